use std::io::Write;
use std::process::{Command, Stdio};

fn minijvm() -> Command {
    Command::new(env!("CARGO_BIN_EXE_minijvm"))
}

fn write_program(source: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("failed to create temp file");
    file.write_all(source.as_bytes()).expect("failed to write program");
    file
}

fn run(source: &str) -> std::process::Output {
    let file = write_program(source);
    minijvm().arg(file.path()).output().expect("failed to run minijvm")
}

fn run_with_stdin(source: &str, input: &str) -> std::process::Output {
    let file = write_program(source);
    let mut child = minijvm()
        .arg(file.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn minijvm");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait for minijvm")
}

fn stdout_of(out: &std::process::Output) -> String {
    String::from_utf8_lossy(&out.stdout).to_string()
}

// --- Straight-line programs ---

#[test]
fn arithmetic_and_print() {
    let out = run(
        ".class public Main\n\
         .super java/lang/Object\n\
         .method public static main([Ljava/lang/String;)V\n\
         getstatic java/lang/System/out Ljava/io/PrintStream;\n\
         ldc_w 20\n\
         ldc_w 3\n\
         isub\n\
         invokevirtual java/io/PrintStream/print(I)V\n\
         return\n\
         .end method\n\
         .end class\n",
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(stdout_of(&out), "17");
}

#[test]
fn string_and_long_printing() {
    let out = run(
        ".method public static main([Ljava/lang/String;)V\n\
         getstatic java/lang/System/out Ljava/io/PrintStream;\n\
         ldc_w \"total: \"\n\
         invokevirtual java/io/PrintStream/print(Ljava/lang/String;)V\n\
         getstatic java/lang/System/out Ljava/io/PrintStream;\n\
         ldc2_w 4000000000\n\
         ldc2_w 2\n\
         lmul\n\
         invokevirtual java/io/PrintStream/print(J)V\n\
         return\n\
         .end method\n",
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(stdout_of(&out), "total: 8000000000");
}

// --- Calls ---

#[test]
fn call_and_return_passes_parameters() {
    let out = run(
        ".method public static diff(II)I\n\
         iload 0\n\
         iload 1\n\
         isub\n\
         ireturn\n\
         .end method\n\
         .method public static main([Ljava/lang/String;)V\n\
         getstatic java/lang/System/out Ljava/io/PrintStream;\n\
         ldc_w 10\n\
         ldc_w 3\n\
         invokestatic Main/diff(II)I\n\
         invokevirtual java/io/PrintStream/print(I)V\n\
         return\n\
         .end method\n",
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(stdout_of(&out), "7");
}

// --- Control flow ---

#[test]
fn loop_with_labels_terminates() {
    // sums 1..=10 with a conditional backward branch
    let out = run(
        ".method public static main([Ljava/lang/String;)V\n\
         ldc_w 0\n\
         istore 0\n\
         ldc_w 1\n\
         istore 1\n\
         loop: iload 1\n\
         ldc_w 10\n\
         if_icmpgt done\n\
         iload 0\n\
         iload 1\n\
         iadd\n\
         istore 0\n\
         iload 1\n\
         ldc_w 1\n\
         iadd\n\
         istore 1\n\
         goto loop\n\
         done: getstatic java/lang/System/out Ljava/io/PrintStream;\n\
         iload 0\n\
         invokevirtual java/io/PrintStream/print(I)V\n\
         return\n\
         .end method\n",
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(stdout_of(&out), "55");
}

#[test]
fn same_label_name_in_two_functions() {
    let out = run(
        ".method public static pick(I)I\n\
         iload 0\n\
         ifgt yes\n\
         ldc_w 0\n\
         ireturn\n\
         yes: ldc_w 1\n\
         ireturn\n\
         .end method\n\
         .method public static main([Ljava/lang/String;)V\n\
         ldc_w 5\n\
         invokestatic Main/pick(I)I\n\
         ifgt yes\n\
         return\n\
         yes: getstatic java/lang/System/out Ljava/io/PrintStream;\n\
         ldc_w \"positive\"\n\
         invokevirtual java/io/PrintStream/print(Ljava/lang/String;)V\n\
         return\n\
         .end method\n",
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(stdout_of(&out), "positive");
}

// --- Globals and clinit ---

#[test]
fn globals_round_trip_and_clinit_runs_first() {
    let out = run(
        ".field public static counter I\n\
         .field public static big J\n\
         .method public static <clinit>()V\n\
         ldc_w 41\n\
         putstatic Main/counter I\n\
         ldc2_w 5000000000\n\
         putstatic Main/big J\n\
         return\n\
         .end method\n\
         .method public static main([Ljava/lang/String;)V\n\
         getstatic Main/counter I\n\
         ldc_w 1\n\
         iadd\n\
         putstatic Main/counter I\n\
         getstatic java/lang/System/out Ljava/io/PrintStream;\n\
         getstatic Main/counter I\n\
         invokevirtual java/io/PrintStream/print(I)V\n\
         getstatic java/lang/System/out Ljava/io/PrintStream;\n\
         ldc_w \" \"\n\
         invokevirtual java/io/PrintStream/print(Ljava/lang/String;)V\n\
         getstatic java/lang/System/out Ljava/io/PrintStream;\n\
         getstatic Main/big J\n\
         invokevirtual java/io/PrintStream/print(J)V\n\
         return\n\
         .end method\n",
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(stdout_of(&out), "42 5000000000");
}

// --- Input ---

#[test]
fn reads_a_line_and_parses_it() {
    let out = run_with_stdin(
        ".method public static main([Ljava/lang/String;)V\n\
         getstatic java/lang/System/out Ljava/io/PrintStream;\n\
         new java/io/BufferedReader\n\
         dup\n\
         new java/io/InputStreamReader\n\
         dup\n\
         getstatic java/lang/System/in Ljava/io/InputStream;\n\
         invokespecial java/io/InputStreamReader/<init>(Ljava/io/InputStream;)V\n\
         invokespecial java/io/BufferedReader/<init>(Ljava/io/Reader;)V\n\
         invokevirtual java/io/BufferedReader/readLine()Ljava/lang/String;\n\
         invokestatic java/lang/Integer/parseInt(Ljava/lang/String;)I\n\
         ldc_w 2\n\
         imul\n\
         invokevirtual java/io/PrintStream/print(I)V\n\
         return\n\
         .end method\n",
        "21\n",
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(stdout_of(&out), "42");
}

// --- Errors ---

#[test]
fn unknown_instruction_fails_with_one_message() {
    let out = run(
        ".method public static main([Ljava/lang/String;)V\n\
         frobnicate 3\n\
         return\n\
         .end method\n",
    );
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(stderr.lines().count(), 1, "stderr: {}", stderr);
    assert!(stderr.contains("unknown instruction"), "stderr: {}", stderr);
}

#[test]
fn unknown_directive_fails_at_load() {
    let out = run(".limit stack 10\n");
    assert!(!out.status.success());
    assert!(
        String::from_utf8_lossy(&out.stderr).contains("unknown directive"),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
}

#[test]
fn division_by_zero_fails_at_runtime() {
    let out = run(
        ".method public static main([Ljava/lang/String;)V\n\
         ldc_w 1\n\
         ldc_w 0\n\
         idiv\n\
         return\n\
         .end method\n",
    );
    assert!(!out.status.success());
    assert!(
        String::from_utf8_lossy(&out.stderr).contains("division by zero"),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
}

#[test]
fn missing_file_is_reported() {
    let out = minijvm().arg("no-such-program.j").output().expect("failed to run minijvm");
    assert!(!out.status.success());
    assert!(!out.stderr.is_empty());
}

// --- Image dump ---

#[test]
fn dump_prints_the_image_as_json() {
    let file = write_program(
        ".field public static counter I\n\
         .method public static main([Ljava/lang/String;)V\n\
         return\n\
         .end method\n",
    );
    let out = minijvm()
        .arg(file.path())
        .arg("--dump")
        .output()
        .expect("failed to run minijvm");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = stdout_of(&out);
    assert!(stdout.contains("\"program\""), "expected image JSON, got: {}", stdout);
    assert!(stdout.contains("\"counter\""), "expected globals JSON, got: {}", stdout);
}
