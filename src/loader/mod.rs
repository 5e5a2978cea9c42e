use logos::Logos;
use serde::Serialize;

use crate::globals::GlobalVariablesArea;
use crate::program::{ProgramArea, ProgramError};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("unknown directive: {directive}")]
    UnknownDirective { directive: String },
    #[error("unknown type in global variable declaration: {directive}")]
    UnknownFieldType { directive: String },
    #[error("missing type in global variable declaration: {directive}")]
    MissingFieldType { directive: String },
    #[error(transparent)]
    Program(#[from] ProgramError),
}

/// A fully loaded program: instructions plus global declarations, ready to
/// hand to the machine (or to serialize for `--dump`).
#[derive(Debug, Default, Serialize)]
pub struct Image {
    pub program: ProgramArea,
    pub globals: GlobalVariablesArea,
}

/// Raw source tokens. A quoted string is one token and may contain spaces,
/// escaped quotes and even newlines; everything else is split on blanks and
/// line ends. `Word` is the catch-all, so lexing never fails.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
    #[regex(r#""([^"\\]|\\.)*""#, priority = 10)]
    Str,
    #[regex(r"[ \t\r]+")]
    Blank,
    #[token("\n")]
    Newline,
    #[regex(r"[^ \t\r\n]+", priority = 1)]
    Word,
}

/// Mnemonics whose single argument is a label; their argument gets the same
/// per-function suffix as label definitions.
const BRANCH_MNEMONICS: [&str; 13] = [
    "goto", "if_icmpeq", "if_icmpge", "if_icmpgt", "if_icmple", "if_icmplt", "if_icmpne",
    "ifeq", "ifge", "ifgt", "ifle", "iflt", "ifne",
];

/// Loads source text into a program image.
///
/// Source is first rebuilt into logical lines with normalized whitespace
/// (one space between tokens, none at the ends, string literals untouched),
/// then each line is uniquified for labels and routed: directives to the
/// directive handler, everything else into the program area.
pub fn load(source: &str) -> Result<Image, LoadError> {
    let mut image = Image::default();
    // counts .method directives seen so far; body lines of the n-th
    // function carry suffix _n
    let mut function_ordinal: u32 = 0;

    for mut line in logical_lines(source) {
        uniquify_labels(&mut line, function_ordinal);
        if line.is_empty() {
            continue;
        }
        if line.starts_with('.') {
            handle_directive(&line, &mut image, &mut function_ordinal)?;
        } else {
            image.program.add_instruction(&line)?;
        }
    }

    Ok(image)
}

/// Rebuilds the raw source into clean instruction lines: tabs become
/// spaces, runs of whitespace collapse to a single space, leading and
/// trailing whitespace disappears. Quoted strings pass through verbatim.
fn logical_lines(source: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(token) = lexer.next() {
        match token {
            Ok(RawToken::Str) | Ok(RawToken::Word) => {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(lexer.slice());
            }
            Ok(RawToken::Blank) => {}
            Ok(RawToken::Newline) => lines.push(std::mem::take(&mut current)),
            // unreachable: Word matches any non-blank run
            Err(()) => {}
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Makes labels globally unique by appending `_<function-ordinal>` to a
/// leading label definition and to the label argument of the branch
/// mnemonics. Label definitions sit before the first space of the line;
/// a colon after a space belongs to an argument, not a label.
fn uniquify_labels(line: &mut String, function_ordinal: u32) {
    if line.is_empty() {
        return;
    }

    let space = line.find(' ');
    let mut rest_start = 0;
    if let Some(pos) = line.find(':').filter(|p| space.is_none_or(|s| *p < s)) {
        let suffix = format!("_{function_ordinal}");
        line.insert_str(pos, &suffix);
        let after_colon = pos + suffix.len() + 1;
        rest_start = after_colon
            + line[after_colon..].len()
            - line[after_colon..].trim_start_matches(' ').len();
    }

    if let Some(arg_space) = line[rest_start..].find(' ') {
        let mnemonic = &line[rest_start..rest_start + arg_space];
        if BRANCH_MNEMONICS.contains(&mnemonic) {
            line.push_str(&format!("_{function_ordinal}"));
        }
    }
}

fn handle_directive(
    line: &str,
    image: &mut Image,
    function_ordinal: &mut u32,
) -> Result<(), LoadError> {
    if line.starts_with(".method public static ") {
        image.program.add_instruction(line)?;
        *function_ordinal += 1;
    } else if line == ".end method" {
        image.program.add_instruction(line)?;
    } else if let Some(field) = line.strip_prefix(".field public static ") {
        declare_global(line, field, &mut image.globals)?;
    } else if line == ".class public Main" || line == ".super java/lang/Object" || line == ".end class" {
        // framing directives, nothing to record
    } else {
        return Err(LoadError::UnknownDirective { directive: line.to_string() });
    }
    Ok(())
}

fn declare_global(
    line: &str,
    field: &str,
    globals: &mut GlobalVariablesArea,
) -> Result<(), LoadError> {
    let Some((name, descriptor)) = field.split_once(' ') else {
        return Err(LoadError::MissingFieldType { directive: line.to_string() });
    };
    match descriptor {
        "S" => globals.add_short(name, 0),
        "C" => globals.add_char(name, 0),
        "I" => globals.add_int(name, 0),
        "J" => globals.add_long(name, 0),
        _ => return Err(LoadError::UnknownFieldType { directive: line.to_string() }),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_whitespace_normalized() {
        let lines = logical_lines("  ldc_w\t 5 \n\n   iadd  \n");
        assert_eq!(lines, vec!["ldc_w 5", "", "iadd"]);
    }

    #[test]
    fn string_literals_keep_their_spaces() {
        let lines = logical_lines("ldc_w  \"two  spaces\"\n");
        assert_eq!(lines, vec!["ldc_w \"two  spaces\""]);
    }

    #[test]
    fn escaped_quote_stays_inside_the_string() {
        let lines = logical_lines(r#"ldc_w "say \"hi\""
"#);
        assert_eq!(lines, vec![r#"ldc_w "say \"hi\"""#]);
    }

    #[test]
    fn newline_inside_string_does_not_split_the_line() {
        let lines = logical_lines("ldc_w \"a\nb\"\npop\n");
        assert_eq!(lines, vec!["ldc_w \"a\nb\"", "pop"]);
    }

    #[test]
    fn labels_get_function_suffix() {
        let mut line = "loop: iload 0".to_string();
        uniquify_labels(&mut line, 1);
        assert_eq!(line, "loop_1: iload 0");
    }

    #[test]
    fn branch_arguments_get_function_suffix() {
        let mut line = "goto loop".to_string();
        uniquify_labels(&mut line, 1);
        assert_eq!(line, "goto loop_1");

        let mut line = "again: if_icmplt again".to_string();
        uniquify_labels(&mut line, 2);
        assert_eq!(line, "again_2: if_icmplt again_2");
    }

    #[test]
    fn non_branch_arguments_are_untouched() {
        let mut line = "ldc_w \"a:b\"".to_string();
        uniquify_labels(&mut line, 1);
        assert_eq!(line, "ldc_w \"a:b\"");
    }

    #[test]
    fn loads_functions_labels_and_globals() {
        let image = load(
            ".class public Main\n\
             .super java/lang/Object\n\
             .field public static counter I\n\
             .method public static main([Ljava/lang/String;)V\n\
             start: ldc_w 1\n\
             goto start\n\
             .end method\n\
             .end class\n",
        )
        .unwrap();
        assert_eq!(image.program.get_function_range("main([Ljava/lang/String;)V"), Ok((0, 1)));
        assert_eq!(image.program.get_label_index("start_1"), Ok(0));
        assert_eq!(image.program.get_instruction(1), Ok("goto start_1"));
        assert_eq!(image.globals.get_int("counter"), Ok(0));
    }

    #[test]
    fn same_label_in_two_functions_stays_distinct() {
        let image = load(
            ".method public static a()V\n\
             top: goto top\n\
             .end method\n\
             .method public static b()V\n\
             top: goto top\n\
             .end method\n",
        )
        .unwrap();
        assert_eq!(image.program.get_label_index("top_1"), Ok(0));
        assert_eq!(image.program.get_label_index("top_2"), Ok(1));
    }

    #[test]
    fn unknown_directive_is_rejected() {
        let err = load(".limit stack 10\n").unwrap_err();
        assert_eq!(err, LoadError::UnknownDirective { directive: ".limit stack 10".to_string() });
    }

    #[test]
    fn field_without_type_is_rejected() {
        let err = load(".field public static lonely\n").unwrap_err();
        assert!(matches!(err, LoadError::MissingFieldType { .. }));
    }

    #[test]
    fn field_with_bad_type_is_rejected() {
        let err = load(".field public static x F\n").unwrap_err();
        assert!(matches!(err, LoadError::UnknownFieldType { .. }));
    }

    #[test]
    fn instruction_outside_function_is_a_load_error() {
        let err = load("iadd\n").unwrap_err();
        assert!(matches!(err, LoadError::Program(ProgramError::InstructionOutsideFunction { .. })));
    }
}
