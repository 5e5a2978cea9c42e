use std::io::{self, BufRead, Write};

use crate::callstack::{CallStack, StackError};
use crate::globals::{GlobalVariablesArea, UnknownGlobal};
use crate::loader::Image;
use crate::program::{ProgramArea, ProgramError};
use crate::value::{
    BUFFERED_READER_TYPE, INPUT_STREAM_READER_TYPE, INPUT_STREAM_TYPE, PRINT_STREAM_TYPE,
    RefValue, STRING_TYPE,
};

const CLINIT: &str = "<clinit>()V";
const MAIN: &str = "main([Ljava/lang/String;)V";

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum VmError {
    #[error("unknown instruction: {mnemonic}")]
    UnknownInstruction { mnemonic: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("expected a reference of type {expected} on the operand stack")]
    UnexpectedReferenceType { expected: &'static str },
    #[error(transparent)]
    Global(#[from] UnknownGlobal),
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error(transparent)]
    Stack(#[from] StackError),
}

type VmResult<T> = Result<T, VmError>;

// ── Opcodes ─────────────────────────────────────────────────────────

/// Every mnemonic the machine executes. Parsing the mnemonic once into an
/// enum keeps dispatch to a single match instead of a chain of string
/// comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Nop,
    LdcW,
    Ldc2W,
    Sipush,
    Dup,
    Dup2,
    Pop,
    Pop2,
    Swap,
    Iadd,
    Isub,
    Imul,
    Idiv,
    Irem,
    Ineg,
    Ishl,
    Ishr,
    Ladd,
    Lsub,
    Lmul,
    Ldiv,
    Lrem,
    Lneg,
    Lshl,
    Lshr,
    Lcmp,
    Goto,
    IfIcmpeq,
    IfIcmpne,
    IfIcmplt,
    IfIcmple,
    IfIcmpgt,
    IfIcmpge,
    Ifeq,
    Ifne,
    Iflt,
    Ifle,
    Ifgt,
    Ifge,
    Iload,
    Istore,
    Lload,
    Lstore,
    I2c,
    I2s,
    I2l,
    L2i,
    Getstatic,
    Putstatic,
    Invokestatic,
    Invokevirtual,
    Invokespecial,
    New,
    Return,
    Ireturn,
    Lreturn,
}

impl Opcode {
    pub fn parse(mnemonic: &str) -> Option<Opcode> {
        Some(match mnemonic {
            "nop" => Opcode::Nop,
            "ldc_w" => Opcode::LdcW,
            "ldc2_w" => Opcode::Ldc2W,
            "sipush" => Opcode::Sipush,
            "dup" => Opcode::Dup,
            "dup2" => Opcode::Dup2,
            "pop" => Opcode::Pop,
            "pop2" => Opcode::Pop2,
            "swap" => Opcode::Swap,
            "iadd" => Opcode::Iadd,
            "isub" => Opcode::Isub,
            "imul" => Opcode::Imul,
            "idiv" => Opcode::Idiv,
            "irem" => Opcode::Irem,
            "ineg" => Opcode::Ineg,
            "ishl" => Opcode::Ishl,
            "ishr" => Opcode::Ishr,
            "ladd" => Opcode::Ladd,
            "lsub" => Opcode::Lsub,
            "lmul" => Opcode::Lmul,
            "ldiv" => Opcode::Ldiv,
            "lrem" => Opcode::Lrem,
            "lneg" => Opcode::Lneg,
            "lshl" => Opcode::Lshl,
            "lshr" => Opcode::Lshr,
            "lcmp" => Opcode::Lcmp,
            "goto" => Opcode::Goto,
            "if_icmpeq" => Opcode::IfIcmpeq,
            "if_icmpne" => Opcode::IfIcmpne,
            "if_icmplt" => Opcode::IfIcmplt,
            "if_icmple" => Opcode::IfIcmple,
            "if_icmpgt" => Opcode::IfIcmpgt,
            "if_icmpge" => Opcode::IfIcmpge,
            "ifeq" => Opcode::Ifeq,
            "ifne" => Opcode::Ifne,
            "iflt" => Opcode::Iflt,
            "ifle" => Opcode::Ifle,
            "ifgt" => Opcode::Ifgt,
            "ifge" => Opcode::Ifge,
            "iload" => Opcode::Iload,
            "istore" => Opcode::Istore,
            "lload" => Opcode::Lload,
            "lstore" => Opcode::Lstore,
            "i2c" => Opcode::I2c,
            "i2s" => Opcode::I2s,
            "i2l" => Opcode::I2l,
            "l2i" => Opcode::L2i,
            "getstatic" => Opcode::Getstatic,
            "putstatic" => Opcode::Putstatic,
            "invokestatic" => Opcode::Invokestatic,
            "invokevirtual" => Opcode::Invokevirtual,
            "invokespecial" => Opcode::Invokespecial,
            "new" => Opcode::New,
            "return" => Opcode::Return,
            "ireturn" => Opcode::Ireturn,
            "lreturn" => Opcode::Lreturn,
            _ => return None,
        })
    }
}

// ── Console ─────────────────────────────────────────────────────────

/// The machine's view of the outside world: the print stream and the line
/// reader behind the fictitious `System.out` / `System.in` references.
pub trait Console {
    fn write(&mut self, text: &str);

    /// Next input line without its terminator, or `None` at end of input.
    fn read_line(&mut self) -> Option<String>;
}

/// Production console on the process's stdin/stdout.
pub struct StdConsole;

impl Console for StdConsole {
    fn write(&mut self, text: &str) {
        print!("{text}");
        let _ = io::stdout().flush();
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                }
                if line.ends_with('\r') {
                    line.pop();
                }
                Some(line)
            }
        }
    }
}

// ── The machine ─────────────────────────────────────────────────────

/// The execution engine: fetch, decode, execute over a loaded image.
pub struct Machine<C> {
    program: ProgramArea,
    globals: GlobalVariablesArea,
    stack: CallStack,
    console: C,
}

impl Machine<StdConsole> {
    pub fn new(image: Image) -> Self {
        Machine::with_console(image, StdConsole)
    }
}

impl<C: Console> Machine<C> {
    pub fn with_console(image: Image, console: C) -> Self {
        Machine {
            program: image.program,
            globals: image.globals,
            stack: CallStack::new(),
            console,
        }
    }

    /// Runs `<clinit>()V` to completion if the program defines it, then
    /// `main([Ljava/lang/String;)V`. A program with no main is an error.
    pub fn run(&mut self) -> VmResult<()> {
        if self.program.has_function(CLINIT) {
            self.run_function(CLINIT)?;
        }
        self.run_function(MAIN)
    }

    fn run_function(&mut self, name: &str) -> VmResult<()> {
        let start = self.program.get_function_start(name)?;
        self.stack.push_frame();
        self.stack.pc_set(start)?;
        while !self.stack.is_empty() {
            self.step()?;
        }
        Ok(())
    }

    /// One fetch-decode-execute cycle. The PC is incremented before the
    /// instruction runs, so branches and calls overwrite it cleanly and
    /// straight-line code falls through to the next index.
    fn step(&mut self) -> VmResult<()> {
        let pc = self.stack.pc_get()?;
        let instruction = self.program.get_instruction(pc)?.to_string();
        self.stack.pc_increment()?;

        let (mnemonic, arg) = split_first_space(&instruction);
        // a bare label line stores an empty instruction
        if mnemonic.is_empty() {
            return Ok(());
        }
        let opcode = Opcode::parse(mnemonic)
            .ok_or_else(|| VmError::UnknownInstruction { mnemonic: mnemonic.to_string() })?;
        self.execute(opcode, arg)
    }

    fn execute(&mut self, opcode: Opcode, arg: &str) -> VmResult<()> {
        match opcode {
            Opcode::Nop => {}

            // ── Constants ───────────────────────────────────────────
            Opcode::LdcW => {
                if let Some(text) = arg.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
                    self.stack.push_ref(RefValue::string(unescape(text)))?;
                } else {
                    self.stack.push_int32(parse_literal(arg) as i32)?;
                }
            }
            Opcode::Ldc2W => self.stack.push_int64(parse_literal(arg))?,
            Opcode::Sipush => self.stack.push_int32(parse_literal(arg) as i16 as i32)?,

            // ── Stack shuffling ─────────────────────────────────────
            Opcode::Dup => self.stack.dup_one()?,
            Opcode::Dup2 => self.stack.dup_two()?,
            Opcode::Pop => {
                self.stack.pop_one()?;
            }
            Opcode::Pop2 => {
                self.stack.pop_two()?;
            }
            Opcode::Swap => self.stack.swap_one_one()?,

            // ── 32-bit arithmetic ───────────────────────────────────
            Opcode::Iadd => self.ibinop(i32::wrapping_add)?,
            Opcode::Isub => self.ibinop(i32::wrapping_sub)?,
            Opcode::Imul => self.ibinop(i32::wrapping_mul)?,
            Opcode::Idiv => {
                self.check_int32_divisor()?;
                self.ibinop(i32::wrapping_div)?;
            }
            Opcode::Irem => {
                self.check_int32_divisor()?;
                self.ibinop(i32::wrapping_rem)?;
            }
            Opcode::Ineg => {
                let v = self.stack.pop_int32()?;
                self.stack.push_int32(v.wrapping_neg())?;
            }
            Opcode::Ishl => self.ibinop(|b, a| b.wrapping_shl(a as u32))?,
            Opcode::Ishr => self.ibinop(|b, a| b.wrapping_shr(a as u32))?,

            // ── 64-bit arithmetic ───────────────────────────────────
            Opcode::Ladd => self.lbinop(i64::wrapping_add)?,
            Opcode::Lsub => self.lbinop(i64::wrapping_sub)?,
            Opcode::Lmul => self.lbinop(i64::wrapping_mul)?,
            Opcode::Ldiv => {
                self.check_int64_divisor()?;
                self.lbinop(i64::wrapping_div)?;
            }
            Opcode::Lrem => {
                self.check_int64_divisor()?;
                self.lbinop(i64::wrapping_rem)?;
            }
            Opcode::Lneg => {
                let v = self.stack.pop_int64()?;
                self.stack.push_int64(v.wrapping_neg())?;
            }
            Opcode::Lshl => {
                let a = self.stack.pop_int32()?;
                let b = self.stack.pop_int64()?;
                self.stack.push_int64(b.wrapping_shl(a as u32))?;
            }
            Opcode::Lshr => {
                let a = self.stack.pop_int32()?;
                let b = self.stack.pop_int64()?;
                self.stack.push_int64(b.wrapping_shr(a as u32))?;
            }
            Opcode::Lcmp => {
                let a = self.stack.pop_int64()?;
                let b = self.stack.pop_int64()?;
                self.stack.push_int32(match b.cmp(&a) {
                    std::cmp::Ordering::Less => -1,
                    std::cmp::Ordering::Equal => 0,
                    std::cmp::Ordering::Greater => 1,
                })?;
            }

            // ── Control flow ────────────────────────────────────────
            Opcode::Goto => {
                let target = self.program.get_label_index(arg)?;
                self.stack.pc_set(target)?;
            }
            Opcode::IfIcmpeq => self.branch_icmp(arg, |b, a| b == a)?,
            Opcode::IfIcmpne => self.branch_icmp(arg, |b, a| b != a)?,
            Opcode::IfIcmplt => self.branch_icmp(arg, |b, a| b < a)?,
            Opcode::IfIcmple => self.branch_icmp(arg, |b, a| b <= a)?,
            Opcode::IfIcmpgt => self.branch_icmp(arg, |b, a| b > a)?,
            Opcode::IfIcmpge => self.branch_icmp(arg, |b, a| b >= a)?,
            Opcode::Ifeq => self.branch_izero(arg, |a| a == 0)?,
            Opcode::Ifne => self.branch_izero(arg, |a| a != 0)?,
            Opcode::Iflt => self.branch_izero(arg, |a| a < 0)?,
            Opcode::Ifle => self.branch_izero(arg, |a| a <= 0)?,
            Opcode::Ifgt => self.branch_izero(arg, |a| a > 0)?,
            Opcode::Ifge => self.branch_izero(arg, |a| a >= 0)?,

            // ── Locals ──────────────────────────────────────────────
            Opcode::Iload => {
                let v = self.stack.local_get_int32(parse_index(arg))?;
                self.stack.push_int32(v)?;
            }
            Opcode::Istore => {
                let v = self.stack.pop_int32()?;
                self.stack.local_set_int32(parse_index(arg), v)?;
            }
            Opcode::Lload => {
                let v = self.stack.local_get_int64(parse_index(arg))?;
                self.stack.push_int64(v)?;
            }
            Opcode::Lstore => {
                let v = self.stack.pop_int64()?;
                self.stack.local_set_int64(parse_index(arg), v)?;
            }

            // ── Conversions ─────────────────────────────────────────
            Opcode::I2c => {
                let v = self.stack.pop_int32()?;
                self.stack.push_int32((v as u16) as i32)?;
            }
            Opcode::I2s => {
                let v = self.stack.pop_int32()?;
                self.stack.push_int32((v as i16) as i32)?;
            }
            Opcode::I2l => {
                let v = self.stack.pop_int32()?;
                self.stack.push_int64(v as i64)?;
            }
            Opcode::L2i => {
                let v = self.stack.pop_int64()?;
                self.stack.push_int32(v as i32)?;
            }

            // ── Globals and fictitious statics ──────────────────────
            Opcode::Getstatic => self.getstatic(arg)?,
            Opcode::Putstatic => self.putstatic(arg)?,

            // ── Calls and returns ───────────────────────────────────
            Opcode::Invokestatic => self.invokestatic(arg)?,
            Opcode::Invokevirtual => self.invokevirtual(arg)?,
            Opcode::Invokespecial => self.invokespecial(arg)?,
            Opcode::New => self.stack.push_ref(RefValue::marker(format!("L{};", arg.trim())))?,
            Opcode::Return => self.stack.pop_frame()?,
            Opcode::Ireturn => {
                let v = self.stack.pop_int32()?;
                self.stack.pop_frame()?;
                self.stack.push_int32(v)?;
            }
            Opcode::Lreturn => {
                let v = self.stack.pop_int64()?;
                self.stack.pop_frame()?;
                self.stack.push_int64(v)?;
            }
        }
        Ok(())
    }

    // ── Arithmetic helpers ──────────────────────────────────────────

    /// Pops a then b, pushes `f(b, a)`.
    fn ibinop(&mut self, f: impl Fn(i32, i32) -> i32) -> VmResult<()> {
        let a = self.stack.pop_int32()?;
        let b = self.stack.pop_int32()?;
        self.stack.push_int32(f(b, a))?;
        Ok(())
    }

    fn lbinop(&mut self, f: impl Fn(i64, i64) -> i64) -> VmResult<()> {
        let a = self.stack.pop_int64()?;
        let b = self.stack.pop_int64()?;
        self.stack.push_int64(f(b, a))?;
        Ok(())
    }

    /// The divisor sits on top; it is checked before either operand is
    /// popped, so a division by zero leaves the stack untouched.
    fn check_int32_divisor(&self) -> VmResult<()> {
        if self.stack.top_int32()? == 0 {
            return Err(VmError::DivisionByZero);
        }
        Ok(())
    }

    fn check_int64_divisor(&self) -> VmResult<()> {
        if self.stack.top_int64()? == 0 {
            return Err(VmError::DivisionByZero);
        }
        Ok(())
    }

    // ── Branch helpers ──────────────────────────────────────────────

    /// Pops a then b, branches to `label` when `predicate(b, a)` holds.
    /// The label is resolved only for a taken branch.
    fn branch_icmp(&mut self, label: &str, predicate: impl Fn(i32, i32) -> bool) -> VmResult<()> {
        let a = self.stack.pop_int32()?;
        let b = self.stack.pop_int32()?;
        if predicate(b, a) {
            let target = self.program.get_label_index(label)?;
            self.stack.pc_set(target)?;
        }
        Ok(())
    }

    fn branch_izero(&mut self, label: &str, predicate: impl Fn(i32) -> bool) -> VmResult<()> {
        let a = self.stack.pop_int32()?;
        if predicate(a) {
            let target = self.program.get_label_index(label)?;
            self.stack.pc_set(target)?;
        }
        Ok(())
    }

    // ── Statics ─────────────────────────────────────────────────────

    fn getstatic(&mut self, arg: &str) -> VmResult<()> {
        match arg {
            "java/lang/System/out Ljava/io/PrintStream;" => {
                self.stack.push_ref(RefValue::marker(PRINT_STREAM_TYPE))?;
            }
            "java/lang/System/in Ljava/io/InputStream;" => {
                self.stack.push_ref(RefValue::marker(INPUT_STREAM_TYPE))?;
            }
            _ => {
                let (name, descriptor) = parse_global(arg)?;
                match descriptor {
                    "S" => {
                        let v = self.globals.get_short(name)?;
                        self.stack.push_int32(v as i32)?;
                    }
                    "C" => {
                        let v = self.globals.get_char(name)?;
                        self.stack.push_int32(v as i32)?;
                    }
                    "I" => {
                        let v = self.globals.get_int(name)?;
                        self.stack.push_int32(v)?;
                    }
                    "J" => {
                        let v = self.globals.get_long(name)?;
                        self.stack.push_int64(v)?;
                    }
                    _ => return Err(unknown_global(arg)),
                }
            }
        }
        Ok(())
    }

    fn putstatic(&mut self, arg: &str) -> VmResult<()> {
        let (name, descriptor) = parse_global(arg)?;
        match descriptor {
            "S" => {
                let v = self.stack.pop_int32()?;
                self.globals.set_short(name, v as i16)?;
            }
            "C" => {
                let v = self.stack.pop_int32()?;
                self.globals.set_char(name, v as u16)?;
            }
            "I" => {
                let v = self.stack.pop_int32()?;
                self.globals.set_int(name, v)?;
            }
            "J" => {
                let v = self.stack.pop_int64()?;
                self.globals.set_long(name, v)?;
            }
            _ => return Err(unknown_global(arg)),
        }
        Ok(())
    }

    // ── Calls ───────────────────────────────────────────────────────

    fn invokestatic(&mut self, arg: &str) -> VmResult<()> {
        let signature: String = arg.chars().filter(|c| *c != ' ').collect();
        match signature.as_str() {
            "java/lang/Integer/parseInt(Ljava/lang/String;)I" => {
                let text = self.pop_string()?;
                self.stack.push_int32(parse_literal(&text) as i32)?;
            }
            "java/lang/Long/parseLong(Ljava/lang/String;)J" => {
                let text = self.pop_string()?;
                self.stack.push_int64(parse_literal(&text))?;
            }
            _ => {
                let name = signature.strip_prefix("Main/").unwrap_or(&signature);
                let start = self.program.get_function_start(name)?;
                let widths = parameter_widths(name);
                self.stack.push_frame();
                // rightmost parameter is on top of the caller's stack
                let mut index: u16 = widths.iter().sum();
                for width in widths.iter().rev() {
                    index -= width;
                    match width {
                        2 => self.stack.pass_int64_parameter(index)?,
                        _ => self.stack.pass_int32_parameter(index)?,
                    }
                }
                self.stack.pc_set(start)?;
            }
        }
        Ok(())
    }

    fn invokevirtual(&mut self, arg: &str) -> VmResult<()> {
        let signature: String = arg.chars().filter(|c| *c != ' ').collect();
        match signature.as_str() {
            "java/io/PrintStream/print(I)V" => {
                let v = self.stack.pop_int32()?;
                self.pop_marker(PRINT_STREAM_TYPE)?;
                self.console.write(&v.to_string());
            }
            "java/io/PrintStream/print(C)V" => {
                let v = self.stack.pop_int32()?;
                self.pop_marker(PRINT_STREAM_TYPE)?;
                let c = char::from_u32((v as u16) as u32).unwrap_or(char::REPLACEMENT_CHARACTER);
                self.console.write(&c.to_string());
            }
            "java/io/PrintStream/print(J)V" => {
                let v = self.stack.pop_int64()?;
                self.pop_marker(PRINT_STREAM_TYPE)?;
                self.console.write(&v.to_string());
            }
            "java/io/PrintStream/print(Ljava/lang/String;)V" => {
                let text = self.pop_string()?;
                self.pop_marker(PRINT_STREAM_TYPE)?;
                self.console.write(&text);
            }
            "java/io/BufferedReader/read()I" => {
                self.pop_marker(BUFFERED_READER_TYPE)?;
                let v = match self.console.read_line() {
                    None => -1,
                    // one character; the rest of the line is discarded
                    Some(line) => line.chars().next().map(|c| c as i32).unwrap_or('\n' as i32),
                };
                self.stack.push_int32(v)?;
            }
            "java/io/BufferedReader/readLine()Ljava/lang/String;" => {
                self.pop_marker(BUFFERED_READER_TYPE)?;
                let line = self.console.read_line().unwrap_or_default();
                self.stack.push_ref(RefValue::string(line))?;
            }
            _ => {
                return Err(VmError::UnknownInstruction {
                    mnemonic: format!("invokevirtual {signature}"),
                });
            }
        }
        Ok(())
    }

    fn invokespecial(&mut self, arg: &str) -> VmResult<()> {
        let signature: String = arg.chars().filter(|c| *c != ' ').collect();
        match signature.as_str() {
            "java/io/InputStreamReader/<init>(Ljava/io/InputStream;)V" => {
                self.pop_marker(INPUT_STREAM_TYPE)?;
                self.pop_marker(INPUT_STREAM_READER_TYPE)?;
            }
            "java/io/BufferedReader/<init>(Ljava/io/Reader;)V" => {
                self.pop_marker(INPUT_STREAM_READER_TYPE)?;
                self.pop_marker(BUFFERED_READER_TYPE)?;
            }
            _ => {
                return Err(VmError::UnknownInstruction {
                    mnemonic: format!("invokespecial {signature}"),
                });
            }
        }
        Ok(())
    }

    // ── Reference helpers ───────────────────────────────────────────

    /// Pops a string reference and takes ownership of its text; the
    /// reference itself is gone after this.
    fn pop_string(&mut self) -> VmResult<String> {
        let r = self.stack.pop_ref()?;
        if r.type_name != STRING_TYPE {
            return Err(VmError::UnexpectedReferenceType { expected: STRING_TYPE });
        }
        Ok(r.payload.unwrap_or_default())
    }

    fn pop_marker(&mut self, expected: &'static str) -> VmResult<()> {
        let r = self.stack.pop_ref()?;
        if r.type_name != expected {
            return Err(VmError::UnexpectedReferenceType { expected });
        }
        Ok(())
    }
}

// ── Free helpers ────────────────────────────────────────────────────

fn split_first_space(instruction: &str) -> (&str, &str) {
    match instruction.find(' ') {
        Some(pos) => (&instruction[..pos], &instruction[pos + 1..]),
        None => (instruction, ""),
    }
}

/// Numeric literal with C `atol` semantics: an optional sign and the
/// longest run of leading digits; anything without a leading digit
/// parses as 0, trailing junk is ignored.
fn parse_literal(arg: &str) -> i64 {
    let text = arg.trim_start();
    let sign = if text.starts_with(['+', '-']) { 1 } else { 0 };
    let digits = text[sign..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len() - sign);
    text[..sign + digits].parse().unwrap_or(0)
}

fn parse_index(arg: &str) -> u16 {
    parse_literal(arg) as u16
}

/// Strips escape backslashes from a string literal's content.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Splits a `Main/name D` static field argument into name and descriptor.
fn parse_global(arg: &str) -> VmResult<(&str, &str)> {
    arg.strip_prefix("Main/")
        .and_then(|rest| rest.split_once(' '))
        .ok_or_else(|| unknown_global(arg))
}

fn unknown_global(arg: &str) -> VmError {
    VmError::Global(UnknownGlobal { name: arg.to_string() })
}

/// Slot widths of the parameters in a `name(…)…` signature, in declaration
/// order. I, C and S take one slot, J takes two.
fn parameter_widths(signature: &str) -> Vec<u16> {
    let params = signature
        .find('(')
        .zip(signature.find(')'))
        .map(|(open, close)| &signature[open + 1..close])
        .unwrap_or("");
    params
        .chars()
        .filter_map(|c| match c {
            'J' => Some(2),
            'I' | 'C' | 'S' => Some(1),
            _ => None,
        })
        .collect()
}
