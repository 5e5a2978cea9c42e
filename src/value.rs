// Type-descriptor strings for the reference values the machine fabricates.
// Only strings carry a payload; the stream types exist purely so the I/O
// opcodes can type-check the operand stack.
pub const STRING_TYPE: &str = "Ljava/lang/String;";
pub const PRINT_STREAM_TYPE: &str = "Ljava/io/PrintStream;";
pub const INPUT_STREAM_TYPE: &str = "Ljava/io/InputStream;";
pub const INPUT_STREAM_READER_TYPE: &str = "Ljava/io/InputStreamReader;";
pub const BUFFERED_READER_TYPE: &str = "Ljava/io/BufferedReader;";

/// A reference value: a type descriptor plus an optionally owned payload.
///
/// The machine only ever allocates strings; every other reference is a
/// zero-payload marker standing in for a console stream object. The payload
/// is owned by exactly one stack or local slot at a time and moves with the
/// value — it is never cloned, so it is freed exactly once, by whichever
/// opcode finally consumes or drops it.
#[derive(Debug, PartialEq)]
pub struct RefValue {
    pub type_name: String,
    pub payload: Option<String>,
}

impl RefValue {
    pub fn marker(type_name: impl Into<String>) -> Self {
        RefValue { type_name: type_name.into(), payload: None }
    }

    pub fn string(text: impl Into<String>) -> Self {
        RefValue { type_name: STRING_TYPE.to_string(), payload: Some(text.into()) }
    }
}

/// A tagged runtime value. `Int64` occupies two logical slots on the operand
/// stack and in the local-variable area; the other variants occupy one.
#[derive(Debug, PartialEq)]
pub enum Value {
    Int32(i32),
    Int64(i64),
    Ref(RefValue),
}

/// The tag of a [`Value`], without its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int32,
    Int64,
    Ref,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Int32 => "int",
            ValueKind::Int64 => "long",
            ValueKind::Ref => "reference",
        }
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int32(_) => ValueKind::Int32,
            Value::Int64(_) => ValueKind::Int64,
            Value::Ref(_) => ValueKind::Ref,
        }
    }

    /// Human-readable tag name, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        self.kind().name()
    }
}
