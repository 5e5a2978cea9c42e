use std::collections::HashMap;

use serde::Serialize;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ProgramError {
    #[error("instruction index {index} is outside the program area")]
    IndexOutOfRange { index: u32 },
    #[error("unknown function: {name}")]
    UnknownFunction { name: String },
    #[error("unknown label: {name}")]
    UnknownLabel { name: String },
    #[error("instruction outside of a function: {instruction}")]
    InstructionOutsideFunction { instruction: String },
    #[error(".end method without an open .method directive")]
    DanglingFunctionEnd,
}

type ProgramResult<T> = Result<T, ProgramError>;

const METHOD_OPEN: &str = ".method public static ";
const METHOD_CLOSE: &str = ".end method";

/// The program area: the ordered instruction sequence plus the lookup
/// tables mapping function names to index ranges and label names to
/// indices. Pure storage — it never executes anything.
///
/// `add_instruction` runs a small state machine: a `.method public static`
/// directive opens a function, its first real instruction fixes the
/// function's start index, and `.end method` closes the range at the last
/// stored instruction. A leading `label:` is stripped from each stored
/// instruction and recorded against its index. Label uniqueness across
/// functions is the loader's responsibility, not this store's.
#[derive(Debug, Default, Serialize)]
pub struct ProgramArea {
    program: Vec<String>,
    functions: HashMap<String, (u32, u32)>,
    labels: HashMap<String, u32>,
    #[serde(skip)]
    inside_function: bool,
    #[serde(skip)]
    at_function_start: bool,
    #[serde(skip)]
    current_function: String,
}

impl ProgramArea {
    pub fn new() -> Self {
        ProgramArea::default()
    }

    pub fn add_instruction(&mut self, instruction: &str) -> ProgramResult<()> {
        if self.inside_function {
            if instruction == METHOD_CLOSE {
                self.inside_function = false;
                self.at_function_start = false;
                let range = self
                    .functions
                    .get_mut(&self.current_function)
                    .ok_or(ProgramError::DanglingFunctionEnd)?;
                range.1 = self.program.len() as u32 - 1;
                self.current_function.clear();
            } else {
                self.program.push(instruction.to_string());
                self.record_label();
                if self.at_function_start {
                    let start = self.program.len() as u32 - 1;
                    self.functions.insert(self.current_function.clone(), (start, 0));
                    self.at_function_start = false;
                }
            }
            Ok(())
        } else if let Some(name) = instruction.strip_prefix(METHOD_OPEN) {
            self.inside_function = true;
            self.at_function_start = true;
            self.current_function = normalize(name);
            Ok(())
        } else if instruction == METHOD_CLOSE {
            Err(ProgramError::DanglingFunctionEnd)
        } else {
            Err(ProgramError::InstructionOutsideFunction { instruction: instruction.to_string() })
        }
    }

    pub fn get_instruction(&self, index: u32) -> ProgramResult<&str> {
        self.program
            .get(index as usize)
            .map(String::as_str)
            .ok_or(ProgramError::IndexOutOfRange { index })
    }

    /// (first, last) instruction indices of the named function. The name is
    /// whitespace-normalized before lookup, matching how it was recorded.
    pub fn get_function_range(&self, name: &str) -> ProgramResult<(u32, u32)> {
        self.functions
            .get(&normalize(name))
            .copied()
            .ok_or_else(|| ProgramError::UnknownFunction { name: name.to_string() })
    }

    pub fn get_function_start(&self, name: &str) -> ProgramResult<u32> {
        self.get_function_range(name).map(|(start, _)| start)
    }

    pub fn get_label_index(&self, name: &str) -> ProgramResult<u32> {
        self.labels
            .get(name)
            .copied()
            .ok_or_else(|| ProgramError::UnknownLabel { name: name.to_string() })
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(&normalize(name))
    }

    pub fn instruction_count(&self) -> u32 {
        self.program.len() as u32
    }

    pub fn function_count(&self) -> u32 {
        self.functions.len() as u32
    }

    /// Detects a leading `label:` on the just-stored instruction, records it
    /// and strips it. A colon can also appear inside a string argument, but
    /// arguments are always preceded by a space while a label never is, so a
    /// colon before the first space is what marks a label.
    fn record_label(&mut self) {
        let index = self.program.len() as u32 - 1;
        let stored = self.program.last_mut().expect("called right after a push");
        let colon = match stored.find(':') {
            Some(pos) if stored.find(' ').is_none_or(|space| pos < space) => pos,
            _ => return,
        };
        self.labels.insert(stored[..colon].to_string(), index);
        let rest_start = if stored[colon + 1..].starts_with(' ') { colon + 2 } else { colon + 1 };
        *stored = stored[rest_start..].to_string();
    }
}

fn normalize(name: &str) -> String {
    name.chars().filter(|c| *c != ' ').collect()
}
