use crate::value::{RefValue, Value};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("the operand stack is empty")]
    EmptyStack,
    #[error("the operand stack holds fewer than two one-slot entries")]
    StackTooShort,
    #[error("expected {expected} on the operand stack, found {found}")]
    TypeMismatch { expected: &'static str, found: &'static str },
    #[error("access to local variable {index}, which has not been initialized")]
    UninitializedLocal { index: u16 },
    #[error("local variable {index} is not of type {expected}")]
    LocalTypeMismatch { index: u16, expected: &'static str },
}

type FrameResult<T> = Result<T, FrameError>;

/// One slot of the local-variable area. A long occupies two consecutive
/// slots: the first holds the value, the second is a `Continuation` marker
/// with no independent content.
#[derive(Debug, PartialEq)]
enum LocalSlot {
    Int32(i32),
    Int64(i64),
    Continuation,
}

/// An activation record: one function call's execution state.
///
/// Holds the program counter, the operand stack and the local-variable
/// area. The operand stack stores one entry per value; width accounting
/// (a long "occupies two slots") is enforced by the typed pop/dup/swap
/// operations rather than by physical slot layout. Locals are addressed by
/// a 16-bit index and the area grows on demand.
#[derive(Debug, Default)]
pub struct ActivationRecord {
    program_counter: u32,
    operand_stack: Vec<Value>,
    locals: Vec<Option<LocalSlot>>,
}

impl ActivationRecord {
    pub fn new() -> Self {
        ActivationRecord::default()
    }

    // ── Program counter ─────────────────────────────────────────────

    pub fn pc_get(&self) -> u32 {
        self.program_counter
    }

    pub fn pc_set(&mut self, value: u32) {
        self.program_counter = value;
    }

    /// Adds 1 to the PC and returns the incremented value.
    pub fn pc_increment(&mut self) -> u32 {
        self.program_counter += 1;
        self.program_counter
    }

    // ── Operand stack ───────────────────────────────────────────────

    pub fn push_int32(&mut self, value: i32) {
        self.operand_stack.push(Value::Int32(value));
    }

    pub fn push_int64(&mut self, value: i64) {
        self.operand_stack.push(Value::Int64(value));
    }

    pub fn push_ref(&mut self, value: RefValue) {
        self.operand_stack.push(Value::Ref(value));
    }

    pub fn top_int32(&self) -> FrameResult<i32> {
        match self.top()? {
            Value::Int32(v) => Ok(*v),
            other => Err(type_mismatch("int", other)),
        }
    }

    pub fn top_int64(&self) -> FrameResult<i64> {
        match self.top()? {
            Value::Int64(v) => Ok(*v),
            other => Err(type_mismatch("long", other)),
        }
    }

    pub fn top_ref(&self) -> FrameResult<&RefValue> {
        match self.top()? {
            Value::Ref(r) => Ok(r),
            other => Err(type_mismatch("a reference", other)),
        }
    }

    /// Removes and returns the top one-slot entry (an int or a reference).
    ///
    /// Popping a reference hands its payload to the caller; nothing is
    /// released here. A consuming opcode takes the payload, anything else
    /// drops the returned value and with it the payload, exactly once.
    pub fn pop_one(&mut self) -> FrameResult<Value> {
        match self.top()? {
            Value::Int64(_) => Err(type_mismatch("an int or a reference", &Value::Int64(0))),
            _ => Ok(self.operand_stack.pop().expect("top() checked non-empty")),
        }
    }

    /// Removes the top two-slot entry (a long) and returns its value.
    pub fn pop_two(&mut self) -> FrameResult<i64> {
        match self.top()? {
            Value::Int64(v) => {
                let v = *v;
                self.operand_stack.pop();
                Ok(v)
            }
            other => Err(type_mismatch("long", other)),
        }
    }

    pub fn pop_int32(&mut self) -> FrameResult<i32> {
        let v = self.top_int32()?;
        self.operand_stack.pop();
        Ok(v)
    }

    pub fn pop_int64(&mut self) -> FrameResult<i64> {
        let v = self.top_int64()?;
        self.operand_stack.pop();
        Ok(v)
    }

    pub fn pop_ref(&mut self) -> FrameResult<RefValue> {
        self.top_ref()?;
        match self.operand_stack.pop() {
            Some(Value::Ref(r)) => Ok(r),
            _ => unreachable!("top_ref() checked the tag"),
        }
    }

    /// Duplicates the top one-slot entry. For a reference the payload moves
    /// to the new top entry; the older entry keeps the type tag only, so the
    /// payload still has exactly one owner.
    pub fn dup_one(&mut self) -> FrameResult<()> {
        match self.top()? {
            Value::Int32(v) => {
                let v = *v;
                self.push_int32(v);
                Ok(())
            }
            Value::Ref(_) => {
                let top = self.operand_stack.last_mut().expect("top() checked non-empty");
                let Value::Ref(r) = top else { unreachable!() };
                let duplicate = RefValue { type_name: r.type_name.clone(), payload: r.payload.take() };
                self.push_ref(duplicate);
                Ok(())
            }
            other => Err(type_mismatch("an int or a reference", other)),
        }
    }

    /// Duplicates the top two-slot entry (a long).
    pub fn dup_two(&mut self) -> FrameResult<()> {
        let v = self.top_int64()?;
        self.push_int64(v);
        Ok(())
    }

    /// Exchanges the top two entries; both must be one-slot values.
    pub fn swap_one_one(&mut self) -> FrameResult<()> {
        let len = self.operand_stack.len();
        if len < 2 {
            return Err(FrameError::StackTooShort);
        }
        for entry in &self.operand_stack[len - 2..] {
            if let Value::Int64(_) = entry {
                return Err(type_mismatch("an int or a reference", entry));
            }
        }
        self.operand_stack.swap(len - 1, len - 2);
        Ok(())
    }

    // ── Local variables ─────────────────────────────────────────────

    /// Stores an int at `index`, releasing whatever the slot held before.
    pub fn local_set_int32(&mut self, index: u16, value: i32) {
        let index = index as usize;
        self.grow_locals(index + 1);
        self.release_slot(index);
        self.locals[index] = Some(LocalSlot::Int32(value));
    }

    /// Stores a long at `index` and `index + 1`, releasing whatever either
    /// slot held before (including long halves that straddle the boundary).
    pub fn local_set_int64(&mut self, index: u16, value: i64) {
        let index = index as usize;
        self.grow_locals(index + 2);
        self.release_slot(index);
        self.release_slot(index + 1);
        self.locals[index] = Some(LocalSlot::Int64(value));
        self.locals[index + 1] = Some(LocalSlot::Continuation);
    }

    pub fn local_get_int32(&self, index: u16) -> FrameResult<i32> {
        match self.locals.get(index as usize) {
            None => Err(FrameError::UninitializedLocal { index }),
            Some(Some(LocalSlot::Int32(v))) => Ok(*v),
            Some(_) => Err(FrameError::LocalTypeMismatch { index, expected: "int" }),
        }
    }

    pub fn local_get_int64(&self, index: u16) -> FrameResult<i64> {
        if (index as usize) + 1 >= self.locals.len() {
            return Err(FrameError::UninitializedLocal { index });
        }
        match &self.locals[index as usize] {
            Some(LocalSlot::Int64(v)) => Ok(*v),
            _ => Err(FrameError::LocalTypeMismatch { index, expected: "long" }),
        }
    }

    fn grow_locals(&mut self, len: usize) {
        if self.locals.len() < len {
            self.locals.resize_with(len, || None);
        }
    }

    /// Clears the slot at `index` together with the other half of any long
    /// it belongs to.
    fn release_slot(&mut self, index: usize) {
        match self.locals[index] {
            Some(LocalSlot::Int64(_)) => {
                self.locals[index] = None;
                self.locals[index + 1] = None;
            }
            Some(LocalSlot::Continuation) => {
                self.locals[index - 1] = None;
                self.locals[index] = None;
            }
            _ => self.locals[index] = None,
        }
    }

    fn top(&self) -> FrameResult<&Value> {
        self.operand_stack.last().ok_or(FrameError::EmptyStack)
    }
}

fn type_mismatch(expected: &'static str, found: &Value) -> FrameError {
    FrameError::TypeMismatch { expected, found: found.kind_name() }
}
