use crate::frame::{ActivationRecord, FrameError};
use crate::value::{RefValue, Value};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum StackError {
    #[error("the call stack is empty")]
    EmptyCallStack,
    #[error("parameter passing requires a caller frame below the callee")]
    FrameUnderflow,
    #[error(transparent)]
    Frame(#[from] FrameError),
}

type StackResult<T> = Result<T, StackError>;

/// The call stack: an ordered sequence of activation records.
///
/// Frames are pushed and popped only at the top, and all operand-stack,
/// PC and local-variable operations are forwarded to the top frame. The
/// one exception is parameter passing, which reads the second-from-top
/// frame while a freshly pushed callee frame sits above its caller.
#[derive(Debug, Default)]
pub struct CallStack {
    frames: Vec<ActivationRecord>,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack::default()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Appends a new, empty activation record.
    pub fn push_frame(&mut self) {
        self.frames.push(ActivationRecord::new());
    }

    /// Removes the top activation record, releasing everything it owns.
    pub fn pop_frame(&mut self) -> StackResult<()> {
        self.frames.pop().map(drop).ok_or(StackError::EmptyCallStack)
    }

    // ── Delegating accessors for the top frame ──────────────────────

    pub fn pc_get(&self) -> StackResult<u32> {
        Ok(self.top()?.pc_get())
    }

    pub fn pc_set(&mut self, value: u32) -> StackResult<()> {
        self.top_mut()?.pc_set(value);
        Ok(())
    }

    pub fn pc_increment(&mut self) -> StackResult<u32> {
        Ok(self.top_mut()?.pc_increment())
    }

    pub fn push_int32(&mut self, value: i32) -> StackResult<()> {
        self.top_mut()?.push_int32(value);
        Ok(())
    }

    pub fn push_int64(&mut self, value: i64) -> StackResult<()> {
        self.top_mut()?.push_int64(value);
        Ok(())
    }

    pub fn push_ref(&mut self, value: RefValue) -> StackResult<()> {
        self.top_mut()?.push_ref(value);
        Ok(())
    }

    pub fn top_int32(&self) -> StackResult<i32> {
        Ok(self.top()?.top_int32()?)
    }

    pub fn top_int64(&self) -> StackResult<i64> {
        Ok(self.top()?.top_int64()?)
    }

    pub fn pop_one(&mut self) -> StackResult<Value> {
        Ok(self.top_mut()?.pop_one()?)
    }

    pub fn pop_two(&mut self) -> StackResult<i64> {
        Ok(self.top_mut()?.pop_two()?)
    }

    pub fn pop_int32(&mut self) -> StackResult<i32> {
        Ok(self.top_mut()?.pop_int32()?)
    }

    pub fn pop_int64(&mut self) -> StackResult<i64> {
        Ok(self.top_mut()?.pop_int64()?)
    }

    pub fn pop_ref(&mut self) -> StackResult<RefValue> {
        Ok(self.top_mut()?.pop_ref()?)
    }

    pub fn dup_one(&mut self) -> StackResult<()> {
        Ok(self.top_mut()?.dup_one()?)
    }

    pub fn dup_two(&mut self) -> StackResult<()> {
        Ok(self.top_mut()?.dup_two()?)
    }

    pub fn swap_one_one(&mut self) -> StackResult<()> {
        Ok(self.top_mut()?.swap_one_one()?)
    }

    pub fn local_set_int32(&mut self, index: u16, value: i32) -> StackResult<()> {
        self.top_mut()?.local_set_int32(index, value);
        Ok(())
    }

    pub fn local_set_int64(&mut self, index: u16, value: i64) -> StackResult<()> {
        self.top_mut()?.local_set_int64(index, value);
        Ok(())
    }

    pub fn local_get_int32(&self, index: u16) -> StackResult<i32> {
        Ok(self.top()?.local_get_int32(index)?)
    }

    pub fn local_get_int64(&self, index: u16) -> StackResult<i64> {
        Ok(self.top()?.local_get_int64(index)?)
    }

    // ── Parameter passing ───────────────────────────────────────────

    /// Pops an int from the caller frame (second from top) and stores it in
    /// local `index` of the callee frame (top). Used right after a call
    /// instruction pushes the callee frame.
    pub fn pass_int32_parameter(&mut self, index: u16) -> StackResult<()> {
        let (caller, callee) = self.top_two_mut()?;
        let value = caller.pop_int32()?;
        callee.local_set_int32(index, value);
        Ok(())
    }

    /// Pops a long from the caller frame and stores it in locals `index`
    /// and `index + 1` of the callee frame.
    pub fn pass_int64_parameter(&mut self, index: u16) -> StackResult<()> {
        let (caller, callee) = self.top_two_mut()?;
        let value = caller.pop_int64()?;
        callee.local_set_int64(index, value);
        Ok(())
    }

    fn top(&self) -> StackResult<&ActivationRecord> {
        self.frames.last().ok_or(StackError::EmptyCallStack)
    }

    fn top_mut(&mut self) -> StackResult<&mut ActivationRecord> {
        self.frames.last_mut().ok_or(StackError::EmptyCallStack)
    }

    /// Caller (second from top) and callee (top), mutably.
    fn top_two_mut(&mut self) -> StackResult<(&mut ActivationRecord, &mut ActivationRecord)> {
        let len = self.frames.len();
        if len < 2 {
            return Err(StackError::FrameUnderflow);
        }
        let (below, top) = self.frames.split_at_mut(len - 1);
        Ok((&mut below[len - 2], &mut top[0]))
    }
}
