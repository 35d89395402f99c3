use cb_objects::Value;

/// One call's activation record. Locals live in their own vector, separate
/// from the shared evaluation stack (§4.7: "frames (call stack of
/// {returnPC, locals})") — `OP_GET_LOCAL`/`OP_SET_LOCAL` grow this vector on
/// demand rather than indexing into the operand stack.
pub(crate) struct Frame {
  pub return_pc: usize,
  pub locals: Vec<Value>,
}

impl Frame {
  pub fn new(return_pc: usize, args: Vec<Value>) -> Self {
    Frame { return_pc, locals: args }
  }

  pub fn get(&self, idx: usize) -> Value {
    self.locals.get(idx).cloned().unwrap_or(Value::Nil)
  }

  pub fn set(&mut self, idx: usize, value: Value) {
    if idx >= self.locals.len() {
      self.locals.resize(idx + 1, Value::Nil);
    }
    self.locals[idx] = value;
  }
}
