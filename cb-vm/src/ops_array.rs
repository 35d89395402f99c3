use cb_core::chunk::OpCode;
use cb_objects::{ArrayObj, Value};

use crate::{Step, VmResult, VM};

impl<'a> VM<'a> {
  pub(crate) fn exec_array_op(&mut self, op: OpCode, op_pc: usize) -> VmResult<Step> {
    match op {
      OpCode::NewArray => {
        let count = self.next_byte() as usize;
        let mut elements = Vec::with_capacity(count);
        for _ in 0..count {
          elements.push(self.pop());
        }
        elements.reverse();
        let mut arr = ArrayObj::new();
        for e in elements {
          arr.push(e);
        }
        self.note_container_created();
        self.push(Value::array(arr));
      }
      OpCode::IndexGet => {
        let index = self.pop();
        let target = self.pop();
        let result = match (target.as_array(), index.as_number()) {
          (Some(arr), Some(i)) => arr.borrow().get(i),
          _ => None,
        };
        match result {
          Some(v) => self.push(v),
          None => {
            self.warn(op_pc, "array index out of range or not an array");
            self.push(Value::Nil);
          }
        }
      }
      OpCode::IndexSet => {
        let value = self.pop();
        let index = self.pop();
        let target = self.pop();
        match (target.as_array(), index.as_number()) {
          (Some(arr), Some(i)) => arr.borrow_mut().set(i, value),
          _ => self.warn(op_pc, "array index out of range or not an array"),
        }
      }
      OpCode::Len => {
        let target = self.pop();
        let len = match &target {
          Value::Array(a) => a.borrow().len(),
          Value::Str(s) => s.len(),
          _ => 0,
        };
        self.push(Value::Number(len as f64));
      }
      OpCode::Append => {
        let value = self.pop();
        let target = self.pop();
        if let Some(arr) = target.as_array() {
          arr.borrow_mut().push(value);
        } else {
          self.warn(op_pc, "__append target is not an array");
        }
        self.push(Value::Nil);
      }
      OpCode::ArrayPop => {
        let target = self.pop();
        let popped = target.as_array().and_then(|a| a.borrow_mut().pop());
        self.push(popped.unwrap_or(Value::Nil));
      }
      OpCode::ArrayReserve => {
        let n = self.pop_number(op_pc);
        let target = self.pop();
        if let Some(arr) = target.as_array() {
          arr.borrow_mut().reserve(n.max(0.0) as usize);
        }
        self.push(Value::Nil);
      }
      OpCode::ArrayClear => {
        let target = self.pop();
        if let Some(arr) = target.as_array() {
          arr.borrow_mut().clear();
        }
        self.push(Value::Nil);
      }
      _ => unreachable!("{:?} is not an array opcode", op),
    }
    Ok(Step::Continue)
  }
}
