use cb_core::chunk::OpCode;
use cb_objects::Value;

use crate::{Step, VmResult, VM};

impl<'a> VM<'a> {
  /// Arithmetic, comparison, and logical opcodes: pop two operands, push one
  /// result (§4.7).
  pub(crate) fn exec_arith_op(&mut self, op: OpCode, op_pc: usize) -> VmResult<Step> {
    match op {
      OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div | OpCode::Mod => {
        let right = self.pop_number(op_pc);
        let left = self.pop_number(op_pc);
        let result = match op {
          OpCode::Add => left + right,
          OpCode::Sub => left - right,
          OpCode::Mul => left * right,
          OpCode::Div => {
            if right == 0.0 {
              self.warn(op_pc, "division by zero");
              0.0
            } else {
              left / right
            }
          }
          OpCode::Mod => {
            if right == 0.0 {
              self.warn(op_pc, "modulo by zero");
              0.0
            } else {
              left % right
            }
          }
          _ => unreachable!(),
        };
        self.push(Value::Number(result));
      }
      OpCode::Gt | OpCode::Ge | OpCode::Lt | OpCode::Le => {
        let right = self.pop_number(op_pc);
        let left = self.pop_number(op_pc);
        let result = match op {
          OpCode::Gt => left > right,
          OpCode::Ge => left >= right,
          OpCode::Lt => left < right,
          OpCode::Le => left <= right,
          _ => unreachable!(),
        };
        self.push(Value::Bool(result));
      }
      OpCode::Eq | OpCode::Ne => {
        let right = self.pop();
        let left = self.pop();
        let equal = left == right;
        self.push(Value::Bool(if op == OpCode::Eq { equal } else { !equal }));
      }
      OpCode::And | OpCode::Or => {
        let right = self.pop();
        let left = self.pop();
        let result = if op == OpCode::And { left.is_truthy() && right.is_truthy() } else { left.is_truthy() || right.is_truthy() };
        self.push(Value::Bool(result));
      }
      _ => unreachable!("{:?} is not an arithmetic opcode", op),
    }
    Ok(Step::Continue)
  }
}
