use cb_core::chunk::OpCode;
use cb_objects::Value;

use crate::convert::to_i64;
use crate::{Step, VmResult, VM};

impl<'a> VM<'a> {
  /// Numeric intrinsics and bitwise ops (§4.7): all but `OP_RANDOM` pop one
  /// or two numbers and push one back.
  pub(crate) fn exec_math_op(&mut self, op: OpCode) -> VmResult<Step> {
    match op {
      OpCode::Floor | OpCode::Ceil | OpCode::Round | OpCode::Sqrt | OpCode::Abs | OpCode::Exp | OpCode::Log
      | OpCode::Sin | OpCode::Cos | OpCode::Tan | OpCode::Asin | OpCode::Acos | OpCode::Atan => {
        let n = self.pop_number(0);
        let result = match op {
          OpCode::Floor => n.floor(),
          OpCode::Ceil => n.ceil(),
          OpCode::Round => n.round(),
          OpCode::Sqrt => n.sqrt(),
          OpCode::Abs => n.abs(),
          OpCode::Exp => n.exp(),
          OpCode::Log => n.ln(),
          OpCode::Sin => n.sin(),
          OpCode::Cos => n.cos(),
          OpCode::Tan => n.tan(),
          OpCode::Asin => n.asin(),
          OpCode::Acos => n.acos(),
          OpCode::Atan => n.atan(),
          _ => unreachable!(),
        };
        self.push(Value::Number(result));
      }
      OpCode::Pow | OpCode::Atan2 | OpCode::BAnd | OpCode::BOr | OpCode::BXor | OpCode::Shl | OpCode::Shr => {
        let b = self.pop_number(0);
        let a = self.pop_number(0);
        let result = match op {
          OpCode::Pow => a.powf(b),
          OpCode::Atan2 => a.atan2(b),
          OpCode::BAnd => (to_i64(a) & to_i64(b)) as f64,
          OpCode::BOr => (to_i64(a) | to_i64(b)) as f64,
          OpCode::BXor => (to_i64(a) ^ to_i64(b)) as f64,
          OpCode::Shl => to_i64(a).wrapping_shl(to_i64(b) as u32 & 63) as f64,
          OpCode::Shr => to_i64(a).wrapping_shr(to_i64(b) as u32 & 63) as f64,
          _ => unreachable!(),
        };
        self.push(Value::Number(result));
      }
      OpCode::Random => self.push(Value::Number(rand::random::<f64>())),
      _ => unreachable!("{:?} is not a math/bitwise opcode", op),
    }
    Ok(Step::Continue)
  }
}
