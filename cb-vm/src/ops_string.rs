use cb_core::chunk::OpCode;
use cb_objects::{ArrayObj, Value};

use crate::convert::coerce_to_string;
use crate::{Step, VmResult, VM};

impl<'a> VM<'a> {
  /// String opcodes operate on UTF-8 byte sequences (§4.7). Slicing is done
  /// on the byte representation and repaired with a lossy UTF-8 decode
  /// rather than panicking on a non-boundary cut.
  pub(crate) fn exec_string_op(&mut self, op: OpCode, op_pc: usize) -> VmResult<Step> {
    match op {
      OpCode::StrIndex => {
        let index = self.pop_number(op_pc);
        let s = self.pop_string();
        let bytes = s.as_bytes();
        let result = to_index(index, bytes.len()).map(|i| (bytes[i] as char).to_string());
        self.push(result.map(Value::Str).unwrap_or(Value::Nil));
      }
      OpCode::Substr => {
        let to = self.pop_number(op_pc);
        let from = self.pop_number(op_pc);
        let s = self.pop_string();
        let bytes = s.as_bytes();
        let len = bytes.len();
        let a = clamp_index(from, len);
        let b = clamp_index(to, len).max(a);
        self.push(Value::Str(String::from_utf8_lossy(&bytes[a..b]).into_owned()));
      }
      OpCode::StrFind => {
        let needle = self.pop_string();
        let haystack = self.pop_string();
        let idx = haystack.find(&needle).map(|i| i as f64).unwrap_or(-1.0);
        self.push(Value::Number(idx));
      }
      OpCode::Split => {
        let sep = self.pop_string();
        let s = self.pop_string();
        let mut arr = ArrayObj::new();
        if sep.is_empty() {
          for b in s.bytes() {
            arr.push(Value::Str((b as char).to_string()));
          }
        } else {
          for part in s.split(sep.as_str()) {
            arr.push(Value::Str(part.to_string()));
          }
        }
        self.note_container_created();
        self.push(Value::array(arr));
      }
      OpCode::StrCat => {
        let b = self.pop();
        let a = self.pop();
        self.push(Value::Str(format!("{}{}", coerce_to_string(&a), coerce_to_string(&b))));
      }
      OpCode::Join => {
        let sep = self.pop_string();
        let target = self.pop();
        let joined = match target.as_array() {
          Some(arr) => arr.borrow().0.iter().map(coerce_to_string).collect::<Vec<_>>().join(&sep),
          None => String::new(),
        };
        self.push(Value::Str(joined));
      }
      OpCode::Trim => {
        let s = self.pop_string();
        self.push(Value::Str(s.trim().to_string()));
      }
      OpCode::Replace => {
        let to = self.pop_string();
        let from = self.pop_string();
        let s = self.pop_string();
        self.push(Value::Str(s.replace(&from, &to)));
      }
      OpCode::StrUpper => {
        let s = self.pop_string();
        self.push(Value::Str(s.to_uppercase()));
      }
      OpCode::StrLower => {
        let s = self.pop_string();
        self.push(Value::Str(s.to_lowercase()));
      }
      OpCode::StrContains => {
        let needle = self.pop_string();
        let s = self.pop_string();
        self.push(Value::Bool(s.contains(&needle)));
      }
      OpCode::Format => {
        let argc = self.next_byte() as usize;
        let mut values = Vec::with_capacity(argc);
        for _ in 0..argc {
          values.push(self.pop());
        }
        values.reverse();
        let mut values = values.into_iter();
        let fmt = values.next().map(|v| coerce_to_string(&v)).unwrap_or_default();
        self.push(Value::Str(apply_format(&fmt, values)));
      }
      OpCode::StartsWith => {
        let prefix = self.pop_string();
        let s = self.pop_string();
        self.push(Value::Bool(s.starts_with(&prefix)));
      }
      OpCode::EndsWith => {
        let suffix = self.pop_string();
        let s = self.pop_string();
        self.push(Value::Bool(s.ends_with(&suffix)));
      }
      OpCode::Ord => {
        let s = self.pop_string();
        self.push(Value::Number(s.as_bytes().first().copied().unwrap_or(0) as f64));
      }
      OpCode::Chr => {
        let n = self.pop_number(op_pc);
        self.push(Value::Str(((n as i64 as u8) as char).to_string()));
      }
      OpCode::ToString => {
        let v = self.pop();
        self.push(Value::Str(coerce_to_string(&v)));
      }
      OpCode::ParseInt => {
        let s = self.pop_string();
        self.push(s.trim().parse::<i64>().map(|n| Value::Number(n as f64)).unwrap_or(Value::Nil));
      }
      OpCode::ParseFloat => {
        let s = self.pop_string();
        self.push(s.trim().parse::<f64>().map(Value::Number).unwrap_or(Value::Nil));
      }
      _ => unreachable!("{:?} is not a string opcode", op),
    }
    Ok(Step::Continue)
  }
}

fn to_index(index: f64, len: usize) -> Option<usize> {
  if index.fract() != 0.0 || !index.is_finite() {
    return None;
  }
  let i = index as i64;
  if i < 0 || i as usize >= len {
    None
  } else {
    Some(i as usize)
  }
}

/// Clamps a (possibly fractional, negative, or non-finite) index into
/// `[0, len]`, matching `OP_SUBSTR`'s "clamps indices to [0, len]" (§4.7).
fn clamp_index(index: f64, len: usize) -> usize {
  if !index.is_finite() || index < 0.0 {
    0
  } else if index as usize > len {
    len
  } else {
    index as usize
  }
}

fn apply_format(fmt: &str, mut args: impl Iterator<Item = Value>) -> String {
  let mut out = String::with_capacity(fmt.len());
  let mut rest = fmt;
  while let Some(pos) = rest.find("{}") {
    out.push_str(&rest[..pos]);
    match args.next() {
      Some(v) => out.push_str(&coerce_to_string(&v)),
      None => out.push_str("{}"),
    }
    rest = &rest[pos + 2..];
  }
  out.push_str(rest);
  out
}
