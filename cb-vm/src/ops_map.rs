use cb_core::chunk::OpCode;
use cb_objects::{ArrayObj, MapObj, Value};

use crate::{Step, VmResult, VM};

impl<'a> VM<'a> {
  pub(crate) fn exec_map_op(&mut self, op: OpCode) -> VmResult<Step> {
    match op {
      OpCode::NewMap => {
        self.note_container_created();
        self.push(Value::map(MapObj::new()));
      }
      OpCode::MapGet => {
        let key = self.pop();
        let target = self.pop();
        let result = match (target.as_map(), key.as_str()) {
          (Some(map), Some(k)) => map.borrow().get(k),
          _ => None,
        };
        self.push(result.unwrap_or(Value::Nil));
      }
      OpCode::MapSet => {
        let value = self.pop();
        let key = self.pop();
        let target = self.pop();
        if let (Some(map), Some(k)) = (target.as_map(), key.as_str()) {
          map.borrow_mut().set(k.to_string(), value);
        }
        self.push(Value::Nil);
      }
      OpCode::MapHas => {
        let key = self.pop();
        let target = self.pop();
        let has = matches!((target.as_map(), key.as_str()), (Some(map), Some(k)) if map.borrow().has(k));
        self.push(Value::Bool(has));
      }
      OpCode::MapDel => {
        let key = self.pop();
        let target = self.pop();
        if let (Some(map), Some(k)) = (target.as_map(), key.as_str()) {
          map.borrow_mut().delete(k);
        }
        self.push(Value::Nil);
      }
      OpCode::MapKeys => {
        let target = self.pop();
        let mut arr = ArrayObj::new();
        if let Some(map) = target.as_map() {
          for key in map.borrow().keys() {
            arr.push(Value::Str(key));
          }
        }
        self.note_container_created();
        self.push(Value::array(arr));
      }
      OpCode::MapSize => {
        let target = self.pop();
        let size = target.as_map().map(|m| m.borrow().len()).unwrap_or(0);
        self.push(Value::Number(size as f64));
      }
      OpCode::MapClear => {
        let target = self.pop();
        if let Some(map) = target.as_map() {
          map.borrow_mut().clear();
        }
        self.push(Value::Nil);
      }
      _ => unreachable!("{:?} is not a map opcode", op),
    }
    Ok(Step::Continue)
  }
}
