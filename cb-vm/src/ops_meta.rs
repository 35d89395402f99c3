use cb_core::chunk::{Chunk, FunctionEntry, OpCode};
use cb_core::interfaces::{FfiArg, FfiResult};
use cb_objects::Value;

use crate::convert::to_i64;
use crate::{Step, VmResult, VM};

impl<'a> VM<'a> {
  /// Control/meta opcodes (§4.7 "Integration opcodes" and "FFI opcodes").
  pub(crate) fn exec_meta_op(&mut self, op: OpCode, op_pc: usize) -> VmResult<Step> {
    match op {
      OpCode::Assert => {
        let condition = self.pop();
        if !condition.is_truthy() {
          return Err(self.fatal(op_pc, "assertion failed"));
        }
        self.push(Value::Nil);
      }
      OpCode::Panic => {
        let message = self.pop_string();
        return Err(self.fatal(op_pc, message));
      }
      OpCode::Exit => {
        let code = to_i64(self.pop_number(op_pc)) as i32;
        return Ok(Step::Halt(code));
      }
      OpCode::EmitChunk => {
        let path = self.pop_string();
        let map = self.pop();
        match map.as_map().map(|m| chunk_from_map(&m.borrow())) {
          Some(Some(chunk)) => {
            let bytes = cb_bytecode_io::serialize(&chunk);
            if std::fs::write(&path, bytes).is_err() {
              self.warn(op_pc, format!("could not write chunk to '{}'", path));
            }
          }
          _ => self.warn(op_pc, "__emit_chunk target is not a well-formed chunk map"),
        }
        self.push(Value::Nil);
      }
      OpCode::OpcodeId => {
        let name = self.pop_string();
        let id = OpCode::from_canonical_name(&name).map(|op| op as u8 as f64).unwrap_or(-1.0);
        self.push(Value::Number(id));
      }
      OpCode::CallnArr => {
        let func_name = self.pop_string();
        let args_value = self.pop();
        let args = match args_value.as_array() {
          Some(arr) => arr.borrow().0.clone(),
          None => Vec::new(),
        };
        match self.chunk.names.iter().position(|n| n == &func_name) {
          Some(idx) => self.invoke(idx as u16, args, op_pc)?,
          None => return Err(self.fatal(op_pc, format!("call to unresolved function '{}'", func_name))),
        }
        return Ok(Step::Continue);
      }
      OpCode::FfiCall => {
        let argc = self.next_byte() as usize;
        let func = self.pop_string();
        let lib = self.pop_string();
        let args = self.pop_ffi_args(argc);
        let result = self.dispatch_ffi(&lib, &func, None, &args);
        self.push(result);
      }
      OpCode::FfiCallSig => {
        let argc = self.next_byte() as usize;
        let sig = self.pop_string();
        let func = self.pop_string();
        let lib = self.pop_string();
        let args = self.pop_ffi_args(argc);
        let result = self.dispatch_ffi(&lib, &func, Some(&sig), &args);
        self.push(result);
      }
      OpCode::FfiProc => {
        let func = self.pop_string();
        let lib = self.pop_string();
        self.push(Value::Str(format!("{}\0{}", lib, func)));
      }
      OpCode::FfiCallPtr => {
        let argc = self.next_byte() as usize;
        let handle = self.pop_string();
        let args = self.pop_ffi_args(argc);
        match handle.split_once('\0') {
          Some((lib, func)) => {
            let result = self.dispatch_ffi(lib, func, None, &args);
            self.push(result);
          }
          None => {
            self.warn(op_pc, "__ffi_call_ptr target is not a resolved proc handle");
            self.push(Value::Number(0.0));
          }
        }
      }
      _ => unreachable!("{:?} is not a control/meta opcode", op),
    }
    Ok(Step::Continue)
  }

  fn pop_ffi_args(&mut self, argc: usize) -> Vec<FfiArg> {
    let mut values = Vec::with_capacity(argc);
    for _ in 0..argc {
      values.push(self.pop());
    }
    values.reverse();
    values
      .into_iter()
      .map(|v| match v {
        Value::Str(s) => FfiArg::Str(s),
        other => FfiArg::Number(other.as_number().unwrap_or(0.0)),
      })
      .collect()
  }

  /// Delegates to the registered `ForeignCallSink`. With no sink registered,
  /// these opcodes push 0 (§4.7).
  fn dispatch_ffi(&mut self, library: &str, function: &str, signature: Option<&str>, args: &[FfiArg]) -> Value {
    match self.ffi_mut() {
      Some(sink) => match sink.call(library, function, signature, args) {
        FfiResult::Number(n) => Value::Number(n),
        FfiResult::Str(s) => Value::Str(s),
      },
      None => Value::Number(0.0),
    }
  }
}

/// Reconstructs a `Chunk` from the runtime map `OP_EMIT_CHUNK` is handed
/// (keys `constants`, `names`, `functions`, `code`, `debugLines`,
/// `debugCols`), the self-hosted emission path (§4.7).
fn chunk_from_map(map: &cb_objects::MapObj) -> Option<Chunk> {
  let constants = map
    .get("constants")?
    .as_array()?
    .borrow()
    .0
    .iter()
    .map(|v| match v {
      Value::Nil => cb_core::value::Value::Nil,
      Value::Number(n) => cb_core::value::Value::Number(*n),
      Value::Str(s) => cb_core::value::Value::Str(s.clone()),
      Value::Bool(b) => cb_core::value::Value::Bool(*b),
      _ => cb_core::value::Value::Nil,
    })
    .collect();

  let names = map
    .get("names")?
    .as_array()?
    .borrow()
    .0
    .iter()
    .map(|v| v.as_str().unwrap_or("").to_string())
    .collect();

  let functions = map
    .get("functions")?
    .as_array()?
    .borrow()
    .0
    .iter()
    .filter_map(|v| {
      let entry = v.as_map()?;
      let entry = entry.borrow();
      Some(FunctionEntry {
        name_index: entry.get("nameIndex")?.as_number()? as u16,
        arity: entry.get("arity")?.as_number()? as u16,
        entry_offset: entry.get("entryOffset")?.as_number()? as u32,
      })
    })
    .collect();

  let code = map
    .get("code")?
    .as_array()?
    .borrow()
    .0
    .iter()
    .filter_map(|v| v.as_number().map(|n| n as u8))
    .collect();

  let debug_lines = map
    .get("debugLines")?
    .as_array()?
    .borrow()
    .0
    .iter()
    .filter_map(|v| v.as_number().map(|n| n as u32))
    .collect();

  let debug_cols = map
    .get("debugCols")?
    .as_array()?
    .borrow()
    .0
    .iter()
    .filter_map(|v| v.as_number().map(|n| n as u32))
    .collect();

  Some(Chunk { constants, names, functions, code, debug_lines, debug_cols, source_name: "<emitted>".to_string() })
}
