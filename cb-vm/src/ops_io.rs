use std::path::Path;

use cb_core::chunk::OpCode;
use cb_objects::Value;

use crate::convert::{coerce_to_string, to_i64};
use crate::{Step, VmResult, VM};

impl<'a> VM<'a> {
  /// File and stream opcodes (§4.7 "I/O"). `OP_READ_FILE`/`OP_WRITE_FILE`
  /// move whole files at once; `OP_FOPEN`-family ops multiplex through
  /// `self.streams`' handle table, where 0/1/2 are the standard streams.
  pub(crate) fn exec_io_op(&mut self, op: OpCode) -> VmResult<Step> {
    match op {
      OpCode::ReadFile => {
        let path = self.pop_string();
        let contents = std::fs::read_to_string(&path).ok();
        self.push(contents.map(Value::Str).unwrap_or(Value::Nil));
      }
      OpCode::WriteFile => {
        let contents = self.pop_string();
        let path = self.pop_string();
        let ok = std::fs::write(&path, contents).is_ok();
        self.push(Value::Bool(ok));
      }
      OpCode::FileExists => {
        let path = self.pop_string();
        self.push(Value::Bool(Path::new(&path).exists()));
      }
      OpCode::Fopen => {
        let mode = self.pop_string();
        let path = self.pop_string();
        let handle = self.streams.fopen(&path, &mode);
        self.push(handle.map(|h| Value::Number(h as f64)).unwrap_or(Value::Nil));
      }
      OpCode::Fclose => {
        let handle = to_i64(self.pop_number(0)) as u32;
        self.push(Value::Bool(self.streams.fclose(handle)));
      }
      OpCode::Fread => {
        let n = to_i64(self.pop_number(0)).max(0) as usize;
        let handle = to_i64(self.pop_number(0)) as u32;
        self.push(self.streams.fread(handle, n).map(Value::Str).unwrap_or(Value::Nil));
      }
      OpCode::Freadline => {
        let handle = to_i64(self.pop_number(0)) as u32;
        self.push(self.streams.freadline(handle).map(Value::Str).unwrap_or(Value::Nil));
      }
      OpCode::Fwrite => {
        let data = self.pop_string();
        let handle = to_i64(self.pop_number(0)) as u32;
        self.push(Value::Bool(self.streams.fwrite(handle, &data)));
      }
      OpCode::Stdin => self.push(Value::Number(0.0)),
      OpCode::Stdout => self.push(Value::Number(1.0)),
      OpCode::Stderr => self.push(Value::Number(2.0)),
      OpCode::Print => {
        let argc = self.next_byte() as usize;
        let mut values = Vec::with_capacity(argc);
        for _ in 0..argc {
          values.push(self.pop());
        }
        values.reverse();
        let line = values.iter().map(coerce_to_string).collect::<Vec<_>>().join(" ");
        println!("{}", line);
      }
      _ => unreachable!("{:?} is not an I/O opcode", op),
    }
    Ok(Step::Continue)
  }
}
