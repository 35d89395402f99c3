use cb_core::chunk::OpCode;
use cb_objects::Value;

use crate::frame::Frame;
use crate::{Step, VmResult, VM};

impl<'a> VM<'a> {
  /// Stack/const, variable, control-flow, and call/return opcodes — the
  /// ones that touch `pc`, `frames`, or `globals` directly rather than a
  /// container or the heap.
  pub(crate) fn exec_stack_op(&mut self, op: OpCode, op_pc: usize) -> VmResult<Step> {
    match op {
      OpCode::Const => {
        let idx = self.next_u16() as usize;
        let value = crate::convert::from_constant(&self.chunk.constants[idx]);
        self.push(value);
      }
      OpCode::Pop => {
        self.pop();
      }
      OpCode::Halt => return Ok(Step::Halt(0)),
      OpCode::GetGlobal => {
        let idx = self.next_u16() as usize;
        let value = self.globals.get(idx).cloned().flatten().unwrap_or_else(|| {
          self.warn(op_pc, format!("unresolved global '{}'", self.chunk.names.get(idx).map(String::as_str).unwrap_or("?")));
          Value::Nil
        });
        self.push(value);
      }
      OpCode::SetGlobal => {
        let idx = self.next_u16() as usize;
        let value = self.pop();
        if idx < self.globals.len() {
          self.globals[idx] = Some(value);
        }
      }
      OpCode::GetLocal => {
        let idx = self.next_u16() as usize;
        let value = self.current_frame().map(|f| f.get(idx)).unwrap_or(Value::Nil);
        self.push(value);
      }
      OpCode::SetLocal => {
        let idx = self.next_u16() as usize;
        let value = self.pop();
        if let Some(frame) = self.current_frame_mut() {
          frame.set(idx, value);
        }
      }
      OpCode::Jump => {
        let disp = self.next_u16();
        self.jump(disp);
      }
      OpCode::JumpIfFalse => {
        let disp = self.next_u16();
        if !self.peek().is_truthy() {
          self.jump(disp);
        }
      }
      OpCode::Loop => {
        let disp = self.next_u16();
        self.loop_back(disp);
      }
      OpCode::Call => {
        let name_idx = self.next_u16();
        let argc = self.next_byte() as usize;
        self.exec_call(name_idx, argc, op_pc)?;
      }
      OpCode::Return => {
        let result = self.pop();
        let frame = self.frames.pop();
        match frame {
          Some(frame) => {
            self.pc = frame.return_pc;
            self.push(result);
          }
          None => return Ok(Step::Halt(0)),
        }
      }
      _ => unreachable!("{:?} is not a stack/control opcode", op),
    }
    Ok(Step::Continue)
  }

  fn exec_call(&mut self, name_idx: u16, argc: usize, op_pc: usize) -> VmResult<()> {
    let mut args = Vec::with_capacity(argc);
    for _ in 0..argc {
      args.push(self.pop());
    }
    args.reverse();
    self.invoke(name_idx, args, op_pc)
  }

  /// Resolves `name_idx` against the chunk's function table and pushes a
  /// fresh frame over `args`. Shared by `OP_CALL` (args popped off the
  /// operand stack) and `OP_CALLN_ARR` (args taken from a runtime array).
  pub(crate) fn invoke(&mut self, name_idx: u16, args: Vec<Value>, op_pc: usize) -> VmResult<()> {
    let entry = match self.chunk.find_function(name_idx) {
      Some(f) => *f,
      None => {
        let name = self.chunk.names.get(name_idx as usize).cloned().unwrap_or_default();
        return Err(self.fatal(op_pc, format!("call to unresolved function '{}'", name)));
      }
    };
    if entry.arity as usize != args.len() {
      let name = self.chunk.names.get(name_idx as usize).cloned().unwrap_or_default();
      return Err(self.fatal(
        op_pc,
        format!("'{}' expects {} argument(s), got {}", name, entry.arity, args.len()),
      ));
    }
    self.frames.push(Frame::new(self.pc, args));
    self.pc = entry.entry_offset as usize;
    Ok(())
  }
}
