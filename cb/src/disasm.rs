//! `--disassemble`: a human-readable dump of a chunk's constants, names,
//! function table, and decoded instruction stream. Pure tooling over
//! already-specified data (§3 Chunk, §6 opcode catalogue); changes no
//! execution semantics.

use std::fmt::Write as _;

use cb_core::chunk::{Chunk, OpCode};

/// Opcodes followed by a u16 operand (constant/name index, local slot, or
/// jump displacement).
fn u16_operand(op: OpCode) -> bool {
  use OpCode::*;
  matches!(op, Const | GetGlobal | SetGlobal | GetLocal | SetLocal | Jump | JumpIfFalse | Loop)
}

/// Opcodes followed by a single u8 operand (an arg/element count).
fn u8_operand(op: OpCode) -> bool {
  use OpCode::*;
  matches!(op, NewArray | Print | Format | FfiCall | FfiCallSig | FfiCallPtr)
}

pub fn disassemble(chunk: &Chunk) -> String {
  let mut out = String::new();

  writeln!(out, "; source: {}", chunk.source_name).unwrap();

  writeln!(out, "; constants ({})", chunk.constants.len()).unwrap();
  for (i, c) in chunk.constants.iter().enumerate() {
    writeln!(out, "    [{:>4}] {}", i, c).unwrap();
  }

  writeln!(out, "; names ({})", chunk.names.len()).unwrap();
  for (i, n) in chunk.names.iter().enumerate() {
    writeln!(out, "    [{:>4}] {}", i, n).unwrap();
  }

  writeln!(out, "; functions ({})", chunk.functions.len()).unwrap();
  for f in &chunk.functions {
    let name = chunk.names.get(f.name_index as usize).map(String::as_str).unwrap_or("?");
    writeln!(out, "    {} arity={} entry={}", name, f.arity, f.entry_offset).unwrap();
  }

  writeln!(out, "; code ({} bytes)", chunk.code.len()).unwrap();
  let mut pc = 0usize;
  while pc < chunk.code.len() {
    let op_pc = pc;
    let byte = chunk.code[pc];
    pc += 1;
    let op: Option<OpCode> = num_traits::FromPrimitive::from_u8(byte);
    let op = match op {
      Some(op) => op,
      None => {
        writeln!(out, "{:>6}  {:#04x}  <invalid opcode>", op_pc, byte).unwrap();
        continue;
      }
    };

    let operand = if op == OpCode::Call {
      let name_idx = chunk.get_u16(pc);
      let argc = chunk.code.get(pc + 2).copied().unwrap_or(0);
      pc += 3;
      let name = chunk.names.get(name_idx as usize).map(String::as_str).unwrap_or("?");
      format!(" {} argc={}", name, argc)
    } else if u16_operand(op) {
      let v = chunk.get_u16(pc);
      pc += 2;
      format!(" {}", v)
    } else if u8_operand(op) {
      let v = chunk.code.get(pc).copied().unwrap_or(0);
      pc += 1;
      format!(" {}", v)
    } else {
      String::new()
    };

    writeln!(
      out,
      "{:>6}  line {:>4} col {:>3}  {}{}",
      op_pc,
      chunk.line_at(op_pc),
      chunk.col_at(op_pc),
      op.canonical_name(),
      operand
    )
    .unwrap();
  }

  out
}

#[cfg(test)]
mod tests {
  use cb_core::chunk::Chunk;
  use cb_core::value::Value;

  use super::disassemble;

  #[test]
  fn lists_constants_and_decodes_a_const_then_halt_stream() {
    let mut chunk = Chunk::new("demo");
    let idx = chunk.add_constant(Value::Number(5.0));
    chunk.push_op(cb_core::chunk::OpCode::Const, 1, 1);
    chunk.push_u16(idx, 1, 1);
    chunk.push_op(cb_core::chunk::OpCode::Halt, 1, 4);

    let out = disassemble(&chunk);
    assert!(out.contains("; source: demo"));
    assert!(out.contains("[   0] 5"));
    assert!(out.contains("OP_CONST 0"));
    assert!(out.contains("OP_HALT"));
  }

  #[test]
  fn call_decodes_name_and_argc_as_a_single_operand() {
    let mut chunk = Chunk::new("demo");
    let name_idx = chunk.intern_name("addTen");
    chunk.push_op(cb_core::chunk::OpCode::Call, 1, 1);
    chunk.push_u16(name_idx, 1, 1);
    chunk.push_byte(1, 1, 1);
    chunk.push_op(cb_core::chunk::OpCode::Halt, 1, 1);

    let out = disassemble(&chunk);
    assert!(out.contains("OP_CALL addTen argc=1"));
  }

  #[test]
  fn an_invalid_opcode_byte_is_reported_without_panicking() {
    let mut chunk = Chunk::new("demo");
    chunk.push_byte(0xFF, 1, 1);
    let out = disassemble(&chunk);
    assert!(out.contains("<invalid opcode>"));
  }
}
