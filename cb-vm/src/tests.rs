use cb_core::chunk::{Chunk, FunctionEntry, OpCode};
use cb_core::value::Value as ConstValue;
use cb_objects::Value;

use crate::VM;

fn const_op(chunk: &mut Chunk, value: ConstValue) {
  let idx = chunk.add_constant(value);
  chunk.push_op(OpCode::Const, 1, 1);
  chunk.push_u16(idx, 1, 1);
}

#[test]
fn arithmetic_adds_two_constants() {
  let mut chunk = Chunk::new("test");
  const_op(&mut chunk, ConstValue::Number(2.0));
  const_op(&mut chunk, ConstValue::Number(3.0));
  chunk.push_op(OpCode::Add, 1, 1);
  chunk.push_op(OpCode::Halt, 1, 1);

  let mut vm = VM::new(&chunk);
  let code = vm.run().unwrap();
  assert_eq!(code, 0);
  assert_eq!(vm.peek(), Value::Number(5.0));
}

#[test]
fn division_by_zero_pushes_zero_without_halting() {
  let mut chunk = Chunk::new("test");
  const_op(&mut chunk, ConstValue::Number(9.0));
  const_op(&mut chunk, ConstValue::Number(0.0));
  chunk.push_op(OpCode::Div, 1, 1);
  chunk.push_op(OpCode::Halt, 1, 1);

  let mut vm = VM::new(&chunk);
  vm.run().unwrap();
  assert_eq!(vm.peek(), Value::Number(0.0));
}

#[test]
fn call_and_return_through_a_function_frame() {
  let mut chunk = Chunk::new("test");
  let name_idx = chunk.intern_name("addTen");

  const_op(&mut chunk, ConstValue::Number(5.0));
  chunk.push_op(OpCode::Call, 1, 1);
  chunk.push_u16(name_idx, 1, 1);
  chunk.push_byte(1, 1, 1); // argc
  chunk.push_op(OpCode::Halt, 1, 1);

  let entry_offset = chunk.len() as u32;
  chunk.push_op(OpCode::GetLocal, 1, 1);
  chunk.push_u16(0, 1, 1);
  const_op(&mut chunk, ConstValue::Number(10.0));
  chunk.push_op(OpCode::Add, 1, 1);
  chunk.push_op(OpCode::Return, 1, 1);

  chunk.add_function(FunctionEntry { name_index: name_idx, arity: 1, entry_offset });

  let mut vm = VM::new(&chunk);
  vm.run().unwrap();
  assert_eq!(vm.peek(), Value::Number(15.0));
}

#[test]
fn call_with_wrong_arity_is_a_fatal_error() {
  let mut chunk = Chunk::new("test");
  let name_idx = chunk.intern_name("needsOne");

  chunk.push_op(OpCode::Call, 1, 1);
  chunk.push_u16(name_idx, 1, 1);
  chunk.push_byte(0, 1, 1); // argc 0, but arity 1
  chunk.push_op(OpCode::Halt, 1, 1);

  let entry_offset = chunk.len() as u32;
  chunk.push_op(OpCode::Return, 1, 1);
  chunk.add_function(FunctionEntry { name_index: name_idx, arity: 1, entry_offset });

  let mut vm = VM::new(&chunk);
  let err = vm.run().unwrap_err();
  assert_eq!(err.kind, cb_core::errors::ErrorKind::RuntimeError);
}

#[test]
fn new_array_then_index_get() {
  let mut chunk = Chunk::new("test");
  const_op(&mut chunk, ConstValue::Number(10.0));
  const_op(&mut chunk, ConstValue::Number(20.0));
  const_op(&mut chunk, ConstValue::Number(30.0));
  chunk.push_op(OpCode::NewArray, 1, 1);
  chunk.push_byte(3, 1, 1);
  const_op(&mut chunk, ConstValue::Number(1.0));
  chunk.push_op(OpCode::IndexGet, 1, 1);
  chunk.push_op(OpCode::Halt, 1, 1);

  let mut vm = VM::new(&chunk);
  vm.run().unwrap();
  assert_eq!(vm.peek(), Value::Number(20.0));
}

#[test]
fn str_cat_joins_in_push_order() {
  let mut chunk = Chunk::new("test");
  const_op(&mut chunk, ConstValue::Str("foo".into()));
  const_op(&mut chunk, ConstValue::Str("bar".into()));
  chunk.push_op(OpCode::StrCat, 1, 1);
  chunk.push_op(OpCode::Halt, 1, 1);

  let mut vm = VM::new(&chunk);
  vm.run().unwrap();
  assert_eq!(vm.peek(), Value::Str("foobar".into()));
}

#[test]
fn format_substitutes_in_order_and_leaves_excess_placeholders() {
  let mut chunk = Chunk::new("test");
  const_op(&mut chunk, ConstValue::Str("{} and {} and {}".into()));
  const_op(&mut chunk, ConstValue::Str("a".into()));
  const_op(&mut chunk, ConstValue::Str("b".into()));
  chunk.push_op(OpCode::Format, 1, 1);
  chunk.push_byte(3, 1, 1);
  chunk.push_op(OpCode::Halt, 1, 1);

  let mut vm = VM::new(&chunk);
  vm.run().unwrap();
  assert_eq!(vm.peek(), Value::Str("a and b and {}".into()));
}

#[test]
fn heap_store_then_load_round_trips() {
  // The VM has no "dup" opcode, so the allocated pointer is stashed in a
  // global to use it twice (once for the store, once for the load).
  let mut chunk = Chunk::new("test");
  let ptr_name = chunk.intern_name("p");
  const_op(&mut chunk, ConstValue::Number(8.0));
  chunk.push_op(OpCode::Alloc, 1, 1);
  chunk.push_op(OpCode::SetGlobal, 1, 1);
  chunk.push_u16(ptr_name, 1, 1);

  // OP_STORE32 pops in "value, pointer, offset" order (§6): push value
  // first, then the pointer, then the offset on top.
  const_op(&mut chunk, ConstValue::Number(291.0));
  chunk.push_op(OpCode::GetGlobal, 1, 1);
  chunk.push_u16(ptr_name, 1, 1);
  const_op(&mut chunk, ConstValue::Number(0.0));
  chunk.push_op(OpCode::Store32, 1, 1);

  chunk.push_op(OpCode::GetGlobal, 1, 1);
  chunk.push_u16(ptr_name, 1, 1);
  const_op(&mut chunk, ConstValue::Number(0.0));
  chunk.push_op(OpCode::Load32, 1, 1);
  chunk.push_op(OpCode::Halt, 1, 1);

  let mut vm = VM::new(&chunk);
  vm.run().unwrap();
  assert_eq!(vm.peek(), Value::Number(291.0));
}

#[test]
fn panic_is_a_fatal_error() {
  let mut chunk = Chunk::new("test");
  const_op(&mut chunk, ConstValue::Str("boom".into()));
  chunk.push_op(OpCode::Panic, 1, 1);
  chunk.push_op(OpCode::Halt, 1, 1);

  let mut vm = VM::new(&chunk);
  let err = vm.run().unwrap_err();
  assert_eq!(err.kind, cb_core::errors::ErrorKind::UserPanic);
}

#[test]
fn failed_assert_is_a_fatal_error() {
  let mut chunk = Chunk::new("test");
  const_op(&mut chunk, ConstValue::Bool(false));
  chunk.push_op(OpCode::Assert, 1, 1);
  chunk.push_op(OpCode::Halt, 1, 1);

  let mut vm = VM::new(&chunk);
  let err = vm.run().unwrap_err();
  assert_eq!(err.kind, cb_core::errors::ErrorKind::AssertionFailure);
}

#[test]
fn exit_halts_with_its_operand_as_the_process_code() {
  let mut chunk = Chunk::new("test");
  const_op(&mut chunk, ConstValue::Number(7.0));
  chunk.push_op(OpCode::Exit, 1, 1);

  let mut vm = VM::new(&chunk);
  let code = vm.run().unwrap();
  assert_eq!(code, 7);
}

/// A forward jump must land exactly past its own operand plus whatever it
/// skips, for any skip length — the displacement the compiler patches in is
/// always relative to the byte right after the u16 operand.
#[quickcheck_macros::quickcheck]
fn forward_jump_always_lands_exactly_past_what_it_skips(skip_count: u8) -> bool {
  let skip_count = (skip_count % 20) as usize;
  let mut chunk = Chunk::new("prop");
  const_op(&mut chunk, ConstValue::Number(1.0));
  chunk.push_op(OpCode::Pop, 1, 1);

  chunk.push_op(OpCode::Jump, 1, 1);
  let operand_at = chunk.len();
  chunk.push_u16(0xFFFF, 1, 1);

  for _ in 0..skip_count {
    const_op(&mut chunk, ConstValue::Number(999.0));
    chunk.push_op(OpCode::Pop, 1, 1);
  }

  let target = chunk.len();
  let disp = (target - (operand_at + 2)) as u16;
  chunk.patch_u16(operand_at, disp);

  const_op(&mut chunk, ConstValue::Number(2.0));
  chunk.push_op(OpCode::Halt, 1, 1);

  let mut vm = VM::new(&chunk);
  vm.run().unwrap();
  vm.peek() == Value::Number(2.0)
}
