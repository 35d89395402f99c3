use cb_core::ast::Stmt;
use cb_core::chunk::{Chunk, OpCode};

use crate::Compiler;

fn compile(src: &str) -> Chunk {
  let stmts: Vec<(Stmt, usize, usize)> = cb_preprocess::accumulate(src)
    .into_iter()
    .map(|s| {
      let tokens = cb_lexer::Lexer::lex_all(&s.text, "test").expect("lex failed");
      let stmt = cb_parser::Parser::parse_statement_text(&tokens, "test").expect("parse failed");
      (stmt, s.start_line, s.start_col)
    })
    .collect();
  Compiler::compile_program(&stmts, "test")
}

/// Decodes just the opcode stream, ignoring operands, for shape assertions
/// that don't want to hand-decode every operand width.
fn opcodes(chunk: &Chunk) -> Vec<OpCode> {
  let mut out = Vec::new();
  let mut pc = 0usize;
  while pc < chunk.code.len() {
    let op: OpCode = num_traits::FromPrimitive::from_u8(chunk.code[pc]).expect("bad opcode byte");
    out.push(op);
    pc += 1 + operand_len(op);
  }
  out
}

fn operand_len(op: OpCode) -> usize {
  use OpCode::*;
  match op {
    Const | GetGlobal | SetGlobal | GetLocal | SetLocal | Jump | JumpIfFalse | Loop => 2,
    Call => 3,
    NewArray | Print | Format | FfiCall | FfiCallSig | FfiCallPtr => 1,
    _ => 0,
  }
}

#[test]
fn arithmetic_expression_auto_prints_at_top_level() {
  let chunk = compile("print (2+3)*4;");
  // print is a statement-like form: no auto OP_PRINT wrap around itself.
  assert_eq!(opcodes(&chunk), vec![OpCode::Const, OpCode::Const, OpCode::Add, OpCode::Const, OpCode::Mul, OpCode::Print, OpCode::Halt]);
}

#[test]
fn bare_expression_statement_gets_auto_print_wrap() {
  let chunk = compile("5 + 3;");
  assert_eq!(opcodes(&chunk), vec![OpCode::Const, OpCode::Const, OpCode::Add, OpCode::Print, OpCode::Halt]);
}

#[test]
fn let_and_set_use_globals_at_top_level() {
  let chunk = compile("let x be 10\nset x to x + 5;\n");
  assert_eq!(
    opcodes(&chunk),
    vec![OpCode::Const, OpCode::SetGlobal, OpCode::GetGlobal, OpCode::Const, OpCode::Add, OpCode::SetGlobal, OpCode::Halt]
  );
}

#[test]
fn unary_minus_lowers_to_zero_minus_x() {
  let chunk = compile("print -x;");
  assert_eq!(opcodes(&chunk), vec![OpCode::Const, OpCode::GetGlobal, OpCode::Sub, OpCode::Print, OpCode::Halt]);
}

#[test]
fn map_set_phrase_is_statement_like_and_gets_no_print_wrap() {
  let chunk = compile("set key \"a\" of m to 1;");
  assert_eq!(opcodes(&chunk), vec![OpCode::GetGlobal, OpCode::Const, OpCode::Const, OpCode::MapSet, OpCode::Pop, OpCode::Halt]);
}

#[test]
fn dunder_call_compiles_to_dedicated_opcode() {
  let chunk = compile("print length of a;");
  assert_eq!(opcodes(&chunk), vec![OpCode::GetGlobal, OpCode::Len, OpCode::Print, OpCode::Halt]);
}

#[test]
fn range_expands_to_inline_loop_with_single_net_value() {
  let chunk = compile("let r be range from 0 to 3\n");
  let ops = opcodes(&chunk);
  assert!(ops.contains(&OpCode::Lt));
  assert!(ops.contains(&OpCode::Append));
  assert!(ops.contains(&OpCode::Loop));
  assert_eq!(ops.last(), Some(&OpCode::Halt));
  // 3 synthetic bindings (i, to, arr) each set once going in, `i` set again
  // by the loop increment, and `r` itself set from the range's result: 5.
  assert_eq!(ops.iter().filter(|o| **o == OpCode::SetGlobal).count(), 5);
}

#[test]
fn concise_function_body_uses_local_slots_not_globals() {
  let chunk = compile("fn add(a, b) {\n  return a + b;\n}\n");
  assert_eq!(chunk.functions.len(), 1);
  let entry = &chunk.functions[0];
  assert_eq!(entry.arity, 2);
  assert_eq!(chunk.names[entry.name_index as usize], "add");
  let ops = opcodes(&chunk);
  // The top-level statement is a Jump (over the body) ... body ... Return,
  // then the program's own trailing Halt.
  assert_eq!(ops[0], OpCode::Jump);
  assert!(ops.contains(&OpCode::GetLocal));
  assert!(!ops.contains(&OpCode::GetGlobal));
}

#[test]
fn while_loop_patches_forward_and_backward_jumps_in_bounds() {
  let chunk = compile("let i be 0\nwhile i < 3 do\n  set i to i + 1;\nend\n");
  // Every jump operand must land on an opcode boundary inside the chunk.
  let mut pc = 0usize;
  while pc < chunk.code.len() {
    let op: OpCode = num_traits::FromPrimitive::from_u8(chunk.code[pc]).unwrap();
    if matches!(op, OpCode::Jump | OpCode::JumpIfFalse) {
      let disp = chunk.get_u16(pc + 1) as usize;
      let target = pc + 3 + disp;
      assert!(target <= chunk.code.len());
    } else if op == OpCode::Loop {
      let disp = chunk.get_u16(pc + 1) as usize;
      assert!(pc + 3 >= disp);
    }
    pc += 1 + operand_len(op);
  }
}

#[test]
fn for_each_walks_array_by_index_into_a_local_variable() {
  let chunk = compile("fn sum(arr) {\n  let total be 0\n  for x in arr do\n    set total to total + x;\n  end\n  return total;\n}\n");
  let ops = opcodes(&chunk);
  assert!(ops.contains(&OpCode::Len));
  assert!(ops.contains(&OpCode::IndexGet));
  assert!(!ops.contains(&OpCode::GetGlobal));
}

#[test]
fn array_literal_compiles_to_new_array_with_element_count() {
  let chunk = compile("print [1, 2, 3];");
  let ops = opcodes(&chunk);
  assert_eq!(ops, vec![OpCode::Const, OpCode::Const, OpCode::Const, OpCode::NewArray, OpCode::Print, OpCode::Halt]);
}

#[test]
fn user_defined_call_compiles_to_op_call_with_interned_name() {
  let chunk = compile("fn add(a, b) {\n  return a + b;\n}\nprint add(1, 2);\n");
  assert!(chunk.names.iter().any(|n| n == "add"));
  let ops = opcodes(&chunk);
  assert!(ops.contains(&OpCode::Call));
}

#[test]
fn debug_table_is_populated_with_the_statement_start_location() {
  let chunk = compile("\n\nprint 1;\n");
  // `print 1;` starts on physical line 3. Every byte belonging to it should
  // carry that line number (down to the trailing Halt, which belongs to no
  // statement and is stamped with whatever the last statement left behind).
  assert!(chunk.debug_lines[0] >= 3);
  assert_eq!(chunk.debug_lines.len(), chunk.code.len());
  assert_eq!(chunk.debug_cols.len(), chunk.code.len());
}

#[test]
fn statement_like_append_is_popped_not_echoed() {
  let chunk = compile("append 1 to a;");
  assert_eq!(opcodes(&chunk), vec![OpCode::GetGlobal, OpCode::Const, OpCode::Append, OpCode::Pop, OpCode::Halt]);
}

#[quickcheck_macros::quickcheck]
fn printing_any_finite_number_keeps_debug_tables_aligned(n: f64) -> bool {
  if !n.is_finite() {
    return true;
  }
  let bounded = (n.abs() % 1_000_000.0 * 1000.0).round() / 1000.0;
  let chunk = compile(&format!("print {};", bounded));
  chunk.debug_lines.len() == chunk.code.len() && chunk.debug_cols.len() == chunk.code.len()
}
