use cb_core::ast::{Expr, Literal_};
use cb_core::chunk::OpCode;
use cb_core::tokens::TokenKind;
use cb_core::value::Value;

use crate::builtins;
use crate::Compiler;

impl Compiler {
  /// Compiles `expr`, leaving exactly one value on the stack.
  pub(crate) fn compile_expr(&mut self, expr: &Expr) {
    match expr {
      Expr::Literal(lit) => self.compile_literal(lit),
      Expr::Grouping(inner) => self.compile_expr(inner),
      Expr::Variable(name) => {
        let place = self.resolve(name);
        self.emit_get(place);
      }
      Expr::Assign { name, value } => {
        self.compile_expr(value);
        let place = self.resolve(name);
        self.emit_set(place);
        // Assignment is an expression: surface the stored value again.
        self.emit_get(place);
      }
      Expr::Unary { op, right } => self.compile_unary(*op, right),
      Expr::Binary { op, left, right } => self.compile_binary(*op, left, right),
      Expr::ArrayLiteral(elements) => {
        for e in elements {
          self.compile_expr(e);
        }
        self.emit_op(OpCode::NewArray);
        self.emit_byte(elements.len() as u8);
      }
      Expr::Index { array, index } => {
        self.compile_expr(array);
        self.compile_expr(index);
        self.emit_op(OpCode::IndexGet);
      }
      Expr::Call { callee, args } => self.compile_call(callee, args),
    }
  }

  fn compile_literal(&mut self, lit: &Literal_) {
    match lit {
      Literal_::Number(n) => self.emit_constant(Value::Number(*n)),
      Literal_::Str(s) => self.emit_constant(Value::Str(s.clone())),
      Literal_::Bool(b) => self.emit_constant(Value::Bool(*b)),
      Literal_::Nil => self.emit_constant(Value::Nil),
    }
  }

  /// The only unary operator the grammar produces is prefix `-`, and it
  /// lowers to `0 - x` rather than getting its own opcode.
  fn compile_unary(&mut self, op: TokenKind, right: &Expr) {
    debug_assert_eq!(op, TokenKind::Minus);
    self.emit_constant(Value::Number(0.0));
    self.compile_expr(right);
    self.emit_op(OpCode::Sub);
  }

  fn compile_binary(&mut self, op: TokenKind, left: &Expr, right: &Expr) {
    self.compile_expr(left);
    self.compile_expr(right);
    let opcode = match op {
      TokenKind::Plus => OpCode::Add,
      TokenKind::Minus => OpCode::Sub,
      TokenKind::Star => OpCode::Mul,
      TokenKind::Slash => OpCode::Div,
      TokenKind::Percent => OpCode::Mod,
      TokenKind::Greater => OpCode::Gt,
      TokenKind::GreaterEqual => OpCode::Ge,
      TokenKind::Less => OpCode::Lt,
      TokenKind::LessEqual => OpCode::Le,
      TokenKind::EqualEqual => OpCode::Eq,
      TokenKind::BangEqual => OpCode::Ne,
      TokenKind::And => OpCode::And,
      TokenKind::Or => OpCode::Or,
      other => unreachable!("{:?} is not a binary operator token", other),
    };
    self.emit_op(opcode);
  }

  fn compile_call(&mut self, callee: &Expr, args: &[Expr]) {
    let Expr::Variable(name) = callee else {
      // The grammar only ever builds `Call` on top of a bare name
      // (`call_or_index`'s postfix `(`); nothing constructs an indirect
      // call. Evaluate operands for side effects and push nil so the
      // expression still leaves one value behind.
      self.compile_expr(callee);
      self.emit_op(OpCode::Pop);
      for a in args {
        self.compile_expr(a);
        self.emit_op(OpCode::Pop);
      }
      self.emit_constant(Value::Nil);
      return;
    };

    if name == "print" {
      for a in args {
        self.compile_expr(a);
      }
      self.emit_op(OpCode::Print);
      self.emit_byte(args.len() as u8);
      return;
    }

    if name == "__range" {
      self.compile_range(&args[0], &args[1]);
      return;
    }

    if name.starts_with("__") {
      if let Some(spec) = builtins::lookup(name) {
        for a in args {
          self.compile_expr(a);
        }
        self.emit_op(spec.op);
        if spec.arity == builtins::Arity::Variable {
          self.emit_byte(args.len() as u8);
        }
        return;
      }
    }

    for a in args {
      self.compile_expr(a);
    }
    let name_index = self.chunk.intern_name(name);
    self.emit_op(OpCode::Call);
    self.emit_u16(name_index);
    self.emit_byte(args.len() as u8);
  }

  /// `range from A to B` has no dedicated opcode — the parser hands the
  /// compiler a call to `__range(A, B)`, which is expanded here into an
  /// inline array-building loop over existing opcodes, the same trick used
  /// for unary minus.
  fn compile_range(&mut self, from: &Expr, to: &Expr) {
    let i_name = self.fresh_synth_name("range_i");
    let to_name = self.fresh_synth_name("range_to");
    let arr_name = self.fresh_synth_name("range_arr");

    self.compile_expr(from);
    let i_place = self.declare(&i_name);
    self.emit_set(i_place);

    self.compile_expr(to);
    let to_place = self.declare(&to_name);
    self.emit_set(to_place);

    self.emit_op(OpCode::NewArray);
    self.emit_byte(0);
    let arr_place = self.declare(&arr_name);
    self.emit_set(arr_place);

    let loop_start = self.chunk.len();
    self.emit_get(i_place);
    self.emit_get(to_place);
    self.emit_op(OpCode::Lt);
    let exit_jump = self.emit_jump(OpCode::JumpIfFalse);
    self.emit_op(OpCode::Pop); // discard the `true` test value

    self.emit_get(arr_place);
    self.emit_get(i_place);
    self.emit_op(OpCode::Append);
    self.emit_op(OpCode::Pop); // discard OP_APPEND's nil

    self.emit_get(i_place);
    self.emit_constant(Value::Number(1.0));
    self.emit_op(OpCode::Add);
    self.emit_set(i_place);

    self.emit_loop(loop_start);
    self.patch_jump(exit_jump);
    self.emit_op(OpCode::Pop); // discard the `false` test value

    self.emit_get(arr_place);
  }
}
