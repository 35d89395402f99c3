use cb_core::ast::{Expr, Stmt};
use cb_core::chunk::OpCode;

use crate::builtins;
use crate::{Compiler, FunctionScope};

impl Compiler {
  /// Compiles one top-level statement. Function declarations get their body
  /// compiled as an inline, skipped-over block (§4.5); everything else
  /// delegates to `compile_stmt`.
  pub(crate) fn compile_top_level(&mut self, stmt: &Stmt) {
    self.compile_stmt(stmt, false);
  }

  /// `in_function` distinguishes two different statement-expression
  /// conventions: top level auto-echoes unless the call is "statement-like"
  /// builtin or `print`; inside a function body, every bare expression
  /// statement is simply evaluated and discarded.
  fn compile_stmt(&mut self, stmt: &Stmt, in_function: bool) {
    match stmt {
      Stmt::Expression(expr) => self.compile_expr_stmt(expr, in_function),
      Stmt::Let { name, initializer, .. } => {
        self.compile_expr(initializer);
        let place = self.declare(name);
        self.emit_set(place);
      }
      Stmt::Set { name, value } => {
        self.compile_expr(value);
        let place = self.resolve(name);
        self.emit_set(place);
      }
      Stmt::SetIndex { array, index, value } => {
        self.compile_expr(array);
        self.compile_expr(index);
        self.compile_expr(value);
        self.emit_op(OpCode::IndexSet);
      }
      Stmt::Block(stmts) => {
        for s in stmts {
          self.compile_stmt(s, in_function);
        }
      }
      Stmt::If { cond, then_branch, else_branch } => self.compile_if(cond, then_branch, else_branch, in_function),
      Stmt::While { cond, body } => self.compile_while(cond, body, in_function),
      Stmt::ForEach { var, iterable, body } => self.compile_for_each(var, iterable, body, in_function),
      Stmt::Function { name, params, body, .. } => self.compile_function(name, params, body),
      Stmt::Return { value, .. } => {
        match value {
          Some(expr) => self.compile_expr(expr),
          None => self.emit_constant(cb_core::value::Value::Nil),
        }
        self.emit_op(OpCode::Return);
      }
    }
  }

  fn compile_expr_stmt(&mut self, expr: &Expr, in_function: bool) {
    let callee_name = match expr {
      Expr::Call { callee, .. } => match callee.as_ref() {
        Expr::Variable(name) => Some(name.as_str()),
        _ => None,
      },
      _ => None,
    };

    self.compile_expr(expr);

    match callee_name {
      Some("print") => {
        // OP_PRINT consumes its arguments and pushes nothing back.
      }
      Some(name) if builtins::is_statement_like(name) => {
        self.emit_op(OpCode::Pop);
      }
      _ if in_function => self.emit_op(OpCode::Pop),
      _ => {
        // Top-level, not print, not a statement-like builtin: echo the
        // expression's value the way a REPL would.
        self.emit_op(OpCode::Print);
        self.emit_byte(1);
      }
    }
  }

  fn compile_if(&mut self, cond: &Expr, then_branch: &Stmt, else_branch: &Option<Box<Stmt>>, in_function: bool) {
    self.compile_expr(cond);
    let else_jump = self.emit_jump(OpCode::JumpIfFalse);
    self.emit_op(OpCode::Pop); // discard the `true` test value
    self.compile_stmt(then_branch, in_function);

    if let Some(else_stmt) = else_branch {
      let end_jump = self.emit_jump(OpCode::Jump);
      self.patch_jump(else_jump);
      self.emit_op(OpCode::Pop); // discard the `false` test value
      self.compile_stmt(else_stmt, in_function);
      self.patch_jump(end_jump);
    } else {
      self.patch_jump(else_jump);
      self.emit_op(OpCode::Pop);
    }
  }

  fn compile_while(&mut self, cond: &Expr, body: &Stmt, in_function: bool) {
    let loop_start = self.chunk.len();
    self.compile_expr(cond);
    let exit_jump = self.emit_jump(OpCode::JumpIfFalse);
    self.emit_op(OpCode::Pop);
    self.compile_stmt(body, in_function);
    self.emit_loop(loop_start);
    self.patch_jump(exit_jump);
    self.emit_op(OpCode::Pop);
  }

  /// `for NAME in ITERABLE do ... end` has no dedicated opcode either: it
  /// lowers to the same index-counting loop shape as `__range`, but walking
  /// an arbitrary array expression instead of building one.
  fn compile_for_each(&mut self, var: &str, iterable: &Expr, body: &Stmt, in_function: bool) {
    let arr_name = self.fresh_synth_name("foreach_arr");
    let i_name = self.fresh_synth_name("foreach_i");

    self.compile_expr(iterable);
    let arr_place = self.declare(&arr_name);
    self.emit_set(arr_place);

    self.emit_constant(cb_core::value::Value::Number(0.0));
    let i_place = self.declare(&i_name);
    self.emit_set(i_place);

    let var_place = self.declare(var);

    let loop_start = self.chunk.len();
    self.emit_get(i_place);
    self.emit_get(arr_place);
    self.emit_op(OpCode::Len);
    self.emit_op(OpCode::Lt);
    let exit_jump = self.emit_jump(OpCode::JumpIfFalse);
    self.emit_op(OpCode::Pop);

    self.emit_get(arr_place);
    self.emit_get(i_place);
    self.emit_op(OpCode::IndexGet);
    self.emit_set(var_place);

    self.compile_stmt(body, in_function);

    self.emit_get(i_place);
    self.emit_constant(cb_core::value::Value::Number(1.0));
    self.emit_op(OpCode::Add);
    self.emit_set(i_place);

    self.emit_loop(loop_start);
    self.patch_jump(exit_jump);
    self.emit_op(OpCode::Pop);
  }

  /// Function bodies are emitted inline in the code stream: jump over the
  /// body, record where it actually starts, emit it, then patch the jump.
  fn compile_function(&mut self, name: &str, params: &[cb_core::ast::Parameter], body: &[Stmt]) {
    let skip_jump = self.emit_jump(OpCode::Jump);
    let entry_offset = self.chunk.len() as u32;

    self.scopes.push(FunctionScope::default());
    for p in params {
      self.declare(&p.name);
    }
    for s in body {
      self.compile_stmt(s, true);
    }
    // A body that falls off the end without an explicit `return` returns nil.
    self.emit_constant(cb_core::value::Value::Nil);
    self.emit_op(OpCode::Return);
    self.scopes.pop();

    self.patch_jump(skip_jump);

    let name_index = self.chunk.intern_name(name);
    self.chunk.add_function(cb_core::chunk::FunctionEntry {
      name_index,
      arity: params.len() as u16,
      entry_offset,
    });
  }
}
