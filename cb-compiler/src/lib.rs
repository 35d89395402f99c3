//! AST-to-bytecode codegen (§4.5). A `Compiler` walks one top-level
//! statement at a time and appends its instructions directly onto a shared
//! `Chunk`; debug locations are stamped per top-level statement rather than
//! per token, so every byte a statement emits — including the body of an
//! `if`/`while`/`fn` it introduces — carries the same source line/column.

pub mod builtins;
pub mod expressions;
pub mod statements;
pub mod typecheck;

#[cfg(test)]
mod tests;

use cb_core::chunk::{Chunk, OpCode};

/// Where a name resolves to: a local slot inside the function currently
/// being compiled, or an entry in the chunk's global name table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Place {
  Local(u16),
  Global(u16),
}

/// One function's local-slot bookkeeping. Locals are never block-scoped —
/// the language has no shadowing-on-exit semantics, so a flat, append-only
/// vector with last-match-wins lookup is enough.
#[derive(Default)]
struct FunctionScope {
  locals: Vec<String>,
}

pub struct Compiler {
  chunk: Chunk,
  scopes: Vec<FunctionScope>,
  current_line: u32,
  current_col: u32,
  /// Disambiguates the synthetic slots `__range` codegen allocates so two
  /// range expressions in the same function don't collide.
  synth_counter: u32,
}

impl Compiler {
  pub fn new(source_name: impl Into<String>) -> Self {
    Compiler { chunk: Chunk::new(source_name), scopes: Vec::new(), current_line: 0, current_col: 0, synth_counter: 0 }
  }

  /// Compiles a whole program: one entry per top-level statement, carrying
  /// the original source line/column it started at (as produced by the
  /// statement accumulator).
  pub fn compile_program(stmts: &[(cb_core::ast::Stmt, usize, usize)], source_name: &str) -> Chunk {
    let mut compiler = Compiler::new(source_name);
    for (stmt, line, col) in stmts {
      compiler.current_line = *line as u32;
      compiler.current_col = *col as u32;
      compiler.compile_top_level(stmt);
    }
    compiler.chunk.push_op(OpCode::Halt, compiler.current_line, compiler.current_col);
    compiler.chunk
  }

  fn fresh_synth_name(&mut self, tag: &str) -> String {
    self.synth_counter += 1;
    format!("%{}${}", tag, self.synth_counter)
  }

  /// Declares a brand-new binding (`let`/`make`/function parameter):
  /// allocates a local slot inside the current function, or interns a
  /// global name at the top level.
  fn declare(&mut self, name: &str) -> Place {
    if let Some(scope) = self.scopes.last_mut() {
      scope.locals.push(name.to_string());
      Place::Local((scope.locals.len() - 1) as u16)
    } else {
      Place::Global(self.chunk.intern_name(name))
    }
  }

  /// Resolves an existing binding for read or write: searches the current
  /// function's locals from the most recently declared backward (so
  /// shadowing favors the innermost `let`), falling back to a global name.
  fn resolve(&mut self, name: &str) -> Place {
    if let Some(scope) = self.scopes.last() {
      if let Some(idx) = scope.locals.iter().rposition(|n| n == name) {
        return Place::Local(idx as u16);
      }
    }
    Place::Global(self.chunk.intern_name(name))
  }

  fn emit_get(&mut self, place: Place) {
    let (line, col) = (self.current_line, self.current_col);
    match place {
      Place::Local(idx) => {
        self.chunk.push_op(OpCode::GetLocal, line, col);
        self.chunk.push_u16(idx, line, col);
      }
      Place::Global(idx) => {
        self.chunk.push_op(OpCode::GetGlobal, line, col);
        self.chunk.push_u16(idx, line, col);
      }
    }
  }

  /// Stores the top-of-stack value into `place`, consuming it. Assignment
  /// statements therefore leave the stack exactly as they found it; an
  /// `Expr::Assign` that needs to surface the stored value as its own
  /// result follows this with an `emit_get`.
  fn emit_set(&mut self, place: Place) {
    let (line, col) = (self.current_line, self.current_col);
    match place {
      Place::Local(idx) => {
        self.chunk.push_op(OpCode::SetLocal, line, col);
        self.chunk.push_u16(idx, line, col);
      }
      Place::Global(idx) => {
        self.chunk.push_op(OpCode::SetGlobal, line, col);
        self.chunk.push_u16(idx, line, col);
      }
    }
  }

  fn emit_op(&mut self, op: OpCode) {
    self.chunk.push_op(op, self.current_line, self.current_col);
  }

  fn emit_byte(&mut self, byte: u8) {
    self.chunk.push_byte(byte, self.current_line, self.current_col);
  }

  fn emit_u16(&mut self, val: u16) {
    self.chunk.push_u16(val, self.current_line, self.current_col);
  }

  fn emit_constant(&mut self, value: cb_core::value::Value) {
    let idx = self.chunk.add_constant(value);
    self.emit_op(OpCode::Const);
    self.emit_u16(idx);
  }

  /// Emits a forward jump with a placeholder operand, returning the operand
  /// offset to patch once the displacement is known.
  fn emit_jump(&mut self, op: OpCode) -> usize {
    self.emit_op(op);
    let at = self.chunk.len();
    self.emit_u16(0xFFFF);
    at
  }

  /// Patches a forward jump emitted by `emit_jump` to land just after the
  /// operand at the current end of the chunk.
  fn patch_jump(&mut self, operand_at: usize) {
    let target = self.chunk.len();
    let disp = (target - (operand_at + 2)) as u16;
    self.chunk.patch_u16(operand_at, disp);
  }

  /// Emits `OP_LOOP` back to `loop_start` (an opcode offset).
  fn emit_loop(&mut self, loop_start: usize) {
    self.emit_op(OpCode::Loop);
    let at = self.chunk.len();
    let disp = ((at + 2) - loop_start) as u16;
    self.emit_u16(disp);
  }
}
