//! Optional structural type-check pass (§4.5, §9's type-hint handling). Type
//! hints on `let`/function parameters/return types are annotations only —
//! nothing in the compiler or VM enforces them — but a caller that wants
//! early feedback can run this pass over the parsed program first and report
//! mismatches before ever reaching codegen. Skipping it changes nothing
//! about the emitted bytecode.

use std::collections::HashMap;

use cb_core::ast::{Expr, Literal_, Stmt};
use cb_core::errors::{ErrorKind, ErrorReport};
use cb_core::types::{Primitive, TypeDescriptor};

/// A rough static type, inferred structurally from literals and annotated
/// bindings. `Unknown` means "give up and allow it" — this pass never
/// fails a program outright, it only surfaces likely mismatches.
#[derive(Debug, Clone, PartialEq)]
enum Ty {
  Primitive(Primitive),
  Unknown,
}

impl From<&TypeDescriptor> for Ty {
  fn from(t: &TypeDescriptor) -> Self {
    match t {
      TypeDescriptor::Primitive(p) => Ty::Primitive(*p),
      TypeDescriptor::Pointer(_) => Ty::Primitive(Primitive::Ptr),
      TypeDescriptor::Function { .. } => Ty::Unknown,
    }
  }
}

struct Checker<'a> {
  source_name: &'a str,
  bindings: Vec<HashMap<String, Ty>>,
  errors: Vec<ErrorReport>,
}

/// Runs the structural check over a parsed program, returning every
/// mismatch found. An empty result means either the program type-checks
/// cleanly or (far more often, for this dynamically-typed language) none of
/// its bindings carry a type hint to check against.
pub fn check_program(stmts: &[Stmt], source_name: &str) -> Vec<ErrorReport> {
  let mut checker = Checker { source_name, bindings: vec![HashMap::new()], errors: Vec::new() };
  for s in stmts {
    checker.check_stmt(s);
  }
  checker.errors
}

impl<'a> Checker<'a> {
  fn error(&mut self, message: impl Into<String>) {
    self.errors.push(ErrorReport::new(ErrorKind::TypeError, self.source_name, 0, 0, message));
  }

  fn declare(&mut self, name: &str, ty: Ty) {
    if let Some(scope) = self.bindings.last_mut() {
      scope.insert(name.to_string(), ty);
    }
  }

  fn lookup(&self, name: &str) -> Ty {
    for scope in self.bindings.iter().rev() {
      if let Some(ty) = scope.get(name) {
        return ty.clone();
      }
    }
    Ty::Unknown
  }

  fn infer(&self, expr: &Expr) -> Ty {
    match expr {
      Expr::Literal(Literal_::Number(_)) => Ty::Primitive(Primitive::F64),
      Expr::Literal(Literal_::Str(_)) => Ty::Primitive(Primitive::String),
      Expr::Literal(Literal_::Bool(_)) => Ty::Primitive(Primitive::Bool),
      Expr::Literal(Literal_::Nil) => Ty::Primitive(Primitive::Nil),
      Expr::Grouping(inner) => self.infer(inner),
      Expr::Variable(name) => self.lookup(name),
      Expr::Unary { .. } => Ty::Primitive(Primitive::F64),
      Expr::Binary { op, .. } => match op {
        cb_core::tokens::TokenKind::Greater
        | cb_core::tokens::TokenKind::GreaterEqual
        | cb_core::tokens::TokenKind::Less
        | cb_core::tokens::TokenKind::LessEqual
        | cb_core::tokens::TokenKind::EqualEqual
        | cb_core::tokens::TokenKind::BangEqual
        | cb_core::tokens::TokenKind::And
        | cb_core::tokens::TokenKind::Or => Ty::Primitive(Primitive::Bool),
        _ => Ty::Unknown,
      },
      _ => Ty::Unknown,
    }
  }

  fn check_stmt(&mut self, stmt: &Stmt) {
    match stmt {
      Stmt::Let { name, type_hint, initializer } => {
        let actual = self.infer(initializer);
        if let Some(hint) = type_hint {
          let expected = Ty::from(hint);
          if expected != Ty::Unknown && actual != Ty::Unknown && expected != actual {
            self.error(format!("'{}' declared with a type hint that its initializer doesn't match", name));
          }
          self.declare(name, expected);
        } else {
          self.declare(name, actual);
        }
      }
      Stmt::Set { value, .. } => {
        self.infer(value);
      }
      Stmt::SetIndex { array, index, value } => {
        self.infer(array);
        self.infer(index);
        self.infer(value);
      }
      Stmt::Expression(expr) => {
        self.infer(expr);
      }
      Stmt::Block(stmts) => {
        self.bindings.push(HashMap::new());
        for s in stmts {
          self.check_stmt(s);
        }
        self.bindings.pop();
      }
      Stmt::If { cond, then_branch, else_branch } => {
        self.infer(cond);
        self.check_stmt(then_branch);
        if let Some(e) = else_branch {
          self.check_stmt(e);
        }
      }
      Stmt::While { cond, body } => {
        self.infer(cond);
        self.check_stmt(body);
      }
      Stmt::ForEach { var, iterable, body } => {
        self.infer(iterable);
        self.bindings.push(HashMap::new());
        self.declare(var, Ty::Unknown);
        self.check_stmt(body);
        self.bindings.pop();
      }
      Stmt::Function { params, return_type, body, .. } => {
        self.bindings.push(HashMap::new());
        for p in params {
          let ty = p.type_hint.as_ref().map(Ty::from).unwrap_or(Ty::Unknown);
          self.declare(&p.name, ty);
        }
        let _ = return_type;
        for s in body {
          self.check_stmt(s);
        }
        self.bindings.pop();
      }
      Stmt::Return { value, .. } => {
        if let Some(v) = value {
          self.infer(v);
        }
      }
    }
  }
}
