use crate::tokens::{Literal, Token, TokenKind};
use crate::types::TypeDescriptor;

/// Expression nodes. `op` is always the token tag of the operator that
/// produced the node, per the data model.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  Binary { op: TokenKind, left: Box<Expr>, right: Box<Expr> },
  Unary { op: TokenKind, right: Box<Expr> },
  Grouping(Box<Expr>),
  Literal(Literal_),
  Variable(String),
  Assign { name: String, value: Box<Expr> },
  Call { callee: Box<Expr>, args: Vec<Expr> },
  ArrayLiteral(Vec<Expr>),
  Index { array: Box<Expr>, index: Box<Expr> },
}

/// Literal payload for `Expr::Literal`. Kept distinct from `tokens::Literal`
/// because the AST also needs `Bool` and `Nil`, which the lexer never
/// produces directly (`true`/`false`/`nil` arrive as bare identifiers and are
/// folded into literals by the parser).
#[derive(Debug, Clone, PartialEq)]
pub enum Literal_ {
  Number(f64),
  Str(String),
  Bool(bool),
  Nil,
}

impl From<Literal> for Literal_ {
  fn from(l: Literal) -> Self {
    match l {
      Literal::Number(n) => Literal_::Number(n),
      Literal::Str(s) => Literal_::Str(s),
    }
  }
}

/// A function parameter: name plus an optional type annotation consumed only
/// by the (skippable) structural type-check pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
  pub name: String,
  pub type_hint: Option<TypeDescriptor>,
}

/// Statement nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
  Expression(Expr),
  Let { name: String, type_hint: Option<TypeDescriptor>, initializer: Expr },
  Set { name: String, value: Expr },
  SetIndex { array: Expr, index: Expr, value: Expr },
  Block(Vec<Stmt>),
  If { cond: Expr, then_branch: Box<Stmt>, else_branch: Option<Box<Stmt>> },
  While { cond: Expr, body: Box<Stmt> },
  ForEach { var: String, iterable: Expr, body: Box<Stmt> },
  Function { name: String, params: Vec<Parameter>, return_type: Option<TypeDescriptor>, body: Vec<Stmt> },
  Return { keyword: Token, value: Option<Expr> },
}
