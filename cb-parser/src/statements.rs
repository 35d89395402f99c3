//! Statement-level dual-surface disambiguation (§4.4): each kind of
//! statement picks its concise-vs-English branch by peeking one token past
//! the leading keyword, then parses either surface down to the same AST
//! shape. Blocks recurse into `statement()` directly — a whole `if`/`while`/
//! `fn` body already arrived as one token stream, so nested statements never
//! need a fresh lexer pass.

use cb_core::ast::{Expr, Parameter, Stmt};
use cb_core::tokens::TokenKind;
use cb_core::types::{Primitive, TypeDescriptor};

use crate::{ParseResult, Parser};

impl<'a> Parser<'a> {
  pub(crate) fn statement(&mut self) -> ParseResult<Stmt> {
    if self.check_ident("fn") {
      return self.concise_function();
    }
    if self.check_ident("define") {
      return self.english_function();
    }
    if self.check_ident("if") {
      return self.if_stmt();
    }
    if self.check_ident("while") {
      return self.while_stmt();
    }
    if self.check_ident("for") {
      return self.for_each_stmt();
    }
    if self.check_ident("let") || self.check_ident("make") {
      return self.let_stmt();
    }
    if self.check_ident("return") {
      return self.return_stmt();
    }
    if self.check_ident("set") {
      return self.set_stmt();
    }
    if self.check_ident("print") {
      return self.print_stmt();
    }
    if self.check(TokenKind::LeftBrace) {
      self.advance();
      let body = self.block_stmts(&[], true)?;
      self.expect(TokenKind::RightBrace, "missing '}'")?;
      return Ok(Stmt::Block(body));
    }
    if self.check(TokenKind::Identifier) && (self.check_next(TokenKind::Equal) || self.check_next(TokenKind::LeftBracket)) {
      return self.concise_assign();
    }
    self.expression_stmt()
  }

  /// Parses statements until the brace-terminated body hits `}`, or (for
  /// `do`-terminated English bodies) until one of `enders` is seen without
  /// being consumed.
  fn block_stmts(&mut self, enders: &[&str], brace_terminated: bool) -> ParseResult<Vec<Stmt>> {
    let mut stmts = Vec::new();
    loop {
      if self.is_at_end() {
        break;
      }
      if brace_terminated && self.check(TokenKind::RightBrace) {
        break;
      }
      if !brace_terminated && enders.iter().any(|e| self.check_ident(e)) {
        break;
      }
      stmts.push(self.statement()?);
    }
    Ok(stmts)
  }

  fn parse_type_name(&mut self) -> ParseResult<TypeDescriptor> {
    let tok = self.expect(TokenKind::Identifier, "expected a type name")?.clone();
    let prim = match tok.lexeme.as_str() {
      "number" => Primitive::F64,
      "string" => Primitive::String,
      "bool" => Primitive::Bool,
      "pointer" => Primitive::Ptr,
      _ => Primitive::Nil,
    };
    Ok(TypeDescriptor::Primitive(prim))
  }

  fn params_list(&mut self) -> ParseResult<Vec<Parameter>> {
    let mut params = Vec::new();
    if !self.check(TokenKind::RightParen) {
      loop {
        let name = self.expect(TokenKind::Identifier, "expected parameter name")?.lexeme.clone();
        params.push(Parameter { name, type_hint: None });
        if !self.matches(TokenKind::Comma) {
          break;
        }
      }
    }
    Ok(params)
  }

  // fn NAME(a, b) [-> TYPE] { ... }
  fn concise_function(&mut self) -> ParseResult<Stmt> {
    self.advance(); // fn
    let name = self.expect(TokenKind::Identifier, "expected function name")?.lexeme.clone();
    self.expect(TokenKind::LeftParen, "missing '('")?;
    let params = self.params_list()?;
    self.expect(TokenKind::RightParen, "missing ')'")?;
    let return_type = if self.matches(TokenKind::Arrow) { Some(self.parse_type_name()?) } else { None };
    self.expect(TokenKind::LeftBrace, "missing '{'")?;
    let body = self.block_stmts(&[], true)?;
    self.expect(TokenKind::RightBrace, "missing '}'")?;
    Ok(Stmt::Function { name, params, return_type, body })
  }

  // define function NAME [with parameters a, b] [returning TYPE] : do ... end
  fn english_function(&mut self) -> ParseResult<Stmt> {
    self.advance(); // define
    self.expect_ident("function", "expected 'function'")?;
    let name = self.expect(TokenKind::Identifier, "expected function name")?.lexeme.clone();

    let mut params = Vec::new();
    if self.match_ident("with") {
      self.expect_ident("parameters", "expected 'parameters'")?;
      params = self.params_list_by_ident()?;
    }

    let return_type = if self.match_ident("returning") { Some(self.parse_type_name()?) } else { None };

    self.expect(TokenKind::Colon, "missing ':'")?;
    self.expect_ident("do", "missing 'do'")?;
    self.match_ident("do"); // tolerate `do do` as an explicit nested block

    let body = self.block_stmts(&["end"], false)?;
    self.expect_ident("end", "missing 'end'")?;
    Ok(Stmt::Function { name, params, return_type, body })
  }

  fn params_list_by_ident(&mut self) -> ParseResult<Vec<Parameter>> {
    let mut params = Vec::new();
    loop {
      let name = self.expect(TokenKind::Identifier, "expected parameter name")?.lexeme.clone();
      params.push(Parameter { name, type_hint: None });
      if !self.matches(TokenKind::Comma) {
        break;
      }
    }
    Ok(params)
  }

  // if (COND) { ... } [else [if ...] { ... }]
  // if COND then ... [else|otherwise ...] end
  fn if_stmt(&mut self) -> ParseResult<Stmt> {
    self.advance(); // if
    if self.check(TokenKind::LeftParen) {
      self.advance();
      let cond = self.expression()?;
      self.expect(TokenKind::RightParen, "missing ')'")?;
      self.expect(TokenKind::LeftBrace, "missing '{'")?;
      let then_body = self.block_stmts(&[], true)?;
      self.expect(TokenKind::RightBrace, "missing '}'")?;
      let else_branch = if self.match_ident("else") {
        if self.check_ident("if") {
          Some(Box::new(self.if_stmt()?))
        } else {
          self.expect(TokenKind::LeftBrace, "missing '{'")?;
          let else_body = self.block_stmts(&[], true)?;
          self.expect(TokenKind::RightBrace, "missing '}'")?;
          Some(Box::new(Stmt::Block(else_body)))
        }
      } else {
        None
      };
      Ok(Stmt::If { cond, then_branch: Box::new(Stmt::Block(then_body)), else_branch })
    } else {
      let cond = self.expression()?;
      self.expect_ident("then", "missing 'then'")?;
      let then_body = self.block_stmts(&["else", "otherwise", "end"], false)?;
      let else_branch = if self.match_ident("else") || self.match_ident("otherwise") {
        let else_body = self.block_stmts(&["end"], false)?;
        Some(Box::new(Stmt::Block(else_body)))
      } else {
        None
      };
      self.expect_ident("end", "missing 'end'")?;
      Ok(Stmt::If { cond, then_branch: Box::new(Stmt::Block(then_body)), else_branch })
    }
  }

  // while (COND) { ... }
  // while COND do ... end  (a second `do` is tolerated, per §9's explicit note)
  fn while_stmt(&mut self) -> ParseResult<Stmt> {
    self.advance(); // while
    if self.check(TokenKind::LeftParen) {
      self.advance();
      let cond = self.expression()?;
      self.expect(TokenKind::RightParen, "missing ')'")?;
      self.expect(TokenKind::LeftBrace, "missing '{'")?;
      let body = self.block_stmts(&[], true)?;
      self.expect(TokenKind::RightBrace, "missing '}'")?;
      Ok(Stmt::While { cond, body: Box::new(Stmt::Block(body)) })
    } else {
      let cond = self.expression()?;
      self.expect_ident("do", "missing 'do'")?;
      self.match_ident("do");
      let body = self.block_stmts(&["end"], false)?;
      self.expect_ident("end", "missing 'end'")?;
      Ok(Stmt::While { cond, body: Box::new(Stmt::Block(body)) })
    }
  }

  // for (VAR in ITERABLE) { ... }
  // for each VAR in ITERABLE do ... end
  fn for_each_stmt(&mut self) -> ParseResult<Stmt> {
    self.advance(); // for
    if self.check(TokenKind::LeftParen) {
      self.advance();
      let var = self.expect(TokenKind::Identifier, "expected loop variable")?.lexeme.clone();
      self.expect_ident("in", "missing 'in'")?;
      let iterable = self.expression()?;
      self.expect(TokenKind::RightParen, "missing ')'")?;
      self.expect(TokenKind::LeftBrace, "missing '{'")?;
      let body = self.block_stmts(&[], true)?;
      self.expect(TokenKind::RightBrace, "missing '}'")?;
      Ok(Stmt::ForEach { var, iterable, body: Box::new(Stmt::Block(body)) })
    } else {
      self.match_ident("each");
      let var = self.expect(TokenKind::Identifier, "expected loop variable")?.lexeme.clone();
      self.expect_ident("in", "missing 'in'")?;
      let iterable = self.expression()?;
      self.expect_ident("do", "missing 'do'")?;
      let body = self.block_stmts(&["end"], false)?;
      self.expect_ident("end", "missing 'end'")?;
      Ok(Stmt::ForEach { var, iterable, body: Box::new(Stmt::Block(body)) })
    }
  }

  // let NAME [: TYPE] = EXPR [;]
  // let NAME be EXPR            (English; `make NAME equal to EXPR` is an alias)
  fn let_stmt(&mut self) -> ParseResult<Stmt> {
    if self.check_ident("make") {
      self.advance();
      let name = self.expect(TokenKind::Identifier, "expected variable name")?.lexeme.clone();
      self.expect_ident("equal", "expected 'equal'")?;
      self.expect_ident("to", "expected 'to'")?;
      let initializer = self.expression()?;
      self.consume_optional_semicolon();
      return Ok(Stmt::Let { name, type_hint: None, initializer });
    }

    self.advance(); // let
    let name = self.expect(TokenKind::Identifier, "expected variable name")?.lexeme.clone();

    let type_hint = if self.matches(TokenKind::Colon) { Some(self.parse_type_name()?) } else { None };

    if self.matches(TokenKind::Equal) {
      let initializer = self.expression()?;
      self.consume_optional_semicolon();
      Ok(Stmt::Let { name, type_hint, initializer })
    } else if self.match_ident("be") {
      let initializer = self.expression()?;
      Ok(Stmt::Let { name, type_hint, initializer })
    } else {
      Err(self.error("expected '=' or 'be' after variable name").with_hint("let NAME = EXPR | let NAME be EXPR"))
    }
  }

  // return [EXPR] [;]
  fn return_stmt(&mut self) -> ParseResult<Stmt> {
    let keyword = self.advance().clone(); // return
    let value = if self.at_block_end() { None } else { Some(self.expression()?) };
    self.consume_optional_semicolon();
    Ok(Stmt::Return { keyword, value })
  }

  fn at_block_end(&self) -> bool {
    self.is_at_end()
      || self.check(TokenKind::RightBrace)
      || self.check(TokenKind::Semicolon)
      || self.check_ident("end")
      || self.check_ident("else")
      || self.check_ident("otherwise")
  }

  // set NAME to EXPR [;]
  // set NAME[IDX] to EXPR [;]
  // set key K of M to V  -> ExpressionStmt(__map_set(M, K, V)), a
  // statement-like builtin (§4.5), not SetIndexStmt — SetIndexStmt is
  // reserved for bracket-indexed array assignment.
  fn set_stmt(&mut self) -> ParseResult<Stmt> {
    self.advance(); // set

    if self.check_ident("key") {
      self.advance();
      let key = self.arg()?;
      self.expect_ident("of", "expected 'of'")?;
      let map_expr = self.arg()?;
      self.expect_ident("to", "expected 'to'")?;
      let value = self.expression()?;
      self.consume_optional_semicolon();
      let set_call = Expr::Call { callee: Box::new(Expr::Variable("__map_set".to_string())), args: vec![map_expr, key, value] };
      return Ok(Stmt::Expression(set_call));
    }

    let name = self.expect(TokenKind::Identifier, "expected variable name")?.lexeme.clone();

    if self.matches(TokenKind::LeftBracket) {
      let index = self.expression()?;
      self.expect(TokenKind::RightBracket, "missing ']'")?;
      self.expect_ident("to", "expected 'to'")?;
      let value = self.expression()?;
      self.consume_optional_semicolon();
      return Ok(Stmt::SetIndex { array: Expr::Variable(name), index, value });
    }

    self.expect_ident("to", "expected 'to'")?;
    let value = self.expression()?;
    self.consume_optional_semicolon();
    Ok(Stmt::Set { name, value })
  }

  // IDENT = EXPR [;]
  // IDENT[IDX] = EXPR [;]
  fn concise_assign(&mut self) -> ParseResult<Stmt> {
    let name = self.advance().lexeme.clone();
    if self.matches(TokenKind::LeftBracket) {
      let index = self.expression()?;
      self.expect(TokenKind::RightBracket, "missing ']'")?;
      self.expect(TokenKind::Equal, "missing '='")?;
      let value = self.expression()?;
      self.consume_optional_semicolon();
      return Ok(Stmt::SetIndex { array: Expr::Variable(name), index, value });
    }
    self.expect(TokenKind::Equal, "missing '='")?;
    let value = self.expression()?;
    self.consume_optional_semicolon();
    Ok(Stmt::Set { name, value })
  }

  // print E1 E2 ... (space-separated, no parens or commas required)
  fn print_stmt(&mut self) -> ParseResult<Stmt> {
    self.advance(); // print
    let mut args = vec![self.arg()?];
    while self.can_start_expr() {
      args.push(self.arg()?);
    }
    self.consume_optional_semicolon();
    let call = Expr::Call { callee: Box::new(Expr::Variable("print".to_string())), args };
    Ok(Stmt::Expression(call))
  }

  fn expression_stmt(&mut self) -> ParseResult<Stmt> {
    let expr = self.expression()?;
    self.consume_optional_semicolon();
    Ok(Stmt::Expression(expr))
  }
}
