//! Pratt-style precedence chain: `equality -> logic -> comparison -> term ->
//! factor -> unary -> call/index postfix -> primary`. Phrase forms live in
//! `phrases.rs` and are dispatched from `primary`.

use cb_core::ast::{Expr, Literal_};
use cb_core::tokens::TokenKind;

use crate::{ParseResult, Parser};

impl<'a> Parser<'a> {
  pub(crate) fn expression(&mut self) -> ParseResult<Expr> {
    self.equality()
  }

  fn equality(&mut self) -> ParseResult<Expr> {
    let mut expr = self.logic()?;
    while matches!(self.peek_kind(), TokenKind::EqualEqual | TokenKind::BangEqual) {
      let op = self.advance().kind;
      let right = self.logic()?;
      expr = Expr::Binary { op, left: Box::new(expr), right: Box::new(right) };
    }
    Ok(expr)
  }

  fn logic(&mut self) -> ParseResult<Expr> {
    let mut expr = self.comparison()?;
    while matches!(self.peek_kind(), TokenKind::And | TokenKind::Or) {
      let op = self.advance().kind;
      let right = self.comparison()?;
      expr = Expr::Binary { op, left: Box::new(expr), right: Box::new(right) };
    }
    Ok(expr)
  }

  pub(crate) fn comparison(&mut self) -> ParseResult<Expr> {
    let mut expr = self.term()?;
    while matches!(self.peek_kind(), TokenKind::Greater | TokenKind::GreaterEqual | TokenKind::Less | TokenKind::LessEqual) {
      let op = self.advance().kind;
      let right = self.term()?;
      expr = Expr::Binary { op, left: Box::new(expr), right: Box::new(right) };
    }
    Ok(expr)
  }

  fn term(&mut self) -> ParseResult<Expr> {
    let mut expr = self.factor()?;
    while matches!(self.peek_kind(), TokenKind::Plus | TokenKind::Minus) {
      let op = self.advance().kind;
      let right = self.factor()?;
      expr = Expr::Binary { op, left: Box::new(expr), right: Box::new(right) };
    }
    Ok(expr)
  }

  fn factor(&mut self) -> ParseResult<Expr> {
    let mut expr = self.unary()?;
    while matches!(self.peek_kind(), TokenKind::Star | TokenKind::Slash | TokenKind::Percent) {
      let op = self.advance().kind;
      let right = self.unary()?;
      expr = Expr::Binary { op, left: Box::new(expr), right: Box::new(right) };
    }
    Ok(expr)
  }

  fn unary(&mut self) -> ParseResult<Expr> {
    if self.check(TokenKind::Minus) {
      let op = self.advance().kind;
      let right = self.unary()?;
      return Ok(Expr::Unary { op, right: Box::new(right) });
    }
    self.call_or_index()
  }

  /// Postfix chain: `callee(args)` and `array[index]`, left-associative and
  /// chainable (`f(x)[0]`, `a[0][1]`, ...).
  fn call_or_index(&mut self) -> ParseResult<Expr> {
    let mut expr = self.primary()?;
    loop {
      if self.matches(TokenKind::LeftParen) {
        let args = self.call_args()?;
        self.expect(TokenKind::RightParen, "missing ')'")?;
        expr = Expr::Call { callee: Box::new(expr), args };
      } else if self.matches(TokenKind::LeftBracket) {
        let index = self.expression()?;
        self.expect(TokenKind::RightBracket, "missing ']'")?;
        expr = Expr::Index { array: Box::new(expr), index: Box::new(index) };
      } else {
        break;
      }
    }
    Ok(expr)
  }

  fn call_args(&mut self) -> ParseResult<Vec<Expr>> {
    let mut args = Vec::new();
    if !self.check(TokenKind::RightParen) {
      loop {
        args.push(self.expression()?);
        if !self.matches(TokenKind::Comma) {
          break;
        }
      }
    }
    Ok(args)
  }

  fn primary(&mut self) -> ParseResult<Expr> {
    if self.check(TokenKind::Number) {
      let n = self.advance().number().expect("NUMBER token always carries a literal");
      return Ok(Expr::Literal(Literal_::Number(n)));
    }

    if self.check(TokenKind::String) {
      let s = self.advance().string().expect("STRING token always carries a literal").to_string();
      return Ok(Expr::Literal(Literal_::Str(s)));
    }

    if self.matches(TokenKind::LeftBracket) {
      let mut elements = Vec::new();
      if !self.check(TokenKind::RightBracket) {
        loop {
          elements.push(self.expression()?);
          if !self.matches(TokenKind::Comma) {
            break;
          }
        }
      }
      self.expect(TokenKind::RightBracket, "missing ']'")?;
      return Ok(Expr::ArrayLiteral(elements));
    }

    if self.matches(TokenKind::LeftParen) {
      let inner = self.expression()?;
      self.expect(TokenKind::RightParen, "missing ')'")?;
      return Ok(Expr::Grouping(Box::new(inner)));
    }

    if self.check(TokenKind::Identifier) {
      if let Some(expr) = self.try_phrase()? {
        return Ok(expr);
      }
      let word = self.advance().lexeme.clone();
      return Ok(match word.as_str() {
        "true" => Expr::Literal(Literal_::Bool(true)),
        "false" => Expr::Literal(Literal_::Bool(false)),
        "nil" => Expr::Literal(Literal_::Nil),
        _ => Expr::Variable(word),
      });
    }

    Err(self.error("expected expression"))
  }
}
