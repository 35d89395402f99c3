//! Dual-surface recursive-descent parser (§4.4). A fresh `Parser` is handed
//! the token stream for exactly one logical statement (as grouped by
//! `cb-preprocess::accumulate`) and parses it to completion, including any
//! nested statements inside its own body — an `if`/`while`/`fn` block never
//! needs to go back through the lexer, because the whole block already
//! arrived as one token stream.

pub mod expressions;
pub mod phrases;
pub mod statements;


use cb_core::ast::Stmt;
use cb_core::errors::{ErrorKind, ErrorReport};
use cb_core::tokens::{Token, TokenKind};

pub type ParseResult<T> = Result<T, ErrorReport>;

pub struct Parser<'a> {
  tokens: &'a [Token],
  current: usize,
  source_name: &'a str,
}

impl<'a> Parser<'a> {
  pub fn new(tokens: &'a [Token], source_name: &'a str) -> Self {
    Parser { tokens, current: 0, source_name }
  }

  /// Parses exactly one statement from `tokens`, requiring every token to be
  /// consumed (trailing garbage is a parse error).
  pub fn parse_statement_text(tokens: &'a [Token], source_name: &'a str) -> ParseResult<Stmt> {
    let mut parser = Parser::new(tokens, source_name);
    let stmt = parser.statement()?;
    if !parser.is_at_end() {
      return Err(parser.error("unexpected trailing tokens after statement"));
    }
    Ok(stmt)
  }

  fn peek(&self) -> &Token {
    &self.tokens[self.current]
  }

  fn peek_kind(&self) -> TokenKind {
    self.peek().kind
  }

  fn previous(&self) -> &Token {
    &self.tokens[self.current - 1]
  }

  fn is_at_end(&self) -> bool {
    self.peek_kind() == TokenKind::Eof
  }

  fn advance(&mut self) -> &Token {
    if !self.is_at_end() {
      self.current += 1;
    }
    self.previous()
  }

  fn check(&self, kind: TokenKind) -> bool {
    !self.is_at_end() && self.peek_kind() == kind
  }

  fn check_next(&self, kind: TokenKind) -> bool {
    self.tokens.get(self.current + 1).map(|t| t.kind == kind).unwrap_or(false)
  }

  fn check_ident(&self, word: &str) -> bool {
    self.check(TokenKind::Identifier) && self.peek().lexeme == word
  }

  fn matches(&mut self, kind: TokenKind) -> bool {
    if self.check(kind) {
      self.advance();
      true
    } else {
      false
    }
  }

  fn match_ident(&mut self, word: &str) -> bool {
    if self.check_ident(word) {
      self.advance();
      true
    } else {
      false
    }
  }

  fn error(&self, message: impl Into<String>) -> ErrorReport {
    let tok = self.peek();
    ErrorReport::new(ErrorKind::ParseError, self.source_name, tok.line as u32, tok.col as u32, message).with_near(tok.lexeme.clone())
  }

  fn expect(&mut self, kind: TokenKind, hint: &str) -> ParseResult<&Token> {
    if self.check(kind) {
      Ok(self.advance())
    } else {
      Err(self.error(format!("expected {:?}", kind)).with_hint(hint.to_string()))
    }
  }

  fn expect_ident(&mut self, word: &str, hint: &str) -> ParseResult<()> {
    if self.match_ident(word) {
      Ok(())
    } else {
      Err(self.error(format!("expected '{}'", word)).with_hint(hint.to_string()))
    }
  }

  fn expect_and(&mut self, hint: &str) -> ParseResult<()> {
    if self.matches(TokenKind::And) {
      Ok(())
    } else {
      Err(self.error("expected 'and'").with_hint(hint.to_string()))
    }
  }

  fn consume_optional_semicolon(&mut self) {
    self.matches(TokenKind::Semicolon);
  }

  /// Statement-leading words that must never be swallowed as another
  /// `print` argument, even though they're ordinary IDENTIFIER tokens: the
  /// next nested statement (or this block's ender) always wins.
  const STATEMENT_BOUNDARY_WORDS: [&'static str; 13] =
    ["fn", "define", "if", "while", "for", "let", "make", "return", "set", "print", "end", "else", "otherwise"];

  /// Whether the next token could begin a new `print` argument — used to
  /// know when its space-separated argument list has ended. An IDENTIFIER
  /// only counts if it isn't itself a statement-leading keyword, so
  /// `print 1\notherwise ...` and `print 1\nprint 2` never merge.
  fn can_start_expr(&self) -> bool {
    if self.is_at_end() {
      return false;
    }
    match self.peek_kind() {
      TokenKind::Number | TokenKind::String | TokenKind::LeftParen | TokenKind::LeftBracket => true,
      TokenKind::Identifier => !Self::STATEMENT_BOUNDARY_WORDS.contains(&self.peek().lexeme.as_str()),
      _ => false,
    }
  }

  /// The precedence level used for phrase *arguments*: one notch below
  /// `logic`, so an argument expression never swallows the `and`/`or`
  /// keyword a phrase itself uses as a separator (e.g. `band A and B`).
  fn arg(&mut self) -> ParseResult<cb_core::ast::Expr> {
    self.comparison()
  }
}
