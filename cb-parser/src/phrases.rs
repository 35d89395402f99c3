//! The English-phrase catalogue (§4.4): every multi-word builtin surface
//! desugars here into `Expr::Call { callee: Variable("__..."), args }`. The
//! compiler (§4.5) recognizes calls to `__`-prefixed names and emits their
//! dedicated opcode instead of a generic `OP_CALL`.
//!
//! Argument expressions are parsed with `Parser::arg` (the `comparison`
//! level), one notch below `logic`, so a phrase's own `and`/`or` separator
//! is never swallowed by the argument's own expression grammar.

use cb_core::ast::Expr;

use crate::{ParseResult, Parser};

fn call(name: &str, args: Vec<Expr>) -> Expr {
  Expr::Call { callee: Box::new(Expr::Variable(name.to_string())), args }
}

impl<'a> Parser<'a> {
  /// Tries to parse the phrase beginning at the current identifier. Returns
  /// `Ok(None)` (no tokens consumed) when the leading word isn't a phrase
  /// keyword, so the caller can fall back to treating it as a bare
  /// identifier.
  pub(crate) fn try_phrase(&mut self) -> ParseResult<Option<Expr>> {
    let word = self.peek().lexeme.clone();
    let expr = match word.as_str() {
      "get" => self.phrase_map_get()?,
      "has" => self.phrase_map_has()?,
      "substring" => self.phrase_substring()?,
      "ord" => self.phrase_ord()?,
      "chr" => self.phrase_unary("chr", "__chr")?,
      "read" => self.phrase_read_file()?,
      "find" => self.phrase_find()?,
      "split" => self.phrase_split()?,
      "concat" => self.phrase_and_pair("concat", "__str_cat")?,
      "pack16" => self.phrase_unary("pack16", "__pack_u16le")?,
      "pack32" => self.phrase_unary("pack32", "__pack_u32le")?,
      "pack64" => self.phrase_unary("pack64", "__pack_f64le")?,
      "assert" => self.phrase_unary("assert", "__assert")?,
      "panic" => self.phrase_unary("panic", "__panic")?,
      "length" => self.phrase_length()?,
      "alloc" => self.phrase_unary("alloc", "__alloc")?,
      "free" => self.phrase_unary("free", "__free")?,
      "tostring" => self.phrase_unary("tostring", "__to_string")?,
      "floor" => self.phrase_unary("floor", "__floor")?,
      "ceil" => self.phrase_unary("ceil", "__ceil")?,
      "round" => self.phrase_unary("round", "__round")?,
      "sqrt" => self.phrase_unary("sqrt", "__sqrt")?,
      "abs" => self.phrase_unary("abs", "__abs")?,
      "pow" => self.phrase_by_pair("pow", "__pow")?,
      "band" => self.phrase_and_pair("band", "__band")?,
      "bor" => self.phrase_and_pair("bor", "__bor")?,
      "bxor" => self.phrase_and_pair("bxor", "__bxor")?,
      "shl" => self.phrase_by_pair("shl", "__shl")?,
      "shr" => self.phrase_by_pair("shr", "__shr")?,
      "size" => self.phrase_size_of()?,
      "ptradd" => self.phrase_by_pair("ptradd", "__ptr_add")?,
      "ptrdiff" => self.phrase_adjacent_pair("ptrdiff", "__ptr_diff")?,
      "realloc" => self.phrase_adjacent_pair("realloc", "__realloc")?,
      "blocksize" => self.phrase_unary("blocksize", "__block_size")?,
      "ptroffset" => self.phrase_unary("ptroffset", "__ptr_offset")?,
      "ptrblock" => self.phrase_unary("ptrblock", "__ptr_block")?,
      "read8" => self.phrase_mem_read("read8", "__load8")?,
      "read16" => self.phrase_mem_read("read16", "__load16")?,
      "read32" => self.phrase_mem_read("read32", "__load32")?,
      "read64" => self.phrase_mem_read("read64", "__load64")?,
      "write8" => self.phrase_mem_write("write8", "__store8")?,
      "write16" => self.phrase_mem_write("write16", "__store16")?,
      "write32" => self.phrase_mem_write("write32", "__store32")?,
      "write64" => self.phrase_mem_write("write64", "__store64")?,
      "range" => self.phrase_range()?,
      "parse" => self.phrase_parse()?,
      "starts" => self.phrase_affix("starts", "__starts_with")?,
      "ends" => self.phrase_affix("ends", "__ends_with")?,
      "delete" => self.phrase_delete_key()?,
      "keys" => self.phrase_keys_of()?,
      "exists" => self.phrase_exists_file()?,
      "append" => self.phrase_append()?,
      "call" => self.phrase_call_with()?,
      _ => return Ok(None),
    };
    Ok(Some(expr))
  }

  // get K from M -> __map_get(M, K)
  fn phrase_map_get(&mut self) -> ParseResult<Expr> {
    self.advance();
    let k = self.arg()?;
    self.expect_ident("from", "expected 'from'")?;
    let m = self.arg()?;
    Ok(call("__map_get", vec![m, k]))
  }

  // has K in M -> __map_has(M, K)
  fn phrase_map_has(&mut self) -> ParseResult<Expr> {
    self.advance();
    let k = self.arg()?;
    self.expect_ident("in", "expected 'in'")?;
    let m = self.arg()?;
    Ok(call("__map_has", vec![m, k]))
  }

  // substring of S from A to B -> __substr(S, A, B)
  fn phrase_substring(&mut self) -> ParseResult<Expr> {
    self.advance();
    self.expect_ident("of", "expected 'of'")?;
    let s = self.arg()?;
    self.expect_ident("from", "expected 'from'")?;
    let a = self.arg()?;
    self.expect_ident("to", "expected 'to'")?;
    let b = self.arg()?;
    Ok(call("__substr", vec![s, a, b]))
  }

  // ord of S -> __ord(S)
  fn phrase_ord(&mut self) -> ParseResult<Expr> {
    self.advance();
    self.expect_ident("of", "expected 'of'")?;
    let s = self.arg()?;
    Ok(call("__ord", vec![s]))
  }

  // read file P -> __read_file(P)
  fn phrase_read_file(&mut self) -> ParseResult<Expr> {
    self.advance();
    self.expect_ident("file", "expected 'file'")?;
    let p = self.arg()?;
    Ok(call("__read_file", vec![p]))
  }

  // find N in H -> __str_find(H, N)
  fn phrase_find(&mut self) -> ParseResult<Expr> {
    self.advance();
    let n = self.arg()?;
    self.expect_ident("in", "expected 'in'")?;
    let h = self.arg()?;
    Ok(call("__str_find", vec![h, n]))
  }

  // split S by SEP -> __split(S, SEP)
  fn phrase_split(&mut self) -> ParseResult<Expr> {
    self.advance();
    let s = self.arg()?;
    self.expect_ident("by", "expected 'by'")?;
    let sep = self.arg()?;
    Ok(call("__split", vec![s, sep]))
  }

  // length of A -> __len(A)
  fn phrase_length(&mut self) -> ParseResult<Expr> {
    self.advance();
    self.expect_ident("of", "expected 'of'")?;
    let a = self.arg()?;
    Ok(call("__len", vec![a]))
  }

  // size of M -> __map_size(M)
  fn phrase_size_of(&mut self) -> ParseResult<Expr> {
    self.advance();
    self.expect_ident("of", "expected 'of'")?;
    let m = self.arg()?;
    Ok(call("__map_size", vec![m]))
  }

  // keys of M -> __map_keys(M)
  fn phrase_keys_of(&mut self) -> ParseResult<Expr> {
    self.advance();
    self.expect_ident("of", "expected 'of'")?;
    let m = self.arg()?;
    Ok(call("__map_keys", vec![m]))
  }

  // delete key K from M -> __map_del(M, K)
  fn phrase_delete_key(&mut self) -> ParseResult<Expr> {
    self.advance();
    self.expect_ident("key", "expected 'key'")?;
    let k = self.arg()?;
    self.expect_ident("from", "expected 'from'")?;
    let m = self.arg()?;
    Ok(call("__map_del", vec![m, k]))
  }

  // exists file P -> __file_exists(P)
  fn phrase_exists_file(&mut self) -> ParseResult<Expr> {
    self.advance();
    self.expect_ident("file", "expected 'file'")?;
    let p = self.arg()?;
    Ok(call("__file_exists", vec![p]))
  }

  // append X to A -> __append(A, X)
  fn phrase_append(&mut self) -> ParseResult<Expr> {
    self.advance();
    let x = self.arg()?;
    self.expect_ident("to", "expected 'to'")?;
    let a = self.arg()?;
    Ok(call("__append", vec![a, x]))
  }

  // starts with P in S -> __starts_with(S, P)
  // ends with P in S -> __ends_with(S, P)
  fn phrase_affix(&mut self, keyword: &str, builtin: &str) -> ParseResult<Expr> {
    self.advance();
    self.expect_ident("with", "expected 'with'")?;
    let p = self.arg()?;
    self.expect_ident("in", "expected 'in'")?;
    let s = self.arg()?;
    let _ = keyword;
    Ok(call(builtin, vec![s, p]))
  }

  // range from A to B -> __range(A, B) (special-cased in codegen, §9)
  fn phrase_range(&mut self) -> ParseResult<Expr> {
    self.advance();
    self.expect_ident("from", "expected 'from'")?;
    let a = self.arg()?;
    self.expect_ident("to", "expected 'to'")?;
    let b = self.arg()?;
    Ok(call("__range", vec![a, b]))
  }

  // parse int S -> __parse_int(S); parse float S -> __parse_float(S)
  fn phrase_parse(&mut self) -> ParseResult<Expr> {
    self.advance();
    if self.match_ident("int") {
      let s = self.arg()?;
      Ok(call("__parse_int", vec![s]))
    } else if self.match_ident("float") {
      let s = self.arg()?;
      Ok(call("__parse_float", vec![s]))
    } else {
      Err(self.error("expected 'int' or 'float' after 'parse'").with_hint("parse int S | parse float S"))
    }
  }

  // call NAME with a and b and c -> Call(Variable(NAME), [a, b, c])
  fn phrase_call_with(&mut self) -> ParseResult<Expr> {
    self.advance();
    let name = self.expect(cb_core::tokens::TokenKind::Identifier, "expected function name")?.lexeme.clone();
    let mut args = Vec::new();
    if self.match_ident("with") {
      args.push(self.arg()?);
      while self.matches(cb_core::tokens::TokenKind::And) || self.matches(cb_core::tokens::TokenKind::Comma) {
        args.push(self.arg()?);
      }
    }
    Ok(Expr::Call { callee: Box::new(Expr::Variable(name)), args })
  }

  // Shared shapes ---------------------------------------------------------

  // KEYWORD X -> builtin(X)
  fn phrase_unary(&mut self, _keyword: &str, builtin: &str) -> ParseResult<Expr> {
    self.advance();
    let x = self.arg()?;
    Ok(call(builtin, vec![x]))
  }

  // KEYWORD A and B -> builtin(A, B)
  fn phrase_and_pair(&mut self, _keyword: &str, builtin: &str) -> ParseResult<Expr> {
    self.advance();
    let a = self.arg()?;
    self.expect_and("expected 'and'")?;
    let b = self.arg()?;
    Ok(call(builtin, vec![a, b]))
  }

  // KEYWORD A by B -> builtin(A, B)
  fn phrase_by_pair(&mut self, _keyword: &str, builtin: &str) -> ParseResult<Expr> {
    self.advance();
    let a = self.arg()?;
    self.expect_ident("by", "expected 'by'")?;
    let b = self.arg()?;
    Ok(call(builtin, vec![a, b]))
  }

  // KEYWORD A B -> builtin(A, B), no separator word
  fn phrase_adjacent_pair(&mut self, _keyword: &str, builtin: &str) -> ParseResult<Expr> {
    self.advance();
    let a = self.arg()?;
    let b = self.arg()?;
    Ok(call(builtin, vec![a, b]))
  }

  // readN P at K -> __loadN(P, K)
  fn phrase_mem_read(&mut self, _keyword: &str, builtin: &str) -> ParseResult<Expr> {
    self.advance();
    let p = self.arg()?;
    self.expect_ident("at", "expected 'at'")?;
    let k = self.arg()?;
    Ok(call(builtin, vec![p, k]))
  }

  // writeN V to P at K -> __storeN(V, P, K), matching OP_STOREn's operand
  // stack order (value, pointer, offset).
  fn phrase_mem_write(&mut self, _keyword: &str, builtin: &str) -> ParseResult<Expr> {
    self.advance();
    let v = self.arg()?;
    self.expect_ident("to", "expected 'to'")?;
    let p = self.arg()?;
    self.expect_ident("at", "expected 'at'")?;
    let k = self.arg()?;
    Ok(call(builtin, vec![v, p, k]))
  }
}
