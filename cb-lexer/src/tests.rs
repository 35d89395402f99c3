use super::*;
use cb_core::tokens::TokenKind as K;

fn lex(src: &str) -> Vec<Token> {
  Lexer::lex_all(src, "<test>").expect("lex should succeed")
}

#[test]
fn scans_arithmetic_with_precedence_tokens() {
  let toks = lex("(2+3)*4");
  let kinds: Vec<K> = toks.iter().map(|t| t.kind).collect();
  assert_eq!(
    kinds,
    vec![K::LeftParen, K::Number, K::Plus, K::Number, K::RightParen, K::Star, K::Number, K::Eof]
  );
}

#[test]
fn arrow_is_merged_from_minus_greater() {
  let toks = lex("->");
  assert_eq!(toks[0].kind, K::Arrow);
}

#[test]
fn bare_pipe_is_fatal_with_hint() {
  let err = Lexer::lex_all("a | b", "<test>").unwrap_err();
  assert!(err.hint.as_deref() == Some("did you mean ||?"));
}

#[test]
fn double_pipe_is_logical_or() {
  let toks = lex("a || b");
  assert_eq!(toks[1].kind, K::Or);
}

#[test]
fn line_comment_is_skipped() {
  let toks = lex("1 // comment\n2");
  assert_eq!(toks[0].number(), Some(1.0));
  assert_eq!(toks[1].number(), Some(2.0));
}

#[test]
fn block_comment_updates_line_counter() {
  let toks = lex("1 /* line1\nline2 */ 2");
  assert_eq!(toks[1].line, 2);
}

#[test]
fn unterminated_block_comment_is_fatal() {
  assert!(Lexer::lex_all("/* oops", "<test>").is_err());
}

#[test]
fn semicolon_at_column_one_is_a_line_comment() {
  let toks = lex(";entire line ignored\n42");
  assert_eq!(toks[0].number(), Some(42.0));
}

#[test]
fn semicolon_elsewhere_is_a_token() {
  let toks = lex("a; b");
  assert_eq!(toks[1].kind, K::Semicolon);
}

#[test]
fn hash_at_column_one_is_a_line_comment() {
  let toks = lex("# comment\n7");
  assert_eq!(toks[0].number(), Some(7.0));
}

#[test]
fn dot_is_silently_ignored() {
  let toks = lex("print x.");
  assert_eq!(toks.last().unwrap().kind, K::Eof);
}

#[test]
fn hex_literal_parses_as_unsigned_f64() {
  let toks = lex("0x11223344");
  assert_eq!(toks[0].number(), Some(0x1122_3344u32 as f64));
}

#[test]
fn out_of_range_hex_is_fatal() {
  assert!(Lexer::lex_all("0xFFFFFFFFFFFFFFFFFFFFFFFF", "<test>").is_err());
}

#[test]
fn string_literal_allows_embedded_newline() {
  let toks = lex("\"hello\nworld\"");
  assert_eq!(toks[0].string(), Some("hello\nworld"));
}

#[test]
fn unterminated_string_is_fatal() {
  assert!(Lexer::lex_all("\"oops", "<test>").is_err());
}

#[test]
fn and_or_identifiers_are_reclassified() {
  let toks = lex("and or andy");
  assert_eq!(toks[0].kind, K::And);
  assert_eq!(toks[1].kind, K::Or);
  assert_eq!(toks[2].kind, K::Identifier);
}

#[test]
fn unknown_byte_reports_line_and_column() {
  let err = Lexer::lex_all("x = @", "<test>").unwrap_err();
  assert_eq!(err.line, 1);
  assert_eq!(err.col, 5);
}

#[test]
fn fractional_number_requires_digit_after_dot() {
  let toks = lex("3.5");
  assert_eq!(toks[0].number(), Some(3.5));
}
