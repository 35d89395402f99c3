//! Wires `cb-preprocess` → `cb-lexer` → `cb-parser` → `cb-compiler` into the
//! single "compile one source file to a `Chunk`" path shared by plain
//! compilation, `--emit`, `--bundle-exe`, and the REPL.

use std::path::Path;

use cb_core::ast::Stmt;
use cb_core::chunk::Chunk;
use cb_core::errors::{report_errors, ErrorReport};
use cb_core::interfaces::SuggestionOracle;
use cb_lexer::Lexer;
use cb_parser::Parser;
use cb_preprocess::{accumulate, expand_includes, OriginMap, Statement};

use crate::config::Config;

/// Parses one accumulated statement's text into an AST node, the
/// lex-then-parse sequence every statement goes through regardless of where
/// its text came from.
fn parse_one(text: &str, source_name: &str) -> Result<Stmt, ErrorReport> {
  let tokens = Lexer::lex_all(text, source_name)?;
  Parser::parse_statement_text(&tokens, source_name)
}

/// Rewrites a lex/parse error's reported location from "line N of this
/// statement's own text" to "line N of the file it actually came from",
/// using the include expander's origin map (§4.2). Falls back to the
/// statement-relative location if the expanded line has no recorded origin.
fn remap_error(mut err: ErrorReport, stmt: &Statement, origin: &OriginMap) -> ErrorReport {
  let expanded_line = stmt.start_line + (err.line as usize).saturating_sub(1);
  if let Some((file, local_line)) = origin.origin_of(expanded_line.saturating_sub(1)) {
    err.source_name = file.to_string();
    err.line = local_line as u32;
  }
  err
}

/// Lexes and parses every accumulated statement, collecting diagnostics
/// rather than stopping at the first failure (§7: "remaining statements
/// continue to compile"). A statement whose parse fails is dropped unless
/// `config.autofix` is set and the oracle proposes a rewrite that itself
/// parses cleanly.
fn parse_program(
  statements: &[Statement],
  origin: &OriginMap,
  source_name: &str,
  config: &Config,
  oracle: &dyn SuggestionOracle,
) -> (Vec<(Stmt, usize, usize)>, bool) {
  let mut parsed = Vec::with_capacity(statements.len());
  let mut errors = Vec::new();

  for stmt in statements {
    match parse_one(&stmt.text, source_name) {
      Ok(ast) => parsed.push((ast, stmt.start_line, stmt.start_col)),
      Err(err) => {
        let mut recovered = false;
        if config.autofix {
          if let Some(suggestion) = oracle.suggest(&stmt.text) {
            if let Ok(ast) = parse_one(&suggestion.fixed, source_name) {
              log::info!("auto-fix applied: {}", suggestion.description);
              parsed.push((ast, stmt.start_line, stmt.start_col));
              recovered = true;
            }
          }
        }
        if !recovered {
          errors.push(remap_error(err, stmt, origin));
        }
      }
    }
  }

  let had_errors = !errors.is_empty();
  report_errors(&errors);
  (parsed, had_errors)
}

/// Compiles an already-accumulated batch of statements to a `Chunk`.
/// Shared by file compilation (one batch, real origin map) and the REPL
/// (the growing history of everything entered so far, no origin map).
pub fn compile_statements(
  statements: &[Statement],
  origin: &OriginMap,
  source_name: &str,
  config: &Config,
  oracle: &dyn SuggestionOracle,
  typecheck: bool,
) -> Result<Chunk, ()> {
  let (stmts, had_errors) = parse_program(statements, origin, source_name, config, oracle);

  if typecheck {
    let warnings = cb_compiler::typecheck::check_program(
      &stmts.iter().map(|(s, _, _)| s.clone()).collect::<Vec<_>>(),
      source_name,
    );
    report_errors(&warnings);
  }

  if had_errors {
    return Err(());
  }

  Ok(cb_compiler::Compiler::compile_program(&stmts, source_name))
}

/// Compiles one `.cb` source file to a `Chunk`. Returns `Err(())` once any
/// statement failed to parse and could not be recovered — the diagnostics
/// themselves are already on stderr by the time this returns.
pub fn compile_file(path: &Path, config: &Config, oracle: &dyn SuggestionOracle, typecheck: bool) -> Result<Chunk, ()> {
  let source_name = path.to_string_lossy().to_string();
  let (expanded, origin) = expand_includes(path);
  let statements = accumulate(&expanded);
  compile_statements(&statements, &origin, &source_name, config, oracle, typecheck)
}

#[cfg(test)]
mod tests {
  use cb_core::interfaces::{Suggestion, SuggestionOracle};
  use cb_preprocess::{OriginMap, Statement};

  use super::compile_statements;
  use crate::config::Config;

  struct NoSuggestions;
  impl SuggestionOracle for NoSuggestions {
    fn suggest(&self, _statement_text: &str) -> Option<Suggestion> {
      None
    }
  }

  /// Always proposes the same fixed rewrite, regardless of input — enough to
  /// exercise the recovery path without a real suggestion engine.
  struct AlwaysFixesTo(&'static str);
  impl SuggestionOracle for AlwaysFixesTo {
    fn suggest(&self, _statement_text: &str) -> Option<Suggestion> {
      Some(Suggestion { description: "test fixup".into(), fixed: self.0.to_string() })
    }
  }

  fn stmt(text: &str) -> Statement {
    Statement { text: text.to_string(), start_line: 1, start_col: 1 }
  }

  fn config_with_autofix(autofix: bool) -> Config {
    Config { autofix, memdbg: false, dll_path: Vec::new() }
  }

  #[test]
  fn a_well_formed_program_compiles_to_a_chunk() {
    let statements = vec![stmt("let x be 10"), stmt("print x")];
    let origin = OriginMap::default();
    let config = config_with_autofix(false);
    let chunk = compile_statements(&statements, &origin, "<test>", &config, &NoSuggestions, false).expect("should compile");
    assert!(!chunk.code.is_empty());
  }

  #[test]
  fn an_unparsable_statement_fails_without_autofix() {
    let statements = vec![stmt("let x be")];
    let origin = OriginMap::default();
    let config = config_with_autofix(false);
    assert!(compile_statements(&statements, &origin, "<test>", &config, &NoSuggestions, false).is_err());
  }

  #[test]
  fn autofix_recovers_when_the_oracles_rewrite_parses() {
    let statements = vec![stmt("let x be")];
    let origin = OriginMap::default();
    let config = config_with_autofix(true);
    let oracle = AlwaysFixesTo("let x be 0");
    assert!(compile_statements(&statements, &origin, "<test>", &config, &oracle, false).is_ok());
  }

  #[test]
  fn autofix_still_fails_when_the_rewrite_itself_does_not_parse() {
    let statements = vec![stmt("let x be")];
    let origin = OriginMap::default();
    let config = config_with_autofix(true);
    let oracle = AlwaysFixesTo("still not valid (((");
    assert!(compile_statements(&statements, &origin, "<test>", &config, &oracle, false).is_err());
  }

  #[test]
  fn one_bad_statement_does_not_stop_the_others_from_being_reported() {
    // Both statements fail to parse; compile_statements should still return
    // Err (not panic) after collecting diagnostics for each.
    let statements = vec![stmt("let x be"), stmt("let y be")];
    let origin = OriginMap::default();
    let config = config_with_autofix(false);
    assert!(compile_statements(&statements, &origin, "<test>", &config, &NoSuggestions, false).is_err());
  }
}
