//! The REPL loop (§6 "`prog` with no args ... else enter the REPL"): reads
//! statements line by line and runs each one through the same
//! compile-and-run path a file would, re-running the whole session history
//! each time so `let`/`make` bindings from earlier lines stay visible.
//!
//! Bare, as SPEC_FULL.md frames it: top-level expression echoing is the
//! compiler's own job (`cb-compiler/src/statements.rs` already emits
//! `OP_PRINT` for a bare top-level expression), not something this loop adds.
//! The one real cost of recompiling history from scratch is that a `print`
//! from an earlier line runs again on every later line — an accepted
//! limitation of treating the REPL as "one more whole program" rather than
//! teaching the compiler to link incremental chunks.

use std::io::{self, Write};

use cb_core::interfaces::SuggestionOracle;
use cb_preprocess::{Statement, OriginMap};

use crate::config::Config;
use crate::pipeline::compile_statements;

/// Mirrors the statement accumulator's own open/close counting (§4.3):
/// whole-word `do`/`end` plus raw braces, ignored inside quoted strings and
/// at non-zero paren/bracket depth. Kept local instead of calling into
/// `cb-preprocess` because the REPL needs a per-line delta, not a batch
/// grouping of a whole text blob.
fn balance_delta(line: &str) -> i32 {
  let mut delta = 0i32;
  let mut in_string = false;
  let mut depth = 0i32;
  let chars: Vec<char> = line.chars().collect();
  let mut i = 0;
  while i < chars.len() {
    let c = chars[i];
    if in_string {
      if c == '"' {
        in_string = false;
      }
      i += 1;
      continue;
    }
    match c {
      '"' => in_string = true,
      '(' | '[' => depth += 1,
      ')' | ']' => depth -= 1,
      '{' if depth == 0 => delta += 1,
      '}' if depth == 0 => delta -= 1,
      _ if depth == 0 && (c.is_alphabetic() || c == '_') => {
        let start = i;
        while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
          i += 1;
        }
        let word: String = chars[start..i].iter().collect();
        match word.as_str() {
          "do" => delta += 1,
          "end" => delta -= 1,
          _ => {}
        }
        continue;
      }
      _ => {}
    }
    i += 1;
  }
  delta
}

pub fn run(config: &Config, oracle: &dyn SuggestionOracle) {
  let stdin = io::stdin();
  let mut history: Vec<Statement> = Vec::new();
  let origin = OriginMap::default();

  loop {
    print!("cb> ");
    let _ = io::stdout().flush();

    let mut buffer = String::new();
    let mut pending = 0i32;
    let start_line = history.iter().map(|s| s.start_line).max().unwrap_or(0) + 1;

    loop {
      let mut line = String::new();
      if stdin.read_line(&mut line).unwrap_or(0) == 0 {
        if buffer.trim().is_empty() {
          println!();
          return;
        }
        break;
      }
      pending += balance_delta(&line);
      buffer.push_str(&line);
      if pending <= 0 {
        break;
      }
      print!("... ");
      let _ = io::stdout().flush();
    }

    if buffer.trim().is_empty() {
      continue;
    }

    history.push(Statement { text: buffer.trim_end().to_string(), start_line, start_col: 1 });

    match compile_statements(&history, &origin, "<repl>", config, oracle, false) {
      Ok(chunk) => {
        let mut vm = cb_vm::VM::new(&chunk).with_memdbg(config.memdbg);
        if let Err(err) = vm.run() {
          eprintln!("{}", err);
        }
      }
      Err(()) => {
        // Diagnostics already went to stderr; drop this statement so it
        // doesn't poison every future recompile.
        history.pop();
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::balance_delta;

  #[test]
  fn plain_line_is_balanced() {
    assert_eq!(balance_delta("let x be 10"), 0);
  }

  #[test]
  fn do_opens_and_end_closes() {
    assert_eq!(balance_delta("while x do"), 1);
    assert_eq!(balance_delta("end"), -1);
  }

  #[test]
  fn brace_opens_and_closes() {
    assert_eq!(balance_delta("function f() {"), 1);
    assert_eq!(balance_delta("}"), -1);
  }

  #[test]
  fn do_and_end_inside_a_string_are_ignored() {
    assert_eq!(balance_delta(r#"print "do this, then end""#), 0);
  }

  #[test]
  fn braces_inside_call_parens_do_not_affect_block_depth() {
    // A literal `{` passed as a call argument (e.g. a map literal) is not a
    // block opener; only brace-depth-zero braces count.
    assert_eq!(balance_delta("make m be foo({a: 1})"), 0);
  }

  #[test]
  fn word_containing_do_as_a_substring_is_not_counted() {
    assert_eq!(balance_delta("let doughnut be 1"), 0);
  }
}
