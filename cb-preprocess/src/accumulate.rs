//! Groups physical lines of (already include-expanded) text into logical
//! statements by balancing `do`/`end` words and `{`/`}` braces (§4.3).

/// A logical statement: its accumulated text, and the starting physical
/// line/column (1-based) to report in diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
  pub text: String,
  pub start_line: usize,
  pub start_col: usize,
}

enum LineClass {
  Skip,
  Code,
}

/// Classifies one physical line, updating `in_block_comment` carried across
/// calls. Blank lines, `;`/`#`/`//` line comments and whole `/* ... */` block
/// comments (including the include expander's sentinel lines, which are
/// themselves single-line block comments) are filtered.
fn classify(line: &str, in_block_comment: &mut bool) -> LineClass {
  let trimmed = line.trim();

  if *in_block_comment {
    if line.contains("*/") {
      *in_block_comment = false;
    }
    return LineClass::Skip;
  }

  if trimmed.is_empty() {
    return LineClass::Skip;
  }

  if trimmed.starts_with(';') || trimmed.starts_with('#') || trimmed.starts_with("//") {
    return LineClass::Skip;
  }

  if trimmed.starts_with("/*") {
    if !trimmed.contains("*/") {
      *in_block_comment = true;
    }
    return LineClass::Skip;
  }

  LineClass::Code
}

/// Counts this line's contribution to the block-balance counter: `opens`
/// from the whole word "do" and raw `{`, `closes` from the whole word "end"
/// and raw `}`. Words are only counted outside quoted strings and at
/// balanced paren/bracket/brace depth zero, so `fn dodge(a, b) { ... }`
/// never mistakes "dodge" for "do".
fn count_balance(line: &str) -> (usize, usize) {
  let chars: Vec<char> = line.chars().collect();
  let mut opens = 0usize;
  let mut closes = 0usize;
  let mut in_string = false;
  let mut depth: i32 = 0;
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
      '"' => {
        in_string = true;
        i += 1;
        continue;
      }
      '(' | '[' => {
        depth += 1;
        i += 1;
        continue;
      }
      ')' | ']' => {
        depth -= 1;
        i += 1;
        continue;
      }
      '{' => {
        opens += 1;
        depth += 1;
        i += 1;
        continue;
      }
      '}' => {
        closes += 1;
        depth -= 1;
        i += 1;
        continue;
      }
      _ => {}
    }

    if depth == 0 && (c.is_alphabetic() || c == '_') {
      let start = i;
      while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
        i += 1;
      }
      let word: String = chars[start..i].iter().collect();
      match word.as_str() {
        "do" => opens += 1,
        "end" => closes += 1,
        _ => {}
      }
      continue;
    }

    i += 1;
  }

  (opens, closes)
}

/// Consumes `expanded_text` line by line and groups it into logical
/// statements, ready to be handed one-by-one to a fresh lexer/parser.
pub fn accumulate(expanded_text: &str) -> Vec<Statement> {
  let lines: Vec<&str> = expanded_text.lines().collect();
  let mut statements = Vec::new();
  let mut in_block_comment = false;
  let mut i = 0;

  while i < lines.len() {
    let line = lines[i];
    match classify(line, &mut in_block_comment) {
      LineClass::Skip => {
        i += 1;
      }
      LineClass::Code => {
        let start_line = i + 1;
        let leading_ws = line.len() - line.trim_start().len();
        let start_col = leading_ws + 1;

        let mut collected = vec![line.to_string()];
        let (mut opens, mut closes) = count_balance(line);
        i += 1;

        while opens > closes && i < lines.len() {
          let next = lines[i];
          let class = classify(next, &mut in_block_comment);
          i += 1;
          if let LineClass::Code = class {
            collected.push(next.to_string());
            let (o, c) = count_balance(next);
            opens += o;
            closes += c;
          }
        }

        statements.push(Statement { text: collected.join("\n"), start_line, start_col });
      }
    }
  }

  statements
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn single_line_statement_stands_alone() {
    let stmts = accumulate("print 1\nprint 2\n");
    assert_eq!(stmts.len(), 2);
    assert_eq!(stmts[0].text, "print 1");
    assert_eq!(stmts[1].start_line, 2);
  }

  #[test]
  fn english_do_end_block_is_one_statement() {
    let src = "while x do\n  set x to x - 1\nend\nprint x";
    let stmts = accumulate(src);
    assert_eq!(stmts.len(), 2);
    assert!(stmts[0].text.contains("while x do"));
    assert!(stmts[0].text.contains("end"));
  }

  #[test]
  fn brace_block_is_one_statement() {
    let src = "fn add(a, b) {\n  return a + b;\n}\nprint add(1, 2)";
    let stmts = accumulate(src);
    assert_eq!(stmts.len(), 2);
  }

  #[test]
  fn dodge_does_not_open_a_block() {
    let stmts = accumulate("let dodge be 1\nprint dodge");
    assert_eq!(stmts.len(), 2);
  }

  #[test]
  fn do_inside_string_is_not_counted() {
    let stmts = accumulate("print \"do this\"\nprint 2");
    assert_eq!(stmts.len(), 2);
  }

  #[test]
  fn blank_and_comment_lines_are_skipped() {
    let src = "\n; a comment\n# also a comment\n// and this\nprint 1";
    let stmts = accumulate(src);
    assert_eq!(stmts.len(), 1);
    assert_eq!(stmts[0].start_line, 5);
  }

  #[test]
  fn block_comment_spanning_lines_is_skipped() {
    let src = "/* start\nmore\nend */\nprint 1";
    let stmts = accumulate(src);
    assert_eq!(stmts.len(), 1);
    assert_eq!(stmts[0].start_line, 4);
  }

  #[test]
  fn starting_column_accounts_for_leading_whitespace() {
    let stmts = accumulate("   print 1");
    assert_eq!(stmts[0].start_col, 4);
  }

  #[test]
  fn double_do_is_tolerated_as_an_explicit_block() {
    let src = "while x do do\n  print x\nend\nend";
    let stmts = accumulate(src);
    assert_eq!(stmts.len(), 1);
  }
}
