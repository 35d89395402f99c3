use std::fmt;

/// The closed set of diagnostic categories produced anywhere in the
/// pipeline (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  LexError,
  ParseError,
  TypeError,
  IoError,
  RuntimeError,
  UserPanic,
  AssertionFailure,
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ErrorKind::LexError => "Lex error",
      ErrorKind::ParseError => "Parse error",
      ErrorKind::TypeError => "Type error",
      ErrorKind::IoError => "IO error",
      ErrorKind::RuntimeError => "Runtime error",
      ErrorKind::UserPanic => "Panic",
      ErrorKind::AssertionFailure => "Assertion failed",
    };
    write!(f, "{}", name)
  }
}

/// A single diagnostic, carrying enough to reproduce the exact message
/// format §4.7 mandates for runtime errors and the line/col/near-lexeme
/// shape §4.4 mandates for parse errors.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
  pub kind: ErrorKind,
  pub source_name: String,
  pub line: u32,
  pub col: u32,
  pub message: String,
  /// Present for parse errors: the lexeme the parser was looking at.
  pub near: Option<String>,
  /// A short static hint from the catalogue in §4.4 (e.g. "missing ')'").
  pub hint: Option<String>,
}

impl ErrorReport {
  pub fn new(kind: ErrorKind, source_name: impl Into<String>, line: u32, col: u32, message: impl Into<String>) -> Self {
    ErrorReport {
      kind,
      source_name: source_name.into(),
      line,
      col,
      message: message.into(),
      near: None,
      hint: None,
    }
  }

  pub fn with_near(mut self, near: impl Into<String>) -> Self {
    self.near = Some(near.into());
    self
  }

  pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
    self.hint = Some(hint.into());
    self
  }
}

impl fmt::Display for ErrorReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} in {}: line {}, col {}: {}", self.kind, self.source_name, self.line, self.col, self.message)?;
    if let Some(near) = &self.near {
      write!(f, " (near '{}')", near)?;
    }
    if let Some(hint) = &self.hint {
      write!(f, " — {}", hint)?;
    }
    Ok(())
  }
}

/// Emits a batch of diagnostics to stderr, one per line, in the order they
/// were produced. Non-fatal front-end errors (lex/parse) are reported this
/// way and compilation continues for the remaining statements (§7).
pub fn report_errors(errors: &[ErrorReport]) {
  for err in errors {
    eprintln!("{}", err);
  }
}
