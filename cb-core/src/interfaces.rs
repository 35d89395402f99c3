//! Interface-only collaborators. §1 lists program entry/argument parsing,
//! the REPL loop and file discovery, auto-fix suggestions, FFI marshalling,
//! self-host bundling and the numeric JIT as explicitly out of this core's
//! scope. Each gets a trait here so the in-scope crates (parser, VM,
//! serializer) can depend on the *shape* of the collaborator without owning
//! an implementation; the `cb` binary crate supplies minimal/no-op defaults.

use crate::chunk::Chunk;

/// Proposes an auto-fix for a statement that failed to parse (§7).
pub trait SuggestionOracle {
  /// Given the raw statement text, optionally return a rewritten statement
  /// and a human-readable description of the suggestion.
  fn suggest(&self, statement_text: &str) -> Option<Suggestion>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
  pub description: String,
  pub fixed: String,
}

/// Marshals VM stack arguments to/from a native library call (`OP_FFI_*`).
pub trait ForeignCallSink {
  /// Invoke `function` in `library` with the given arguments, returning a
  /// numeric result. `signature` is an optional calling-convention hint
  /// (used by `OP_FFI_CALL_SIG`); implementations without FFI support
  /// should never be asked to call this (the VM pushes 0 itself when no
  /// sink is registered).
  fn call(&mut self, library: &str, function: &str, signature: Option<&str>, args: &[FfiArg]) -> FfiResult;
}

#[derive(Debug, Clone, PartialEq)]
pub enum FfiArg {
  Number(f64),
  Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FfiResult {
  Number(f64),
  Str(String),
}

/// Appends a compiled chunk's payload to a host executable, producing a
/// self-contained bundle (§6 "bundle-exe").
pub trait Bundler {
  fn bundle(&self, host_exe: &[u8], payload: &[u8]) -> Vec<u8>;
}

/// Evaluates a trivial arithmetic subset of an expression natively,
/// bypassing the stack VM, and returns the result as a double. A `NumericJit`
/// implementation may refuse any expression it doesn't recognize.
pub trait NumericJit {
  fn try_eval(&self, chunk: &Chunk, entry_offset: u32) -> Option<f64>;
}
