//! Minimal/no-op implementations of the four out-of-scope interface traits
//! (§1, `cb-core::interfaces`). The CLI wires these in by default; nothing
//! here grows CLI ergonomics, it exists so the workspace is runnable without
//! a real auto-fix engine, FFI loader, bundler, or JIT.

use cb_core::chunk::Chunk;
use cb_core::interfaces::{Bundler, FfiArg, FfiResult, ForeignCallSink, NumericJit, Suggestion, SuggestionOracle};

/// Never proposes a fix. `CB_AUTOFIX` consulting this oracle is therefore a
/// no-op until a real suggestion engine is plugged in.
pub struct NoSuggestions;

impl SuggestionOracle for NoSuggestions {
  fn suggest(&self, _statement_text: &str) -> Option<Suggestion> {
    None
  }
}

/// No native libraries are loaded; every `OP_FFI_*` call returns 0 through
/// the VM's own "no sink registered" path unless this sink is asked
/// directly, in which case it logs and returns the same default.
pub struct NoForeignCalls;

impl ForeignCallSink for NoForeignCalls {
  fn call(&mut self, library: &str, function: &str, _signature: Option<&str>, _args: &[FfiArg]) -> FfiResult {
    log::warn!("FFI call to '{}' in '{}' ignored: no foreign call sink configured", function, library);
    FfiResult::Number(0.0)
  }
}

/// Appends the payload with no host-specific framing beyond what
/// `cb_bytecode_io::append_bundle` already does.
pub struct PlainBundler;

impl Bundler for PlainBundler {
  fn bundle(&self, host_exe: &[u8], payload: &[u8]) -> Vec<u8> {
    cb_bytecode_io::append_bundle(host_exe, payload)
  }
}

/// Never recognizes an expression as JIT-able; every chunk runs through the
/// stack VM.
pub struct NoJit;

impl NumericJit for NoJit {
  fn try_eval(&self, _chunk: &Chunk, _entry_offset: u32) -> Option<f64> {
    None
  }
}
