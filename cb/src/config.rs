//! Reads the three environment variables §6 names, once, at startup.

/// Plain struct passed down explicitly, the teacher's own style — no global
/// config singleton.
pub struct Config {
  /// `CB_AUTOFIX`: 1/unset consults the `SuggestionOracle` on a parse
  /// failure; 0 never does.
  pub autofix: bool,
  /// `CB_MEMDBG`: set enables the VM's container-create counter, logged on
  /// halt/exit.
  pub memdbg: bool,
  /// `CB_DLL_PATH`: directories searched for native libraries by the FFI
  /// collaborator. Stored for the `ForeignCallSink` to consult; the default
  /// no-op sink never reads it.
  pub dll_path: Vec<String>,
}

impl Config {
  pub fn from_env() -> Self {
    let autofix = match std::env::var("CB_AUTOFIX") {
      Ok(v) => v != "0",
      Err(_) => true,
    };
    let memdbg = std::env::var("CB_MEMDBG").is_ok();
    let dll_path = std::env::var("CB_DLL_PATH")
      .map(|v| v.split(':').filter(|s| !s.is_empty()).map(String::from).collect())
      .unwrap_or_default();
    Config { autofix, memdbg, dll_path }
  }
}
