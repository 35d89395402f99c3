//! The thin CLI collaborator (§6): argument parsing, file discovery, the
//! REPL loop, and the no-op default implementations of the four interface
//! traits named in `cb-core::interfaces`. Intentionally minimal — this
//! binary exists so the workspace produces a runnable program, not as a
//! place to grow CLI ergonomics.

mod collaborators;
mod config;
mod disasm;
mod pipeline;
mod repl;

use std::path::{Path, PathBuf};

use cb_core::interfaces::{Bundler, SuggestionOracle};
use config::Config;

fn main() {
  // Non-halting VM diagnostics (division by zero, unresolved globals,
  // out-of-range access) and the one-time FFI warning go through
  // `log::warn!`; env_logger's own default filter is Error, which would
  // swallow them silently with RUST_LOG unset.
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
  let config = Config::from_env();
  let oracle = collaborators::NoSuggestions;
  let args: Vec<String> = std::env::args().skip(1).collect();
  std::process::exit(dispatch(&args, &config, &oracle));
}

fn dispatch(args: &[String], config: &Config, oracle: &dyn SuggestionOracle) -> i32 {
  match args {
    [] => run_bundle_or_repl(config),
    [flag, path] if flag == "--run" => run_file(Path::new(path), config),
    [flag, path] if flag == "--disassemble" => disassemble_file(Path::new(path), config, oracle),
    [flag, out, src] if flag == "--emit" => compile_to(Path::new(src), Some(Path::new(out)), config, oracle),
    [flag, src, out] if flag == "--bundle-exe" => bundle_exe(Path::new(src), Path::new(out), config, oracle),
    [path] if has_extension(path, "cat") => run_file(Path::new(path), config),
    [path] => compile_to(Path::new(path), None, config, oracle),
    _ => {
      eprintln!(
        "usage: cb <file.cb> | --emit <out.cat> <file.cb> | <file.cat> | --run <file.cat> | --bundle-exe <file> <out.exe> | --disassemble <file> | (no args)"
      );
      1
    }
  }
}

fn has_extension(path: &str, ext: &str) -> bool {
  Path::new(path).extension().and_then(|e| e.to_str()) == Some(ext)
}

/// `prog <file.cb>`: compile to `<file.cat>` next to the source, do not
/// execute. `--emit` gives an explicit output path.
fn compile_to(src: &Path, out: Option<&Path>, config: &Config, oracle: &dyn SuggestionOracle) -> i32 {
  let chunk = match pipeline::compile_file(src, config, oracle, true) {
    Ok(chunk) => chunk,
    Err(()) => return 1,
  };
  let out_path = out.map(PathBuf::from).unwrap_or_else(|| src.with_extension("cat"));
  let bytes = cb_bytecode_io::serialize(&chunk);
  match std::fs::write(&out_path, bytes) {
    Ok(()) => 0,
    Err(e) => {
      eprintln!("could not write '{}': {}", out_path.display(), e);
      1
    }
  }
}

/// `prog <file.cat>` / `prog --run <file.cat>`: load and execute a compiled
/// chunk.
fn run_file(path: &Path, config: &Config) -> i32 {
  let bytes = match std::fs::read(path) {
    Ok(b) => b,
    Err(e) => {
      eprintln!("could not read '{}': {}", path.display(), e);
      return 1;
    }
  };
  let chunk = match cb_bytecode_io::deserialize(&bytes, path.to_string_lossy()) {
    Ok(c) => c,
    Err(e) => {
      eprintln!("{}", e);
      return 1;
    }
  };
  run_chunk(&chunk, config)
}

fn run_chunk(chunk: &cb_core::chunk::Chunk, config: &Config) -> i32 {
  let mut ffi = collaborators::NoForeignCalls;
  let mut vm = cb_vm::VM::new(chunk).with_ffi(&mut ffi).with_memdbg(config.memdbg);
  match vm.run() {
    Ok(code) => code,
    Err(err) => {
      eprintln!("{}", err);
      1
    }
  }
}

/// `prog --bundle-exe <file.cb|.cat> <out.exe>`: copy the host executable
/// and append `{payload, size u64, magic "CBPACK1\0"}` (§6).
fn bundle_exe(src: &Path, out: &Path, config: &Config, oracle: &dyn SuggestionOracle) -> i32 {
  let payload = match load_payload(src, config, oracle) {
    Ok(p) => p,
    Err(code) => return code,
  };
  let host_exe = match std::env::current_exe().and_then(std::fs::read) {
    Ok(b) => b,
    Err(e) => {
      eprintln!("could not read the running executable: {}", e);
      return 1;
    }
  };
  let bundler = collaborators::PlainBundler;
  let bytes = bundler.bundle(&host_exe, &payload);
  if let Err(e) = std::fs::write(out, &bytes) {
    eprintln!("could not write '{}': {}", out.display(), e);
    return 1;
  }
  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    if let Ok(meta) = std::fs::metadata(out) {
      let mut perms = meta.permissions();
      perms.set_mode(perms.mode() | 0o111);
      let _ = std::fs::set_permissions(out, perms);
    }
  }
  0
}

/// `prog` with no args: run an embedded bundle if this executable carries
/// one, else fall into the REPL.
fn run_bundle_or_repl(config: &Config) -> i32 {
  if let Ok(exe_bytes) = std::env::current_exe().and_then(std::fs::read) {
    if let Some(payload) = cb_bytecode_io::detect_bundle_payload(&exe_bytes) {
      return match cb_bytecode_io::deserialize(payload, "<bundle>") {
        Ok(chunk) => run_chunk(&chunk, config),
        Err(e) => {
          eprintln!("{}", e);
          1
        }
      };
    }
  }
  let oracle = collaborators::NoSuggestions;
  repl::run(config, &oracle);
  0
}

fn disassemble_file(path: &Path, config: &Config, oracle: &dyn SuggestionOracle) -> i32 {
  let chunk = if has_extension(&path.to_string_lossy(), "cat") {
    match std::fs::read(path).map_err(|e| format!("could not read '{}': {}", path.display(), e)).and_then(|bytes| {
      cb_bytecode_io::deserialize(&bytes, path.to_string_lossy()).map_err(|e| e.to_string())
    }) {
      Ok(c) => c,
      Err(msg) => {
        eprintln!("{}", msg);
        return 1;
      }
    }
  } else {
    match pipeline::compile_file(path, config, oracle, true) {
      Ok(c) => c,
      Err(()) => return 1,
    }
  };
  print!("{}", disasm::disassemble(&chunk));
  0
}

/// Produces a compiled chunk's serialized bytes from either a `.cb` source
/// (compiled in memory) or an already-compiled `.cat` file, for
/// `--bundle-exe`'s payload.
fn load_payload(src: &Path, config: &Config, oracle: &dyn SuggestionOracle) -> Result<Vec<u8>, i32> {
  if has_extension(&src.to_string_lossy(), "cat") {
    std::fs::read(src).map_err(|e| {
      eprintln!("could not read '{}': {}", src.display(), e);
      1
    })
  } else {
    pipeline::compile_file(src, config, oracle, true).map(|chunk| cb_bytecode_io::serialize(&chunk)).map_err(|()| 1)
  }
}
