//! The deterministic binary chunk format (§4.6, §6 "Bytecode file layout")
//! and the bundled-executable footer the `--bundle-exe` CLI flow appends.
//!
//! No serde/bincode here even though another repo in the example pack reaches
//! for them: the wire layout is an authoritative, field-by-field byte
//! contract (exact tag bytes, exact field order, a magic number and a
//! forward-tolerant version), not a structure a derived serializer could be
//! trusted to reproduce byte-for-byte without fighting its defaults. Hand
//! framing with `to_le_bytes`/`from_le_bytes` is the teacher's own style for
//! anything binary-shaped (see e.g. `Lexer`'s byte-wise scanning) generalized
//! to writing instead of just reading.

mod cursor;

use cb_core::chunk::{Chunk, FunctionEntry};
use cb_core::errors::{ErrorKind, ErrorReport};
use cb_core::value::Value;

use cursor::Cursor;

pub const MAGIC: u32 = 0x4342_4243;
pub const VERSION: u16 = 1;
pub const BUNDLE_MAGIC: &[u8; 8] = b"CBPACK1\0";

pub type IoResult<T> = Result<T, ErrorReport>;

/// Serializes a chunk to the authoritative little-endian layout. `source_name`
/// is not part of the wire format (it's bookkeeping for diagnostics, not
/// persisted state), so it does not round-trip through `serialize`/
/// `deserialize` — a loader assigns it from the path it read.
pub fn serialize(chunk: &Chunk) -> Vec<u8> {
  let mut out = Vec::new();
  out.extend_from_slice(&MAGIC.to_le_bytes());
  out.extend_from_slice(&VERSION.to_le_bytes());

  out.extend_from_slice(&(chunk.constants.len() as u32).to_le_bytes());
  for c in &chunk.constants {
    write_constant(&mut out, c);
  }

  out.extend_from_slice(&(chunk.names.len() as u32).to_le_bytes());
  for name in &chunk.names {
    write_string(&mut out, name);
  }

  out.extend_from_slice(&(chunk.functions.len() as u32).to_le_bytes());
  for f in &chunk.functions {
    out.extend_from_slice(&f.name_index.to_le_bytes());
    out.extend_from_slice(&f.arity.to_le_bytes());
    out.extend_from_slice(&f.entry_offset.to_le_bytes());
  }

  out.extend_from_slice(&(chunk.code.len() as u32).to_le_bytes());
  out.extend_from_slice(&chunk.code);

  out.extend_from_slice(&(chunk.debug_lines.len() as u32).to_le_bytes());
  for l in &chunk.debug_lines {
    out.extend_from_slice(&l.to_le_bytes());
  }

  out.extend_from_slice(&(chunk.debug_cols.len() as u32).to_le_bytes());
  for c in &chunk.debug_cols {
    out.extend_from_slice(&c.to_le_bytes());
  }

  out
}

fn write_string(out: &mut Vec<u8>, s: &str) {
  out.extend_from_slice(&(s.len() as u32).to_le_bytes());
  out.extend_from_slice(s.as_bytes());
}

fn write_constant(out: &mut Vec<u8>, value: &Value) {
  match value {
    Value::Nil => out.push(0),
    Value::Number(n) => {
      out.push(1);
      out.extend_from_slice(&n.to_le_bytes());
    }
    Value::Str(s) => {
      out.push(2);
      write_string(out, s);
    }
    Value::Bool(b) => {
      out.push(3);
      out.push(if *b { 1 } else { 0 });
    }
  }
}

/// Deserializes a chunk from the authoritative layout. `source_name` becomes
/// the loaded chunk's `source_name` (e.g. the `.cat` path it came from); it
/// is not read from `bytes`. Unknown trailing bytes are ignored, and a
/// version newer than `VERSION` is accepted rather than rejected, matching
/// §6's "reader accepts higher" / "forward-tolerant" wording.
pub fn deserialize(bytes: &[u8], source_name: impl Into<String>) -> IoResult<Chunk> {
  let source_name = source_name.into();
  let mut cur = Cursor::new(bytes, &source_name);

  let magic = cur.u32()?;
  if magic != MAGIC {
    return Err(ErrorReport::new(
      ErrorKind::IoError,
      &source_name,
      0,
      0,
      format!("bad magic number: expected 0x{:08X}, found 0x{:08X}", MAGIC, magic),
    ));
  }
  let _version = cur.u16()?;

  let const_count = cur.u32()? as usize;
  let mut constants = Vec::with_capacity(const_count);
  for _ in 0..const_count {
    constants.push(read_constant(&mut cur)?);
  }

  let name_count = cur.u32()? as usize;
  let mut names = Vec::with_capacity(name_count);
  for _ in 0..name_count {
    names.push(cur.string()?);
  }

  let func_count = cur.u32()? as usize;
  let mut functions = Vec::with_capacity(func_count);
  for _ in 0..func_count {
    let name_index = cur.u16()?;
    let arity = cur.u16()?;
    let entry_offset = cur.u32()?;
    functions.push(FunctionEntry { name_index, arity, entry_offset });
  }

  let code_len = cur.u32()? as usize;
  let code = cur.bytes(code_len)?.to_vec();

  let debug_line_count = cur.u32()? as usize;
  let mut debug_lines = Vec::with_capacity(debug_line_count);
  for _ in 0..debug_line_count {
    debug_lines.push(cur.u32()?);
  }

  let debug_col_count = cur.u32()? as usize;
  let mut debug_cols = Vec::with_capacity(debug_col_count);
  for _ in 0..debug_col_count {
    debug_cols.push(cur.u32()?);
  }

  Ok(Chunk { constants, names, functions, code, debug_lines, debug_cols, source_name })
}

fn read_constant(cur: &mut Cursor<'_>) -> IoResult<Value> {
  match cur.u8()? {
    0 => Ok(Value::Nil),
    1 => Ok(Value::Number(cur.f64()?)),
    2 => Ok(Value::Str(cur.string()?)),
    3 => Ok(Value::Bool(cur.u8()? != 0)),
    tag => Err(cur.err(format!("unknown constant tag {}", tag))),
  }
}

/// Appends the bundler's footer: `{payload}{payloadSize u64 LE}{"CBPACK1\0"}`
/// after a copy of the host executable's bytes (§6 "Bundled executable
/// footer").
pub fn append_bundle(host_exe: &[u8], payload: &[u8]) -> Vec<u8> {
  let mut out = Vec::with_capacity(host_exe.len() + payload.len() + 16);
  out.extend_from_slice(host_exe);
  out.extend_from_slice(payload);
  out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
  out.extend_from_slice(BUNDLE_MAGIC);
  out
}

/// Looks for a trailing bundle footer in `exe_bytes` and, if present, returns
/// the embedded payload slice. Detection reads the last 16 bytes, checks the
/// 8-byte magic, then seeks back `payloadSize + 16` bytes to find where the
/// payload begins.
pub fn detect_bundle_payload(exe_bytes: &[u8]) -> Option<&[u8]> {
  if exe_bytes.len() < 16 {
    return None;
  }
  let magic = &exe_bytes[exe_bytes.len() - 8..];
  if magic != BUNDLE_MAGIC {
    return None;
  }
  let size_bytes: [u8; 8] = exe_bytes[exe_bytes.len() - 16..exe_bytes.len() - 8].try_into().unwrap();
  let payload_size = u64::from_le_bytes(size_bytes) as usize;
  let trailer_len = payload_size.checked_add(16)?;
  if exe_bytes.len() < trailer_len {
    return None;
  }
  let payload_start = exe_bytes.len() - trailer_len;
  Some(&exe_bytes[payload_start..payload_start + payload_size])
}

#[cfg(test)]
mod tests;
