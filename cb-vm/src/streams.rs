use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Read, Write};

use hashbrown::HashMap;

/// An open file, in one direction only: CatLang's `fopen` mode string picks
/// read or write up front, so a handle never needs to support both (§4.7
/// "Stream ops ... multiplex through a small handle table").
enum OpenFile {
  Reader(BufReader<std::fs::File>),
  Writer(std::fs::File),
}

/// Handles 0/1/2 are stdin/stdout/stderr and are never stored here — they're
/// borrowed from the process fresh on every call and can't be closed.
pub(crate) struct StreamTable {
  files: HashMap<u32, OpenFile>,
  next_handle: u32,
}

impl StreamTable {
  pub fn new() -> Self {
    StreamTable { files: HashMap::new(), next_handle: 3 }
  }

  pub fn fopen(&mut self, path: &str, mode: &str) -> Option<u32> {
    let file = if mode.starts_with('r') {
      OpenOptions::new().read(true).open(path).ok().map(|f| OpenFile::Reader(BufReader::new(f)))
    } else if mode.starts_with('a') {
      OpenOptions::new().create(true).append(true).open(path).ok().map(OpenFile::Writer)
    } else {
      OpenOptions::new().create(true).write(true).truncate(true).open(path).ok().map(OpenFile::Writer)
    }?;
    let handle = self.next_handle;
    self.next_handle += 1;
    self.files.insert(handle, file);
    Some(handle)
  }

  pub fn fclose(&mut self, handle: u32) -> bool {
    self.files.remove(&handle).is_some()
  }

  /// Closes every still-open handle. Called on `OP_HALT`/`OP_EXIT` (§5:
  /// "`OP_HALT`/`OP_EXIT` close all open streams").
  pub fn close_all(&mut self) {
    self.files.clear();
  }

  pub fn fread(&mut self, handle: u32, n: usize) -> Option<String> {
    let mut buf = vec![0u8; n];
    let read = match self.files.get_mut(&handle)? {
      OpenFile::Reader(r) => r.read(&mut buf).ok()?,
      OpenFile::Writer(_) => return None,
    };
    buf.truncate(read);
    Some(String::from_utf8_lossy(&buf).into_owned())
  }

  pub fn freadline(&mut self, handle: u32) -> Option<String> {
    if handle == 0 {
      let mut line = String::new();
      return (std::io::stdin().read_line(&mut line).ok()? > 0).then(|| trim_newline(line));
    }
    match self.files.get_mut(&handle)? {
      OpenFile::Reader(r) => {
        let mut line = String::new();
        let read = r.read_line(&mut line).ok()?;
        (read > 0).then(|| trim_newline(line))
      }
      OpenFile::Writer(_) => None,
    }
  }

  pub fn fwrite(&mut self, handle: u32, data: &str) -> bool {
    match handle {
      1 => std::io::stdout().write_all(data.as_bytes()).is_ok(),
      2 => std::io::stderr().write_all(data.as_bytes()).is_ok(),
      0 => false,
      _ => match self.files.get_mut(&handle) {
        Some(OpenFile::Writer(w)) => w.write_all(data.as_bytes()).is_ok(),
        _ => false,
      },
    }
  }
}

fn trim_newline(mut s: String) -> String {
  if s.ends_with('\n') {
    s.pop();
    if s.ends_with('\r') {
      s.pop();
    }
  }
  s
}

impl Default for StreamTable {
  fn default() -> Self {
    StreamTable::new()
  }
}
