use cb_core::errors::{ErrorKind, ErrorReport};

/// A bounds-checked reading cursor over a byte slice. Every read that would
/// run past the end of `bytes` fails with an `IoError` rather than panicking
/// — a truncated or corrupt `.cat` file is a diagnosable user error, not a
/// crash.
pub(crate) struct Cursor<'a> {
  bytes: &'a [u8],
  pos: usize,
  source_name: &'a str,
}

impl<'a> Cursor<'a> {
  pub fn new(bytes: &'a [u8], source_name: &'a str) -> Self {
    Cursor { bytes, pos: 0, source_name }
  }

  pub(crate) fn err(&self, message: impl Into<String>) -> ErrorReport {
    ErrorReport::new(ErrorKind::IoError, self.source_name, 0, 0, message)
  }

  fn take(&mut self, n: usize) -> Result<&'a [u8], ErrorReport> {
    let end = self.pos.checked_add(n).filter(|&e| e <= self.bytes.len());
    match end {
      Some(end) => {
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
      }
      None => Err(self.err("unexpected end of bytecode file")),
    }
  }

  pub fn u8(&mut self) -> Result<u8, ErrorReport> {
    Ok(self.take(1)?[0])
  }

  pub fn u16(&mut self) -> Result<u16, ErrorReport> {
    Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()))
  }

  pub fn u32(&mut self) -> Result<u32, ErrorReport> {
    Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
  }

  pub fn u64(&mut self) -> Result<u64, ErrorReport> {
    Ok(u64::from_le_bytes(self.take(8)?.try_into().unwrap()))
  }

  pub fn f64(&mut self) -> Result<f64, ErrorReport> {
    Ok(f64::from_le_bytes(self.take(8)?.try_into().unwrap()))
  }

  pub fn bytes(&mut self, n: usize) -> Result<&'a [u8], ErrorReport> {
    self.take(n)
  }

  /// A `u32`-length-prefixed UTF-8 string.
  pub fn string(&mut self) -> Result<String, ErrorReport> {
    let len = self.u32()? as usize;
    let bytes = self.take(len)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| self.err("name or string constant is not valid UTF-8"))
  }
}
