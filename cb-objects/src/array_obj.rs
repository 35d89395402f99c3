use crate::Value;

/// A CatLang array, always accessed through a shared `Rc<RefCell<_>>` so that
/// every holder of a copy of the containing `Value::Array` sees the same
/// mutations (§3 "Array and map are owned by reference counts").
#[derive(Debug, Default)]
pub struct ArrayObj(pub Vec<Value>);

impl ArrayObj {
  pub fn new() -> Self {
    ArrayObj(Vec::new())
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn push(&mut self, value: Value) {
    self.0.push(value);
  }

  /// `OP_INDEX_GET` semantics: an out-of-range or non-integer index reads as
  /// nil rather than erroring.
  pub fn get(&self, index: f64) -> Option<Value> {
    to_index(index, self.0.len()).map(|i| self.0[i].clone())
  }

  /// `OP_INDEX_SET` semantics: an out-of-range write is silently dropped.
  pub fn set(&mut self, index: f64, value: Value) {
    if let Some(i) = to_index(index, self.0.len()) {
      self.0[i] = value;
    }
  }

  /// `OP_ARRAY_POP`: removes and returns the last element, or `None` on an
  /// empty array.
  pub fn pop(&mut self) -> Option<Value> {
    self.0.pop()
  }

  pub fn reserve(&mut self, additional: usize) {
    self.0.reserve(additional);
  }

  pub fn clear(&mut self) {
    self.0.clear();
  }
}

fn to_index(index: f64, len: usize) -> Option<usize> {
  if index.fract() != 0.0 || !index.is_finite() {
    return None;
  }
  let i = index as i64;
  if i < 0 || i as usize >= len {
    None
  } else {
    Some(i as usize)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn out_of_range_get_is_none_and_in_range_roundtrips() {
    let mut a = ArrayObj::new();
    a.push(Value::Number(1.0));
    a.push(Value::Number(2.0));
    assert_eq!(a.get(1.0), Some(Value::Number(2.0)));
    assert_eq!(a.get(5.0), None);
    assert_eq!(a.get(-1.0), None);
  }

  #[test]
  fn out_of_range_set_is_a_no_op() {
    let mut a = ArrayObj::new();
    a.push(Value::Number(1.0));
    a.set(9.0, Value::Number(9.0));
    assert_eq!(a.len(), 1);
  }
}
