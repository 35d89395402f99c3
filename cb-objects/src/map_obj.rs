use hashbrown::HashMap;

use crate::Value;

/// A CatLang map. Keys must be strings (§4.7 "Containers"); a non-string key
/// reaching `__map_get`/`__map_set` is the VM's problem, not this type's —
/// `MapObj` only ever stores `String` keys.
#[derive(Debug, Default)]
pub struct MapObj(pub HashMap<String, Value>);

impl MapObj {
  pub fn new() -> Self {
    MapObj(HashMap::new())
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// `OP_MAP_GET`: nil on a missing key.
  pub fn get(&self, key: &str) -> Option<Value> {
    self.0.get(key).cloned()
  }

  pub fn set(&mut self, key: String, value: Value) {
    self.0.insert(key, value);
  }

  /// `OP_MAP_HAS`.
  pub fn has(&self, key: &str) -> bool {
    self.0.contains_key(key)
  }

  /// `OP_MAP_DEL`.
  pub fn delete(&mut self, key: &str) -> bool {
    self.0.remove(key).is_some()
  }

  pub fn clear(&mut self) {
    self.0.clear();
  }

  pub fn keys(&self) -> Vec<String> {
    self.0.keys().cloned().collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn get_on_missing_key_is_none() {
    let m = MapObj::new();
    assert_eq!(m.get("missing"), None);
  }

  #[test]
  fn set_then_has_then_delete_round_trips() {
    let mut m = MapObj::new();
    m.set("k".into(), Value::Number(1.0));
    assert!(m.has("k"));
    assert_eq!(m.get("k"), Some(Value::Number(1.0)));
    assert!(m.delete("k"));
    assert!(!m.has("k"));
  }
}
