use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::array_obj::ArrayObj;
use crate::map_obj::MapObj;
use crate::pointer::Pointer;

/// The VM's runtime value (§3 "Value (runtime)"). Distinct from
/// `cb_core::value::Value`, which only ever appears in the constant pool —
/// this type additionally carries the three reference kinds that only exist
/// once a heap and container arena are live. Arrays and maps are shared
/// through `Rc<RefCell<_>>`, matching "owned by reference counts; no cycle
/// collection" literally: dropping the last `Rc` drops the container.
#[derive(Debug, Clone)]
pub enum Value {
  Nil,
  Number(f64),
  Bool(bool),
  Str(String),
  Array(Rc<RefCell<ArrayObj>>),
  Map(Rc<RefCell<MapObj>>),
  Pointer(Pointer),
}

impl Value {
  pub fn array(arr: ArrayObj) -> Self {
    Value::Array(Rc::new(RefCell::new(arr)))
  }

  pub fn map(map: MapObj) -> Self {
    Value::Map(Rc::new(RefCell::new(map)))
  }

  pub fn type_name(&self) -> &'static str {
    match self {
      Value::Nil => "nil",
      Value::Number(_) => "number",
      Value::Bool(_) => "bool",
      Value::Str(_) => "string",
      Value::Array(_) => "array",
      Value::Map(_) => "map",
      Value::Pointer(_) => "pointer",
    }
  }

  /// `nil` and `false` are falsy; every other value, including `0` and `""`,
  /// is truthy.
  pub fn is_truthy(&self) -> bool {
    !matches!(self, Value::Nil | Value::Bool(false))
  }

  pub fn as_number(&self) -> Option<f64> {
    match self {
      Value::Number(n) => Some(*n),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::Str(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_pointer(&self) -> Option<Pointer> {
    match self {
      Value::Pointer(p) => Some(*p),
      _ => None,
    }
  }

  pub fn as_array(&self) -> Option<&Rc<RefCell<ArrayObj>>> {
    match self {
      Value::Array(a) => Some(a),
      _ => None,
    }
  }

  pub fn as_map(&self) -> Option<&Rc<RefCell<MapObj>>> {
    match self {
      Value::Map(m) => Some(m),
      _ => None,
    }
  }
}

/// "equality is defined on nil, number, bool, and string only (reference
/// values compare not-equal unless the same referent)" — arrays and maps
/// compare by identity (`Rc::ptr_eq`), never by structural content; a
/// pointer is a plain value (not reference-counted) and compares by its two
/// fields, same as any other scalar.
impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Value::Nil, Value::Nil) => true,
      (Value::Number(a), Value::Number(b)) => a == b,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Str(a), Value::Str(b)) => a == b,
      (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
      (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
      (Value::Pointer(a), Value::Pointer(b)) => a == b,
      _ => false,
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Nil => write!(f, "nil"),
      Value::Number(n) => write!(f, "{}", n),
      Value::Bool(b) => write!(f, "{}", b),
      Value::Str(s) => write!(f, "{}", s),
      Value::Array(arr) => {
        write!(f, "[")?;
        let arr = arr.borrow();
        for (i, v) in arr.0.iter().enumerate() {
          if i > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{}", v)?;
        }
        write!(f, "]")
      }
      Value::Map(map) => {
        write!(f, "{{")?;
        let map = map.borrow();
        for (i, key) in map.keys().iter().enumerate() {
          if i > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{:?}: {}", key, map.get(key).unwrap_or(Value::Nil))?;
        }
        write!(f, "}}")
      }
      Value::Pointer(p) => write!(f, "<ptr block={} offset={}>", p.block_index, p.offset),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scalars_compare_structurally() {
    assert_eq!(Value::Number(1.0), Value::Number(1.0));
    assert_eq!(Value::Str("a".into()), Value::Str("a".into()));
    assert_ne!(Value::Nil, Value::Bool(false));
  }

  #[test]
  fn arrays_compare_by_identity_not_content() {
    let a = Value::array(ArrayObj::new());
    let b = Value::array(ArrayObj::new());
    assert_ne!(a, b);
    assert_eq!(a.clone(), a);
  }
}
