//! Cloning and merging of dynamic values.

use crate::value::{Array, Object, Value};

/// Copies and merges [`Value`]s.
///
/// Objects and arrays are copied either one level deep (`deep == false`, the
/// copy shares nested handles with the original) or recursively. Dates are
/// copied by value. Functions and opaque host values are never copied, only
/// their handles are.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectModifier;

impl ObjectModifier {
  pub fn new() -> Self {
    ObjectModifier
  }

  pub fn clone_value(&self, value: &Value, deep: bool) -> Value {
    match value {
      Value::Object(obj) => Value::Object(self.clone_object(obj, deep)),
      Value::Array(arr) => Value::Array(self.clone_array(arr, deep)),
      Value::Date(date) => Value::Date(*date),
      other => other.clone(),
    }
  }

  /// Copies the own properties of `obj`. The prototype link is kept as-is.
  pub fn clone_object(&self, obj: &Object, deep: bool) -> Object {
    let copy = match obj.proto() {
      Some(proto) => Object::with_proto(proto.clone()),
      None => Object::new(),
    };
    for (key, value) in obj.entries() {
      let value = if deep { self.clone_value(&value, true) } else { value };
      copy.set(key, value);
    }
    copy
  }

  pub fn clone_array(&self, arr: &Array, deep: bool) -> Array {
    let items = arr
      .to_vec()
      .into_iter()
      .map(|item| if deep { self.clone_value(&item, true) } else { item })
      .collect();
    Array::from_vec(items)
  }

  /// Copies the own properties of `source` onto `target`, overwriting on key
  /// collision.
  ///
  /// With `deep`, a plain-object property is merged into a fresh copy of the
  /// plain object already under that key instead of replacing it. Neither
  /// `source` nor the replaced nested object is mutated.
  pub fn merge<'a>(&self, target: &'a Object, source: &Object, deep: bool) -> &'a Object {
    for (key, incoming) in source.entries() {
      let merged = match incoming {
        Value::Object(ref nested_src) if deep && nested_src.is_plain() => {
          let nested = Object::new();
          if let Some(Value::Object(existing)) = target.get_own(&key) {
            if existing.is_plain() {
              self.merge(&nested, &existing, true);
            }
          }
          self.merge(&nested, nested_src, true);
          Value::Object(nested)
        }
        other => other,
      };
      target.set(key, merged);
    }
    target
  }

  /// Merges each source onto `target` in order; later sources win.
  pub fn extend<'a>(&self, target: &'a Object, sources: &[Object], deep: bool) -> &'a Object {
    for source in sources {
      self.merge(target, source, deep);
    }
    target
  }
}
