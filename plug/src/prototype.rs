//! Named capability objects and their composition onto constructors.

use crate::constructor::Constructor;
use crate::error::{Error, Result};
use crate::modifier::ObjectModifier;
use crate::value::Object;
use indexmap::IndexMap;

/// The name → capability-object map of one container.
#[derive(Debug, Default)]
pub struct PrototypeStore {
  prototypes: IndexMap<String, Object>,
}

impl PrototypeStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, name: &str, capabilities: Object) {
    if self.prototypes.insert(name.to_owned(), capabilities).is_some() {
      tracing::debug!(prototype = name, "overwriting prototype");
    } else {
      tracing::debug!(prototype = name, "adding prototype");
    }
  }

  /// Looks up every name in order. Fails on the first unknown name.
  pub fn retrieve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Object>> {
    names
      .iter()
      .map(|name| {
        let name = name.as_ref();
        self
          .prototypes
          .get(name)
          .cloned()
          .ok_or_else(|| Error::PrototypeNotFound(name.to_owned()))
      })
      .collect()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.prototypes.contains_key(name)
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.prototypes.keys().map(String::as_str)
  }
}

/// Builds a constructor whose method table is `prototypes` merged in order,
/// with the constructor's own prototype merged last.
///
/// Neither the capability objects nor the original constructor are touched.
pub fn compose(
  modifier: &ObjectModifier,
  constructor: &Constructor,
  prototypes: &[Object],
  deep: bool,
) -> Constructor {
  let table = Object::new();
  modifier.extend(&table, prototypes, deep);
  modifier.merge(&table, constructor.prototype(), deep);
  constructor.with_prototype(table)
}
