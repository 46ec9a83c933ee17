//! Named registration slots and the register that owns them.

use crate::core::{RegistrationId, ResolutionGuard};
use crate::error::{Error, Result};
use crate::module::Module;
use crate::value::Value;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// What a registration slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationKind {
  /// A plain value or host reference, returned as stored.
  Value,
  /// A construction plan, resolved through its factory.
  Module,
}

/// The contents of a registration slot.
#[derive(Clone)]
pub enum Payload {
  Value(Value),
  Module(Arc<Module>),
}

impl Payload {
  pub fn kind(&self) -> RegistrationKind {
    match self {
      Payload::Value(_) => RegistrationKind::Value,
      Payload::Module(_) => RegistrationKind::Module,
    }
  }
}

/// A named, typed slot.
///
/// The kind is fixed when the slot is created. Re-registering the name with
/// a payload of the same kind swaps the payload in place, so modules that
/// captured this slot at their own registration observe the new payload.
pub struct Registration {
  id: RegistrationId,
  name: String,
  kind: RegistrationKind,
  payload: RwLock<Payload>,
}

impl Registration {
  fn new(name: &str, payload: Payload) -> Self {
    Self {
      id: RegistrationId::next(),
      name: name.to_owned(),
      kind: payload.kind(),
      payload: RwLock::new(payload),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn kind(&self) -> RegistrationKind {
    self.kind
  }

  /// Produces the live value of this slot.
  ///
  /// Values are returned as stored. Modules are asked for an instance, which
  /// resolves their own dependencies first.
  pub fn value(&self) -> Result<Value> {
    // Clone the payload out so no lock is held while user constructors run.
    let payload = self.payload.read().clone();
    match payload {
      Payload::Value(value) => Ok(value),
      Payload::Module(module) => {
        let _guard = ResolutionGuard::enter(self.id, &self.name)?;
        tracing::trace!(registration = %self.name, "instantiating module");
        module.get_instance()
      }
    }
  }

  fn replace(&self, payload: Payload) {
    *self.payload.write() = payload;
  }
}

impl fmt::Debug for Registration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Registration")
      .field("name", &self.name)
      .field("kind", &self.kind)
      .finish()
  }
}

/// The name → registration map of one container.
#[derive(Debug, Default)]
pub struct Register {
  registrations: IndexMap<String, Arc<Registration>>,
}

impl Register {
  pub fn new() -> Self {
    Self::default()
  }

  /// Stores `payload` under `name`, overwriting any existing registration.
  ///
  /// Same-kind overwrites update the existing slot in place. A kind change
  /// replaces the slot, so dependents bound to the old slot keep the old
  /// payload.
  pub fn add(&mut self, name: &str, payload: Payload) -> Result<Arc<Registration>> {
    if name.is_empty() {
      return Err(Error::InvalidRegistration(
        "registration name must not be empty".to_string(),
      ));
    }
    Ok(self.upsert(name, payload))
  }

  /// [`add`](Self::add) without name validation, for names known to be valid.
  pub(crate) fn upsert(&mut self, name: &str, payload: Payload) -> Arc<Registration> {
    if let Some(existing) = self.registrations.get(name) {
      if existing.kind() == payload.kind() {
        tracing::debug!(registration = name, kind = ?existing.kind(), "overwriting registration");
        existing.replace(payload);
        return Arc::clone(existing);
      }
      tracing::debug!(
        registration = name,
        from = ?existing.kind(),
        to = ?payload.kind(),
        "replacing registration with a different kind"
      );
    } else {
      tracing::debug!(registration = name, kind = ?payload.kind(), "adding registration");
    }

    let registration = Arc::new(Registration::new(name, payload));
    self
      .registrations
      .insert(name.to_owned(), Arc::clone(&registration));
    registration
  }

  /// Looks up every name, keeping order. Unknown names yield `None` and a
  /// warning instead of failing the batch.
  pub fn retrieve<S: AsRef<str>>(
    &self,
    names: &[S],
  ) -> Result<Vec<(String, Option<Arc<Registration>>)>> {
    names
      .iter()
      .map(|name| {
        let name = name.as_ref();
        if name.is_empty() {
          return Err(Error::InvalidArgument(
            "cannot retrieve an empty registration name".to_string(),
          ));
        }
        let registration = self.registrations.get(name).cloned();
        if registration.is_none() {
          tracing::warn!(
            registration = name,
            "failed to resolve registration, expect an undefined value in its place"
          );
        }
        Ok((name.to_owned(), registration))
      })
      .collect()
  }

  pub fn get(&self, name: &str) -> Option<&Arc<Registration>> {
    self.registrations.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.registrations.contains_key(name)
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.registrations.keys().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.registrations.len()
  }

  pub fn is_empty(&self) -> bool {
    self.registrations.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn same_kind_overwrite_keeps_the_slot() {
    let mut register = Register::new();
    let first = register.add("port", Payload::Value(Value::from(80))).unwrap();
    let second = register.add("port", Payload::Value(Value::from(8080))).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(register.len(), 1);
    assert_eq!(first.value().unwrap(), Value::from(8080));
  }

  #[test]
  fn empty_name_is_an_invalid_registration() {
    let mut register = Register::new();
    let result = register.add("", Payload::Value(Value::Null));
    assert!(matches!(result, Err(Error::InvalidRegistration(_))));
  }

  #[test]
  fn retrieve_leaves_holes_for_unknown_names() {
    let mut register = Register::new();
    register.add("a", Payload::Value(Value::from(1))).unwrap();

    let found = register.retrieve(&["a", "missing"]).unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].0, "a");
    assert!(found[0].1.is_some());
    assert_eq!(found[1].0, "missing");
    assert!(found[1].1.is_none());
  }

  #[test]
  fn retrieve_rejects_empty_names() {
    let register = Register::new();
    assert!(matches!(
      register.retrieve(&[""]),
      Err(Error::InvalidArgument(_))
    ));
  }
}
