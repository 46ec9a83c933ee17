//! Lifetime strategies for modules and the store that hands them out.

use crate::constructor::Constructor;
use crate::error::{Error, Result};
use crate::value::Value;
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// A lifetime strategy: decides whether a module's constructor runs on a
/// given request or a previously produced instance is handed back.
///
/// Every module owns its own factory instance, so any caching state a factory
/// keeps is per module.
pub trait Factory: Send + Sync {
  fn get_instance(&self, constructor: &Constructor, args: &[Value]) -> Result<Value>;
}

/// Stateless factories can be written as plain closures.
impl<F> Factory for F
where
  F: Fn(&Constructor, &[Value]) -> Result<Value> + Send + Sync,
{
  fn get_instance(&self, constructor: &Constructor, args: &[Value]) -> Result<Value> {
    self(constructor, args)
  }
}

/// Produces a fresh factory instance for each module registered under it.
pub type FactoryConstructor = Arc<dyn Fn() -> Result<Box<dyn Factory>> + Send + Sync>;

/// Constructs on the first request and returns that instance forever after.
/// Arguments passed on later requests are ignored.
#[derive(Default)]
pub struct SingletonFactory {
  instance: OnceCell<Value>,
}

impl SingletonFactory {
  pub const NAME: &'static str = "singleton";

  pub fn new() -> Self {
    Self::default()
  }
}

impl Factory for SingletonFactory {
  fn get_instance(&self, constructor: &Constructor, args: &[Value]) -> Result<Value> {
    self
      .instance
      .get_or_try_init(|| {
        tracing::debug!(constructor = constructor.name(), "constructing singleton instance");
        constructor.construct(args)
      })
      .cloned()
  }
}

/// Constructs a new instance on every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct TransientFactory;

impl TransientFactory {
  pub const NAME: &'static str = "transient";

  pub fn new() -> Self {
    TransientFactory
  }
}

impl Factory for TransientFactory {
  fn get_instance(&self, constructor: &Constructor, args: &[Value]) -> Result<Value> {
    tracing::trace!(constructor = constructor.name(), "constructing transient instance");
    constructor.construct(args)
  }
}

/// Normalizes a factory name to identifier-safe characters.
///
/// Characters outside `[A-Za-z0-9_]` become `_`, and a leading digit gets a
/// `_` prefix. Blank names are rejected.
pub fn sanitize_factory_name(name: &str) -> Result<String> {
  let trimmed = name.trim();
  if trimmed.is_empty() {
    return Err(Error::InvalidFactory {
      name: name.to_owned(),
      reason: "factory name must be a non-empty string".to_string(),
    });
  }

  let mut sanitized: String = trimmed
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
    .collect();
  if sanitized.starts_with(|c: char| c.is_ascii_digit()) {
    sanitized.insert(0, '_');
  }
  Ok(sanitized)
}

/// The name → factory-constructor map of one container.
#[derive(Default)]
pub struct FactoryStore {
  factories: IndexMap<String, FactoryConstructor>,
}

impl FactoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Stores the constructor without running it.
  pub fn add(&mut self, name: &str, constructor: FactoryConstructor) {
    if self.factories.insert(name.to_owned(), constructor).is_some() {
      tracing::debug!(factory = name, "overwriting factory");
    } else {
      tracing::debug!(factory = name, "adding factory");
    }
  }

  /// The named constructor, not yet run.
  pub fn get(&self, name: &str) -> Option<FactoryConstructor> {
    self.factories.get(name).cloned()
  }

  /// Runs the named constructor and returns the new factory instance.
  pub fn retrieve(&self, name: &str) -> Result<Box<dyn Factory>> {
    let constructor = self
      .get(name)
      .ok_or_else(|| Error::FactoryNotRegistered(name.to_owned()))?;
    instantiate(name, &constructor)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.factories.contains_key(name)
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.factories.keys().map(String::as_str)
  }
}

/// Runs a factory constructor, reporting its failure as [`Error::InvalidFactory`].
pub(crate) fn instantiate(
  name: &str,
  constructor: &FactoryConstructor,
) -> Result<Box<dyn Factory>> {
  constructor().map_err(|e| Error::InvalidFactory {
    name: name.to_owned(),
    reason: e.to_string(),
  })
}

impl fmt::Debug for FactoryStore {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.factories.keys()).finish()
  }
}
