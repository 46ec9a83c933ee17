//! Modules: deferred construction plans bound to a factory.

use crate::constructor::Constructor;
use crate::error::{Error, Result};
use crate::factory::Factory;
use crate::registration::Registration;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// One element of a module's constructor spec.
#[derive(Debug, Clone)]
pub enum SpecItem {
  /// The name of a registration to pass as the next positional argument.
  Dependency(String),
  /// The constructor. Only valid as the final element.
  Constructor(Constructor),
}

impl From<&str> for SpecItem {
  fn from(name: &str) -> Self {
    SpecItem::Dependency(name.to_owned())
  }
}

impl From<String> for SpecItem {
  fn from(name: String) -> Self {
    SpecItem::Dependency(name)
  }
}

impl From<Constructor> for SpecItem {
  fn from(constructor: Constructor) -> Self {
    SpecItem::Constructor(constructor)
  }
}

/// Describes a module registration: dependency names followed by the
/// constructor, plus the names of prototypes to compose onto it.
///
/// ```
/// use fibre_plug::{Constructor, ModuleSpec};
///
/// let spec = ModuleSpec::new()
///   .dependency("connectionsService")
///   .constructor(Constructor::new("SmartWatch", |_, _| Ok(())))
///   .prototypes(["watch", "smartDevice"]);
/// # let _ = spec;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModuleSpec {
  items: Vec<SpecItem>,
  prototypes: Vec<String>,
  deep_merge: Option<bool>,
}

impl ModuleSpec {
  pub fn new() -> Self {
    Self::default()
  }

  /// A spec with no dependencies.
  pub fn of(constructor: Constructor) -> Self {
    Self::new().constructor(constructor)
  }

  pub fn dependency(mut self, name: impl Into<String>) -> Self {
    self.items.push(SpecItem::Dependency(name.into()));
    self
  }

  pub fn dependencies<I, S>(mut self, names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self
      .items
      .extend(names.into_iter().map(|n| SpecItem::Dependency(n.into())));
    self
  }

  pub fn constructor(mut self, constructor: Constructor) -> Self {
    self.items.push(SpecItem::Constructor(constructor));
    self
  }

  pub fn item(mut self, item: impl Into<SpecItem>) -> Self {
    self.items.push(item.into());
    self
  }

  /// Prototype names to merge onto the constructor, in order. Later names
  /// win on key collision; the constructor's own members win over all.
  pub fn prototypes<I, S>(mut self, names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.prototypes.extend(names.into_iter().map(Into::into));
    self
  }

  /// Overrides the container's default merge depth for composition.
  pub fn deep_merge(mut self, deep: bool) -> Self {
    self.deep_merge = Some(deep);
    self
  }

  /// Splits the spec into its validated parts.
  pub(crate) fn into_parts(mut self, module: &str) -> Result<SpecParts> {
    let constructor = match self.items.pop() {
      Some(SpecItem::Constructor(constructor)) => constructor,
      Some(SpecItem::Dependency(_)) | None => {
        return Err(Error::MissingConstructor {
          module: module.to_owned(),
        })
      }
    };

    let dependencies = self
      .items
      .into_iter()
      .map(|item| match item {
        SpecItem::Dependency(name) => Ok(name),
        SpecItem::Constructor(c) => Err(Error::InvalidArgument(format!(
          "module '{module}': constructor '{}' must be the last element of its spec",
          c.name()
        ))),
      })
      .collect::<Result<Vec<_>>>()?;

    Ok(SpecParts {
      dependencies,
      constructor,
      prototypes: self.prototypes,
      deep_merge: self.deep_merge,
    })
  }
}

impl From<Vec<SpecItem>> for ModuleSpec {
  fn from(items: Vec<SpecItem>) -> Self {
    Self {
      items,
      ..Self::default()
    }
  }
}

impl From<Constructor> for ModuleSpec {
  fn from(constructor: Constructor) -> Self {
    Self::of(constructor)
  }
}

pub(crate) struct SpecParts {
  pub(crate) dependencies: Vec<String>,
  pub(crate) constructor: Constructor,
  pub(crate) prototypes: Vec<String>,
  pub(crate) deep_merge: Option<bool>,
}

/// A factory, a constructor and the registration slots of its dependencies.
///
/// Dependencies are bound when the module is registered. A name that was not
/// registered at that point stays a hole and is passed as
/// [`Value::Undefined`], even if it is registered later.
pub struct Module {
  factory_name: String,
  factory: Box<dyn Factory>,
  constructor: Constructor,
  dependencies: Vec<(String, Option<Arc<Registration>>)>,
}

impl Module {
  pub(crate) fn new(
    factory_name: &str,
    factory: Box<dyn Factory>,
    constructor: Constructor,
    dependencies: Vec<(String, Option<Arc<Registration>>)>,
  ) -> Self {
    Self {
      factory_name: factory_name.to_owned(),
      factory,
      constructor,
      dependencies,
    }
  }

  /// Resolves the dependencies to positional arguments and lets the factory
  /// decide whether to construct.
  pub fn get_instance(&self) -> Result<Value> {
    let args = self
      .dependencies
      .iter()
      .map(|(_, registration)| match registration {
        Some(registration) => registration.value(),
        None => Ok(Value::Undefined),
      })
      .collect::<Result<Vec<_>>>()?;

    self.factory.get_instance(&self.constructor, &args)
  }

  pub fn factory_name(&self) -> &str {
    &self.factory_name
  }

  pub fn constructor(&self) -> &Constructor {
    &self.constructor
  }

  pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
    self.dependencies.iter().map(|(name, _)| name.as_str())
  }
}

impl fmt::Debug for Module {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Module")
      .field("factory", &self.factory_name)
      .field("constructor", &self.constructor.name())
      .field("dependencies", &self.dependency_names().collect::<Vec<_>>())
      .finish()
  }
}
