//! The main `Container` struct and its associated methods.

use crate::config::ContainerConfig;
use crate::error::{Error, Result};
use crate::factory::{sanitize_factory_name, Factory, FactoryConstructor, FactoryStore};
use crate::factory::{instantiate, SingletonFactory, TransientFactory};
use crate::modifier::ObjectModifier;
use crate::module::{Module, ModuleSpec};
use crate::prototype::{compose, PrototypeStore};
use crate::registration::{Payload, Register, Registration, RegistrationKind};
use crate::value::{Object, Value};
use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// One name or a list of names to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Names {
  One(String),
  Many(Vec<String>),
}

impl From<&str> for Names {
  fn from(name: &str) -> Self {
    Names::One(name.to_owned())
  }
}

impl From<String> for Names {
  fn from(name: String) -> Self {
    Names::One(name)
  }
}

impl From<&String> for Names {
  fn from(name: &String) -> Self {
    Names::One(name.clone())
  }
}

impl<S: Into<String>> From<Vec<S>> for Names {
  fn from(names: Vec<S>) -> Self {
    Names::Many(names.into_iter().map(Into::into).collect())
  }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Names {
  fn from(names: [S; N]) -> Self {
    Names::Many(names.into_iter().map(Into::into).collect())
  }
}

impl<S: AsRef<str>> From<&[S]> for Names {
  fn from(names: &[S]) -> Self {
    Names::Many(names.iter().map(|n| n.as_ref().to_owned()).collect())
  }
}

/// The result of [`Container::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
  /// A single requested name, unwrapped. `Value::Undefined` if it is unknown.
  One(Value),
  /// Several requested names keyed by name. Unknown names are left out.
  Many(IndexMap<String, Value>),
}

impl Resolved {
  pub fn one(self) -> Option<Value> {
    match self {
      Resolved::One(value) => Some(value),
      Resolved::Many(_) => None,
    }
  }

  pub fn many(self) -> Option<IndexMap<String, Value>> {
    match self {
      Resolved::Many(values) => Some(values),
      Resolved::One(_) => None,
    }
  }

  /// Flattens into a single value; several names become a plain object.
  pub fn into_value(self) -> Value {
    match self {
      Resolved::One(value) => value,
      Resolved::Many(values) => Value::Object(values.into_iter().collect()),
    }
  }
}

#[derive(Debug, Default)]
struct State {
  register: Register,
  factories: FactoryStore,
  prototypes: PrototypeStore,
}

/// The Inversion of Control (IoC) container.
///
/// Holds named registrations (plain values and modules), the factories that
/// decide module lifetimes, and the prototypes that can be composed onto
/// module constructors. All registries sit behind a single lock; the lock is
/// released before any constructor runs, so constructors may use the
/// container that is resolving them.
///
/// Registration methods return `&Self` so calls can be chained with `?`.
pub struct Container {
  state: Mutex<State>,
  modifier: ObjectModifier,
  deep_merge_prototypes: bool,
}

impl Default for Container {
  fn default() -> Self {
    Self::new()
  }
}

impl Container {
  /// Creates a container with the `singleton` and `transient` factories and
  /// the `window` and `document` host references installed.
  pub fn new() -> Self {
    Self::build(&ContainerConfig::default())
  }

  /// Creates a container with nothing installed.
  pub fn empty() -> Self {
    Self::build(&ContainerConfig::bare())
  }

  /// Creates a container from a configuration, registering its values.
  pub fn with_config(config: &ContainerConfig) -> Result<Self> {
    let container = Self::build(config);

    #[cfg(feature = "config")]
    {
      for (name, json) in &config.values {
        container.value(name, Value::from(json.clone()), true)?;
      }
      for (name, json) in &config.references {
        container.reference(name, Value::from(json.clone()))?;
      }
    }

    Ok(container)
  }

  fn build(config: &ContainerConfig) -> Self {
    let container = Self {
      state: Mutex::new(State::default()),
      modifier: ObjectModifier::new(),
      deep_merge_prototypes: config.deep_merge_prototypes,
    };

    {
      let mut state = container.state.lock();
      if config.default_factories {
        let singleton: FactoryConstructor =
          Arc::new(|| -> Result<Box<dyn Factory>> { Ok(Box::new(SingletonFactory::new())) });
        let transient: FactoryConstructor =
          Arc::new(|| -> Result<Box<dyn Factory>> { Ok(Box::new(TransientFactory::new())) });
        state.factories.add(SingletonFactory::NAME, singleton);
        state.factories.add(TransientFactory::NAME, transient);
      }
      if config.host_references {
        state.register.upsert("window", Payload::Value(host_window()));
        state.register.upsert("document", Payload::Value(host_document()));
      }
    }

    container
  }

  // --- Value Registration ---

  /// Registers `value` under `name` as-is. Objects and arrays stay shared
  /// with the caller.
  pub fn reference(&self, name: &str, value: impl Into<Value>) -> Result<&Self> {
    self
      .state
      .lock()
      .register
      .add(name, Payload::Value(value.into()))?;
    Ok(self)
  }

  /// Registers a copy of `value` under `name`. With `deep`, nested objects and
  /// arrays are copied too; otherwise only the top level is.
  pub fn value(&self, name: &str, value: impl Into<Value>, deep: bool) -> Result<&Self> {
    let copy = self.modifier.clone_value(&value.into(), deep);
    self.state.lock().register.add(name, Payload::Value(copy))?;
    Ok(self)
  }

  // --- Factory Registration ---

  /// Registers a factory under a sanitized `name` (see
  /// [`sanitize_factory_name`]). `constructor` runs once per module
  /// registered under the factory, so each module gets its own instance.
  /// It runs with the container unlocked and may resolve from it.
  pub fn factory<F, T>(&self, name: &str, constructor: F) -> Result<&Self>
  where
    F: Fn() -> Result<T> + Send + Sync + 'static,
    T: Factory + 'static,
  {
    let name = sanitize_factory_name(name)?;
    let constructor: FactoryConstructor =
      Arc::new(move || constructor().map(|factory| Box::new(factory) as Box<dyn Factory>));
    self.state.lock().factories.add(&name, constructor);
    Ok(self)
  }

  /// The registration verbs currently available, in installation order.
  pub fn factories(&self) -> Vec<String> {
    self.state.lock().factories.names().map(str::to_owned).collect()
  }

  /// Returns a registration verb bound to one factory.
  pub fn registrar(&self, factory_name: &str) -> Result<Registrar<'_>> {
    let factory = self.lookup_factory_name(factory_name)?;
    if !self.state.lock().factories.contains(&factory) {
      return Err(Error::FactoryNotRegistered(factory_name.to_owned()));
    }
    Ok(Registrar {
      container: self,
      factory,
    })
  }

  // --- Prototype Registration ---

  /// Registers a named capability object for composition. `capabilities`
  /// must be an object.
  pub fn from(&self, name: &str, capabilities: impl Into<Value>) -> Result<&Self> {
    if name.is_empty() {
      return Err(Error::InvalidPrototype {
        name: name.to_owned(),
        reason: "prototype name must be a non-empty string".to_string(),
      });
    }
    match capabilities.into() {
      Value::Object(object) => {
        self.state.lock().prototypes.add(name, object);
        Ok(self)
      }
      other => Err(Error::InvalidPrototype {
        name: name.to_owned(),
        reason: format!("expected an object, got {}", other.type_name()),
      }),
    }
  }

  /// Alias of [`from`](Self::from).
  pub fn prototype(&self, name: &str, capabilities: impl Into<Value>) -> Result<&Self> {
    self.from(name, capabilities)
  }

  // --- Module Registration ---

  /// Registers a module under the named factory.
  ///
  /// Dependency names are looked up now: names registered after this call
  /// are not seen by the module. Prototypes named in the `ModuleSpec` are composed
  /// onto the constructor before it is stored.
  pub fn register_module(
    &self,
    factory_name: &str,
    module_name: &str,
    spec: impl Into<ModuleSpec>,
  ) -> Result<&Self> {
    if module_name.is_empty() {
      return Err(Error::InvalidModuleRegistration(
        "module name must not be empty".to_string(),
      ));
    }
    let factory_name = self.lookup_factory_name(factory_name)?;
    let parts = spec.into().into_parts(module_name)?;

    let factory_constructor = self
      .state
      .lock()
      .factories
      .get(&factory_name)
      .ok_or_else(|| Error::FactoryNotRegistered(factory_name.clone()))?;
    // Unlocked: the constructor may read this container.
    let factory = instantiate(&factory_name, &factory_constructor)?;

    let mut state = self.state.lock();

    let constructor = if parts.prototypes.is_empty() {
      parts.constructor
    } else {
      let prototypes = state.prototypes.retrieve(&parts.prototypes)?;
      let deep = parts.deep_merge.unwrap_or(self.deep_merge_prototypes);
      compose(&self.modifier, &parts.constructor, &prototypes, deep)
    };

    let dependencies = state.register.retrieve(&parts.dependencies)?;
    let module = Module::new(&factory_name, factory, constructor, dependencies);
    tracing::debug!(name = module_name, ?module, "registering module");

    state
      .register
      .add(module_name, Payload::Module(Arc::new(module)))?;
    Ok(self)
  }

  /// Registers a module under the built-in `singleton` factory.
  pub fn singleton(&self, module_name: &str, spec: impl Into<ModuleSpec>) -> Result<&Self> {
    self.register_module(SingletonFactory::NAME, module_name, spec)
  }

  /// Registers a module under the built-in `transient` factory.
  pub fn transient(&self, module_name: &str, spec: impl Into<ModuleSpec>) -> Result<&Self> {
    self.register_module(TransientFactory::NAME, module_name, spec)
  }

  // --- Resolution ---

  /// Resolves one or several names.
  ///
  /// A single name (or a list holding exactly one name) yields
  /// [`Resolved::One`]; unknown names resolve to `Value::Undefined` with a
  /// warning. Otherwise the result is [`Resolved::Many`] without the unknown
  /// names.
  pub fn resolve(&self, names: impl Into<Names>) -> Result<Resolved> {
    let names = match names.into() {
      Names::One(name) => vec![name],
      Names::Many(names) => names,
    };
    let registrations = self.state.lock().register.retrieve(&names)?;

    if let [(_, registration)] = registrations.as_slice() {
      return Ok(Resolved::One(Self::value_of(registration.as_deref())?));
    }

    let mut resolved = IndexMap::with_capacity(registrations.len());
    for (name, registration) in registrations {
      if let Some(registration) = registration {
        resolved.insert(name, registration.value()?);
      }
    }
    Ok(Resolved::Many(resolved))
  }

  /// Resolves a single name; `Value::Undefined` if it is unknown.
  pub fn resolve_one(&self, name: &str) -> Result<Value> {
    let registrations = self.state.lock().register.retrieve(&[name])?;
    let registration = registrations.into_iter().next().and_then(|(_, r)| r);
    Self::value_of(registration.as_deref())
  }

  /// Resolves several names into a map, leaving unknown names out. Unlike
  /// [`resolve`](Self::resolve), a one-name list still yields a map.
  pub fn resolve_many<S: AsRef<str>>(&self, names: &[S]) -> Result<IndexMap<String, Value>> {
    let registrations = self.state.lock().register.retrieve(names)?;
    let mut resolved = IndexMap::with_capacity(registrations.len());
    for (name, registration) in registrations {
      if let Some(registration) = registration {
        resolved.insert(name, registration.value()?);
      }
    }
    Ok(resolved)
  }

  /// Resolves a name and recovers the host value stored in it with
  /// [`Value::opaque`]. `None` when the name is unknown or holds another type.
  pub fn resolve_as<T: Any + Send + Sync>(&self, name: &str) -> Result<Option<Arc<T>>> {
    Ok(self.resolve_one(name)?.downcast::<T>())
  }

  // --- Introspection ---

  pub fn contains(&self, name: &str) -> bool {
    self.state.lock().register.contains(name)
  }

  pub fn kind_of(&self, name: &str) -> Option<RegistrationKind> {
    self.state.lock().register.get(name).map(|r| r.kind())
  }

  /// Registered names, in registration order.
  pub fn names(&self) -> Vec<String> {
    self.state.lock().register.names().map(str::to_owned).collect()
  }

  pub fn prototypes(&self) -> Vec<String> {
    self.state.lock().prototypes.names().map(str::to_owned).collect()
  }

  // --- PRIVATE HELPERS ---

  fn value_of(registration: Option<&Registration>) -> Result<Value> {
    match registration {
      Some(registration) => registration.value(),
      None => Ok(Value::Undefined),
    }
  }

  fn lookup_factory_name(&self, factory_name: &str) -> Result<String> {
    sanitize_factory_name(factory_name)
      .map_err(|_| Error::FactoryNotRegistered(factory_name.to_owned()))
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.state.lock();
    f.debug_struct("Container")
      .field("registrations", &state.register)
      .field("factories", &state.factories)
      .field("prototypes", &state.prototypes)
      .finish()
  }
}

/// A registration verb: registers modules under one factory.
///
/// ```
/// use fibre_plug::{Constructor, Container, ModuleSpec};
///
/// let container = Container::new();
/// container
///   .registrar("transient")?
///   .register("clock", ModuleSpec::of(Constructor::new("Clock", |_, _| Ok(()))))?
///   .register("timer", ModuleSpec::of(Constructor::new("Timer", |_, _| Ok(()))))?;
/// assert!(container.contains("timer"));
/// # Ok::<(), fibre_plug::Error>(())
/// ```
#[derive(Debug)]
pub struct Registrar<'a> {
  container: &'a Container,
  factory: String,
}

impl<'a> Registrar<'a> {
  pub fn register(&self, module_name: &str, spec: impl Into<ModuleSpec>) -> Result<&Self> {
    self
      .container
      .register_module(&self.factory, module_name, spec)?;
    Ok(self)
  }

  pub fn factory_name(&self) -> &str {
    &self.factory
  }

  pub fn container(&self) -> &'a Container {
    self.container
  }
}

// --- Host references ---

/// A snapshot of the process environment.
fn host_window() -> Value {
  Value::Object(
    std::env::vars_os()
      .map(|(k, v)| {
        (
          k.to_string_lossy().into_owned(),
          v.to_string_lossy().into_owned(),
        )
      })
      .collect::<Object>(),
  )
}

/// Process arguments, working directory and start time.
fn host_document() -> Value {
  let args: Vec<String> = std::env::args_os()
    .map(|a| a.to_string_lossy().into_owned())
    .collect();
  let cwd = match std::env::current_dir() {
    Ok(dir) => Value::from(dir.to_string_lossy().into_owned()),
    Err(_) => Value::Null,
  };
  Value::Object(
    Object::new()
      .with("args", args)
      .with("cwd", cwd)
      .with("started_at", Utc::now()),
  )
}
