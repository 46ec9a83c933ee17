use thiserror::Error;

/// The main error type for the `fibre_plug` library.
///
/// Structural misuse (bad names, malformed module specs, unknown factories)
/// is reported through this type at the call that caused it. Lookup misses
/// during resolution are not errors: they are logged and degrade to
/// [`Value::Undefined`](crate::Value::Undefined).
#[derive(Debug, Error)]
pub enum Error {
  #[error("Invalid registration: {0}")]
  InvalidRegistration(String),

  #[error("Invalid argument: {0}")]
  InvalidArgument(String),

  #[error("Invalid module registration: {0}")]
  InvalidModuleRegistration(String),

  #[error("Module '{module}' registration requires a constructor as the last element")]
  MissingConstructor { module: String },

  #[error("Factory '{0}' is not registered")]
  FactoryNotRegistered(String),

  #[error("Invalid factory '{name}': {reason}")]
  InvalidFactory { name: String, reason: String },

  #[error("Invalid prototype '{name}': {reason}")]
  InvalidPrototype { name: String, reason: String },

  #[error("Prototype '{0}' is not registered")]
  PrototypeNotFound(String),

  #[error("Circular dependency detected while resolving: {}", path.join(" -> "))]
  CyclicDependency { path: Vec<String> },

  #[error("Failed to construct '{constructor}': {reason}")]
  Construction { constructor: String, reason: String },

  #[error("Failed to invoke '{name}': {reason}")]
  Invocation { name: String, reason: String },

  #[error("Failed to read configuration file: {0}")]
  ConfigRead(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  ConfigParse(String),
}

impl Error {
  /// Builds an [`Error::Invocation`] from inside a method or function body.
  pub fn invocation(name: impl Into<String>, reason: impl Into<String>) -> Self {
    Error::Invocation {
      name: name.into(),
      reason: reason.into(),
    }
  }

  /// Builds an [`Error::Construction`] from inside a constructor body.
  pub fn construction(constructor: impl Into<String>, reason: impl Into<String>) -> Self {
    Error::Construction {
      constructor: constructor.into(),
      reason: reason.into(),
    }
  }
}

/// A specialized `Result` type for `fibre_plug` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
