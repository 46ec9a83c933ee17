//! Arity-agnostic construction of module instances.

use crate::error::Result;
use crate::value::{Function, Object, Value};
use std::fmt;
use std::sync::Arc;

type InitFn = dyn Fn(&Object, &[Value]) -> Result<()> + Send + Sync;
type BuildFn = dyn Fn(&[Value]) -> Result<Value> + Send + Sync;

#[derive(Clone)]
enum Body {
  Init(Arc<InitFn>),
  Returning(Arc<BuildFn>),
}

/// A named constructor plus the method table ("prototype") its instances
/// inherit from.
///
/// Factories never need to know how many arguments a constructor takes: they
/// hand [`Constructor::construct`] whatever positional dependency values the
/// module resolved.
#[derive(Clone)]
pub struct Constructor {
  name: Arc<str>,
  prototype: Object,
  body: Body,
}

impl Constructor {
  /// A constructor whose `init` populates a fresh instance.
  ///
  /// The instance reads through to this constructor's prototype, so methods
  /// declared with [`method`](Self::method) (and any composed prototypes)
  /// are visible on it.
  pub fn new<F>(name: impl Into<String>, init: F) -> Self
  where
    F: Fn(&Object, &[Value]) -> Result<()> + Send + Sync + 'static,
  {
    Self {
      name: Arc::from(name.into()),
      prototype: Object::new(),
      body: Body::Init(Arc::new(init)),
    }
  }

  /// A constructor whose `build` returns the instance itself.
  ///
  /// Suited to host services wrapped in [`Value::opaque`]. The prototype is not
  /// attached to returned values.
  pub fn returning<F>(name: impl Into<String>, build: F) -> Self
  where
    F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
  {
    Self {
      name: Arc::from(name.into()),
      prototype: Object::new(),
      body: Body::Returning(Arc::new(build)),
    }
  }

  /// Declares a method on the constructor's own prototype.
  pub fn method<F>(self, name: impl Into<String>, f: F) -> Self
  where
    F: Fn(&Value, &[Value]) -> Result<Value> + Send + Sync + 'static,
  {
    self.prototype.set(name, Function::new(f));
    self
  }

  /// Declares a non-function member on the constructor's own prototype.
  ///
  /// The value is shared by every instance: an `Array` or `Object` declared
  /// here is one handle seen by all of them. Per-instance state belongs in
  /// the `init` body, set with `this.set(..)`.
  pub fn field(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
    self.prototype.set(name, value);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn prototype(&self) -> &Object {
    &self.prototype
  }

  /// The same constructor with its method table swapped for `prototype`.
  pub(crate) fn with_prototype(&self, prototype: Object) -> Self {
    Self {
      name: Arc::clone(&self.name),
      prototype,
      body: self.body.clone(),
    }
  }

  /// Builds one instance from the given positional arguments.
  pub fn construct(&self, args: &[Value]) -> Result<Value> {
    match &self.body {
      Body::Init(init) => {
        let instance = Object::with_proto(self.prototype.clone());
        init(&instance, args)?;
        Ok(Value::Object(instance))
      }
      Body::Returning(build) => build(args),
    }
  }
}

impl fmt::Debug for Constructor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Constructor")
      .field("name", &self.name)
      .field("prototype", &self.prototype.keys())
      .finish()
  }
}
