//! The dynamic value model stored in, and produced by, the container.
//!
//! Reference-like values (`Array`, `Object`, `Function`, `Opaque`) are cheap
//! handles around shared state: cloning a `Value` never copies the data it
//! points at. Copying is the job of [`ObjectModifier`](crate::ObjectModifier).

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Ordered property table of an [`Object`].
pub type Properties = IndexMap<String, Value>;

type FunctionBody = dyn Fn(&Value, &[Value]) -> Result<Value> + Send + Sync;

/// A dynamically typed value.
#[derive(Clone, Default)]
pub enum Value {
  /// The absence marker. Unresolved names and dependencies resolve to this.
  #[default]
  Undefined,
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  Str(String),
  Date(DateTime<Utc>),
  Array(Array),
  Object(Object),
  Function(Function),
  Opaque(Opaque),
}

impl Value {
  /// Wraps any thread-safe host value.
  pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
    Value::Opaque(Opaque::new(value))
  }

  /// Wraps a closure as a callable value. The first argument is `this`.
  pub fn function<F>(f: F) -> Self
  where
    F: Fn(&Value, &[Value]) -> Result<Value> + Send + Sync + 'static,
  {
    Value::Function(Function::new(f))
  }

  pub fn is_undefined(&self) -> bool {
    matches!(self, Value::Undefined)
  }

  pub fn is_null(&self) -> bool {
    matches!(self, Value::Null)
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Value::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Value::Int(i) => Some(*i),
      _ => None,
    }
  }

  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Value::Float(f) => Some(*f),
      Value::Int(i) => Some(*i as f64),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::Str(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_date(&self) -> Option<&DateTime<Utc>> {
    match self {
      Value::Date(d) => Some(d),
      _ => None,
    }
  }

  pub fn as_array(&self) -> Option<&Array> {
    match self {
      Value::Array(a) => Some(a),
      _ => None,
    }
  }

  pub fn as_object(&self) -> Option<&Object> {
    match self {
      Value::Object(o) => Some(o),
      _ => None,
    }
  }

  pub fn as_function(&self) -> Option<&Function> {
    match self {
      Value::Function(f) => Some(f),
      _ => None,
    }
  }

  /// Recovers a host value stored with [`Value::opaque`].
  pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
    match self {
      Value::Opaque(o) => o.downcast::<T>(),
      _ => None,
    }
  }

  /// Looks up a property when this value is an object.
  pub fn get(&self, key: &str) -> Option<Value> {
    self.as_object().and_then(|o| o.get(key))
  }

  /// Calls a method when this value is an object.
  pub fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
    match self {
      Value::Object(o) => o.call(method, args),
      other => Err(Error::invocation(
        method,
        format!("receiver is {}, not an object", other.type_name()),
      )),
    }
  }

  /// Identity comparison: reference variants are equal only when they share
  /// the same allocation, primitives compare by value.
  pub fn same(&self, other: &Value) -> bool {
    match (self, other) {
      (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
      (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
      (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
      (Value::Opaque(a), Value::Opaque(b)) => a.ptr_eq(b),
      (Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Opaque(_), _) => false,
      _ => self == other,
    }
  }

  pub fn type_name(&self) -> &'static str {
    match self {
      Value::Undefined => "undefined",
      Value::Null => "null",
      Value::Bool(_) => "bool",
      Value::Int(_) => "int",
      Value::Float(_) => "float",
      Value::Str(_) => "string",
      Value::Date(_) => "date",
      Value::Array(_) => "array",
      Value::Object(_) => "object",
      Value::Function(_) => "function",
      Value::Opaque(_) => "opaque",
    }
  }
}

impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Int(a), Value::Int(b)) => a == b,
      (Value::Float(a), Value::Float(b)) => a == b,
      (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
      (Value::Str(a), Value::Str(b)) => a == b,
      (Value::Date(a), Value::Date(b)) => a == b,
      (Value::Array(a), Value::Array(b)) => a == b,
      (Value::Object(a), Value::Object(b)) => a == b,
      (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
      (Value::Opaque(a), Value::Opaque(b)) => a.ptr_eq(b),
      _ => false,
    }
  }
}

impl fmt::Debug for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Undefined => f.write_str("Undefined"),
      Value::Null => f.write_str("Null"),
      Value::Bool(b) => write!(f, "{b}"),
      Value::Int(i) => write!(f, "{i}"),
      Value::Float(x) => write!(f, "{x:?}"),
      Value::Str(s) => write!(f, "{s:?}"),
      Value::Date(d) => write!(f, "Date({})", d.to_rfc3339()),
      Value::Array(a) => a.fmt(f),
      Value::Object(o) => o.fmt(f),
      Value::Function(func) => func.fmt(f),
      Value::Opaque(o) => o.fmt(f),
    }
  }
}

// --- Array ---

/// A shared, interior-mutable list of values.
#[derive(Clone, Default)]
pub struct Array(Arc<RwLock<Vec<Value>>>);

impl Array {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_vec(items: Vec<Value>) -> Self {
    Array(Arc::new(RwLock::new(items)))
  }

  pub fn len(&self) -> usize {
    self.0.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.read().is_empty()
  }

  pub fn get(&self, index: usize) -> Option<Value> {
    self.0.read().get(index).cloned()
  }

  pub fn push(&self, value: impl Into<Value>) {
    self.0.write().push(value.into());
  }

  /// Replaces the element at `index`. Returns `false` when out of bounds.
  pub fn set(&self, index: usize, value: impl Into<Value>) -> bool {
    match self.0.write().get_mut(index) {
      Some(slot) => {
        *slot = value.into();
        true
      }
      None => false,
    }
  }

  /// A snapshot of the current elements (handles, not copies).
  pub fn to_vec(&self) -> Vec<Value> {
    self.0.read().clone()
  }

  pub fn ptr_eq(&self, other: &Array) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl PartialEq for Array {
  fn eq(&self, other: &Self) -> bool {
    self.ptr_eq(other) || self.to_vec() == other.to_vec()
  }
}

impl fmt::Debug for Array {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.to_vec().iter()).finish()
  }
}

// --- Object ---

struct ObjectInner {
  props: RwLock<Properties>,
  proto: Option<Object>,
}

/// A shared, interior-mutable property bag with an optional prototype link.
///
/// Property reads walk the prototype chain, writes always land on the object
/// itself. Objects without a prototype are "plain" objects.
#[derive(Clone)]
pub struct Object(Arc<ObjectInner>);

impl Default for Object {
  fn default() -> Self {
    Self::new()
  }
}

impl Object {
  pub fn new() -> Self {
    Self::from_props(Properties::new())
  }

  pub fn from_props(props: Properties) -> Self {
    Object(Arc::new(ObjectInner {
      props: RwLock::new(props),
      proto: None,
    }))
  }

  /// Creates an empty object whose reads fall back to `proto`.
  pub fn with_proto(proto: Object) -> Self {
    Object(Arc::new(ObjectInner {
      props: RwLock::new(Properties::new()),
      proto: Some(proto),
    }))
  }

  /// Builder-style `set`.
  pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.set(key, value);
    self
  }

  pub fn proto(&self) -> Option<&Object> {
    self.0.proto.as_ref()
  }

  pub fn is_plain(&self) -> bool {
    self.0.proto.is_none()
  }

  /// Reads a property, falling back along the prototype chain.
  pub fn get(&self, key: &str) -> Option<Value> {
    if let Some(value) = self.get_own(key) {
      return Some(value);
    }
    self.0.proto.as_ref().and_then(|p| p.get(key))
  }

  pub fn get_own(&self, key: &str) -> Option<Value> {
    self.0.props.read().get(key).cloned()
  }

  pub fn has(&self, key: &str) -> bool {
    self.has_own(key) || self.0.proto.as_ref().is_some_and(|p| p.has(key))
  }

  pub fn has_own(&self, key: &str) -> bool {
    self.0.props.read().contains_key(key)
  }

  /// Writes an own property and returns the value it replaced.
  pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
    self.0.props.write().insert(key.into(), value.into())
  }

  pub fn remove(&self, key: &str) -> Option<Value> {
    self.0.props.write().shift_remove(key)
  }

  pub fn keys(&self) -> Vec<String> {
    self.0.props.read().keys().cloned().collect()
  }

  /// A snapshot of the own properties, in insertion order.
  pub fn entries(&self) -> Vec<(String, Value)> {
    self
      .0
      .props
      .read()
      .iter()
      .map(|(k, v)| (k.clone(), v.clone()))
      .collect()
  }

  pub fn len(&self) -> usize {
    self.0.props.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.props.read().is_empty()
  }

  /// Invokes the function stored under `method` with this object as `this`.
  pub fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
    match self.get(method) {
      Some(Value::Function(func)) => func.call(&Value::Object(self.clone()), args),
      Some(other) => Err(Error::invocation(
        method,
        format!("property is {}, not a function", other.type_name()),
      )),
      None => Err(Error::invocation(method, "no such method")),
    }
  }

  pub fn ptr_eq(&self, other: &Object) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl PartialEq for Object {
  fn eq(&self, other: &Self) -> bool {
    if self.ptr_eq(other) {
      return true;
    }
    let same_proto = match (self.proto(), other.proto()) {
      (None, None) => true,
      (Some(a), Some(b)) => a.ptr_eq(b),
      _ => false,
    };
    same_proto && *self.0.props.read() == *other.0.props.read()
  }
}

impl fmt::Debug for Object {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let entries = self.entries();
    f.debug_map()
      .entries(entries.iter().map(|(k, v)| (k, v)))
      .finish()
  }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Object {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Object::from_props(
      iter
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect(),
    )
  }
}

// --- Function ---

/// A shared callable. Invoked with a `this` receiver and positional arguments.
#[derive(Clone)]
pub struct Function(Arc<FunctionBody>);

impl Function {
  pub fn new<F>(f: F) -> Self
  where
    F: Fn(&Value, &[Value]) -> Result<Value> + Send + Sync + 'static,
  {
    Function(Arc::new(f))
  }

  pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value> {
    (self.0)(this, args)
  }

  pub fn ptr_eq(&self, other: &Function) -> bool {
    std::ptr::eq(
      Arc::as_ptr(&self.0) as *const (),
      Arc::as_ptr(&other.0) as *const (),
    )
  }
}

impl fmt::Debug for Function {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Function(..)")
  }
}

// --- Opaque ---

/// A type-erased host value, recovered with [`Opaque::downcast`].
#[derive(Clone)]
pub struct Opaque(Arc<dyn Any + Send + Sync>);

impl Opaque {
  pub fn new<T: Any + Send + Sync>(value: T) -> Self {
    Opaque(Arc::new(value))
  }

  pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
    Opaque(value)
  }

  pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
    self.0.clone().downcast::<T>().ok()
  }

  pub fn is<T: Any>(&self) -> bool {
    self.0.is::<T>()
  }

  pub fn ptr_eq(&self, other: &Opaque) -> bool {
    std::ptr::eq(
      Arc::as_ptr(&self.0) as *const (),
      Arc::as_ptr(&other.0) as *const (),
    )
  }
}

impl fmt::Debug for Opaque {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Opaque(..)")
  }
}

// --- Conversions ---

impl From<()> for Value {
  fn from(_: ()) -> Self {
    Value::Null
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Value::Bool(b)
  }
}

impl From<i32> for Value {
  fn from(i: i32) -> Self {
    Value::Int(i as i64)
  }
}

impl From<i64> for Value {
  fn from(i: i64) -> Self {
    Value::Int(i)
  }
}

impl From<u32> for Value {
  fn from(i: u32) -> Self {
    Value::Int(i as i64)
  }
}

impl From<f64> for Value {
  fn from(f: f64) -> Self {
    Value::Float(f)
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Value::Str(s.to_owned())
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Value::Str(s)
  }
}

impl From<DateTime<Utc>> for Value {
  fn from(d: DateTime<Utc>) -> Self {
    Value::Date(d)
  }
}

impl From<Array> for Value {
  fn from(a: Array) -> Self {
    Value::Array(a)
  }
}

impl From<Object> for Value {
  fn from(o: Object) -> Self {
    Value::Object(o)
  }
}

impl From<Function> for Value {
  fn from(f: Function) -> Self {
    Value::Function(f)
  }
}

impl From<Opaque> for Value {
  fn from(o: Opaque) -> Self {
    Value::Opaque(o)
  }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
  fn from(items: Vec<T>) -> Self {
    Value::Array(Array::from_vec(items.into_iter().map(Into::into).collect()))
  }
}

#[cfg(feature = "config")]
impl From<serde_json::Value> for Value {
  fn from(json: serde_json::Value) -> Self {
    match json {
      serde_json::Value::Null => Value::Null,
      serde_json::Value::Bool(b) => Value::Bool(b),
      serde_json::Value::Number(n) => match n.as_i64() {
        Some(i) => Value::Int(i),
        None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
      },
      serde_json::Value::String(s) => Value::Str(s),
      serde_json::Value::Array(items) => items.into(),
      serde_json::Value::Object(map) => Value::Object(map.into_iter().collect()),
    }
  }
}
