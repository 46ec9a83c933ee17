use fibre_plug::{Constructor, Container, Error, ModuleSpec, RegistrationKind, Resolved, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// --- Test Fixtures ---

// A constructor that records how many times it ran and stamps the instance.
fn counted(name: &str, calls: &Arc<AtomicUsize>) -> Constructor {
  let calls = Arc::clone(calls);
  Constructor::new(name, move |this, _| {
    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
    this.set("serial", n as i64);
    Ok(())
  })
}

// --- Basic Tests ---

#[test]
fn test_reference_overwrite() {
  // Arrange
  let container = Container::empty();
  container.reference("port", 80).unwrap();

  // Act
  container.reference("port", 8080).unwrap();

  // Assert
  assert_eq!(container.resolve_one("port").unwrap(), Value::from(8080));
  assert_eq!(container.names(), vec!["port"]);
}

#[test]
fn test_reference_shares_the_registered_object() {
  let container = Container::empty();
  let settings = fibre_plug::Object::new().with("debug", false);
  container.reference("settings", settings.clone()).unwrap();

  settings.set("debug", true);

  let resolved = container.resolve_one("settings").unwrap();
  assert_eq!(resolved.get("debug"), Some(Value::from(true)));
  assert!(resolved.same(&Value::Object(settings)));
}

#[test]
fn test_singleton_is_constructed_once() {
  // Arrange
  let calls = Arc::new(AtomicUsize::new(0));
  let container = Container::new();
  container
    .singleton("tracker", counted("Tracker", &calls))
    .unwrap();

  // Act
  let r1 = container.resolve_one("tracker").unwrap();
  let r2 = container.resolve_one("tracker").unwrap();

  // Assert
  assert_eq!(calls.load(Ordering::SeqCst), 1);
  assert!(r1.same(&r2));
}

#[test]
fn test_singleton_is_lazy() {
  let calls = Arc::new(AtomicUsize::new(0));
  let container = Container::new();
  container
    .singleton("tracker", counted("Tracker", &calls))
    .unwrap();

  assert_eq!(calls.load(Ordering::SeqCst), 0);
  container.resolve_one("tracker").unwrap();
  assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_transient_constructs_every_time() {
  // Arrange
  let calls = Arc::new(AtomicUsize::new(0));
  let container = Container::new();
  container
    .transient("tracker", counted("Tracker", &calls))
    .unwrap();

  // Act
  let r1 = container.resolve_one("tracker").unwrap();
  let r2 = container.resolve_one("tracker").unwrap();

  // Assert
  assert_eq!(calls.load(Ordering::SeqCst), 2);
  assert!(!r1.same(&r2));
  assert_eq!(r1.get("serial"), Some(Value::from(1)));
  assert_eq!(r2.get("serial"), Some(Value::from(2)));
}

#[test]
fn test_transient_instances_do_not_share_state() {
  let container = Container::new();
  container
    .transient(
      "session",
      Constructor::new("Session", |this, _| {
        this.set("user", "anonymous");
        Ok(())
      }),
    )
    .unwrap();

  let a = container.resolve_one("session").unwrap();
  let b = container.resolve_one("session").unwrap();
  a.as_object().unwrap().set("x", 1);
  a.as_object().unwrap().set("user", "alice");

  assert_eq!(a.get("x"), Some(Value::from(1)));
  assert!(b.get("x").is_none());
  assert_eq!(b.get("user"), Some(Value::from("anonymous")));
}

#[test]
fn test_resolve_single_name_returns_bare_value() {
  let container = Container::empty();
  container.reference("a", 1).unwrap();

  assert_eq!(container.resolve("a").unwrap(), Resolved::One(Value::from(1)));
  // A one-element list is unwrapped as well.
  assert_eq!(container.resolve(["a"]).unwrap(), Resolved::One(Value::from(1)));
}

#[test]
fn test_resolve_many_names_skips_missing() {
  let container = Container::empty();
  container.reference("a", 1).unwrap();
  container.reference("b", "two").unwrap();

  let resolved = container
    .resolve(["a", "missing", "b"])
    .unwrap()
    .many()
    .unwrap();

  assert_eq!(resolved.len(), 2);
  assert_eq!(
    resolved.keys().map(String::as_str).collect::<Vec<_>>(),
    vec!["a", "b"]
  );
  assert_eq!(resolved["b"], Value::from("two"));
}

#[test]
fn test_resolve_missing_single_name_is_undefined() {
  let container = Container::empty();
  assert_eq!(
    container.resolve("nothing").unwrap(),
    Resolved::One(Value::Undefined)
  );
  assert!(container.resolve_one("nothing").unwrap().is_undefined());
}

#[test]
fn test_resolve_many_keeps_a_map_for_one_name() {
  let container = Container::empty();
  container.reference("a", 1).unwrap();

  let resolved = container.resolve_many(&["a"]).unwrap();
  assert_eq!(resolved.len(), 1);
  assert_eq!(resolved["a"], Value::from(1));
}

#[test]
fn test_resolve_empty_name_is_invalid() {
  let container = Container::empty();
  assert!(matches!(
    container.resolve(["a", ""]),
    Err(Error::InvalidArgument(_))
  ));
}

#[test]
fn test_module_without_constructor_is_rejected() {
  let container = Container::new();

  let result = container.singleton("svc", ModuleSpec::new().dependency("config"));

  assert!(matches!(result, Err(Error::MissingConstructor { module }) if module == "svc"));
  assert!(!container.contains("svc"));
}

#[test]
fn test_module_with_empty_name_is_rejected() {
  let container = Container::new();
  let result = container.transient("", Constructor::new("Svc", |_, _| Ok(())));
  assert!(matches!(result, Err(Error::InvalidModuleRegistration(_))));
}

#[test]
fn test_unknown_factory_is_rejected() {
  let container = Container::new();
  let result = container.register_module(
    "pooled",
    "svc",
    Constructor::new("Svc", |_, _| Ok(())),
  );
  assert!(matches!(result, Err(Error::FactoryNotRegistered(name)) if name == "pooled"));
}

#[test]
fn test_empty_reference_name_is_rejected() {
  let container = Container::empty();
  assert!(matches!(
    container.reference("", 1),
    Err(Error::InvalidRegistration(_))
  ));
}

#[test]
fn test_kind_change_on_overwrite() {
  let container = Container::new();
  container.reference("svc", "placeholder").unwrap();
  assert_eq!(container.kind_of("svc"), Some(RegistrationKind::Value));

  container
    .singleton("svc", Constructor::new("Svc", |_, _| Ok(())))
    .unwrap();

  assert_eq!(container.kind_of("svc"), Some(RegistrationKind::Module));
  assert!(container.resolve_one("svc").unwrap().as_object().is_some());
}

#[test]
fn test_constructor_errors_propagate_unchanged() {
  let container = Container::new();
  container
    .transient(
      "broken",
      Constructor::new("Broken", |_, _| {
        Err(Error::construction("Broken", "database unreachable"))
      }),
    )
    .unwrap();

  let err = container.resolve_one("broken").unwrap_err();
  assert!(matches!(err, Error::Construction { ref constructor, .. } if constructor == "Broken"));
  assert_eq!(
    err.to_string(),
    "Failed to construct 'Broken': database unreachable"
  );
}

#[test]
fn test_failed_singleton_is_retried() {
  let attempts = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&attempts);
  let container = Container::new();
  container
    .singleton(
      "flaky",
      Constructor::new("Flaky", move |_, _| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
          Err(Error::construction("Flaky", "first attempt"))
        } else {
          Ok(())
        }
      }),
    )
    .unwrap();

  assert!(container.resolve_one("flaky").is_err());
  let first = container.resolve_one("flaky").unwrap();
  let second = container.resolve_one("flaky").unwrap();

  assert!(first.same(&second));
  assert_eq!(attempts.load(Ordering::SeqCst), 2);
}
