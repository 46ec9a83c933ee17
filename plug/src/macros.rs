//! Public macros for ergonomic resolution.
//!
//! Every macro comes in an untyped form that yields a [`Value`](crate::Value)
//! and a typed form that yields the `Arc<T>` of a host value registered with
//! [`Value::opaque`](crate::Value::opaque). The typed form takes the type
//! first: `resolve!(MyService, "name")`.

/// Resolves a name from a specific container, returning `None` if it is
/// unknown, resolves to `Undefined`, fails, or (typed form) holds another type.
///
/// # Examples
///
/// ```
/// use fibre_plug::{maybe_resolve_from, Container};
///
/// let container = Container::new();
/// container.reference("answer", 42).unwrap();
///
/// assert_eq!(maybe_resolve_from!(&container, "answer").and_then(|v| v.as_i64()), Some(42));
/// assert!(maybe_resolve_from!(&container, "question").is_none());
/// assert!(maybe_resolve_from!(&container, String, "answer").is_none());
/// ```
#[macro_export]
macro_rules! maybe_resolve_from {
    // Arm for a typed host value: maybe_resolve_from!(&c, MyService, "name")
    ($container:expr, $type:ty, $name:expr) => {
        $container.resolve_as::<$type>($name).ok().flatten()
    };

    // Arm for a dynamic value: maybe_resolve_from!(&c, "name")
    ($container:expr, $name:expr) => {
        match $container.resolve_one($name) {
            Ok(value) if !value.is_undefined() => Some(value),
            _ => None,
        }
    };
}

/// Resolves a name from a specific container.
///
/// # Panics
///
/// Panics if the name is unknown, resolves to `Undefined`, fails to resolve,
/// or (typed form) holds a value of another type.
#[macro_export]
macro_rules! resolve_from {
    ($container:expr, $type:ty, $name:expr) => {{
        let name = $name;
        match $container.resolve_as::<$type>(name) {
            Ok(Some(service)) => service,
            Ok(None) => panic!(
                "Failed to resolve required service '{}': {}",
                name,
                std::any::type_name::<$type>()
            ),
            Err(err) => panic!(
                "Failed to resolve required service '{}': {}: {}",
                name,
                std::any::type_name::<$type>(),
                err
            ),
        }
    }};

    ($container:expr, $name:expr) => {{
        let name = $name;
        match $container.resolve_one(name) {
            Ok(value) if !value.is_undefined() => value,
            Ok(_) => panic!("Failed to resolve required value '{}'", name),
            Err(err) => panic!("Failed to resolve required value '{}': {}", name, err),
        }
    }};
}

/// Resolves a name from the global container, returning `None` on a miss.
#[macro_export]
macro_rules! maybe_resolve {
    ($type:ty, $name:expr) => {
        $crate::maybe_resolve_from!($crate::global(), $type, $name)
    };

    ($name:expr) => {
        $crate::maybe_resolve_from!($crate::global(), $name)
    };
}

/// Resolves a name from the global container.
///
/// # Panics
///
/// Panics on a miss. For a non-panicking version, use [`maybe_resolve!`] or
/// `global().resolve_one(...)` directly.
///
/// # Examples
///
/// ```
/// use fibre_plug::{global, resolve, Constructor, Value};
///
/// struct Clock { tz: String }
///
/// global().reference("tz", "UTC").unwrap();
/// global()
///   .singleton("clock", fibre_plug::spec!["tz", Constructor::returning("Clock", |args| {
///     let tz = args[0].as_str().unwrap_or("local").to_owned();
///     Ok(Value::opaque(Clock { tz }))
///   })])
///   .unwrap();
///
/// assert_eq!(resolve!("tz").as_str(), Some("UTC"));
/// assert_eq!(resolve!(Clock, "clock").tz, "UTC");
/// ```
#[macro_export]
macro_rules! resolve {
    ($type:ty, $name:expr) => {
        $crate::resolve_from!($crate::global(), $type, $name)
    };

    ($name:expr) => {
        $crate::resolve_from!($crate::global(), $name)
    };
}

/// Builds a [`ModuleSpec`](crate::ModuleSpec) from dependency names followed
/// by a constructor, mirroring the array form `["dep", "dep", Ctor]`.
///
/// ```
/// use fibre_plug::{spec, Constructor};
///
/// let spec = spec!["config", "logger", Constructor::new("Service", |_, _| Ok(()))];
/// # let _ = spec;
/// ```
#[macro_export]
macro_rules! spec {
    ($($item:expr),* $(,)?) => {
        $crate::ModuleSpec::from(::std::vec![$($crate::SpecItem::from($item)),*])
    };
}
