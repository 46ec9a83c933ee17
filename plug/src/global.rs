//! The process-wide default container and access functions.

use crate::container::Container;
use once_cell::sync::Lazy;

// Created on first access, with the built-in factories and host references.
static GLOBAL_CONTAINER: Lazy<Container> = Lazy::new(Container::new);

/// Provides a reference to the global container instance.
///
/// Code that can take a `&Container` explicitly should prefer doing so; the
/// global instance exists for bootstrap code and the resolution macros.
///
/// # Examples
///
/// ```
/// use fibre_plug::global;
///
/// fn register_values() -> fibre_plug::Result<()> {
///   global().reference("greeting", "Hello from global!")?;
///   Ok(())
/// }
/// # register_values().unwrap();
/// ```
pub fn global() -> &'static Container {
  &GLOBAL_CONTAINER
}
