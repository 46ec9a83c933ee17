//! # Fibre Plug
//!
//! A string-keyed, thread-safe Inversion of Control (IoC) container for
//! dynamically shaped applications.
//!
//! Services are described as *modules*: a list of dependency names followed
//! by a constructor. A *factory* registered under a name decides whether a
//! module is built once (`singleton`), on every resolution (`transient`), or
//! by any policy you plug in yourself. Named *prototypes* (capability
//! objects) can be composed onto a module's constructor at registration.
//!
//! ## Core Concepts
//!
//! - **Container**: holds the register of named values and modules, the
//!   factory store and the prototype store.
//! - **Value**: the dynamic value model. Objects and arrays are shared,
//!   interior-mutable handles; host types ride along as [`Value::opaque`].
//! - **Factory**: decides construction policy; see [`Factory`].
//! - **Global Container**: a process-wide container behind [`global()`], used
//!   by the [`resolve!`] family of macros.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_plug::{Constructor, Container, ModuleSpec, Value};
//!
//! fn main() -> fibre_plug::Result<()> {
//!   let container = Container::new();
//!
//!   container.reference("greeting", "Hello")?;
//!   container.singleton(
//!     "greeter",
//!     ModuleSpec::new()
//!       .dependency("greeting")
//!       .constructor(
//!         Constructor::new("Greeter", |this, args| {
//!           this.set("greeting", args[0].clone());
//!           Ok(())
//!         })
//!         .method("greet", |this, args| {
//!           let greeting = this.get("greeting").and_then(|g| g.as_str().map(str::to_owned));
//!           let who = args.first().and_then(Value::as_str).unwrap_or("world");
//!           Ok(Value::from(format!("{}, {}!", greeting.unwrap_or_default(), who)))
//!         }),
//!       ),
//!   )?;
//!
//!   let greeter = container.resolve_one("greeter")?;
//!   assert_eq!(greeter.call("greet", &["Plug".into()])?, Value::from("Hello, Plug!"));
//!
//!   // Singletons are built once.
//!   assert!(greeter.same(&container.resolve_one("greeter")?));
//!   Ok(())
//! }
//! ```

mod config;
mod constructor;
mod container;
mod core;
mod error;
mod factory;
mod global;
mod macros;
mod modifier;
mod module;
mod prototype;
mod registration;
mod value;

pub use config::ContainerConfig;
pub use constructor::Constructor;
pub use container::{Container, Names, Registrar, Resolved};
pub use error::{Error, Result};
pub use factory::{
  sanitize_factory_name, Factory, FactoryConstructor, FactoryStore, SingletonFactory,
  TransientFactory,
};
pub use global::global;
pub use modifier::ObjectModifier;
pub use module::{Module, ModuleSpec, SpecItem};
pub use prototype::{compose, PrototypeStore};
pub use registration::{Payload, Register, Registration, RegistrationKind};
pub use value::{Array, Function, Object, Opaque, Properties, Value};
