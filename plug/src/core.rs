//! Core, non-public bookkeeping shared by registrations and modules.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REGISTRATION_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
  // Registrations whose module instance is being produced on this thread,
  // outermost first. Re-entering one of them means the dependency graph loops.
  static RESOLVING_STACK: RefCell<Vec<(RegistrationId, String)>> = const { RefCell::new(Vec::new()) };
}

/// Process-unique identity of a registration slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct RegistrationId(u64);

impl RegistrationId {
  pub(crate) fn next() -> Self {
    RegistrationId(NEXT_REGISTRATION_ID.fetch_add(1, Ordering::Relaxed))
  }
}

/// An RAII guard against circular module dependencies.
///
/// Entering pushes the registration onto the thread-local resolution stack;
/// dropping pops it. Entering a registration that is already on the stack
/// fails with [`Error::CyclicDependency`] carrying the loop's path.
pub(crate) struct ResolutionGuard {
  id: RegistrationId,
}

impl ResolutionGuard {
  pub(crate) fn enter(id: RegistrationId, name: &str) -> Result<Self> {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(start) = stack.iter().position(|(entry, _)| *entry == id) {
        let mut path: Vec<String> = stack[start..].iter().map(|(_, n)| n.clone()).collect();
        path.push(name.to_owned());
        return Err(Error::CyclicDependency { path });
      }
      stack.push((id, name.to_owned()));
      Ok(Self { id })
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(pos) = stack.iter().rposition(|(entry, _)| *entry == self.id) {
        stack.truncate(pos);
      }
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reentering_reports_the_loop() {
    let a = RegistrationId::next();
    let b = RegistrationId::next();

    let _ga = ResolutionGuard::enter(a, "a").unwrap();
    let _gb = ResolutionGuard::enter(b, "b").unwrap();
    let err = ResolutionGuard::enter(a, "a").err().unwrap();

    match err {
      Error::CyclicDependency { path } => assert_eq!(path, vec!["a", "b", "a"]),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn dropping_the_guard_allows_reentry() {
    let a = RegistrationId::next();
    {
      let _guard = ResolutionGuard::enter(a, "a").unwrap();
    }
    assert!(ResolutionGuard::enter(a, "a").is_ok());
  }
}
