//! A user-defined lifetime: instances are cached for a fixed number of uses.

use fibre_plug::{Constructor, Container, Factory, Value};
use parking_lot::Mutex;

struct LeaseFactory {
  uses: usize,
  current: Mutex<Option<(Value, usize)>>,
}

impl LeaseFactory {
  fn new(uses: usize) -> Self {
    Self {
      uses,
      current: Mutex::new(None),
    }
  }
}

impl Factory for LeaseFactory {
  fn get_instance(&self, constructor: &Constructor, args: &[Value]) -> fibre_plug::Result<Value> {
    let mut current = self.current.lock();
    if let Some((instance, remaining)) = current.as_mut() {
      if *remaining > 0 {
        *remaining -= 1;
        return Ok(instance.clone());
      }
    }
    let instance = constructor.construct(args)?;
    *current = Some((instance.clone(), self.uses.saturating_sub(1)));
    Ok(instance)
  }
}

fn main() -> fibre_plug::Result<()> {
  let container = Container::new();
  container.factory("leased", || Ok(LeaseFactory::new(2)))?;
  println!("available factories: {:?}", container.factories());

  let session = Constructor::new("Session", |this, _| {
    this.set("created_at", chrono::Utc::now());
    Ok(())
  });
  container.registrar("leased")?.register("session", session)?;

  let sessions = (0..5)
    .map(|_| container.resolve_one("session"))
    .collect::<fibre_plug::Result<Vec<_>>>()?;
  for (i, session) in sessions.iter().enumerate() {
    println!("resolve #{}: {:?}", i + 1, session.get("created_at"));
  }

  // Two uses per lease: 1 and 2 share an instance, 3 and 4 share the next.
  assert!(sessions[0].same(&sessions[1]));
  assert!(!sessions[1].same(&sessions[2]));
  assert!(sessions[2].same(&sessions[3]));
  Ok(())
}
