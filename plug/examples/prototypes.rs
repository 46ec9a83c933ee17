//! Composes a smart watch out of a `watch` and a `smartDevice` capability
//! object plus its own constructor.

use fibre_plug::{Constructor, Container, Error, ModuleSpec, Object, Value};

fn main() -> fibre_plug::Result<()> {
  let container = Container::new();

  container.singleton(
    "connectionsService",
    Constructor::new("ConnectionsService", |this, _| {
      this.set("transport", "bluetooth");
      Ok(())
    }),
  )?;

  container.from(
    "watch",
    Object::new()
      .with("describe", Value::function(|_, _| Ok(Value::from("a plain watch"))))
      .with("time", Value::function(|_, _| Ok(Value::from(chrono::Utc::now())))),
  )?;
  container.from(
    "smartDevice",
    Object::new()
      .with("describe", Value::function(|_, _| Ok(Value::from("a smart device"))))
      .with(
        "connect",
        Value::function(|this, _| {
          let transport = this
            .get("connections")
            .and_then(|c| c.get("transport"))
            .ok_or_else(|| Error::invocation("connect", "no connections service"))?;
          Ok(Value::from(format!("connected over {}", transport.as_str().unwrap_or("?"))))
        }),
      ),
  )?;

  container.transient(
    "smartWatch",
    ModuleSpec::new()
      .dependency("connectionsService")
      .constructor(
        Constructor::new("SmartWatch", |this, args| {
          this.set("connections", args[0].clone());
          Ok(())
        })
        .method("describe", |_, _| Ok(Value::from("a smart watch"))),
      )
      .prototypes(["watch", "smartDevice"]),
  )?;

  let device = container.resolve_one("smartWatch")?;
  println!("describe: {:?}", device.call("describe", &[])?);
  println!("time:     {:?}", device.call("time", &[])?);
  println!("connect:  {:?}", device.call("connect", &[])?);

  assert_eq!(device.call("describe", &[])?, Value::from("a smart watch"));
  assert_eq!(
    device.call("connect", &[])?,
    Value::from("connected over bluetooth")
  );
  Ok(())
}
