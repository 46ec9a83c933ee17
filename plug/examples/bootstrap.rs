//! Boots a container from a YAML configuration with tracing enabled.
//!
//! Run with `RUST_LOG=fibre_plug=debug cargo run --example bootstrap` to see
//! registrations as they happen.

use fibre_plug::{Constructor, Container, ContainerConfig, ModuleSpec, Value};
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"
host_references: true
values:
  http:
    base_url: "https://api.example.test"
    timeout_ms: 2500
references:
  environment: "staging"
"#;

fn main() -> fibre_plug::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let config = ContainerConfig::from_yaml_str(CONFIG)?;
  let container = Container::with_config(&config)?;

  container.singleton(
    "client",
    ModuleSpec::new()
      .dependencies(["http", "environment", "document"])
      .constructor(Constructor::new("HttpClient", |this, args| {
        this.set("base_url", args[0].get("base_url").unwrap_or_default());
        this.set("environment", args[1].clone());
        this.set("cwd", args[2].get("cwd").unwrap_or_default());
        Ok(())
      })),
  )?;

  let client = container.resolve_one("client")?;
  tracing::info!(?client, "client ready");

  // Resolving several names yields a map keyed by name.
  let resolved = container.resolve(["client", "environment", "unknown"])?;
  println!("{:#?}", resolved.into_value());

  assert_eq!(client.get("environment"), Some(Value::from("staging")));
  Ok(())
}
