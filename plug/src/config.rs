//! Container configuration, optionally loaded from YAML or JSON.

#[cfg(feature = "config")]
use crate::error::{Error, Result};
#[cfg(feature = "config")]
use indexmap::IndexMap;
#[cfg(feature = "config")]
use std::path::Path;

/// Switches applied when a [`Container`](crate::Container) is created.
///
/// With the `config` feature, this deserializes from YAML or JSON; every
/// field is optional:
///
/// ```yaml
/// default_factories: true
/// host_references: false
/// deep_merge_prototypes: false
/// values:
///   api:
///     base_url: "https://example.test"
///     retries: 3
/// references:
///   build: "release"
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default, deny_unknown_fields))]
pub struct ContainerConfig {
  /// Install the `singleton` and `transient` factories.
  pub default_factories: bool,
  /// Pre-register the `window` (process environment) and `document`
  /// (process arguments, working directory, start time) references.
  pub host_references: bool,
  /// Default merge depth when composing prototypes onto constructors.
  pub deep_merge_prototypes: bool,
  /// Plain values registered as deep clones at creation, in file order.
  #[cfg(feature = "config")]
  pub values: IndexMap<String, serde_json::Value>,
  /// Plain values registered by reference at creation, in file order.
  #[cfg(feature = "config")]
  pub references: IndexMap<String, serde_json::Value>,
}

impl Default for ContainerConfig {
  fn default() -> Self {
    Self {
      default_factories: true,
      host_references: true,
      deep_merge_prototypes: false,
      #[cfg(feature = "config")]
      values: IndexMap::new(),
      #[cfg(feature = "config")]
      references: IndexMap::new(),
    }
  }
}

impl ContainerConfig {
  /// A configuration with nothing pre-installed.
  pub fn bare() -> Self {
    Self {
      default_factories: false,
      host_references: false,
      ..Self::default()
    }
  }
}

#[cfg(feature = "config")]
impl ContainerConfig {
  pub fn from_yaml_str(source: &str) -> Result<Self> {
    serde_yaml::from_str(source).map_err(|e| Error::ConfigParse(e.to_string()))
  }

  pub fn from_json_str(source: &str) -> Result<Self> {
    serde_json::from_str(source).map_err(|e| Error::ConfigParse(e.to_string()))
  }

  /// Reads a configuration file. `.json` files are parsed as JSON, anything
  /// else as YAML.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), "loading container configuration");

    let is_json = path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
      Self::from_json_str(&contents)
    } else {
      Self::from_yaml_str(&contents)
    }
  }
}

#[cfg(all(test, feature = "config"))]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn missing_fields_take_defaults() {
    let config = ContainerConfig::from_yaml_str("host_references: false").unwrap();
    assert_eq!(
      config,
      ContainerConfig {
        host_references: false,
        ..ContainerConfig::default()
      }
    );
  }

  #[test]
  fn unknown_fields_are_rejected() {
    let result = ContainerConfig::from_json_str(r#"{ "singletons": true }"#);
    assert!(matches!(result, Err(Error::ConfigParse(_))));
  }

  #[test]
  fn values_keep_their_json_shape() {
    let config = ContainerConfig::from_yaml_str("values:\n  api:\n    retries: 3\n").unwrap();
    assert_eq!(config.values["api"], serde_json::json!({ "retries": 3 }));
  }
}
