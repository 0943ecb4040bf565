//! Simulator configuration

// Imports
use {
	anyhow::Context,
	serde_yml::{Mapping, Value},
	std::{fs, path::Path},
};

/// Section holding the traffic generator parameters
pub const FRONTEND_SECTION: &str = "Frontend";

/// Simulator configuration.
///
/// Kept as a generic YAML document, so that every field we don't
/// override is written back as it was read, in the same order.
#[derive(PartialEq, Clone, Debug)]
pub struct SimConfig {
	/// Root mapping
	root: Mapping,
}

impl SimConfig {
	/// Loads a configuration from `path`
	pub fn load(path: &Path) -> Result<Self, anyhow::Error> {
		let contents = fs::read_to_string(path).with_context(|| format!("Unable to read config file {path:?}"))?;
		Self::from_yaml(&contents).with_context(|| format!("Unable to parse config file {path:?}"))
	}

	/// Parses a configuration from a yaml string
	pub fn from_yaml(contents: &str) -> Result<Self, anyhow::Error> {
		match serde_yml::from_str::<Value>(contents).context("Unable to parse yaml")? {
			Value::Mapping(root) => Ok(Self { root }),
			value => anyhow::bail!("Expected a mapping at the top level, found {value:?}"),
		}
	}

	/// Overrides the read ratio and nop counter of the frontend.
	///
	/// # Errors
	/// Returns an error if there is no frontend section, or if it isn't a mapping.
	pub fn set_frontend(&mut self, ratio_reads: f64, nop_counter: u64) -> Result<(), anyhow::Error> {
		let frontend = match self.root.get_mut(FRONTEND_SECTION) {
			Some(Value::Mapping(frontend)) => frontend,
			Some(value) => anyhow::bail!("Config section {FRONTEND_SECTION:?} was not a mapping: {value:?}"),
			None => anyhow::bail!("Config has no {FRONTEND_SECTION:?} section"),
		};

		frontend.insert(Value::from("ratio_reads"), Value::from(ratio_reads));
		frontend.insert(Value::from("nop_counter"), Value::from(nop_counter));

		Ok(())
	}

	/// Returns a field of the frontend section
	pub fn frontend_field(&self, key: &str) -> Option<&Value> {
		self.root.get(FRONTEND_SECTION)?.get(key)
	}

	/// Returns the root mapping
	pub fn root(&self) -> &Mapping {
		&self.root
	}

	/// Serializes this configuration to yaml
	pub fn to_yaml(&self) -> Result<String, anyhow::Error> {
		serde_yml::to_string(&self.root).context("Unable to serialize config")
	}

	/// Saves this configuration to `path`
	pub fn save(&self, path: &Path) -> Result<(), anyhow::Error> {
		let contents = self.to_yaml()?;
		fs::write(path, contents).with_context(|| format!("Unable to write config file {path:?}"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const BASE: &str = "\
Frontend:
  impl: MessTraceGenerator
  clock_ratio: 8
  total_requests: 100000
  ratio_reads: 1.0
  nop_counter: 1
  disable_random: false
MemorySystem:
  impl: GenericDRAM
  clock_ratio: 3
  DRAM:
    impl: DDR5
    org:
      preset: DDR5_16Gb_x8
      channel: 16
";

	#[test]
	fn override_keeps_other_fields() {
		let base = SimConfig::from_yaml(BASE).expect("Unable to parse base");

		let mut config = base.clone();
		config.set_frontend(0.7, 5).expect("Unable to set frontend");
		let round_trip = SimConfig::from_yaml(&config.to_yaml().expect("Unable to serialize"))
			.expect("Unable to parse round trip");

		assert_eq!(round_trip.frontend_field("ratio_reads"), Some(&Value::from(0.7)));
		assert_eq!(round_trip.frontend_field("nop_counter"), Some(&Value::from(5_u64)));

		for (key, value) in base.root() {
			if key == FRONTEND_SECTION {
				continue;
			}
			assert_eq!(round_trip.root().get(key), Some(value), "Field {key:?} changed");
		}

		let base_frontend = base.root().get(FRONTEND_SECTION).and_then(Value::as_mapping).expect("No frontend");
		for (key, value) in base_frontend {
			if key == "ratio_reads" || key == "nop_counter" {
				continue;
			}
			assert_eq!(round_trip.frontend_field(key.as_str().expect("Non-string key")), Some(value));
		}
	}

	#[test]
	fn override_keeps_field_order() {
		let mut config = SimConfig::from_yaml(BASE).expect("Unable to parse base");
		config.set_frontend(0.9, 42).expect("Unable to set frontend");

		let keys = config.root().keys().filter_map(Value::as_str).collect::<Vec<_>>();
		assert_eq!(keys, ["Frontend", "MemorySystem"]);
	}

	#[test]
	fn missing_frontend() {
		let mut config = SimConfig::from_yaml("MemorySystem:\n  impl: GenericDRAM\n").expect("Unable to parse");
		assert!(config.set_frontend(0.5, 1).is_err());
	}

	#[test]
	fn non_mapping_root() {
		assert!(SimConfig::from_yaml("- 1\n- 2\n").is_err());
	}
}
