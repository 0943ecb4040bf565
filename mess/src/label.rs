//! Read ratio labels

// Imports
use std::fmt;

/// Label of a read ratio.
///
/// Names the output sub-directory of every run with that ratio.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum RatioLabel {
	/// Only reads
	Read,

	/// Half reads, half writes
	ReadWrite,

	/// Only writes
	Write,

	/// Any other ratio, as a truncated percentage
	Custom(u32),
}

impl RatioLabel {
	/// Returns the label of `ratio`
	#[allow(clippy::float_cmp, reason = "The nominal ratios are exact")]
	pub fn from_ratio(ratio: f64) -> Self {
		match ratio {
			_ if ratio == 1.0 => Self::Read,
			_ if ratio == 0.5 => Self::ReadWrite,
			_ if ratio == 0.0 => Self::Write,
			// Note: Truncation is intended, `0.7 * 100.0` is `70.00000000000001`.
			_ => Self::Custom((ratio * 100.0) as u32),
		}
	}

	/// Returns the nominal read percentage of this label
	pub fn read_percentage(self) -> u32 {
		match self {
			Self::Read => 100,
			Self::ReadWrite => 50,
			Self::Write => 0,
			Self::Custom(pct) => pct,
		}
	}

	/// Returns the human-readable series name, e.g. `90% reads`
	pub fn series_name(self) -> String {
		format!("{}% reads", self.read_percentage())
	}
}

impl fmt::Display for RatioLabel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Read => f.write_str("read"),
			Self::ReadWrite => f.write_str("read_write"),
			Self::Write => f.write_str("write"),
			Self::Custom(pct) => write!(f, "custom_{pct}"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn nominal_ratios() {
		let labels = [1.0, 0.9, 0.8, 0.7, 0.6, 0.5]
			.into_iter()
			.map(|ratio| RatioLabel::from_ratio(ratio).to_string())
			.collect::<Vec<_>>();

		assert_eq!(labels, [
			"read",
			"custom_90",
			"custom_80",
			"custom_70",
			"custom_60",
			"read_write"
		]);
	}

	#[test]
	fn mapping_is_stable() {
		for ratio in [1.0, 0.9, 0.8, 0.7, 0.6, 0.5, 0.0] {
			assert_eq!(RatioLabel::from_ratio(ratio), RatioLabel::from_ratio(ratio));
		}
	}

	#[test]
	fn write_only() {
		assert_eq!(RatioLabel::from_ratio(0.0).to_string(), "write");
		assert_eq!(RatioLabel::from_ratio(0.0).read_percentage(), 0);
	}

	#[test]
	fn series_names() {
		assert_eq!(RatioLabel::from_ratio(1.0).series_name(), "100% reads");
		assert_eq!(RatioLabel::from_ratio(0.7).series_name(), "70% reads");
		assert_eq!(RatioLabel::from_ratio(0.5).series_name(), "50% reads");
	}
}
