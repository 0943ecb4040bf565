//! Metric series

// Imports
use {
	crate::{bandwidth::Timing, label::RatioLabel, metrics::LogParser, MetricRecord},
	anyhow::Context,
	regex::Regex,
	std::{
		fs,
		io,
		path::{Path, PathBuf},
		sync::LazyLock,
	},
};

/// Pattern of simulator output file names, capturing the spacing count
static OUTPUT_FILE_NAME: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^output_(\d+)\.txt$").expect("Output file name pattern was invalid"));

/// All records sharing a read ratio, sorted by spacing count
#[derive(PartialEq, Clone, Debug)]
#[derive(serde::Serialize)]
pub struct Series {
	/// Name, e.g. `90% reads`
	pub name: String,

	/// Nominal read percentage
	pub read_percentage: u32,

	/// Records
	pub records: Vec<MetricRecord>,
}

impl Series {
	/// Loads a series from all output files in `dir`.
	///
	/// Output files lacking any required metric are skipped.
	///
	/// # Errors
	/// Returns an error if the directory or any output file can't be read, if
	/// any metric value is malformed, or if a complete output file reports zero
	/// cycles or an overflowing request count.
	pub fn load(label: RatioLabel, dir: &Path, parser: &LogParser, timing: &Timing) -> Result<Self, anyhow::Error> {
		let mut records = vec![];
		for entry in fs::read_dir(dir).with_context(|| format!("Unable to read directory {dir:?}"))? {
			let entry = entry.with_context(|| format!("Unable to read entry of {dir:?}"))?;
			let file_name = entry.file_name();
			let Some(nop_count) = file_name.to_str().and_then(self::output_file_nop_count) else {
				continue;
			};
			let nop_count = nop_count.with_context(|| format!("Unable to parse spacing count of {file_name:?}"))?;

			let path = entry.path();
			let file = fs::File::open(&path).with_context(|| format!("Unable to open {path:?}"))?;
			let fields = parser
				.parse(io::BufReader::new(file))
				.with_context(|| format!("Unable to parse {path:?}"))?;

			let record = fields
				.into_record(nop_count, timing)
				.with_context(|| format!("Unable to build record of {path:?}"))?;
			match record {
				Some(record) => records.push(record),
				None => tracing::debug!(?path, ?fields, "Skipping output file with missing metrics"),
			}
		}

		records.sort_by_key(|record| record.nop_count);

		Ok(Self {
			name: label.series_name(),
			read_percentage: label.read_percentage(),
			records,
		})
	}

	/// Returns the highest bandwidth of this series
	pub fn max_bandwidth(&self) -> Option<f64> {
		self.records.iter().map(|record| record.bandwidth_gbps).reduce(f64::max)
	}
}

/// Returns the spacing count of an output file name, if it is one
fn output_file_nop_count(file_name: &str) -> Option<Result<u64, std::num::ParseIntError>> {
	let captures = OUTPUT_FILE_NAME.captures(file_name)?;
	Some(captures[1].parse())
}

/// Returns the highest bandwidth across all series
pub fn max_bandwidth<'a>(series: impl IntoIterator<Item = &'a Series>) -> Option<f64> {
	series
		.into_iter()
		.filter_map(Series::max_bandwidth)
		.fold(None, |max, bandwidth| match max {
			Some(max) => Some(f64::max(max, bandwidth)),
			None => Some(bandwidth),
		})
}

/// Series input: a read ratio and the directory holding its outputs
#[derive(Clone, Debug)]
pub struct SeriesInput {
	pub label: RatioLabel,
	pub dir:   PathBuf,
}

impl SeriesInput {
	/// Creates the inputs of every ratio in `ratios` within `results_dir`, in order
	pub fn from_ratios(results_dir: &Path, ratios: &[f64]) -> Vec<Self> {
		ratios
			.iter()
			.map(|&ratio| {
				let label = RatioLabel::from_ratio(ratio);
				Self {
					label,
					dir: results_dir.join(label.to_string()),
				}
			})
			.collect()
	}
}

/// Loads every series in `inputs`, in order
pub fn load_all(inputs: &[SeriesInput], timing: &Timing) -> Result<Vec<Series>, anyhow::Error> {
	let parser = LogParser::new();
	inputs
		.iter()
		.map(|input| {
			let series = Series::load(input.label, &input.dir, &parser, timing)
				.with_context(|| format!("Unable to load series {:?}", input.label.series_name()))?;
			tracing::info!(series = %series.name, records = series.records.len(), dir = ?input.dir, "Loaded series");
			Ok(series)
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn output_file_names() {
		assert_eq!(output_file_nop_count("output_12.txt"), Some(Ok(12)));
		assert_eq!(output_file_nop_count("output_.txt"), None);
		assert_eq!(output_file_nop_count("output_12.txt.bak"), None);
		assert_eq!(output_file_nop_count("error_12.txt"), None);
		assert_eq!(output_file_nop_count("config_12.yaml"), None);
		assert_eq!(output_file_nop_count("my_output_12.txt"), None);
		assert!(matches!(output_file_nop_count("output_99999999999999999999999.txt"), Some(Err(_))));
	}

	#[test]
	fn inputs_follow_ratio_order() {
		let inputs = SeriesInput::from_ratios(Path::new("results"), &[1.0, 0.5, 0.6]);
		let dirs = inputs.iter().map(|input| input.dir.clone()).collect::<Vec<_>>();
		assert_eq!(dirs, [
			Path::new("results/read"),
			Path::new("results/read_write"),
			Path::new("results/custom_60"),
		]);
	}
}
