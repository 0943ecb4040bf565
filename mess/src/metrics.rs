//! Simulator log metrics

// Imports
use {
	crate::bandwidth::Timing,
	anyhow::Context,
	regex::Regex,
	std::{io, str::FromStr},
};

/// Metrics found in a simulator log.
///
/// Every field is optional, a missing log line simply leaves it unset.
#[derive(PartialEq, Clone, Copy, Default, Debug)]
pub struct MetricFields {
	/// `memory_system_cycles`
	pub cycles: Option<u64>,

	/// `total_num_write_requests`
	pub writes: Option<u64>,

	/// `total_num_read_requests`
	pub reads: Option<u64>,

	/// `avg_read_latency_0`, in cycles
	pub avg_read_latency: Option<f64>,

	/// `avg_queue_time_stream0`, in cycles
	pub avg_stream_queue: Option<f64>,

	/// `avg_random_read_latency_0`, in cycles
	pub avg_random_read_latency: Option<f64>,

	/// `average_strided_read_latency_0`, in cycles
	pub avg_strided_read_latency: Option<f64>,

	/// `total_number_of_retried_requests`
	pub retried_requests: Option<u64>,
}

impl MetricFields {
	/// Returns if all fields required for a record are present
	pub fn is_complete(&self) -> bool {
		self.required().is_some()
	}

	/// Returns the cycles, read latency, writes and reads, if all are present
	fn required(&self) -> Option<(u64, f64, u64, u64)> {
		Some((self.cycles?, self.avg_read_latency?, self.writes?, self.reads?))
	}

	/// Builds a record for spacing count `nop_count` out of these fields.
	///
	/// Returns `Ok(None)` if the fields aren't complete.
	///
	/// # Errors
	/// Returns an error if the log reported zero cycles, or more requests than fit
	/// in a `u64`.
	pub fn into_record(self, nop_count: u64, timing: &Timing) -> Result<Option<MetricRecord>, anyhow::Error> {
		let Some((cycles, avg_read_latency, writes, reads)) = self.required() else {
			return Ok(None);
		};

		anyhow::ensure!(cycles > 0, "Memory system ran for zero cycles");
		let transfers = reads
			.checked_add(writes)
			.with_context(|| format!("Total request count overflowed ({reads} reads + {writes} writes)"))?;

		Ok(Some(MetricRecord {
			nop_count,
			cycles,
			reads,
			writes,
			bandwidth_gbps: timing.bandwidth_gbps(cycles, transfers),
			bytes_per_cycle: timing.bytes_per_cycle(cycles, transfers),
			avg_read_latency_ns: timing.cycles_to_ns(avg_read_latency),
			avg_stream_queue_ns: self.avg_stream_queue.map(|cycles| timing.cycles_to_ns(cycles)),
			avg_random_read_latency_ns: self.avg_random_read_latency.map(|cycles| timing.cycles_to_ns(cycles)),
			avg_strided_read_latency_ns: self.avg_strided_read_latency.map(|cycles| timing.cycles_to_ns(cycles)),
			retried_requests: self.retried_requests,
		}))
	}
}

/// A single run's metrics
#[derive(PartialEq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct MetricRecord {
	/// Spacing count of the run
	pub nop_count: u64,

	pub cycles: u64,
	pub reads:  u64,
	pub writes: u64,

	/// Bandwidth, in GB/s
	pub bandwidth_gbps: f64,

	/// Average bytes per memory cycle
	pub bytes_per_cycle: f64,

	/// Latencies, in nanoseconds
	pub avg_read_latency_ns:         f64,
	pub avg_stream_queue_ns:         Option<f64>,
	pub avg_random_read_latency_ns:  Option<f64>,
	pub avg_strided_read_latency_ns: Option<f64>,

	/// Number of retried requests
	pub retried_requests: Option<u64>,
}

/// Latency reported by a record
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[derive(clap::ValueEnum)]
pub enum Latency {
	/// Average read latency
	Read,

	/// Average stream queueing time
	StreamQueue,

	/// Average random read latency
	#[default]
	RandomRead,

	/// Average strided read latency
	StridedRead,
}

impl Latency {
	/// Returns this latency of `record`, in nanoseconds, if it was logged
	pub fn of(self, record: &MetricRecord) -> Option<f64> {
		match self {
			Self::Read => Some(record.avg_read_latency_ns),
			Self::StreamQueue => record.avg_stream_queue_ns,
			Self::RandomRead => record.avg_random_read_latency_ns,
			Self::StridedRead => record.avg_strided_read_latency_ns,
		}
	}

	/// Returns a description of this latency
	pub fn description(self) -> &'static str {
		match self {
			Self::Read => "Average read latency",
			Self::StreamQueue => "Average stream queue time",
			Self::RandomRead => "Average random read latency",
			Self::StridedRead => "Average strided read latency",
		}
	}
}

/// Simulator log parser
#[derive(Clone, Debug)]
pub struct LogParser {
	cycles:                   Regex,
	writes:                   Regex,
	reads:                    Regex,
	avg_read_latency:         Regex,
	avg_stream_queue:         Regex,
	avg_random_read_latency:  Regex,
	avg_strided_read_latency: Regex,
	retried_requests:         Regex,
}

impl LogParser {
	/// Creates a new parser
	pub fn new() -> Self {
		let int = |key: &str| Self::pattern(key, r"(\d+)");
		let decimal = |key: &str| Self::pattern(key, r"([\d.]+)");

		Self {
			cycles:                   int("memory_system_cycles"),
			writes:                   int("total_num_write_requests"),
			reads:                    int("total_num_read_requests"),
			avg_read_latency:         decimal("avg_read_latency_0"),
			avg_stream_queue:         decimal("avg_queue_time_stream0"),
			avg_random_read_latency:  decimal("avg_random_read_latency_0"),
			avg_strided_read_latency: decimal("average_strided_read_latency_0"),
			retried_requests:         int("total_number_of_retried_requests"),
		}
	}

	/// Builds the pattern for `key: <value>`
	fn pattern(key: &str, value: &str) -> Regex {
		Regex::new(&format!(r"{}:\s*{value}", regex::escape(key))).expect("Metric pattern was invalid")
	}

	/// Parses all metrics in `reader`.
	///
	/// Each line is matched against every metric independently, with later
	/// lines overriding earlier ones.
	pub fn parse<R: io::BufRead>(&self, reader: R) -> Result<MetricFields, anyhow::Error> {
		let mut fields = MetricFields::default();
		for line in reader.lines() {
			let line = line.context("Unable to read line")?;

			Self::update(&mut fields.cycles, &self.cycles, &line)?;
			Self::update(&mut fields.writes, &self.writes, &line)?;
			Self::update(&mut fields.reads, &self.reads, &line)?;
			Self::update(&mut fields.avg_read_latency, &self.avg_read_latency, &line)?;
			Self::update(&mut fields.avg_stream_queue, &self.avg_stream_queue, &line)?;
			Self::update(&mut fields.avg_random_read_latency, &self.avg_random_read_latency, &line)?;
			Self::update(&mut fields.avg_strided_read_latency, &self.avg_strided_read_latency, &line)?;
			Self::update(&mut fields.retried_requests, &self.retried_requests, &line)?;
		}

		tracing::trace!(?fields, "Parsed metrics");
		Ok(fields)
	}

	/// Parses all metrics in a string
	pub fn parse_str(&self, contents: &str) -> Result<MetricFields, anyhow::Error> {
		self.parse(contents.as_bytes())
	}

	/// Sets `field` if `regex` matches `line`
	fn update<T>(field: &mut Option<T>, regex: &Regex, line: &str) -> Result<(), anyhow::Error>
	where
		T: FromStr,
		T::Err: std::error::Error + Send + Sync + 'static,
	{
		let Some(captures) = regex.captures(line) else {
			return Ok(());
		};

		let value = &captures[1];
		let value = value
			.parse()
			.with_context(|| format!("Unable to parse value {value:?} of line {line:?}"))?;
		*field = Some(value);

		Ok(())
	}
}

impl Default for LogParser {
	fn default() -> Self {
		Self::new()
	}
}
