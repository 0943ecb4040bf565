//! Arguments

// Imports
use {mess::metrics::Latency, std::path::PathBuf};

/// Arguments
#[derive(Debug)]
#[derive(clap::Parser)]
pub struct Args {
	/// Log file
	///
	/// Specifies a file to perform verbose logging to.
	/// You can use `RUST_LOG_FILE` to set filtering options
	#[clap(long = "log-file")]
	pub log_file: Option<PathBuf>,

	/// Whether to append to the log file
	#[clap(long = "log-file-append")]
	pub log_file_append: bool,

	/// Sub-command
	#[command(subcommand)]
	pub sub_cmd: SubCmd,
}

/// Sub-command
#[derive(Debug, clap::Subcommand)]
pub enum SubCmd {
	#[clap(name = "latency-bandwidth")]
	LatencyBandwidth(LatencyBandwidth),

	#[clap(name = "retried-requests")]
	RetriedRequests(RetriedRequests),
}

/// Creates a latency over bandwidth graph, one line per read ratio
#[derive(Debug, clap::Args)]
pub struct LatencyBandwidth {
	/// Input
	#[clap(flatten)]
	pub input: Input,

	/// Latency to plot
	#[clap(long = "latency", value_enum, default_value_t)]
	pub latency: Latency,

	/// Data rate, in MT/s
	#[clap(long = "data-rate", default_value_t = 4800.0)]
	pub data_rate_mts: f64,

	/// Channel width, in bits
	#[clap(long = "bus-width", default_value_t = 32.0)]
	pub bus_width_bits: f64,

	/// Cycles lost to each all-bank refresh
	#[clap(long = "refresh-cycles", default_value_t = 793.0)]
	pub refresh_cycles: f64,

	/// Refresh interval, in nanoseconds
	#[clap(long = "refresh-interval", default_value_t = 3900.0)]
	pub refresh_interval_ns: f64,

	/// Minimum cycles between column commands (`tCCD`)
	#[clap(long = "tccd", default_value_t = 8)]
	pub tccd: u64,

	/// Output
	#[clap(flatten)]
	pub output: Output,
}

/// Creates a graph of retried requests over spacing count
#[derive(Debug, clap::Args)]
pub struct RetriedRequests {
	/// Input
	#[clap(flatten)]
	pub input: Input,

	/// Output
	#[clap(flatten)]
	pub output: Output,
}

/// Input
#[derive(Debug, clap::Args)]
pub struct Input {
	/// Results directory.
	///
	/// Defaults to `ddr5_4800an_<channels>ch`
	#[clap(long = "results-dir")]
	pub results_dir: Option<PathBuf>,

	/// Number of channels
	#[clap(long = "channels", default_value_t = 16)]
	pub channels: u32,

	/// Read ratios to plot, in order
	#[clap(long = "ratios", value_delimiter = ',', default_values_t = [1.0, 0.5, 0.6, 0.7, 0.8, 0.9])]
	pub ratios: Vec<f64>,

	/// Clock period, in picoseconds
	#[clap(long = "tck-ps", default_value_t = 416.0)]
	pub tck_ps: f64,

	/// Bytes per read or write
	#[clap(long = "bytes-per-transfer", default_value_t = 64.0)]
	pub bytes_per_transfer: f64,

	/// Dumps all parsed series as json to this file
	#[clap(long = "dump")]
	pub dump_file: Option<PathBuf>,
}

impl Input {
	/// Returns the results directory
	pub fn results_dir(&self) -> PathBuf {
		self.results_dir
			.clone()
			.unwrap_or_else(|| PathBuf::from(format!("ddr5_4800an_{}ch", self.channels)))
	}
}

/// Output
#[derive(Debug, clap::Args)]
pub struct Output {
	/// Interactive mode
	#[clap(long = "interactive")]
	pub interactive: bool,

	/// Output directory
	#[clap(short = 'o', long = "output-dir", default_value = ".")]
	pub dir: PathBuf,

	/// Output width, in pixels
	#[clap(long = "output-width", default_value_t = 1000)]
	pub width: u32,

	/// Output height, in pixels
	#[clap(long = "output-height", default_value_t = 600)]
	pub height: u32,
}
