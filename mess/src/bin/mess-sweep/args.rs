//! Arguments

// Imports
use std::path::PathBuf;

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

	/// Sweep config file
	///
	/// Fields not present take the default sweep values.
	#[clap(long = "config")]
	pub config_file: Option<PathBuf>,

	/// Simulator binary, overrides the config
	#[clap(long = "binary")]
	pub binary: Option<PathBuf>,

	/// Base simulator configurations, override the config
	#[clap(long = "base-config")]
	pub base_configs: Vec<PathBuf>,

	/// Output root, overrides the config
	#[clap(long = "output-root")]
	pub output_root: Option<PathBuf>,

	/// Number of concurrent simulator instances, overrides the config
	#[clap(short = 'j', long = "workers")]
	pub workers: Option<usize>,

	/// Only list the sweep points
	#[clap(long = "dry-run")]
	pub dry_run: bool,
}
