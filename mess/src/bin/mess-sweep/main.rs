//! Runs the simulator over the whole sweep matrix

// Modules
mod args;

// Imports
use {
	self::args::Args,
	anyhow::Context,
	clap::Parser,
	mess::{Sweep, SweepConfig},
	mess_util::logger,
	std::fs,
};

fn main() -> Result<(), anyhow::Error> {
	// Get arguments
	let args = Args::parse();
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	// Read the config file, if any, and apply any overrides
	let mut config = match &args.config_file {
		Some(config_file) => {
			let config_file = fs::File::open(config_file).context("Unable to open config file")?;
			serde_json::from_reader::<_, SweepConfig>(config_file).context("Unable to parse config file")?
		},
		None => SweepConfig::default(),
	};
	if let Some(binary) = args.binary {
		config.binary = binary;
	}
	if !args.base_configs.is_empty() {
		config.base_configs = args.base_configs;
	}
	if let Some(output_root) = args.output_root {
		config.output_root = output_root;
	}
	if let Some(workers) = args.workers {
		config.workers = workers;
	}
	tracing::debug!(?config, "Sweep config");

	let points = config.points();
	if args.dry_run {
		for point in &points {
			let artifacts = point.artifacts();
			println!(
				"{} -f {}  # nop_counter={}, ratio_reads={}",
				config.binary.display(),
				artifacts.config.display(),
				point.nop_count,
				point.read_ratio
			);
		}
		return Ok(());
	}

	let report = Sweep::new(&config.binary, config.workers)
		.run(points)
		.context("Unable to run sweep")?;
	tracing::info!(
		"{}/{} tests completed, {} passed, {} could not be run",
		report.completed(),
		report.total(),
		report.passed(),
		report.errored()
	);

	Ok(())
}
