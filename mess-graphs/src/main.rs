//! Creates graphs from the sweep's simulator logs

// Modules
mod args;
mod color;

// Imports
use {
	anyhow::Context,
	args::Args,
	clap::Parser,
	gnuplot::{AutoOption, AxesCommon, Coordinate, DashType, Figure, LabelOption, PlotOption},
	itertools::Itertools,
	mess::{
		series::{self, SeriesInput},
		PeakBandwidth,
		Series,
		Timing,
	},
	mess_util::logger,
	std::fs,
};

fn main() -> Result<(), anyhow::Error> {
	// Get arguments
	let args = Args::parse();
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	// Then check the sub-command
	match args.sub_cmd {
		args::SubCmd::LatencyBandwidth(cmd_args) => self::draw_latency_bandwidth(cmd_args)?,
		args::SubCmd::RetriedRequests(cmd_args) => self::draw_retried_requests(cmd_args)?,
	}

	Ok(())
}

fn draw_latency_bandwidth(cmd_args: args::LatencyBandwidth) -> Result<(), anyhow::Error> {
	let (timing, all_series) = self::load_series(&cmd_args.input)?;

	let max_bandwidth = series::max_bandwidth(&all_series);

	// Calculate the reference lines
	let peak = PeakBandwidth {
		data_rate_mts:       cmd_args.data_rate_mts,
		bus_width_bits:      cmd_args.bus_width_bits,
		channels:            cmd_args.input.channels,
		refresh_cycles:      cmd_args.refresh_cycles,
		refresh_interval_ns: cmd_args.refresh_interval_ns,
	};
	let peak_gbps = peak.theoretical_gbps();
	let refresh_gbps = peak.refresh_derated_gbps(&timing);
	tracing::info!(
		peak_gbps,
		refresh_gbps,
		refresh_overhead = peak.refresh_overhead(&timing),
		tccd_bound_gbps = timing.tccd_bound_gbps(cmd_args.tccd) * f64::from(peak.channels),
		"Reference bandwidths"
	);

	// Gather all lines first, so we know the latency range
	let lines = all_series
		.iter()
		.map(|series| {
			let (bandwidths, latencies) = series
				.records
				.iter()
				.filter_map(|record| Some((record.bandwidth_gbps, cmd_args.latency.of(record)?)))
				.unzip::<_, _, Vec<_>, Vec<_>>();
			if bandwidths.len() != series.records.len() {
				tracing::warn!(
					series = %series.name,
					missing = series.records.len() - bandwidths.len(),
					"Some records had no {:?} latency",
					cmd_args.latency
				);
			}

			(series, color::read_percentage_color(series.read_percentage), bandwidths, latencies)
		})
		.collect::<Vec<_>>();
	let max_latency = lines
		.iter()
		.flat_map(|(_, _, _, latencies)| latencies.iter().copied())
		.reduce(f64::max)
		.unwrap_or(1.0);
	let y_max = max_latency * 1.1;

	// Finally build the plot and render it
	let mut fg = Figure::new();
	let axes = fg.axes2d();
	for (series, color, bandwidths, latencies) in &lines {
		axes.lines(bandwidths, latencies, &[
			PlotOption::Caption(series.name.as_str()),
			PlotOption::Color(color.as_str().into()),
			PlotOption::LineWidth(2.0),
		]);
	}

	for (bandwidth, caption, color) in [
		(peak_gbps, "Max. Theoretical BW (No Refresh)", "orange"),
		(refresh_gbps, "Max. Achievable BW (With All-Bank Refresh)", "dark-green"),
	] {
		axes.lines([bandwidth, bandwidth], [0.0, y_max], &[
			PlotOption::Caption(caption),
			PlotOption::Color(color.into()),
			PlotOption::LineStyle(DashType::Dash),
			PlotOption::LineWidth(2.0),
		]);
		axes.label(
			&format!("{bandwidth:.1}"),
			Coordinate::Axis(bandwidth),
			Coordinate::Graph(1.03),
			&[LabelOption::TextColor(color.into())],
		);
	}

	axes.set_x_label("Used memory bandwidth (GB/s)", &[])
		.set_y_label(
			&format!("Memory access latency (ns) [{}]", cmd_args.latency.description()),
			&[],
		)
		.set_y_range(AutoOption::Fix(0.0), AutoOption::Fix(y_max))
		.set_x_grid(true)
		.set_y_grid(true);

	self::render(
		&mut fg,
		&cmd_args.output,
		&format!("latency_bandwidth_{}ch", cmd_args.input.channels),
	)?;

	match max_bandwidth {
		Some(max_bandwidth) => println!("max bandwidth is {max_bandwidth}"),
		None => println!("max bandwidth is 0"),
	}

	Ok(())
}

fn draw_retried_requests(cmd_args: args::RetriedRequests) -> Result<(), anyhow::Error> {
	let (_, all_series) = self::load_series(&cmd_args.input)?;

	let mut fg = Figure::new();
	let axes = fg.axes2d();
	for series in &all_series {
		let (nop_counts, retried) = series
			.records
			.iter()
			.filter_map(|record| Some((record.nop_count, record.retried_requests?)))
			.unzip::<_, _, Vec<_>, Vec<_>>();

		let color = color::read_percentage_color(series.read_percentage);
		axes.lines(&nop_counts, &retried, &[
			PlotOption::Caption(series.name.as_str()),
			PlotOption::Color(color.as_str().into()),
			PlotOption::LineWidth(2.0),
		]);
	}

	axes.set_x_label("NOP count", &[])
		.set_y_label("Retried requests", &[])
		.set_x_log(Some(10.0))
		.set_x_grid(true)
		.set_y_grid(true);

	self::render(
		&mut fg,
		&cmd_args.output,
		&format!("retried_requests_{}ch", cmd_args.input.channels),
	)
}

/// Loads all series of `input`, dumping them if requested
fn load_series(input: &args::Input) -> Result<(Timing, Vec<Series>), anyhow::Error> {
	let timing = Timing {
		tck_ps:             input.tck_ps,
		bytes_per_transfer: input.bytes_per_transfer,
	};

	let inputs = SeriesInput::from_ratios(&input.results_dir(), &input.ratios);
	let all_series = series::load_all(&inputs, &timing).context("Unable to load series")?;
	tracing::debug!(
		"Loaded series: {}",
		all_series
			.iter()
			.map(|series| format!("{} ({})", series.name, series.records.len()))
			.join(", ")
	);

	if let Some(dump_file) = &input.dump_file {
		let dump_file = fs::File::create(dump_file).context("Unable to create dump file")?;
		serde_json::to_writer_pretty(dump_file, &all_series).context("Unable to write dump file")?;
	}

	Ok((timing, all_series))
}

/// Saves `fg` as `<name>.png` and `<name>.svg` in the output directory and shows it, if interactive
fn render(fg: &mut Figure, output: &args::Output, name: &str) -> Result<(), anyhow::Error> {
	fs::create_dir_all(&output.dir).context("Unable to create output directory")?;
	let path = |extension: &str| output.dir.join(format!("{name}.{extension}"));

	let png_path = path("png");
	fg.save_to_png(&png_path, output.width, output.height)
		.map_err(|err| anyhow::anyhow!("Unable to save {png_path:?}: {err:?}"))?;

	let svg_path = path("svg");
	fg.save_to_svg(&svg_path, output.width, output.height)
		.map_err(|err| anyhow::anyhow!("Unable to save {svg_path:?}: {err:?}"))?;

	tracing::info!(?png_path, ?svg_path, "Saved graph");

	if output.interactive {
		fg.show().map_err(|err| anyhow::anyhow!("Unable to show graph: {err:?}"))?;
	}

	Ok(())
}
