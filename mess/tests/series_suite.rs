//! Series loading tests

// Imports
use {
	mess::{
		series::{self, SeriesInput},
		RatioLabel,
		Series,
		Timing,
	},
	std::{fs, path::Path},
	tempfile::TempDir,
};

const FULL_LOG: &str = "\
memory_system_cycles: 1000000
total_num_write_requests: 5000
total_num_read_requests: 5000
avg_read_latency_0: 50.0
avg_queue_time_stream0: 5
avg_random_read_latency_0: 60
average_strided_read_latency_0: 45
total_number_of_retried_requests: 3
";

fn log(cycles: u64, reads: Option<u64>, writes: u64, latency: f64) -> String {
	let mut log = format!(
		"memory_system_cycles: {cycles}\ntotal_num_write_requests: {writes}\navg_read_latency_0: {latency}\n"
	);
	if let Some(reads) = reads {
		log.push_str(&format!("total_num_read_requests: {reads}\n"));
	}
	log.push_str("avg_random_read_latency_0: 80.0\n");
	log
}

fn write_run(dir: &Path, nop_count: u64, contents: &str) {
	fs::create_dir_all(dir).unwrap();
	fs::write(dir.join(format!("output_{nop_count}.txt")), contents).unwrap();
	fs::write(dir.join(format!("error_{nop_count}.txt")), "").unwrap();
	fs::write(dir.join(format!("config_{nop_count}.yaml")), "Frontend: {}\n").unwrap();
}

#[test]
fn records_are_sorted_and_incomplete_ones_skipped() {
	let dir = TempDir::new().unwrap();
	let read_dir = dir.path().join("read");
	write_run(&read_dir, 100, &log(1_000_000, Some(1000), 0, 40.0));
	write_run(&read_dir, 2, &log(1_000_000, Some(9000), 0, 90.0));
	write_run(&read_dir, 10, &log(1_000_000, Some(5000), 0, 50.0));

	let timing = Timing::default();
	let complete = series::load_all(&SeriesInput::from_ratios(dir.path(), &[1.0]), &timing).unwrap();
	assert_eq!(complete.len(), 1);
	assert_eq!(complete[0].name, "100% reads");
	let nop_counts = complete[0].records.iter().map(|record| record.nop_count).collect::<Vec<_>>();
	assert_eq!(nop_counts, [2, 10, 100]);

	// Drop the read count of one of the runs
	write_run(&read_dir, 10, &log(1_000_000, None, 0, 50.0));
	let partial = series::load_all(&SeriesInput::from_ratios(dir.path(), &[1.0]), &timing).unwrap();
	assert_eq!(partial[0].records.len(), complete[0].records.len() - 1);
	let nop_counts = partial[0].records.iter().map(|record| record.nop_count).collect::<Vec<_>>();
	assert_eq!(nop_counts, [2, 100]);
}

#[test]
fn reference_bandwidth() {
	let dir = TempDir::new().unwrap();
	let read_write_dir = dir.path().join("read_write");
	write_run(&read_write_dir, 1, FULL_LOG);

	let series = Series::load(
		RatioLabel::ReadWrite,
		&read_write_dir,
		&mess::LogParser::new(),
		&Timing {
			tck_ps:             416.0,
			bytes_per_transfer: 64.0,
		},
	)
	.unwrap();

	let record = &series.records[0];
	let expected = (64.0 * 10_000.0 / (1_000_000.0 / (1.0 / 416e-12))) / 1e9;
	assert!((record.bandwidth_gbps - expected).abs() < 1e-9);
	assert!((record.avg_read_latency_ns - 20.8).abs() < 1e-9);
	assert_eq!(record.retried_requests, Some(3));
	assert_eq!(series.read_percentage, 50);
}

#[test]
fn unrelated_files_are_ignored() {
	let dir = TempDir::new().unwrap();
	let read_dir = dir.path().join("read");
	write_run(&read_dir, 1, &log(1000, Some(10), 10, 10.0));
	fs::write(read_dir.join("output_1.txt.bak"), "garbage").unwrap();
	fs::write(read_dir.join("notes.txt"), "garbage").unwrap();

	let series = Series::load(RatioLabel::Read, &read_dir, &mess::LogParser::new(), &Timing::default()).unwrap();
	assert_eq!(series.records.len(), 1);
}

#[test]
fn missing_directory_is_an_error() {
	let dir = TempDir::new().unwrap();
	let inputs = SeriesInput::from_ratios(dir.path(), &[0.9]);
	assert!(series::load_all(&inputs, &Timing::default()).is_err());
}

#[test]
fn zero_cycle_log_stops_loading() {
	let dir = TempDir::new().unwrap();
	let read_dir = dir.path().join("read");
	write_run(&read_dir, 1, &log(1_000_000, Some(10), 10, 10.0));
	write_run(&read_dir, 2, &log(0, Some(10), 10, 10.0));

	let err = Series::load(RatioLabel::Read, &read_dir, &mess::LogParser::new(), &Timing::default()).unwrap_err();
	assert!(format!("{err:#}").contains("output_2.txt"), "unexpected error: {err:#}");

	// Without a read count the same log is merely incomplete
	write_run(&read_dir, 2, &log(0, None, 10, 10.0));
	let series = Series::load(RatioLabel::Read, &read_dir, &mess::LogParser::new(), &Timing::default()).unwrap();
	assert_eq!(series.records.len(), 1);
	assert!(series.max_bandwidth().is_some_and(f64::is_finite));
}

#[test]
fn max_bandwidth_ignores_order() {
	let dir = TempDir::new().unwrap();
	let cases = [
		(1.0, [(1, 2000), (2, 8000), (3, 500)]),
		(0.5, [(1, 9000), (2, 100), (3, 4000)]),
		(0.8, [(1, 300), (2, 7000), (3, 6500)]),
	];
	for (ratio, runs) in &cases {
		let run_dir = dir.path().join(RatioLabel::from_ratio(*ratio).to_string());
		for &(nop_count, reads) in runs {
			write_run(&run_dir, nop_count, &log(1_000_000, Some(reads), 0, 10.0));
		}
	}

	let timing = Timing::default();
	let expected = timing.bandwidth_gbps(1_000_000, 9000);

	let mut all = series::load_all(&SeriesInput::from_ratios(dir.path(), &[1.0, 0.5, 0.8]), &timing).unwrap();
	assert_eq!(series::max_bandwidth(&all), Some(expected));

	all.reverse();
	assert_eq!(series::max_bandwidth(&all), Some(expected));

	all.rotate_left(1);
	assert_eq!(series::max_bandwidth(&all), Some(expected));

	assert_eq!(series::max_bandwidth(&[] as &[Series]), None);
}
