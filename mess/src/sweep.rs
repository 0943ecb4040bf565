//! Sweep runner
//!
//! Runs the simulator once per point of a parameter matrix, on a bounded pool
//! of workers. Workers never log progress themselves: every finished task sends
//! its outcome to the thread that called [`Sweep::run`], which reports them in
//! completion order.

// Imports
use {
	crate::{label::RatioLabel, sim_config::SimConfig},
	anyhow::Context,
	itertools::Itertools,
	std::{
		fs,
		path::{Path, PathBuf},
		process::{self, ExitStatus},
		sync::Arc,
	},
};

/// Sweep configuration
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SweepConfig {
	/// Simulator binary
	pub binary: PathBuf,

	/// Base simulator configurations
	pub base_configs: Vec<PathBuf>,

	/// Directory in which each base configuration's results directory is created
	pub output_root: PathBuf,

	/// Spacing counts
	pub nop_counts: Vec<u64>,

	/// Read ratios
	pub read_ratios: Vec<f64>,

	/// Number of simulator instances to run at once
	pub workers: usize,
}

impl SweepConfig {
	/// Returns all points of this sweep.
	///
	/// Spacing counts vary slowest, then read ratios, then base configurations.
	pub fn points(&self) -> Vec<SweepPoint> {
		self.nop_counts
			.iter()
			.cartesian_product(&self.read_ratios)
			.cartesian_product(&self.base_configs)
			.map(|((&nop_count, &read_ratio), base_config)| SweepPoint {
				nop_count,
				read_ratio,
				base_config: base_config.clone(),
				output_dir: self.output_root.join(self::results_dir_name(base_config)),
			})
			.collect()
	}
}

impl Default for SweepConfig {
	fn default() -> Self {
		Self {
			binary:       PathBuf::from("../ramulator2"),
			base_configs: vec![PathBuf::from("./configs/ddr5_4800an_16ch.yaml")],
			output_root:  PathBuf::from("."),
			nop_counts:   vec![
				1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 17, 20, 25, 30, 40, 50, 75, 100, 200, 300, 1000, 10000,
			],
			read_ratios:  vec![1.0, 0.9, 0.8, 0.7, 0.6, 0.5],
			workers:      16,
		}
	}
}

/// Returns the results directory name of a base configuration.
///
/// This is the file name, without the `.yaml` extension, and with `config`
/// replaced by `results`.
pub fn results_dir_name(base_config: &Path) -> String {
	let file_name = base_config
		.file_name()
		.map(|file_name| file_name.to_string_lossy())
		.unwrap_or_default();

	file_name.replace("config", "results").replace(".yaml", "")
}

/// A point of the sweep
#[derive(PartialEq, Clone, Debug)]
pub struct SweepPoint {
	/// Spacing count
	pub nop_count: u64,

	/// Read ratio
	pub read_ratio: f64,

	/// Base simulator configuration
	pub base_config: PathBuf,

	/// Results directory of the base configuration
	pub output_dir: PathBuf,
}

impl SweepPoint {
	/// Returns the label of this point's read ratio
	pub fn label(&self) -> RatioLabel {
		RatioLabel::from_ratio(self.read_ratio)
	}

	/// Returns the paths of this point's artifacts
	pub fn artifacts(&self) -> ArtifactPaths {
		ArtifactPaths::new(&self.output_dir.join(self.label().to_string()), self.nop_count)
	}
}

/// Files produced by a single run
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ArtifactPaths {
	/// Directory holding all files
	pub dir: PathBuf,

	/// Modified simulator configuration
	pub config: PathBuf,

	/// Simulator standard output
	pub output: PathBuf,

	/// Simulator standard error
	pub error: PathBuf,
}

impl ArtifactPaths {
	/// Returns the artifacts for spacing count `nop_count` within `dir`
	pub fn new(dir: &Path, nop_count: u64) -> Self {
		Self {
			dir:    dir.to_path_buf(),
			config: dir.join(format!("config_{nop_count}.yaml")),
			output: dir.join(format!("output_{nop_count}.txt")),
			error:  dir.join(format!("error_{nop_count}.txt")),
		}
	}
}

/// Output of a single run
#[derive(Clone, Debug)]
pub struct RunOutput {
	/// Artifacts written
	pub artifacts: ArtifactPaths,

	/// Simulator exit status
	pub status: ExitStatus,
}

impl RunOutput {
	/// Returns the exit code, if the simulator exited normally
	pub fn exit_code(&self) -> Option<i32> {
		self.status.code()
	}

	/// Returns if the simulator succeeded
	pub fn passed(&self) -> bool {
		self.status.success()
	}
}

/// Runs the simulator `binary` on a single point.
///
/// A non-zero exit status isn't an error, it is returned in the output.
pub fn run_point(binary: &Path, point: &SweepPoint) -> Result<RunOutput, anyhow::Error> {
	let mut config = SimConfig::load(&point.base_config).context("Unable to load base config")?;
	config
		.set_frontend(point.read_ratio, point.nop_count)
		.context("Unable to override frontend parameters")?;

	let artifacts = point.artifacts();
	fs::create_dir_all(&artifacts.dir)
		.with_context(|| format!("Unable to create output directory {:?}", artifacts.dir))?;
	config.save(&artifacts.config).context("Unable to save modified config")?;

	let output = fs::File::create(&artifacts.output)
		.with_context(|| format!("Unable to create output file {:?}", artifacts.output))?;
	let error = fs::File::create(&artifacts.error)
		.with_context(|| format!("Unable to create error file {:?}", artifacts.error))?;

	tracing::trace!(?binary, config = ?artifacts.config, "Spawning simulator");
	let status = process::Command::new(binary)
		.arg("-f")
		.arg(&artifacts.config)
		.stdin(process::Stdio::null())
		.stdout(output)
		.stderr(error)
		.status()
		.with_context(|| format!("Unable to run simulator {binary:?}"))?;

	Ok(RunOutput { artifacts, status })
}

/// Outcome of a single task
#[derive(Debug)]
pub struct TaskOutcome {
	/// Index of the point, in submission order
	pub idx: usize,

	/// Point
	pub point: SweepPoint,

	/// Result
	pub result: Result<RunOutput, anyhow::Error>,
}

/// Sweep runner
#[derive(Debug)]
pub struct Sweep {
	/// Simulator binary
	binary: Arc<Path>,

	/// Number of workers
	workers: usize,
}

impl Sweep {
	/// Creates a new sweep runner
	pub fn new(binary: impl Into<PathBuf>, workers: usize) -> Self {
		Self {
			binary:  Arc::from(binary.into()),
			workers: workers.max(1),
		}
	}

	/// Runs all `points`, returning once every run finished.
	///
	/// Runs are started in the order of `points`, but their outcomes are
	/// reported as they finish. Failing runs don't stop the sweep.
	pub fn run(&self, points: Vec<SweepPoint>) -> Result<SweepReport, anyhow::Error> {
		let total = points.len();
		tracing::info!("Running {total} tests with {} concurrent threads...", self.workers);

		let pool = rayon::ThreadPoolBuilder::new()
			.num_threads(self.workers)
			.thread_name(|idx| format!("sweep-worker-{idx}"))
			.build()
			.context("Unable to build worker pool")?;

		let (outcome_tx, outcome_rx) = flume::unbounded();
		for (idx, point) in points.into_iter().enumerate() {
			let binary = Arc::clone(&self.binary);
			let outcome_tx = outcome_tx.clone();
			pool.spawn_fifo(move || {
				let result = self::run_point(&binary, &point);

				// Note: The receiver outlives every task, this can't fail
				let _ = outcome_tx.send(TaskOutcome { idx, point, result });
			});
		}
		drop(outcome_tx);

		// Note: The iterator ends once every task dropped its sender.
		let mut report = SweepReport::new(total);
		for outcome in outcome_rx.iter() {
			report.record(outcome);
		}

		tracing::info!("All tests completed! ({}/{total} completed)", report.completed());
		Ok(report)
	}
}

/// Sweep report
#[derive(Debug)]
pub struct SweepReport {
	/// Total number of tasks
	total: usize,

	/// Outcomes, in completion order
	outcomes: Vec<TaskOutcome>,
}

impl SweepReport {
	/// Creates an empty report for `total` tasks
	pub fn new(total: usize) -> Self {
		Self {
			total,
			outcomes: Vec::with_capacity(total),
		}
	}

	/// Records and logs the outcome of a task
	pub fn record(&mut self, outcome: TaskOutcome) {
		let point = &outcome.point;
		match &outcome.result {
			Ok(output) => {
				tracing::info!(
					"Completed {:?}, with config: {:?}",
					output.artifacts.output,
					output.artifacts.config
				);
				match output.passed() {
					true => tracing::info!("Process exited with code 0: passed"),
					false => tracing::warn!(
						"Process exited with {}: failed",
						output
							.exit_code()
							.map_or_else(|| "no exit code".to_owned(), |code| format!("code {code}"))
					),
				}
			},
			Err(err) => tracing::warn!(
				"Test {}, {} generated an error: {err:?}",
				point.nop_count,
				point.read_ratio
			),
		}

		self.outcomes.push(outcome);
		tracing::info!("Progress: {}/{} tests completed", self.completed(), self.total);
	}

	/// Total number of tasks
	pub fn total(&self) -> usize {
		self.total
	}

	/// Number of tasks that ran the simulator to completion, regardless of its exit status
	pub fn completed(&self) -> usize {
		self.outcomes.iter().filter(|outcome| outcome.result.is_ok()).count()
	}

	/// Number of tasks whose simulator exited successfully
	pub fn passed(&self) -> usize {
		self.outcomes
			.iter()
			.filter(|outcome| outcome.result.as_ref().is_ok_and(RunOutput::passed))
			.count()
	}

	/// Number of tasks that couldn't run the simulator
	pub fn errored(&self) -> usize {
		self.outcomes.len() - self.completed()
	}

	/// All outcomes, in completion order
	pub fn outcomes(&self) -> &[TaskOutcome] {
		&self.outcomes
	}

	/// Returns `(spacing count, read ratio, exit code)` of every completed task, in submission order
	pub fn exit_codes(&self) -> Vec<(u64, f64, Option<i32>)> {
		self.outcomes
			.iter()
			.sorted_by_key(|outcome| outcome.idx)
			.filter_map(|outcome| {
				let output = outcome.result.as_ref().ok()?;
				Some((outcome.point.nop_count, outcome.point.read_ratio, output.exit_code()))
			})
			.collect()
	}
}
