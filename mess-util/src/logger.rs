//! Logger
//!
//! Logging goes to stderr, filtered by `RUST_LOG` (defaults to `info`),
//! and optionally to a file, filtered by `RUST_LOG_FILE` (defaults to `debug`).

// Imports
use {
	std::{
		fs,
		io,
		path::Path,
		sync::Mutex,
	},
	tracing::level_filters::LevelFilter,
	tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer},
};

/// Messages emitted before the logger is initialized
pub mod pre_init {
	// Imports
	use std::sync::Mutex;

	/// Pending messages
	static MESSAGES: Mutex<Vec<(tracing::Level, String)>> = Mutex::new(vec![]);

	/// Queues a debug message
	pub fn debug(msg: impl Into<String>) {
		self::push(tracing::Level::DEBUG, msg.into());
	}

	/// Queues a warning message
	pub fn warn(msg: impl Into<String>) {
		self::push(tracing::Level::WARN, msg.into());
	}

	fn push(level: tracing::Level, msg: String) {
		// Note: A poisoned lock only means another thread panicked mid-push,
		//       the vector itself is still valid.
		let mut messages = MESSAGES.lock().unwrap_or_else(|err| err.into_inner());
		messages.push((level, msg));
	}

	/// Takes all pending messages
	pub(super) fn take() -> Vec<(tracing::Level, String)> {
		let mut messages = MESSAGES.lock().unwrap_or_else(|err| err.into_inner());
		std::mem::take(&mut *messages)
	}
}

/// Initializes the logger.
///
/// If `log_file` is specified, logs are additionally written to it,
/// truncating it unless `log_file_append` is set.
///
/// Calling this more than once leaves the first logger in place.
pub fn init(log_file: Option<&Path>, log_file_append: bool) {
	// Stderr layer
	let stderr_filter = self::env_filter("RUST_LOG", LevelFilter::INFO);
	let stderr_layer = fmt::layer().with_writer(io::stderr).with_filter(stderr_filter);

	// File layer, if any
	let file_layer = log_file.and_then(|log_file| {
		let file = fs::OpenOptions::new()
			.create(true)
			.write(true)
			.append(log_file_append)
			.truncate(!log_file_append)
			.open(log_file);

		match file {
			Ok(file) => {
				let file_filter = self::env_filter("RUST_LOG_FILE", LevelFilter::DEBUG);
				let layer = fmt::layer()
					.with_ansi(false)
					.with_writer(Mutex::new(file))
					.with_filter(file_filter);
				Some(layer)
			},
			Err(err) => {
				pre_init::warn(format!("Unable to open log file {log_file:?}: {err}"));
				None
			},
		}
	});

	if let Err(err) = tracing_subscriber::registry()
		.with(stderr_layer)
		.with(file_layer)
		.try_init()
	{
		eprintln!("Unable to initialize logger: {err}");
	}

	// Finally flush everything logged before we were ready
	for (level, msg) in pre_init::take() {
		match level {
			tracing::Level::WARN => tracing::warn!("{msg}"),
			_ => tracing::debug!("{msg}"),
		}
	}
}

/// Creates an env filter from `var`, falling back to `default`
fn env_filter(var: &str, default: LevelFilter) -> EnvFilter {
	EnvFilter::builder()
		.with_default_directive(default.into())
		.with_env_var(var)
		.from_env_lossy()
}

#[cfg(test)]
mod tests {
	use super::*;

	// Note: Only one test may initialize the global logger.
	#[test]
	fn file_receives_queued_and_live_messages() {
		let dir = tempfile::TempDir::new().unwrap();
		let log_file = dir.path().join("mess.log");
		fs::write(&log_file, "stale contents\n").unwrap();

		pre_init::warn("queued before init");
		self::init(Some(&log_file), false);
		tracing::info!("emitted after init");

		let contents = fs::read_to_string(&log_file).unwrap();
		assert!(!contents.contains("stale contents"), "log file wasn't truncated: {contents}");
		assert!(contents.contains("WARN"), "missing queued warning level: {contents}");
		assert!(contents.contains("queued before init"), "missing queued warning: {contents}");
		assert!(contents.contains("emitted after init"), "missing live message: {contents}");
		assert!(pre_init::take().is_empty());
	}
}
