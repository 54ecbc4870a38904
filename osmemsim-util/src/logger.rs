//! Logger

// Imports
use {
	std::{
		fs,
		path::Path,
		sync::{Arc, Mutex},
	},
	tracing_subscriber::prelude::*,
};

/// Pre-initialization logging.
///
/// Messages emitted before [`init`] are buffered and re-emitted
/// through `tracing` once the subscriber exists.
pub mod pre_init {
	use super::PRE_INIT_MESSAGES;

	/// Buffers a debug message until the logger is initialized
	pub fn debug(message: String) {
		PRE_INIT_MESSAGES
			.lock()
			.expect("Pre-init message buffer was poisoned")
			.push(message);
	}
}

/// All buffered pre-init messages
static PRE_INIT_MESSAGES: Mutex<Vec<String>> = Mutex::new(Vec::new());

/// Initializes the logger.
///
/// Logs to stderr, filtered by `RUST_LOG`, and, if `log_file` is given,
/// additionally to it, filtered by `RUST_LOG_FILE`.
pub fn init(log_file: Option<&Path>, log_file_append: bool) {
	let stderr_layer = tracing_subscriber::fmt::layer()
		.with_writer(std::io::stderr)
		.with_filter(self::env_filter("RUST_LOG"));

	let file_layer = log_file.and_then(|log_file| {
		let file_res = fs::File::options()
			.create(true)
			.append(log_file_append)
			.truncate(!log_file_append)
			.write(true)
			.open(log_file);

		match file_res {
			Ok(file) => {
				let layer = tracing_subscriber::fmt::layer()
					.with_writer(Arc::new(file))
					.with_ansi(false)
					.with_filter(self::env_filter("RUST_LOG_FILE"));
				Some(layer)
			},
			Err(err) => {
				eprintln!("Unable to open log file {log_file:?}: {err}");
				None
			},
		}
	});

	tracing_subscriber::registry()
		.with(stderr_layer)
		.with(file_layer)
		.init();

	// Then flush everything buffered before we existed
	let messages = std::mem::take(
		&mut *PRE_INIT_MESSAGES
			.lock()
			.expect("Pre-init message buffer was poisoned"),
	);
	for message in messages {
		tracing::debug!(target: "osmemsim::pre_init", "{message}");
	}
}

/// Creates an env-filter from the environment variable `env`
fn env_filter(env: &str) -> tracing_subscriber::EnvFilter {
	tracing_subscriber::EnvFilter::builder()
		.with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
		.with_env_var(env)
		.from_env_lossy()
}
