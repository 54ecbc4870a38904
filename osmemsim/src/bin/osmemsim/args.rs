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

	/// Sub-command
	#[clap(subcommand)]
	pub sub_cmd: SubCmd,
}

/// Sub-command
#[derive(Debug)]
#[derive(clap::Subcommand)]
pub enum SubCmd {
	/// Runs the simulation described by a JSON request file
	Simulate {
		/// Request file
		request_file: PathBuf,

		/// Config file
		#[clap(long = "config")]
		config_file: Option<PathBuf>,

		/// Output file (defaults to stdout)
		#[clap(long = "output")]
		output_file: Option<PathBuf>,
	},

	/// Generates a sample request file
	Generate {
		/// Kind of request to generate
		#[clap(value_enum)]
		kind: WorkloadKind,

		/// Output file (defaults to stdout)
		#[clap(long = "output")]
		output_file: Option<PathBuf>,
	},
}

/// Kind of sample workload
#[derive(Clone, Copy, Debug)]
#[derive(clap::ValueEnum)]
pub enum WorkloadKind {
	Allocation,
	Segmentation,
	Replacement,
	VirtualMemory,
}
