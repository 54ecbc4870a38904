//! Operating-system memory-management simulation engine (`osmemsim`)

// Modules
mod args;
mod request;

// Imports
use {
	self::args::{Args, SubCmd, WorkloadKind},
	anyhow::Context,
	clap::Parser,
	osmemsim::{workload, Config},
	osmemsim_util::{logger, BytesDisplay},
	serde_json::json,
	std::{fs, io::Write, path::Path},
};

fn main() -> Result<(), anyhow::Error> {
	// Get arguments
	let args = Args::parse();
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	// Then check the sub-command
	match args.sub_cmd {
		SubCmd::Simulate {
			request_file,
			config_file,
			output_file,
		} => {
			// Read the request file
			let request = {
				let request_file = fs::File::open(&request_file).context("Unable to open request file")?;
				serde_json::from_reader::<_, request::Request>(request_file).context("Unable to parse request file")?
			};
			tracing::debug!(?request, "Parsed request");

			// Read the config file, if any
			let config = match &config_file {
				Some(config_file) => {
					let config_file = fs::File::open(config_file).context("Unable to open config file")?;
					serde_json::from_reader::<_, Config>(config_file).context("Unable to parse config file")?
				},
				None => Config::default(),
			};

			// Run the simulation and write the result
			let result = request::handle(request, &config).context("Unable to run simulation")?;
			self::write_json(&result, output_file.as_deref()).context("Unable to write result")?;
		},

		SubCmd::Generate { kind, output_file } => {
			let mut rng = rand::thread_rng();
			let request = match kind {
				WorkloadKind::Allocation => {
					let memory_size = 1000;
					tracing::debug!(memory = %BytesDisplay(memory_size), "Generating allocation request");
					json!({
						"component": "allocation",
						"memory_size": memory_size,
						"processes": workload::sample_processes(&mut rng, 5, 50, 300),
						"partition_type": "variable",
						"algorithm": "first_fit",
					})
				},
				WorkloadKind::Segmentation => json!({
					"component": "segmentation",
					"memory_size": 4096,
					"segments": workload::sample_segments(&mut rng, 4, 256, 1024),
				}),
				WorkloadKind::Replacement => json!({
					"component": "replacement",
					"algorithm": "fifo",
					"reference_string": workload::sample_reference_string(&mut rng, 20, 9),
					"frame_count": 3,
				}),
				WorkloadKind::VirtualMemory => {
					let virtual_size = 65536;
					tracing::debug!(memory = %BytesDisplay(virtual_size), "Generating virtual-memory request");
					json!({
						"component": "virtual_memory",
						"virtual_size": virtual_size,
						"physical_size": 16384,
						"page_size": 4096,
						"access_pattern": workload::sample_access_pattern(&mut rng, 20, virtual_size),
					})
				},
			};

			self::write_json(&request, output_file.as_deref()).context("Unable to write request")?;
		},
	}

	Ok(())
}

/// Writes `value` as pretty JSON to `output_file`, or stdout if none
fn write_json(value: &serde_json::Value, output_file: Option<&Path>) -> Result<(), anyhow::Error> {
	match output_file {
		Some(output_file) => {
			let output_file = fs::File::create(output_file).context("Unable to create output file")?;
			serde_json::to_writer_pretty(output_file, value).context("Unable to write to output file")?;
		},
		None => {
			let stdout = std::io::stdout();
			let mut stdout = stdout.lock();
			serde_json::to_writer_pretty(&mut stdout, value).context("Unable to write to stdout")?;
			writeln!(stdout).context("Unable to write to stdout")?;
		},
	}

	Ok(())
}
