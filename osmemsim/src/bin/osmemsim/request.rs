//! Simulation requests
//!
//! The transport boundary: a `component`-tagged JSON object is
//! deserialized into the [`Request`] enum once, here, and dispatched to
//! the engine as plain typed calls.

// Imports
use {
	osmemsim::{
		alloc,
		compare,
		paging,
		replacement,
		translate::PageTableEntry,
		virtual_mem,
		Access,
		Algorithm,
		Config,
		FitAlgorithm,
		PartitionKind,
		Process,
		Segment,
	},
	serde_json::json,
};

/// A simulation request
#[derive(Debug)]
#[derive(serde::Deserialize)]
#[serde(tag = "component", rename_all = "snake_case")]
pub enum Request {
	/// Continuous allocation, one algorithm
	Allocation {
		memory_size:    u64,
		processes:      Vec<Process>,
		partition_type: PartitionKind,
		algorithm:      FitAlgorithm,
	},

	/// Continuous allocation, all algorithms compared
	AllocationCompare {
		memory_size:    u64,
		processes:      Vec<Process>,
		partition_type: PartitionKind,
	},

	/// Fixed-size paging of a single process
	Paging {
		memory_size:  u64,
		process_size: u64,
		page_size:    u64,
	},

	/// Variable-size segmentation
	Segmentation { memory_size: u64, segments: Vec<Segment> },

	/// Paging and segmentation compared over the same memory
	PagingCompare {
		memory_size:  u64,
		process_size: u64,
		page_size:    u64,
		segments:     Vec<Segment>,
	},

	/// Page replacement, one algorithm
	Replacement {
		algorithm:        Algorithm,
		reference_string: Vec<u64>,
		frame_count:      usize,
	},

	/// Page replacement, all algorithms compared
	ReplacementCompare {
		reference_string: Vec<u64>,
		frame_count:      usize,
	},

	/// Demand-paged virtual memory
	VirtualMemory {
		virtual_size:   u64,
		physical_size:  u64,
		page_size:      u64,
		access_pattern: Vec<Access>,
	},

	/// Single address translation against a supplied page table
	Translate {
		logical_address: u64,
		page_size:       u64,
		page_table:      Vec<PageTableEntry>,
	},
}

/// Handles `request`, returning the result as a JSON value
pub fn handle(request: Request, config: &Config) -> Result<serde_json::Value, anyhow::Error> {
	let result = match request {
		Request::Allocation {
			memory_size,
			processes,
			partition_type,
			algorithm,
		} => serde_json::to_value(alloc::simulate(memory_size, &processes, partition_type, algorithm)?)?,

		Request::AllocationCompare {
			memory_size,
			processes,
			partition_type,
		} => serde_json::to_value(compare::compare_allocation(memory_size, &processes, partition_type)?)?,

		Request::Paging {
			memory_size,
			process_size,
			page_size,
		} => serde_json::to_value(paging::simulate_paging(memory_size, process_size, page_size)?)?,

		Request::Segmentation { memory_size, segments } =>
			serde_json::to_value(paging::simulate_segmentation(memory_size, &segments)?)?,

		Request::PagingCompare {
			memory_size,
			process_size,
			page_size,
			segments,
		} => serde_json::to_value(compare::compare_paging_segmentation(
			memory_size,
			process_size,
			page_size,
			&segments,
		)?)?,

		Request::Replacement {
			algorithm,
			reference_string,
			frame_count,
		} => serde_json::to_value(replacement::simulate(algorithm, &reference_string, frame_count)?)?,

		Request::ReplacementCompare {
			reference_string,
			frame_count,
		} => serde_json::to_value(compare::compare_replacement(&reference_string, frame_count)?)?,

		Request::VirtualMemory {
			virtual_size,
			physical_size,
			page_size,
			access_pattern,
		} => serde_json::to_value(virtual_mem::simulate(
			virtual_size,
			physical_size,
			page_size,
			&access_pattern,
			&config.virtual_memory,
		)?)?,

		// A failed translation is a simulated page fault, not an engine
		// error, so both outcomes serialize as a result
		Request::Translate {
			logical_address,
			page_size,
			page_table,
		} => match virtual_mem::translate(logical_address, page_size, &page_table)? {
			Ok(translation) => {
				let mut value = serde_json::to_value(translation)?;
				value
					.as_object_mut()
					.expect("Translation serializes as an object")
					.insert("success".to_owned(), json!(true));
				value
			},
			Err(fault) => json!({
				"success": false,
				"logical_address": logical_address,
				"page_number": fault.page_number,
				"error": fault.to_string(),
			}),
		},
	};

	Ok(result)
}
