//! Demand-paged virtual memory

// Imports
use {
	crate::{
		config::VirtualMemoryConfig,
		translate::{PageFault, PageTableEntry, Translation},
	},
	osmemsim_util::round2,
	std::collections::VecDeque,
};

/// Memory access kind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
	Read,
	Write,
}

/// A single memory access
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Access {
	pub address: u64,

	#[serde(rename = "type")]
	pub kind: AccessKind,
}

/// Outcome of a single access
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessOutcome {
	Hit,
	Fault,
}

/// One access-log record
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct AccessRecord {
	pub address:          u64,
	pub page_number:      u64,
	pub offset:           u64,
	pub frame_number:     usize,
	pub physical_address: u64,

	#[serde(rename = "type")]
	pub kind: AccessKind,

	pub result: AccessOutcome,
}

/// Result of a virtual-memory run
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct VirtualMemoryResult {
	pub virtual_size:  u64,
	pub physical_size: u64,
	pub page_size:     u64,

	pub num_virtual_pages:   u64,
	pub num_physical_frames: usize,

	pub total_accesses: usize,
	pub page_hits:      usize,
	pub page_faults:    usize,

	/// Evictions of dirty pages, i.e. write-backs
	pub disk_writes: usize,

	pub hit_rate:   f64,
	pub fault_rate: f64,

	/// Effective access time, in the configured time-units
	pub effective_access_time: f64,

	/// Final page table, one entry per virtual page.
	///
	/// Only resident entries carry a frame number.
	pub page_table: Vec<PageTableEntry>,

	/// Final frame contents: frame index to resident page, if any
	pub frames: Vec<Option<u64>>,

	pub access_log: Vec<AccessRecord>,
}

/// Simulates demand paging over `access_pattern`.
///
/// Nothing is pre-loaded; every first touch of a page faults. When all
/// frames are taken, the page resident longest is evicted (FIFO by load
/// order), and evicting a dirty page counts one disk write.
///
/// # Errors
/// Fails on non-positive sizes, a physical memory smaller than one
/// frame, or an access beyond the virtual address space. Validation
/// happens before any simulation state is built.
pub fn simulate(
	virtual_size: u64,
	physical_size: u64,
	page_size: u64,
	access_pattern: &[Access],
	config: &VirtualMemoryConfig,
) -> Result<VirtualMemoryResult, anyhow::Error> {
	anyhow::ensure!(virtual_size > 0, "Virtual size must be positive");
	anyhow::ensure!(physical_size > 0, "Physical size must be positive");
	anyhow::ensure!(page_size > 0, "Page size must be positive");
	anyhow::ensure!(physical_size >= page_size, "Physical memory must hold at least one frame");
	for access in access_pattern {
		anyhow::ensure!(
			access.address < virtual_size,
			"Access address {:#x} is outside the virtual address space",
			access.address
		);
	}

	let num_virtual_pages = virtual_size.div_ceil(page_size);
	let num_physical_frames = (physical_size / page_size) as usize;

	let mut page_table: Vec<_> = (0..num_virtual_pages).map(PageTableEntry::invalid).collect();
	let mut frames: Vec<Option<u64>> = vec![None; num_physical_frames];
	let mut load_queue: VecDeque<u64> = VecDeque::new();
	let mut next_free_frame = 0;

	let mut access_log = Vec::with_capacity(access_pattern.len());
	let mut page_hits = 0;
	let mut page_faults = 0;
	let mut disk_writes = 0;

	for access in access_pattern {
		let page_number = access.address / page_size;
		let offset = access.address % page_size;

		let entry = &mut page_table[page_number as usize];
		let (frame_number, result) = match entry.valid {
			// Hit
			true => {
				page_hits += 1;
				entry.reference = true;
				if access.kind == AccessKind::Write {
					entry.dirty = true;
				}
				(entry.frame_number.unwrap_or_default(), AccessOutcome::Hit)
			},

			// Fault: load on demand, evicting if no frame is free
			false => {
				page_faults += 1;
				let frame_number = match next_free_frame < num_physical_frames {
					true => {
						let frame_number = next_free_frame;
						next_free_frame += 1;
						frame_number
					},
					false => {
						let victim = load_queue.pop_front().expect("All frames are resident");
						let victim_entry = &mut page_table[victim as usize];
						let frame_number = victim_entry.frame_number.take().expect("Victim was resident");

						if victim_entry.dirty {
							disk_writes += 1;
							tracing::trace!(victim, frame_number, "Writing back dirty page");
						} else {
							tracing::trace!(victim, frame_number, "Evicting clean page");
						}
						victim_entry.valid = false;
						victim_entry.dirty = false;
						victim_entry.reference = false;
						frame_number
					},
				};

				let entry = &mut page_table[page_number as usize];
				entry.frame_number = Some(frame_number);
				entry.valid = true;
				entry.reference = true;
				entry.dirty = access.kind == AccessKind::Write;
				frames[frame_number] = Some(page_number);
				load_queue.push_back(page_number);

				(frame_number, AccessOutcome::Fault)
			},
		};

		access_log.push(AccessRecord {
			address: access.address,
			page_number,
			offset,
			frame_number,
			physical_address: frame_number as u64 * page_size + offset,
			kind: access.kind,
			result,
		});
	}

	let total_accesses = access_pattern.len();
	let (hit_rate, fault_rate) = match total_accesses {
		0 => (0.0, 0.0),
		_ => {
			let hit_rate = 100.0 * page_hits as f64 / total_accesses as f64;
			(hit_rate, 100.0 - hit_rate)
		},
	};
	let effective_access_time =
		hit_rate / 100.0 * config.memory_access_time + fault_rate / 100.0 * config.page_fault_service_time;

	Ok(VirtualMemoryResult {
		virtual_size,
		physical_size,
		page_size,
		num_virtual_pages,
		num_physical_frames,
		total_accesses,
		page_hits,
		page_faults,
		disk_writes,
		hit_rate: round2(hit_rate),
		fault_rate: round2(fault_rate),
		effective_access_time: round2(effective_access_time),
		page_table,
		frames,
		access_log,
	})
}

/// Translates a single logical address against `page_table`.
///
/// Thin wrapper over [`crate::translate::translate`], with the page
/// size validated first.
pub fn translate(
	logical_address: u64,
	page_size: u64,
	page_table: &[PageTableEntry],
) -> Result<Result<Translation, PageFault>, anyhow::Error> {
	anyhow::ensure!(page_size > 0, "Page size must be positive");
	Ok(crate::translate::translate(logical_address, page_size, page_table))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pattern(accesses: &[(u64, AccessKind)]) -> Vec<Access> {
		accesses
			.iter()
			.map(|&(address, kind)| Access { address, kind })
			.collect()
	}

	#[test]
	fn demand_paging_reference_scenario() {
		use AccessKind::{Read, Write};
		let access_pattern = pattern(&[
			(8192, Read),
			(12288, Write),
			(8192, Read),
			(20480, Read),
			(0, Write),
			(8192, Read),
			(4096, Read),
			(20480, Write),
			(12288, Read),
			(16384, Read),
		]);

		let result = simulate(65536, 16384, 4096, &access_pattern, &VirtualMemoryConfig::default())
			.expect("Valid config");

		assert_eq!(result.num_physical_frames, 4);
		assert_eq!(result.page_faults, 6);
		assert_eq!(result.page_hits, 4);
		assert_eq!(result.hit_rate, 40.0);
		assert_eq!(result.disk_writes, 1);
		assert_eq!(result.total_accesses, 10);
	}

	#[test]
	fn effective_access_time_uses_config() {
		let config = VirtualMemoryConfig {
			memory_access_time:      100.0,
			page_fault_service_time: 10_000_000.0,
		};
		// 1 fault, 1 hit
		let result = simulate(8192, 4096, 4096, &pattern(&[(0, AccessKind::Read); 2]), &config)
			.expect("Valid config");
		assert_eq!(result.hit_rate, 50.0);
		assert_eq!(result.effective_access_time, 0.5 * 100.0 + 0.5 * 10_000_000.0);
	}

	#[test]
	fn write_back_only_for_dirty_victims() {
		use AccessKind::{Read, Write};
		// One frame: page 0 written (dirty), evicted by page 1 (write-back),
		// page 1 read only, evicted by page 0 (no write-back)
		let result = simulate(
			3 * 16,
			16,
			16,
			&pattern(&[(0, Write), (16, Read), (0, Read)]),
			&VirtualMemoryConfig::default(),
		)
		.expect("Valid config");
		assert_eq!(result.page_faults, 3);
		assert_eq!(result.disk_writes, 1);
	}

	#[test]
	fn access_log_records_translation() {
		let result = simulate(
			8192,
			4096,
			1024,
			&pattern(&[(1030, AccessKind::Read)]),
			&VirtualMemoryConfig::default(),
		)
		.expect("Valid config");

		let record = &result.access_log[0];
		assert_eq!(record.page_number, 1);
		assert_eq!(record.offset, 6);
		assert_eq!(record.frame_number, 0);
		assert_eq!(record.physical_address, 6);
		assert_eq!(record.result, AccessOutcome::Fault);
	}

	#[test]
	fn empty_access_pattern_yields_zeroes() {
		let result = simulate(4096, 4096, 1024, &[], &VirtualMemoryConfig::default()).expect("Valid config");
		assert_eq!(result.total_accesses, 0);
		assert_eq!(result.hit_rate, 0.0);
		assert_eq!(result.effective_access_time, 0.0);
		assert!(result.access_log.is_empty());
	}

	#[test]
	fn rejects_invalid_config() {
		let config = VirtualMemoryConfig::default();
		assert!(simulate(0, 4096, 1024, &[], &config).is_err());
		assert!(simulate(4096, 0, 1024, &[], &config).is_err());
		assert!(simulate(4096, 4096, 0, &[], &config).is_err());
		// Physical memory smaller than one frame
		assert!(simulate(4096, 512, 1024, &[], &config).is_err());
		// Out-of-range access is rejected eagerly
		let access = Access {
			address: 4096,
			kind:    AccessKind::Read,
		};
		assert!(simulate(4096, 4096, 1024, &[access], &config).is_err());
	}

	#[test]
	fn translate_wrapper_validates_page_size() {
		let table = vec![PageTableEntry::resident(0, 2)];
		assert!(translate(0, 0, &table).is_err());

		let translation = translate(5, 16, &table)
			.expect("Valid page size")
			.expect("Page is resident");
		assert_eq!(translation.physical_address, 2 * 16 + 5);
	}
}
