//! Operating-system memory-management simulation engine (`osmemsim`)
//!
//! Deterministically reproduces the behavior of four classic memory
//! subsystems over a described workload: continuous allocation, paging
//! and segmentation, page replacement, and demand-paged virtual memory.
//!
//! Every simulation is a pure function of its inputs: working state is
//! allocated per call and discarded with the result, so independent
//! invocations may run concurrently without coordination.

// Modules
pub mod alloc;
pub mod compare;
pub mod config;
pub mod paging;
pub mod replacement;
pub mod translate;
pub mod virtual_mem;
pub mod workload;

// Exports
pub use self::{
	alloc::{FitAlgorithm, PartitionKind, Process},
	config::Config,
	paging::{Mode, Segment},
	replacement::Algorithm,
	translate::{PageFault, PageTableEntry, Translation},
	virtual_mem::{Access, AccessKind},
};
