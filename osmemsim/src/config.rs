//! Configuration

/// Configuration
#[derive(Clone, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Config {
	/// Virtual memory timing configuration
	#[serde(default)]
	pub virtual_memory: VirtualMemoryConfig,
}

/// Virtual memory timing configuration.
///
/// The constants feed the effective-access-time formula
/// `EAT = hit_rate * memory_access_time + fault_rate * page_fault_service_time`.
/// They're instrumentation knobs, not algorithmic invariants; the
/// defaults follow textbook EAT modeling.
#[derive(Clone, Copy, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct VirtualMemoryConfig {
	/// Cost of a plain memory access, in time-units
	#[serde(default = "VirtualMemoryConfig::default_memory_access_time")]
	pub memory_access_time: f64,

	/// Cost of servicing a page fault, in time-units
	#[serde(default = "VirtualMemoryConfig::default_page_fault_service_time")]
	pub page_fault_service_time: f64,
}

impl VirtualMemoryConfig {
	fn default_memory_access_time() -> f64 {
		100.0
	}

	fn default_page_fault_service_time() -> f64 {
		10_000_000.0
	}
}

impl Default for VirtualMemoryConfig {
	fn default() -> Self {
		Self {
			memory_access_time:      Self::default_memory_access_time(),
			page_fault_service_time: Self::default_page_fault_service_time(),
		}
	}
}
