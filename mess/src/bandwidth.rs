//! Bandwidth math

/// Memory interface timing
#[derive(PartialEq, Clone, Copy, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Timing {
	/// Clock period, in picoseconds
	pub tck_ps: f64,

	/// Bytes moved by each read or write
	pub bytes_per_transfer: f64,
}

impl Timing {
	/// DDR5-4800 with 64-byte transfers
	pub const DDR5_4800: Self = Self {
		tck_ps:             416.0,
		bytes_per_transfer: 64.0,
	};

	/// Clock frequency, in Hz
	pub fn clock_freq_hz(&self) -> f64 {
		1.0 / (self.tck_ps * 1e-12)
	}

	/// Converts a latency in cycles to nanoseconds
	pub fn cycles_to_ns(&self, cycles: f64) -> f64 {
		cycles * self.tck_ps / 1000.0
	}

	/// Time elapsed over `cycles` cycles, in seconds
	pub fn elapsed_secs(&self, cycles: u64) -> f64 {
		cycles as f64 / self.clock_freq_hz()
	}

	/// Bandwidth of `transfers` transfers over `cycles` cycles, in GB/s
	pub fn bandwidth_gbps(&self, cycles: u64, transfers: u64) -> f64 {
		(self.bytes_per_transfer * transfers as f64 / self.elapsed_secs(cycles)) / 1e9
	}

	/// Average bytes moved per cycle
	pub fn bytes_per_cycle(&self, cycles: u64, transfers: u64) -> f64 {
		self.bytes_per_transfer * transfers as f64 / cycles as f64
	}

	/// Bandwidth of a single channel issuing one transfer every `tccd` cycles, in GB/s
	pub fn tccd_bound_gbps(&self, tccd: u64) -> f64 {
		self.clock_freq_hz() / tccd as f64 * self.bytes_per_transfer / 1e9
	}
}

impl Default for Timing {
	fn default() -> Self {
		Self::DDR5_4800
	}
}

/// Peak bandwidth of a memory system
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct PeakBandwidth {
	/// Data rate, in MT/s
	pub data_rate_mts: f64,

	/// Channel width, in bits
	pub bus_width_bits: f64,

	/// Number of channels
	pub channels: u32,

	/// Cycles lost to each all-bank refresh
	pub refresh_cycles: f64,

	/// Refresh interval (`tREFI`), in nanoseconds
	pub refresh_interval_ns: f64,
}

impl PeakBandwidth {
	/// DDR5-4800 with 32-bit channels
	pub fn ddr5_4800(channels: u32) -> Self {
		Self {
			data_rate_mts: 4800.0,
			bus_width_bits: 32.0,
			channels,
			refresh_cycles: 793.0,
			refresh_interval_ns: 3900.0,
		}
	}

	/// Theoretical peak bandwidth, ignoring refresh, in GB/s
	pub fn theoretical_gbps(&self) -> f64 {
		self.data_rate_mts * self.bus_width_bits / 8.0 / 1000.0 * f64::from(self.channels)
	}

	/// Fraction of time lost to refresh
	pub fn refresh_overhead(&self, timing: &Timing) -> f64 {
		timing.cycles_to_ns(self.refresh_cycles) / self.refresh_interval_ns
	}

	/// Peak bandwidth once refresh is accounted for, in GB/s
	pub fn refresh_derated_gbps(&self, timing: &Timing) -> f64 {
		self.theoretical_gbps() * (1.0 - self.refresh_overhead(timing))
	}
}
