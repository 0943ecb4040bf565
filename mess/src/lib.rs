//! Memory bandwidth/latency sweep harness (`mess`)
//!
//! Drives an external memory simulator over a matrix of traffic parameters
//! and turns its logs into bandwidth/latency series.

// Modules
pub mod bandwidth;
pub mod label;
pub mod metrics;
pub mod series;
pub mod sim_config;
pub mod sweep;

// Exports
pub use self::{
	bandwidth::{PeakBandwidth, Timing},
	label::RatioLabel,
	metrics::{Latency, LogParser, MetricFields, MetricRecord},
	series::Series,
	sim_config::SimConfig,
	sweep::{Sweep, SweepConfig, SweepPoint, SweepReport},
};
