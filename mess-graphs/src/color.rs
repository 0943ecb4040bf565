//! Series colors

// Imports
use palette::{Mix, Srgb};

/// Read percentage mapped to the start of the scale
pub const MIN_READ_PERCENTAGE: u32 = 50;

/// Read percentage mapped to the end of the scale
pub const MAX_READ_PERCENTAGE: u32 = 100;

/// Returns the color of a series with `read_percentage`% reads, as `#rrggbb`.
///
/// Colors go from blue, at 50% reads, to red, at 100% reads.
pub fn read_percentage_color(read_percentage: u32) -> String {
	let low = Srgb::new(0x00_u8, 0x00, 0xaa).into_format::<f32>();
	let high = Srgb::new(0xaa_u8, 0x00, 0x00).into_format::<f32>();

	let range = (MAX_READ_PERCENTAGE - MIN_READ_PERCENTAGE) as f32;
	let factor = ((read_percentage as f32 - MIN_READ_PERCENTAGE as f32) / range).clamp(0.0, 1.0);

	let Srgb { red, green, blue, .. } = low.mix(high, factor).into_format::<u8>();
	format!("#{red:02x}{green:02x}{blue:02x}")
}
