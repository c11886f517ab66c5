use super::style::{Merge, merge_nested, replace};
use super::types::{Color, Size};

/// Fraction of the remaining overlap removed per collision pass.
pub const SEPARATION_FACTOR: f64 = 0.1;
/// Removal progress lost per tick.
pub const REMOVAL_STEP: f64 = 0.05;
/// Progress at or below which a removing bubble is finished.
pub const REMOVAL_EPSILON: f64 = 0.01;
/// Extra radius of the hover ring over the body.
pub const HOVER_RING_GAP: f64 = 1.0;

/// Simulation and rendering parameters shared by every bubble of a chart.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartConfig {
	/// Canvas background.
	pub background: Color,
	/// Canvas background alpha.
	pub background_alpha: f64,
	/// Smooth image scaling on the canvas.
	pub antialias: bool,
	/// Speed given to new bubbles, in pixels per frame.
	pub initial_speed: f64,
	/// Lowest speed a bubble may keep after a collision.
	pub min_speed: f64,
	/// Factor applied to exchanged velocities.
	pub collision_damping: f64,
	/// Area bubbles are confined to.
	pub wrapper_size: Size,
	/// Width of the flash ring.
	pub flash_stroke_width: f64,
	/// Frames per flash pulse.
	pub flash_cycle_time: u32,
	/// Flash ring alpha at the start and end of a pulse.
	pub flash_alpha_min: f64,
	/// Flash ring alpha at the middle of a pulse.
	pub flash_alpha_max: f64,
	/// Bubbles at or below this radius carry no text.
	pub min_text_display_size: f64,
	/// Cap on total bubble area as a fraction of the container; `None` keeps every item.
	pub area_ratio: Option<f64>,
}

impl Default for ChartConfig {
	fn default() -> Self {
		Self {
			background: Color::BLACK,
			background_alpha: 1.0,
			antialias: true,
			initial_speed: 0.8,
			min_speed: 0.5,
			collision_damping: 0.8,
			wrapper_size: Size::default(),
			flash_stroke_width: 5.0,
			flash_cycle_time: 60,
			flash_alpha_min: 0.0,
			flash_alpha_max: 1.0,
			min_text_display_size: 10.0,
			area_ratio: None,
		}
	}
}

impl ChartConfig {
	/// Flash ring alpha after `flash_time` frames of flashing.
	pub fn flash_alpha(&self, flash_time: u32) -> f64 {
		let cycle = self.flash_cycle_time.max(1);
		let phase = (flash_time % cycle) as f64 / cycle as f64;
		let pulse = (std::f64::consts::PI * phase).sin();
		self.flash_alpha_min + (self.flash_alpha_max - self.flash_alpha_min) * pulse
	}
}

/// Partial override for [`ChartConfig`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigPatch {
	/// Replaces the background color.
	pub background: Option<Color>,
	/// Replaces the background alpha.
	pub background_alpha: Option<f64>,
	/// Replaces the antialias flag.
	pub antialias: Option<bool>,
	/// Replaces the initial speed.
	pub initial_speed: Option<f64>,
	/// Replaces the minimum speed.
	pub min_speed: Option<f64>,
	/// Replaces the collision damping.
	pub collision_damping: Option<f64>,
	/// Merged into the wrapper size.
	pub wrapper_size: Option<SizePatch>,
	/// Replaces the flash ring width.
	pub flash_stroke_width: Option<f64>,
	/// Replaces the flash cycle length.
	pub flash_cycle_time: Option<u32>,
	/// Replaces the lower flash alpha.
	pub flash_alpha_min: Option<f64>,
	/// Replaces the upper flash alpha.
	pub flash_alpha_max: Option<f64>,
	/// Replaces the text threshold.
	pub min_text_display_size: Option<f64>,
	/// `Some(None)` turns culling off.
	pub area_ratio: Option<Option<f64>>,
}

impl ConfigPatch {
	/// True when no field is set.
	pub fn is_empty(&self) -> bool {
		*self == ConfigPatch::default()
	}
}

impl Merge for ChartConfig {
	type Patch = ConfigPatch;

	fn merge(&mut self, patch: ConfigPatch) {
		replace(&mut self.background, patch.background);
		replace(&mut self.background_alpha, patch.background_alpha);
		replace(&mut self.antialias, patch.antialias);
		replace(&mut self.initial_speed, patch.initial_speed);
		replace(&mut self.min_speed, patch.min_speed);
		replace(&mut self.collision_damping, patch.collision_damping);
		merge_nested(&mut self.wrapper_size, patch.wrapper_size);
		replace(&mut self.flash_stroke_width, patch.flash_stroke_width);
		replace(&mut self.flash_cycle_time, patch.flash_cycle_time);
		replace(&mut self.flash_alpha_min, patch.flash_alpha_min);
		replace(&mut self.flash_alpha_max, patch.flash_alpha_max);
		replace(&mut self.min_text_display_size, patch.min_text_display_size);
		replace(&mut self.area_ratio, patch.area_ratio);
	}
}

/// Partial override for [`Size`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SizePatch {
	/// Replaces the width.
	pub width: Option<f64>,
	/// Replaces the height.
	pub height: Option<f64>,
}

impl Merge for Size {
	type Patch = SizePatch;

	fn merge(&mut self, patch: SizePatch) {
		replace(&mut self.width, patch.width);
		replace(&mut self.height, patch.height);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn merging_empty_patch_is_identity() {
		let base = ChartConfig {
			area_ratio: Some(0.3),
			wrapper_size: Size::new(640.0, 480.0),
			..ChartConfig::default()
		};
		assert_eq!(base.merged(ConfigPatch::default()), base);
	}

	#[test]
	fn wrapper_size_merges_per_axis() {
		let base = ChartConfig {
			wrapper_size: Size::new(640.0, 480.0),
			..ChartConfig::default()
		};
		let merged = base.merged(ConfigPatch {
			wrapper_size: Some(SizePatch {
				height: Some(200.0),
				..SizePatch::default()
			}),
			..ConfigPatch::default()
		});
		assert_eq!(merged.wrapper_size, Size::new(640.0, 200.0));
	}

	#[test]
	fn area_ratio_can_be_cleared() {
		let base = ChartConfig {
			area_ratio: Some(0.5),
			..ChartConfig::default()
		};
		let merged = base.merged(ConfigPatch {
			area_ratio: Some(None),
			..ConfigPatch::default()
		});
		assert_eq!(merged.area_ratio, None);
	}

	#[test]
	fn flash_alpha_pulses_once_per_cycle() {
		let config = ChartConfig::default();
		assert!(config.flash_alpha(0).abs() < 1e-9);
		assert!((config.flash_alpha(30) - 1.0).abs() < 1e-9);
		assert!(config.flash_alpha(60).abs() < 1e-9);
		assert!((config.flash_alpha(15) - config.flash_alpha(75)).abs() < 1e-9);
	}

	#[test]
	fn flash_alpha_respects_bounds() {
		let config = ChartConfig {
			flash_alpha_min: 0.2,
			flash_alpha_max: 0.6,
			..ChartConfig::default()
		};
		assert!((config.flash_alpha(0) - 0.2).abs() < 1e-9);
		assert!((config.flash_alpha(30) - 0.6).abs() < 1e-9);
	}
}
