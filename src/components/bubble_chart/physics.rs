use super::types::Size;

/// Position, velocity and radius of a bubble.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Body {
	/// Center x.
	pub x: f64,
	/// Center y.
	pub y: f64,
	/// Velocity x, in pixels per frame.
	pub vx: f64,
	/// Velocity y, in pixels per frame.
	pub vy: f64,
	/// Radius.
	pub radius: f64,
}

/// Clamp `value` into `[radius, extent - radius]`.
///
/// When the extent is narrower than the diameter the lower bound wins, so a
/// bubble too large for its container sits against the top/left edge.
fn clamp_axis(value: f64, radius: f64, extent: f64) -> f64 {
	value.min(extent - radius).max(radius)
}

impl Body {
	/// Speed magnitude.
	pub fn speed(&self) -> f64 {
		(self.vx * self.vx + self.vy * self.vy).sqrt()
	}

	/// Advance the position by one frame of velocity.
	pub fn integrate(&mut self) {
		self.x += self.vx;
		self.y += self.vy;
	}

	/// Reflect off the container walls, per axis, keeping the edge inside.
	pub fn bounce_within(&mut self, bounds: Size) {
		let r = self.radius;
		if self.x < r || self.x > bounds.width - r {
			self.vx = -self.vx;
			self.x = clamp_axis(self.x, r, bounds.width);
		}
		if self.y < r || self.y > bounds.height - r {
			self.vy = -self.vy;
			self.y = clamp_axis(self.y, r, bounds.height);
		}
	}

	/// Pull the position inside `bounds` without touching the velocity.
	pub fn clamp_within(&mut self, bounds: Size) {
		self.x = clamp_axis(self.x, self.radius, bounds.width);
		self.y = clamp_axis(self.y, self.radius, bounds.height);
	}

	/// Rescale the velocity up to `min_speed` if it is slower.
	///
	/// A body at rest has no direction to keep; it is pushed along `fallback_angle`.
	pub fn enforce_min_speed(&mut self, min_speed: f64, fallback_angle: f64) {
		let speed = self.speed();
		if speed >= min_speed {
			return;
		}
		if speed > f64::EPSILON {
			let scale = min_speed / speed;
			self.vx *= scale;
			self.vy *= scale;
		} else {
			self.vx = fallback_angle.cos() * min_speed;
			self.vy = fallback_angle.sin() * min_speed;
		}
	}
}
