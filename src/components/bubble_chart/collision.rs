//! Pairwise bubble collisions.
//!
//! One exhaustive pass per frame over every unordered pair. Overlapping bubbles
//! are nudged apart by a fraction of the overlap and swap their velocities with
//! damping, so heavy overlaps resolve over several frames.

use std::f64::consts::PI;

use super::config::{ChartConfig, SEPARATION_FACTOR};
use super::node::BubbleNode;
use super::physics::Body;

/// Tuning for one collision pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionParams {
	/// Factor applied to exchanged velocities.
	pub damping: f64,
	/// Speed floor after an exchange.
	pub min_speed: f64,
	/// Fraction of the half-overlap each bubble moves per pass.
	pub separation: f64,
}

impl From<&ChartConfig> for CollisionParams {
	fn from(config: &ChartConfig) -> Self {
		Self {
			damping: config.collision_damping,
			min_speed: config.min_speed,
			separation: SEPARATION_FACTOR,
		}
	}
}

/// Resolve one pair. Returns true if they overlapped.
pub fn resolve_pair(a: &mut Body, b: &mut Body, params: &CollisionParams) -> bool {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let distance = (dx * dx + dy * dy).sqrt();
	let min_distance = a.radius + b.radius;
	if distance >= min_distance {
		return false;
	}

	// atan2(0, 0) == 0: coincident centers split along x
	let angle = dy.atan2(dx);
	let (sin, cos) = angle.sin_cos();
	let push = (min_distance - distance) / 2.0 * params.separation;
	a.x -= push * cos;
	a.y -= push * sin;
	b.x += push * cos;
	b.y += push * sin;

	let (avx, avy) = (a.vx, a.vy);
	a.vx = b.vx * params.damping;
	a.vy = b.vy * params.damping;
	b.vx = avx * params.damping;
	b.vy = avy * params.damping;

	a.enforce_min_speed(params.min_speed, angle + PI);
	b.enforce_min_speed(params.min_speed, angle);
	true
}

/// Run one pass over every live pair. Returns the number of collisions.
pub fn resolve_collisions<T>(nodes: &mut [BubbleNode<T>], params: &CollisionParams) -> usize {
	let mut hits = 0;
	for i in 0..nodes.len() {
		let (head, tail) = nodes.split_at_mut(i + 1);
		let a = &mut head[i];
		if a.is_destroyed() {
			continue;
		}
		for b in tail.iter_mut().filter(|b| !b.is_destroyed()) {
			if resolve_pair(&mut a.body, &mut b.body, params) {
				hits += 1;
			}
		}
	}
	hits
}
