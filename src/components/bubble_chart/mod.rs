//! Bubble chart: a frame-driven simulation of drifting, colliding bubbles bound
//! to data items, plus the canvas component that draws and drives it.

mod assets;
mod collision;
mod component;
mod config;
mod error;
mod events;
mod handle;
mod node;
mod physics;
mod removal;
mod render;
mod state;
mod style;
mod types;

pub use collision::{CollisionParams, resolve_collisions, resolve_pair};
pub use component::BubbleChartCanvas;
pub use config::{
	ChartConfig, ConfigPatch, HOVER_RING_GAP, REMOVAL_EPSILON, REMOVAL_STEP, SEPARATION_FACTOR,
	SizePatch,
};
pub use error::ChartError;
pub use events::{ChartEvent, EventBus, EventKind, ListenerId};
pub use handle::ChartHandle;
pub use node::{BubbleNode, InteractionState, NodeKey, TickOutcome};
pub use physics::Body;
pub use removal::{BatchRemoval, Removal};
pub use state::BubbleChart;
pub use style::{
	HoverPatch, HoverRule, ImageLayout, ImageLayoutPatch, ImagePatch, ImageRule, Merge, StrokePatch,
	StrokeRule, StyleConfig, StylePatch, StyleValue, TextLayout, TextLayoutPatch, TextPatch, TextRule,
};
pub use types::{
	BubbleDatum, BubbleItem, Color, ImageSpec, RenderDescriptor, Size, StrokeSpec, TextAlign, TextSpec,
};
