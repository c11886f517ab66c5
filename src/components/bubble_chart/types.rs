/// Data that can be bound to a bubble with the stock style rules.
///
/// The default [`StyleConfig`](super::StyleConfig) reads the bubble id, the main
/// label and the secondary label through this trait. Custom style rules may ignore
/// it entirely.
pub trait BubbleDatum: Clone + 'static {
	/// Stable identifier for the bubble bound to this item.
	fn id(&self) -> String;
	/// Main text shown in the bubble.
	fn label(&self) -> String;
	/// Secondary text shown under the main label.
	fn value_label(&self) -> String;
}

/// Stock data item used by the demo page.
#[derive(Clone, Debug, PartialEq)]
pub struct BubbleItem {
	/// Identifier.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Numeric value shown as secondary text.
	pub value: f64,
	/// Optional per-item radius.
	pub size: Option<f64>,
	/// Optional per-item color.
	pub color: Option<Color>,
	/// Optional image URL.
	pub image: Option<String>,
}

impl BubbleItem {
	/// Item with only the required fields set.
	pub fn new(id: impl Into<String>, name: impl Into<String>, value: f64) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			value,
			size: None,
			color: None,
			image: None,
		}
	}
}

impl BubbleDatum for BubbleItem {
	fn id(&self) -> String {
		self.id.clone()
	}

	fn label(&self) -> String {
		self.name.clone()
	}

	fn value_label(&self) -> String {
		self.value.to_string()
	}
}

/// Width and height of the area bubbles are confined to.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
	/// Width in CSS pixels.
	pub width: f64,
	/// Height in CSS pixels.
	pub height: f64,
}

impl Size {
	/// Size from width and height.
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// Surface area.
	pub fn area(&self) -> f64 {
		self.width * self.height
	}
}

/// 24-bit RGB color, written `0xRRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
	/// Opaque black.
	pub const BLACK: Color = Color(0x000000);
	/// Opaque white.
	pub const WHITE: Color = Color(0xffffff);

	/// Red, green and blue channels.
	pub fn channels(self) -> (u8, u8, u8) {
		(
			((self.0 >> 16) & 0xff) as u8,
			((self.0 >> 8) & 0xff) as u8,
			(self.0 & 0xff) as u8,
		)
	}

	/// CSS `rgba(...)` string with the given alpha.
	pub fn to_rgba(self, alpha: f64) -> String {
		let (r, g, b) = self.channels();
		format!("rgba({}, {}, {}, {})", r, g, b, alpha.clamp(0.0, 1.0))
	}

	/// CSS hex string.
	pub fn to_hex(self) -> String {
		format!("#{:06x}", self.0 & 0xffffff)
	}
}

/// Horizontal text alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
	/// Left aligned.
	Left,
	/// Centered.
	#[default]
	Center,
	/// Right aligned.
	Right,
}

impl TextAlign {
	/// Canvas `textAlign` value.
	pub fn as_str(self) -> &'static str {
		match self {
			TextAlign::Left => "left",
			TextAlign::Center => "center",
			TextAlign::Right => "right",
		}
	}
}

/// A ring stroked around the bubble center.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeSpec {
	/// Ring radius, relative to the unscaled bubble.
	pub radius: f64,
	/// Line width.
	pub width: f64,
	/// Line color.
	pub color: Color,
	/// Line alpha in \[0, 1\].
	pub alpha: f64,
}

/// A text glyph run laid out inside a bubble.
#[derive(Clone, Debug, PartialEq)]
pub struct TextSpec {
	/// Text to draw.
	pub text: String,
	/// Font size in pixels.
	pub font_size: f64,
	/// Font family.
	pub font_family: String,
	/// Fill color.
	pub fill: Color,
	/// Horizontal alignment.
	pub align: TextAlign,
	/// Vertical offset from the bubble center.
	pub y_offset: f64,
}

/// An image drawn inside a bubble.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageSpec {
	/// Source URL, resolved by the asset loader.
	pub url: String,
	/// Square edge length of the drawn image.
	pub size: f64,
	/// Vertical offset of the image center from the bubble center.
	pub y_offset: f64,
	/// Radius of the circular mask, when clipping is on.
	pub mask_radius: Option<f64>,
}

/// Everything the render backend needs to draw one bubble.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderDescriptor {
	/// Center x.
	pub x: f64,
	/// Center y.
	pub y: f64,
	/// Unscaled radius.
	pub radius: f64,
	/// Body color.
	pub fill_color: Color,
	/// Hover and flash rings, drawn under the body.
	pub strokes: Vec<StrokeSpec>,
	/// Main and secondary labels.
	pub texts: Vec<TextSpec>,
	/// Optional image.
	pub image: Option<ImageSpec>,
	/// Uniform scale applied around the center.
	pub scale: f64,
}
