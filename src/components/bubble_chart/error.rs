use thiserror::Error;

/// Recoverable failures of chart operations. None of them are fatal to the chart;
/// public operations log them and report a `false`/empty result.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChartError {
	/// No live bubble carries this id.
	#[error("bubble with id {0} not found")]
	UnknownBubble(String),
	/// `update_bubble_style` got a patch with no fields set.
	#[error("no style configuration provided for bubble {0}")]
	EmptyStyle(String),
	/// The bubble is already shrinking away.
	#[error("bubble with id {0} is already being removed")]
	AlreadyRemoving(String),
	/// An image could not be loaded; the bubble is drawn without it.
	#[error("error loading image {url}")]
	ImageLoad {
		/// Image URL.
		url: String,
	},
}
