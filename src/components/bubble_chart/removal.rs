//! Completion signals for animated bubble removal.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use super::node::NodeKey;

/// Resolves once a removal animation finishes: `true` if the bubble was removed,
/// `false` if it was not found or the chart dropped it first.
#[must_use = "removal runs regardless; the future only reports completion"]
pub struct Removal {
	rx: oneshot::Receiver<bool>,
}

impl Removal {
	pub(crate) fn pending() -> (oneshot::Sender<bool>, Self) {
		let (tx, rx) = oneshot::channel();
		(tx, Self { rx })
	}

	pub(crate) fn resolved(removed: bool) -> Self {
		let (tx, rx) = oneshot::channel();
		let _ = tx.send(removed);
		Self { rx }
	}

	/// Result if the removal already completed.
	pub fn try_result(&mut self) -> Option<bool> {
		match self.rx.try_recv() {
			Ok(result) => result,
			Err(oneshot::Canceled) => Some(false),
		}
	}
}

impl Future for Removal {
	type Output = bool;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
		Pin::new(&mut self.rx)
			.poll(cx)
			.map(|result| result.unwrap_or(false))
	}
}

/// Resolves to the ids that were actually removed, in request order.
#[must_use = "removal runs regardless; the future only reports completion"]
pub struct BatchRemoval {
	rx: oneshot::Receiver<Vec<String>>,
}

impl BatchRemoval {
	/// Result if every removal in the batch already completed.
	pub fn try_result(&mut self) -> Option<Vec<String>> {
		match self.rx.try_recv() {
			Ok(result) => result,
			Err(oneshot::Canceled) => Some(Vec::new()),
		}
	}
}

impl Future for BatchRemoval {
	type Output = Vec<String>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Vec<String>> {
		Pin::new(&mut self.rx)
			.poll(cx)
			.map(|result| result.unwrap_or_default())
	}
}

/// Ids still to be removed one after another.
pub(crate) struct RemovalBatch {
	pub(crate) queue: VecDeque<String>,
	pub(crate) removed: Vec<String>,
	pub(crate) current: Option<(NodeKey, String)>,
	done: Option<oneshot::Sender<Vec<String>>>,
}

impl RemovalBatch {
	pub(crate) fn new(ids: Vec<String>) -> (Self, BatchRemoval) {
		let (tx, rx) = oneshot::channel();
		let batch = Self {
			queue: ids.into(),
			removed: Vec::new(),
			current: None,
			done: Some(tx),
		};
		(batch, BatchRemoval { rx })
	}

	/// Resolve the batch with whatever was removed so far.
	pub(crate) fn finish(mut self) {
		if let Some(done) = self.done.take() {
			let _ = done.send(std::mem::take(&mut self.removed));
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures::FutureExt;

	#[test]
	fn resolved_removal_is_ready() {
		assert_eq!(Removal::resolved(false).now_or_never(), Some(false));
		assert_eq!(Removal::resolved(true).now_or_never(), Some(true));
	}

	#[test]
	fn dropped_sender_reads_as_not_removed() {
		let (tx, mut removal) = Removal::pending();
		assert_eq!(removal.try_result(), None);
		drop(tx);
		assert_eq!(removal.try_result(), Some(false));
	}

	#[test]
	fn finished_batch_reports_removed_ids() {
		let (mut batch, handle) = RemovalBatch::new(vec!["a".into(), "b".into()]);
		assert_eq!(batch.queue.len(), 2);
		batch.removed.push("b".into());
		batch.finish();
		assert_eq!(handle.now_or_never(), Some(vec![String::from("b")]));
	}
}
