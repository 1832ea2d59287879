//! Resolution attempt numbering and cancellation.
//!
//! Every cascade run is numbered by the shared [`AttemptClock`] and carries an
//! [`AttemptToken`]; a newer attempt for the same document cancels the older one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

use crate::host::DocumentId;

/// Monotonic counter shared by every resolution attempt.
#[derive(Debug, Default, Clone)]
pub(crate) struct AttemptClock {
	next: Arc<AtomicU64>,
}

impl AttemptClock {
	/// Returns the next attempt number, starting at 1.
	pub fn next(&self) -> u64 {
		self.next.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
	}
}

/// Identifies one resolution attempt of one document.
///
/// A newer attempt for the same document cancels the older token; work
/// finishing under a cancelled token is stale.
#[derive(Debug, Clone)]
pub(crate) struct AttemptToken {
	document: DocumentId,
	attempt: u64,
	cancel: CancellationToken,
}

impl AttemptToken {
	pub fn new(document: DocumentId, attempt: u64) -> Self {
		Self {
			document,
			attempt,
			cancel: CancellationToken::new(),
		}
	}

	pub const fn document(&self) -> DocumentId {
		self.document
	}

	pub const fn attempt(&self) -> u64 {
		self.attempt
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Future resolving when a newer attempt superseded this one.
	pub async fn cancelled(&self) {
		self.cancel.cancelled().await;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_clock_is_monotonic_across_clones() {
		let clock = AttemptClock::default();
		let other = clock.clone();
		assert_eq!(clock.next(), 1);
		assert_eq!(other.next(), 2);
		assert_eq!(clock.next(), 3);
	}

	#[tokio::test]
	async fn test_cancel_wakes_waiters() {
		let token = AttemptToken::new(DocumentId(7), 1);
		let waiter = token.clone();
		let handle = tokio::spawn(async move { waiter.cancelled().await });

		assert!(!token.is_cancelled());
		token.cancel();
		handle.await.unwrap();
		assert!(token.is_cancelled());
		assert_eq!((token.document(), token.attempt()), (DocumentId(7), 1));
	}
}
