//! Trailing-edge debouncing of text-changed notifications.
//!
//! [`Debouncer`] is a plain value driven by explicit instants; it never
//! sleeps. The driver asks [`TriggerSet::next_deadline`] how long to wait and
//! calls [`TriggerSet::take_due`] when that deadline passes.

use std::collections::HashMap;
use std::time::Duration;

use proofmark_primitives::{DocumentId, SubscriptionId};
use tokio::time::Instant;

/// Restartable quiet-period timer.
#[derive(Debug, Clone)]
pub struct Debouncer {
	window: Duration,
	deadline: Option<Instant>,
}

impl Debouncer {
	pub fn new(window: Duration) -> Self {
		Self { window, deadline: None }
	}

	/// Records a notification at `now`, restarting the quiet period.
	pub fn touch(&mut self, now: Instant) {
		self.deadline = Some(now + self.window);
	}

	/// Returns `true` exactly once per quiet period, when `now` has reached
	/// the deadline.
	pub fn fire_if_due(&mut self, now: Instant) -> bool {
		match self.deadline {
			Some(deadline) if now >= deadline => {
				self.deadline = None;
				true
			}
			_ => false,
		}
	}

	pub fn deadline(&self) -> Option<Instant> {
		self.deadline
	}
}

/// Debouncer attached to one document's change subscription.
#[derive(Debug)]
pub struct DebouncedTrigger {
	pub debouncer: Debouncer,
	pub subscription: SubscriptionId,
}

/// All attached triggers, keyed by document.
#[derive(Debug)]
pub struct TriggerSet {
	window: Duration,
	triggers: HashMap<DocumentId, DebouncedTrigger>,
}

impl TriggerSet {
	pub fn new(window: Duration) -> Self {
		Self {
			window,
			triggers: HashMap::new(),
		}
	}

	/// Attaches a trigger for `doc`. Returns the subscription it replaced, which
	/// the caller must release.
	pub fn attach(&mut self, doc: DocumentId, subscription: SubscriptionId) -> Option<SubscriptionId> {
		let trigger = DebouncedTrigger {
			debouncer: Debouncer::new(self.window),
			subscription,
		};
		self.triggers.insert(doc, trigger).map(|old| old.subscription)
	}

	/// Restarts the quiet period for `doc`. Returns `false` if no trigger is
	/// attached.
	pub fn notify(&mut self, doc: DocumentId, now: Instant) -> bool {
		match self.triggers.get_mut(&doc) {
			Some(trigger) => {
				trigger.debouncer.touch(now);
				true
			}
			None => false,
		}
	}

	/// Earliest pending deadline across all documents.
	pub fn next_deadline(&self) -> Option<Instant> {
		self.triggers.values().filter_map(|t| t.debouncer.deadline()).min()
	}

	/// Documents whose quiet period ended at or before `now`, in id order.
	pub fn take_due(&mut self, now: Instant) -> Vec<DocumentId> {
		let mut due: Vec<DocumentId> = self
			.triggers
			.iter_mut()
			.filter_map(|(doc, trigger)| trigger.debouncer.fire_if_due(now).then_some(*doc))
			.collect();
		due.sort_unstable();
		due
	}

	/// Detaches `doc`'s trigger, returning its subscription.
	pub fn detach(&mut self, doc: DocumentId) -> Option<SubscriptionId> {
		self.triggers.remove(&doc).map(|t| t.subscription)
	}

	/// Detaches every trigger, returning their subscriptions.
	pub fn detach_all(&mut self) -> Vec<SubscriptionId> {
		self.triggers.drain().map(|(_, t)| t.subscription).collect()
	}

	pub fn len(&self) -> usize {
		self.triggers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.triggers.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	const WINDOW: Duration = Duration::from_millis(300);

	#[test]
	fn test_fires_once_after_quiet_period() {
		let start = Instant::now();
		let mut debouncer = Debouncer::new(WINDOW);

		debouncer.touch(start);
		assert!(!debouncer.fire_if_due(start + Duration::from_millis(299)));
		assert!(debouncer.fire_if_due(start + WINDOW));
		assert!(!debouncer.fire_if_due(start + Duration::from_secs(5)));
	}

	#[test]
	fn test_touch_restarts_period() {
		let start = Instant::now();
		let mut debouncer = Debouncer::new(WINDOW);

		debouncer.touch(start);
		debouncer.touch(start + Duration::from_millis(200));
		assert!(!debouncer.fire_if_due(start + WINDOW));
		assert_eq!(debouncer.deadline(), Some(start + Duration::from_millis(500)));
		assert!(debouncer.fire_if_due(start + Duration::from_millis(500)));
	}

	#[test]
	fn test_trigger_set_deadlines_and_due() {
		let start = Instant::now();
		let mut set = TriggerSet::new(WINDOW);
		set.attach(DocumentId(2), SubscriptionId(20));
		set.attach(DocumentId(1), SubscriptionId(10));

		assert_eq!(set.next_deadline(), None);
		assert!(set.notify(DocumentId(2), start));
		assert!(set.notify(DocumentId(1), start + Duration::from_millis(100)));
		assert!(!set.notify(DocumentId(3), start));

		assert_eq!(set.next_deadline(), Some(start + WINDOW));
		assert_eq!(set.take_due(start + WINDOW), vec![DocumentId(2)]);
		assert_eq!(set.take_due(start + Duration::from_secs(1)), vec![DocumentId(1)]);
		assert_eq!(set.next_deadline(), None);
	}

	#[test]
	fn test_take_due_orders_by_document() {
		let start = Instant::now();
		let mut set = TriggerSet::new(WINDOW);
		for id in [3, 1, 2] {
			set.attach(DocumentId(id), SubscriptionId(id));
			set.notify(DocumentId(id), start);
		}
		assert_eq!(set.take_due(start + WINDOW), vec![DocumentId(1), DocumentId(2), DocumentId(3)]);
	}

	#[test]
	fn test_attach_replaces_and_detach_all() {
		let mut set = TriggerSet::new(WINDOW);
		assert_eq!(set.attach(DocumentId(1), SubscriptionId(1)), None);
		assert_eq!(set.attach(DocumentId(1), SubscriptionId(2)), Some(SubscriptionId(1)));
		set.attach(DocumentId(2), SubscriptionId(3));

		set.notify(DocumentId(2), Instant::now());
		assert_eq!(set.len(), 2);

		let mut subs = set.detach_all();
		subs.sort_unstable();
		assert_eq!(subs, vec![SubscriptionId(2), SubscriptionId(3)]);
		assert!(set.is_empty());
		assert_eq!(set.next_deadline(), None);
	}

	proptest! {
		/// A burst fires once per gap longer than the window, plus once after
		/// the final notification. A notification landing exactly on the
		/// deadline is handled before the deadline fires.
		#[test]
		fn prop_one_fire_per_quiet_period(gaps in prop::collection::vec(0u64..600, 0..40)) {
			let start = Instant::now();
			let mut debouncer = Debouncer::new(WINDOW);
			let mut now = start;
			let mut fires = 0usize;

			debouncer.touch(now);
			for gap in &gaps {
				let next = now + Duration::from_millis(*gap);
				if let Some(deadline) = debouncer.deadline()
					&& deadline < next
				{
					prop_assert!(debouncer.fire_if_due(deadline));
					fires += 1;
				}
				debouncer.touch(next);
				now = next;
			}
			if let Some(deadline) = debouncer.deadline() {
				prop_assert!(debouncer.fire_if_due(deadline));
				fires += 1;
			}

			let expected = gaps.iter().filter(|g| Duration::from_millis(**g) > WINDOW).count() + 1;
			prop_assert_eq!(fires, expected);
		}
	}
}
