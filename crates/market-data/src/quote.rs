//! Source quotes and their observer fan-out.
//!
//! A [`Quote`] is the single source of truth for a scalar market value. Every
//! dependent registers with the quote's [`ObserverRegistry`] and is updated
//! synchronously inside [`Quote::set_value`].
//!
//! Both directions of the graph are weak:
//!
//! ```text
//!   Quote ──owns──▶ QuoteCell ──holds──▶ ObserverRegistry ──Weak──▶ observers
//!                       ▲                                             │
//!                       └──────────────── Weak (QuoteLink) ───────────┘
//! ```
//!
//! The quote never keeps a dependent alive, and a dependent never keeps the
//! quote alive. The graph is single-threaded (`Rc`/`Cell`), so it is `!Send`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::trace;

/// A dependent notified whenever a source quote changes value.
pub trait Observer {
    /// Called synchronously after the source value changed.
    fn update(&self);
}

fn observer_addr(observer: &Weak<dyn Observer>) -> *const () {
    observer.as_ptr() as *const ()
}

/// Fan-out list of weakly held observers.
///
/// Membership is unique by identity. Notification walks a copy of the
/// membership taken when notification starts, so observers may register or
/// unregister (themselves included) from inside [`Observer::update`].
#[derive(Default)]
pub struct ObserverRegistry {
    members: RefCell<Vec<Weak<dyn Observer>>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer. Returns `false` if it was already registered.
    pub fn register(&self, observer: Weak<dyn Observer>) -> bool {
        let mut members = self.members.borrow_mut();
        let addr = observer_addr(&observer);
        if members.iter().any(|m| observer_addr(m) == addr) {
            return false;
        }
        members.push(observer);
        true
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unregister(&self, observer: &Weak<dyn Observer>) -> bool {
        let mut members = self.members.borrow_mut();
        let addr = observer_addr(observer);
        let before = members.len();
        members.retain(|m| observer_addr(m) != addr);
        members.len() != before
    }

    pub fn contains(&self, observer: &Weak<dyn Observer>) -> bool {
        let addr = observer_addr(observer);
        self.members.borrow().iter().any(|m| observer_addr(m) == addr)
    }

    /// Number of registered observers that are still alive.
    pub fn len(&self) -> usize {
        self.members
            .borrow()
            .iter()
            .filter(|m| m.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Update every observer registered at the time of the call, in
    /// registration order. Dropped observers are pruned afterwards.
    pub fn notify(&self) {
        let snapshot: Vec<Weak<dyn Observer>> = self.members.borrow().clone();
        trace!(observers = snapshot.len(), "Notifying observers");

        for member in &snapshot {
            if let Some(observer) = member.upgrade() {
                observer.update();
            }
        }

        self.members.borrow_mut().retain(|m| m.strong_count() > 0);
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("members", &self.members.borrow().len())
            .finish()
    }
}

/// Shared state behind a [`Quote`].
#[derive(Debug)]
pub(crate) struct QuoteCell {
    value: Cell<f64>,
    observers: ObserverRegistry,
}

/// Mutable scalar source value.
///
/// Not `Clone`: a quote has exactly one owner, and dropping it invalidates
/// every [`QuoteLink`] taken from it.
#[derive(Debug)]
pub struct Quote {
    cell: Rc<QuoteCell>,
}

impl Quote {
    pub fn new(value: f64) -> Self {
        Self {
            cell: Rc::new(QuoteCell {
                value: Cell::new(value),
                observers: ObserverRegistry::new(),
            }),
        }
    }

    pub fn value(&self) -> f64 {
        self.cell.value.get()
    }

    /// Store a new value and notify every registered observer.
    ///
    /// A value bit-for-bit equal to the stored one is ignored, so observers
    /// are not woken for no-op writes.
    pub fn set_value(&self, value: f64) {
        if self.cell.value.get().to_bits() == value.to_bits() {
            return;
        }
        self.cell.value.set(value);
        self.cell.observers.notify();
    }

    pub fn register(&self, observer: Weak<dyn Observer>) -> bool {
        self.cell.observers.register(observer)
    }

    pub fn unregister(&self, observer: &Weak<dyn Observer>) -> bool {
        self.cell.observers.unregister(observer)
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.cell.observers
    }

    /// Non-owning link to this quote.
    pub fn link(&self) -> QuoteLink {
        QuoteLink {
            cell: Rc::downgrade(&self.cell),
        }
    }
}

impl Default for Quote {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quote({})", self.value())
    }
}

// Only the scalar is persisted; observers re-register on reconstruction.
impl Serialize for Quote {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value())
    }
}

impl<'de> Deserialize<'de> for Quote {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(Quote::new(value))
    }
}

/// Weak reference to a [`Quote`] held by its dependents.
///
/// Every accessor returns `None`/`false` once the quote has been dropped.
#[derive(Debug, Clone)]
pub struct QuoteLink {
    cell: Weak<QuoteCell>,
}

impl QuoteLink {
    pub fn is_alive(&self) -> bool {
        self.cell.strong_count() > 0
    }

    pub fn value(&self) -> Option<f64> {
        self.cell.upgrade().map(|cell| cell.value.get())
    }

    pub fn register(&self, observer: Weak<dyn Observer>) -> bool {
        match self.cell.upgrade() {
            Some(cell) => cell.observers.register(observer),
            None => false,
        }
    }

    pub fn unregister(&self, observer: &Weak<dyn Observer>) -> bool {
        match self.cell.upgrade() {
            Some(cell) => cell.observers.unregister(observer),
            None => false,
        }
    }

    /// Check whether this link points at `quote`.
    pub fn points_to(&self, quote: &Quote) -> bool {
        Weak::as_ptr(&self.cell) == Rc::as_ptr(&quote.cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        hits: Cell<usize>,
    }

    impl Observer for Counter {
        fn update(&self) {
            self.hits.set(self.hits.get() + 1);
        }
    }

    fn counter() -> Rc<Counter> {
        Rc::new(Counter { hits: Cell::new(0) })
    }

    fn weak(observer: &Rc<Counter>) -> Weak<dyn Observer> {
        let weak: Weak<Counter> = Rc::downgrade(observer);
        weak
    }

    /// Unregisters itself from its source on the first update.
    struct OneShot {
        source: QuoteLink,
        this: Weak<OneShot>,
        hits: Cell<usize>,
    }

    impl Observer for OneShot {
        fn update(&self) {
            self.hits.set(self.hits.get() + 1);
            let this: Weak<dyn Observer> = self.this.clone();
            self.source.unregister(&this);
        }
    }

    /// Registers a new observer on the first update.
    struct Recruiter {
        source: QuoteLink,
        recruit: Weak<dyn Observer>,
    }

    impl Observer for Recruiter {
        fn update(&self) {
            self.source.register(self.recruit.clone());
        }
    }

    #[test]
    fn test_set_value_notifies() {
        let quote = Quote::new(1.0);
        let observer = counter();
        quote.register(weak(&observer));

        quote.set_value(2.0);
        quote.set_value(3.0);

        assert_eq!(quote.value(), 3.0);
        assert_eq!(observer.hits.get(), 2);
    }

    #[test]
    fn test_equal_value_is_noop() {
        let quote = Quote::new(1.0);
        let observer = counter();
        quote.register(weak(&observer));

        quote.set_value(1.0);
        assert_eq!(observer.hits.get(), 0);
    }

    #[test]
    fn test_negative_zero_is_a_change() {
        let quote = Quote::new(0.0);
        let observer = counter();
        quote.register(weak(&observer));

        quote.set_value(-0.0);
        assert_eq!(observer.hits.get(), 1);
        assert!(quote.value().is_sign_negative());
    }

    #[test]
    fn test_register_is_idempotent() {
        let quote = Quote::new(1.0);
        let observer = counter();

        assert!(quote.register(weak(&observer)));
        assert!(!quote.register(weak(&observer)));
        assert_eq!(quote.observers().len(), 1);

        quote.set_value(5.0);
        assert_eq!(observer.hits.get(), 1);
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let quote = Quote::new(1.0);
        let observer = counter();

        assert!(!quote.unregister(&weak(&observer)));
        quote.register(weak(&observer));
        assert!(quote.unregister(&weak(&observer)));
        assert!(!quote.unregister(&weak(&observer)));

        quote.set_value(2.0);
        assert_eq!(observer.hits.get(), 0);
    }

    #[test]
    fn test_observer_can_unregister_itself_during_notify() {
        let quote = Quote::new(1.0);
        let first = counter();
        let one_shot = Rc::new_cyclic(|this| OneShot {
            source: quote.link(),
            this: this.clone(),
            hits: Cell::new(0),
        });
        let last = counter();

        quote.register(weak(&first));
        let one_shot_weak: Weak<OneShot> = Rc::downgrade(&one_shot);
        quote.register(one_shot_weak);
        quote.register(weak(&last));

        quote.set_value(2.0);
        assert_eq!(first.hits.get(), 1);
        assert_eq!(one_shot.hits.get(), 1);
        assert_eq!(last.hits.get(), 1);
        assert_eq!(quote.observers().len(), 2);

        quote.set_value(3.0);
        assert_eq!(first.hits.get(), 2);
        assert_eq!(one_shot.hits.get(), 1);
        assert_eq!(last.hits.get(), 2);
    }

    #[test]
    fn test_observer_registered_during_notify_waits_for_next_change() {
        let quote = Quote::new(1.0);
        let recruit = counter();
        let recruiter = Rc::new(Recruiter {
            source: quote.link(),
            recruit: weak(&recruit),
        });
        let recruiter_weak: Weak<Recruiter> = Rc::downgrade(&recruiter);
        quote.register(recruiter_weak);

        quote.set_value(2.0);
        assert_eq!(recruit.hits.get(), 0);
        assert_eq!(quote.observers().len(), 2);

        quote.set_value(3.0);
        assert_eq!(recruit.hits.get(), 1);
    }

    #[test]
    fn test_dropped_observer_is_pruned() {
        let quote = Quote::new(1.0);
        let kept = counter();
        quote.register(weak(&kept));
        {
            let gone = counter();
            quote.register(weak(&gone));
        }

        assert_eq!(quote.observers().len(), 1);
        quote.set_value(2.0);
        assert_eq!(kept.hits.get(), 1);
    }

    #[test]
    fn test_link_goes_dead_with_quote() {
        let quote = Quote::new(7.5);
        let link = quote.link();
        assert!(link.is_alive());
        assert!(link.points_to(&quote));
        assert_eq!(link.value(), Some(7.5));

        drop(quote);
        assert!(!link.is_alive());
        assert_eq!(link.value(), None);
        assert!(!link.register(weak(&counter())));
    }

    #[test]
    fn test_quote_serializes_scalar_only() {
        let quote = Quote::new(101.25);
        let observer = counter();
        quote.register(weak(&observer));

        let json = serde_json::to_string(&quote).unwrap();
        assert_eq!(json, "101.25");

        let restored: Quote = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.value(), 101.25);
        assert!(restored.observers().is_empty());
    }
}
