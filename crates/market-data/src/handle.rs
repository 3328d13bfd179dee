//! Cached, read-only views of a [`Quote`].

use crate::error::MarketDataError;
use crate::quote::{Observer, Quote, QuoteLink};
use crate::Result;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::warn;

#[derive(Debug)]
struct HandleState {
    source: RefCell<QuoteLink>,
    value: Cell<f64>,
}

impl HandleState {
    fn refresh(&self) -> Result<f64> {
        let value = self
            .source
            .borrow()
            .value()
            .ok_or(MarketDataError::DanglingReference)?;
        self.value.set(value);
        Ok(value)
    }
}

impl Observer for HandleState {
    fn update(&self) {
        if self.refresh().is_err() {
            warn!("Handle notified after its source quote was dropped");
        }
    }
}

/// Derived view bound to exactly one [`Quote`].
///
/// The cached value equals the quote's value from construction onwards and is
/// refreshed synchronously by every [`Quote::set_value`]. Pricing code reads
/// [`Handle::value`]; nothing outside the handle writes the cache.
#[derive(Debug)]
pub struct Handle {
    state: Rc<HandleState>,
}

impl Handle {
    /// Bind a new handle to `quote`, registering it and taking the current value.
    pub fn new(quote: &Quote) -> Self {
        let state = Rc::new(HandleState {
            source: RefCell::new(quote.link()),
            value: Cell::new(quote.value()),
        });
        let handle = Self { state };
        quote.register(handle.observer());
        handle
    }

    /// Cached value as of the last refresh.
    pub fn value(&self) -> f64 {
        self.state.value.get()
    }

    /// Pull the source value into the cache.
    ///
    /// Fails with [`MarketDataError::DanglingReference`] once the quote is
    /// gone; the cache keeps its last value in that case.
    pub fn refresh(&self) -> Result<f64> {
        self.state.refresh()
    }

    /// True when the source quote has been dropped.
    pub fn is_dangling(&self) -> bool {
        !self.state.source.borrow().is_alive()
    }

    /// True when this handle is bound to `quote`.
    pub fn is_bound_to(&self, quote: &Quote) -> bool {
        self.state.source.borrow().points_to(quote)
    }

    /// Identity used for registration with a quote's registry.
    pub fn observer(&self) -> Weak<dyn Observer> {
        let weak: Weak<HandleState> = Rc::downgrade(&self.state);
        weak
    }

    /// Move this handle to another quote, typically one rebuilt from storage.
    pub fn rebind(&self, quote: &Quote) {
        let observer = self.observer();
        self.state.source.borrow().unregister(&observer);
        *self.state.source.borrow_mut() = quote.link();
        quote.register(observer);
        self.state.value.set(quote.value());
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        let observer = self.observer();
        self.state.source.borrow().unregister(&observer);
    }
}
