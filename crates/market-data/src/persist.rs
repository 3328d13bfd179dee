//! Keyed persistence of quote values.
//!
//! Only the scalar is stored. Restoring writes through [`Quote::set_value`],
//! so handles bound to the quote pick up the stored value immediately.

use crate::quote::Quote;
use crate::universe::Universe;
use crate::Result;
use storage::KeyedStore;
use tracing::debug;

/// Store `quote`'s value under `key`, replacing any previous value.
pub fn save_quote<S>(store: &S, key: &str, quote: &Quote) -> Result<()>
where
    S: KeyedStore<f64> + ?Sized,
{
    store.upsert(key, quote.value())?;
    Ok(())
}

/// Apply the value stored under `key` to `quote`.
///
/// Returns `false` and leaves the quote untouched when nothing is stored.
pub fn restore_quote<S>(store: &S, key: &str, quote: &Quote) -> bool
where
    S: KeyedStore<f64> + ?Sized,
{
    match store.get(key) {
        Some(value) => {
            quote.set_value(value);
            true
        }
        None => false,
    }
}

/// Save every security's price quote under its symbol.
pub fn save_prices<S>(store: &S, universe: &Universe) -> Result<()>
where
    S: KeyedStore<f64> + ?Sized,
{
    for security in universe.iter() {
        save_quote(store, security.symbol(), security.quote())?;
    }
    debug!(universe = universe.name(), count = universe.len(), "Saved prices");
    Ok(())
}

/// Restore price quotes saved by [`save_prices`]. Returns how many were found.
pub fn restore_prices<S>(store: &S, universe: &Universe) -> usize
where
    S: KeyedStore<f64> + ?Sized,
{
    let restored = universe
        .iter()
        .filter(|s| restore_quote(store, s.symbol(), s.quote()))
        .count();
    debug!(universe = universe.name(), restored, "Restored prices");
    restored
}
