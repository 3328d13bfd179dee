//! Snapshot date selection across a universe.

use crate::types::TickField;
use crate::universe::Universe;
use crate::Result;
use chrono::NaiveDate;
use serde::Serialize;
use storage::KeyedStore;
use tracing::{debug, info, warn};

/// Selection state of a [`SnapshotCoordinator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotState {
    #[default]
    Unselected,
    Selected(NaiveDate),
}

/// Outcome of one [`SnapshotCoordinator::select`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectionSummary {
    pub date: NaiveDate,
    pub matched: usize,
    pub unmatched: usize,
}

/// Repoints every security's current tick to a single observation date.
///
/// Matching is exact: a security with no tick on the date ends up with no
/// current data rather than a neighbouring tick. Each security is resolved
/// on its own, so gaps in one history never affect another.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCoordinator {
    state: SnapshotState,
    price_field: Option<TickField>,
}

impl SnapshotCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `field` of each selected tick into the security's price quote.
    pub fn with_price_field(mut self, field: TickField) -> Self {
        self.price_field = Some(field);
        self
    }

    pub fn state(&self) -> SnapshotState {
        self.state
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        match self.state {
            SnapshotState::Selected(date) => Some(date),
            SnapshotState::Unselected => None,
        }
    }

    pub fn select(&mut self, universe: &mut Universe, date: NaiveDate) -> SelectionSummary {
        let mut matched = 0;
        let mut unmatched = 0;

        for security in universe.iter_mut() {
            let position = security.position_of(date);
            security.set_current(position);

            let Some(tick) = security.current() else {
                debug!(symbol = security.symbol(), %date, "No tick on snapshot date");
                unmatched += 1;
                continue;
            };
            matched += 1;

            if let Some(value) = self.price_field.and_then(|field| tick.get(field)) {
                security.quote().set_value(value);
            }
        }

        self.state = SnapshotState::Selected(date);
        let summary = SelectionSummary {
            date,
            matched,
            unmatched,
        };
        info!(
            universe = universe.name(),
            %date,
            matched,
            unmatched,
            "Snapshot selected"
        );
        summary
    }

    /// Select the earliest date seen in any option history.
    pub fn select_earliest(&mut self, universe: &mut Universe) -> Option<SelectionSummary> {
        let date = universe.earliest_option_date()?;
        Some(self.select(universe, date))
    }

    /// Drop every current tick and return to the unselected state.
    pub fn clear(&mut self, universe: &mut Universe) {
        for security in universe.iter_mut() {
            security.set_current(None);
        }
        self.state = SnapshotState::Unselected;
    }

    /// Persist each security's current index under its symbol.
    pub fn save_cursors<S>(&self, store: &S, universe: &Universe) -> Result<()>
    where
        S: KeyedStore<Option<usize>> + ?Sized,
    {
        for security in universe.iter() {
            store.upsert(security.symbol(), security.current_index())?;
        }
        debug!(universe = universe.name(), count = universe.len(), "Saved snapshot cursors");
        Ok(())
    }

    /// Reapply cursors written by [`SnapshotCoordinator::save_cursors`].
    ///
    /// The first restored tick in universe order fixes the snapshot date.
    /// Securities without a stored entry, whose stored index no longer fits
    /// their history, or whose restored tick has another date, end up with
    /// no current data. Returns how many securities have a current tick
    /// afterwards.
    pub fn restore_cursors<S>(&mut self, store: &S, universe: &mut Universe) -> usize
    where
        S: KeyedStore<Option<usize>> + ?Sized,
    {
        let mut restored = 0;
        let mut restored_date: Option<NaiveDate> = None;

        for security in universe.iter_mut() {
            let index = store.get(security.symbol()).flatten();
            security.set_current(index);

            let Some(date) = security.current().map(|t| t.observation_date()) else {
                if let Some(index) = index {
                    warn!(
                        symbol = security.symbol(),
                        index,
                        "Stored cursor is outside the security history"
                    );
                }
                continue;
            };

            let selected = *restored_date.get_or_insert(date);
            if date != selected {
                warn!(
                    symbol = security.symbol(),
                    %date,
                    %selected,
                    "Stored cursor points at another snapshot date"
                );
                security.set_current(None);
                continue;
            }
            restored += 1;
        }

        self.state = match restored_date {
            Some(date) => SnapshotState::Selected(date),
            None => SnapshotState::Unselected,
        };
        info!(universe = universe.name(), restored, "Snapshot cursors restored");
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::Handle;
    use crate::security::Security;
    use crate::types::{MarketTick, OptionRight};
    use storage::InMemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stock(symbol: &str, days: &[(u32, f64)]) -> Security {
        let mut security = Security::stock(symbol).unwrap();
        for &(day, close) in days {
            security
                .push_tick(MarketTick::builder(date(2024, 1, day)).close(close).build())
                .unwrap();
        }
        security
    }

    fn universe() -> Universe {
        let mut universe = Universe::new("test");
        universe.add(stock("SPARSE", &[(1, 10.0), (3, 30.0)])).unwrap();
        universe
            .add(stock("DAILY", &[(1, 1.0), (2, 2.0), (3, 3.0)]))
            .unwrap();
        universe
    }

    #[test]
    fn test_initial_state_is_unselected() {
        let coordinator = SnapshotCoordinator::new();
        let universe = universe();

        assert_eq!(coordinator.state(), SnapshotState::Unselected);
        assert!(universe.iter().all(|s| s.current().is_none()));
    }

    #[test]
    fn test_select_exact_match() {
        let mut coordinator = SnapshotCoordinator::new();
        let mut universe = universe();

        let summary = coordinator.select(&mut universe, date(2024, 1, 3));
        assert_eq!(summary.matched, 2);
        assert_eq!(summary.unmatched, 0);
        assert_eq!(coordinator.selected_date(), Some(date(2024, 1, 3)));

        let sparse = universe.get("SPARSE").unwrap().current().unwrap();
        assert_eq!(sparse.observation_date(), date(2024, 1, 3));
        assert_eq!(sparse.close(), 30.0);
    }

    #[test]
    fn test_select_missing_date_is_independent_per_security() {
        let mut coordinator = SnapshotCoordinator::new();
        let mut universe = universe();

        let summary = coordinator.select(&mut universe, date(2024, 1, 2));
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.unmatched, 1);
        assert!(universe.get("SPARSE").unwrap().current().is_none());
        assert_eq!(universe.get("DAILY").unwrap().current().map(|t| t.close()), Some(2.0));
        assert_eq!(coordinator.state(), SnapshotState::Selected(date(2024, 1, 2)));
    }

    #[test]
    fn test_reselect_clears_stale_current() {
        let mut coordinator = SnapshotCoordinator::new();
        let mut universe = universe();

        coordinator.select(&mut universe, date(2024, 1, 1));
        assert!(universe.get("SPARSE").unwrap().current().is_some());

        coordinator.select(&mut universe, date(2024, 1, 2));
        assert!(universe.get("SPARSE").unwrap().current().is_none());
    }

    #[test]
    fn test_clear() {
        let mut coordinator = SnapshotCoordinator::new();
        let mut universe = universe();
        coordinator.select(&mut universe, date(2024, 1, 1));

        coordinator.clear(&mut universe);
        assert_eq!(coordinator.state(), SnapshotState::Unselected);
        assert_eq!(universe.with_current().count(), 0);
    }

    #[test]
    fn test_select_earliest_uses_option_histories() {
        let mut coordinator = SnapshotCoordinator::new();
        let mut universe = universe();
        assert!(coordinator.select_earliest(&mut universe).is_none());

        let mut option = Security::option("C", date(2024, 3, 15), 100.0, OptionRight::Call).unwrap();
        option
            .push_tick(MarketTick::builder(date(2024, 1, 2)).build())
            .unwrap();
        universe.add(option).unwrap();

        let summary = coordinator.select_earliest(&mut universe).unwrap();
        assert_eq!(summary.date, date(2024, 1, 2));
        assert_eq!(summary.matched, 2);
    }

    #[test]
    fn test_price_field_propagates_to_handles() {
        let mut coordinator = SnapshotCoordinator::new().with_price_field(TickField::Close);
        let mut universe = universe();
        let sparse = Handle::new(universe.get("SPARSE").unwrap().quote());
        let daily = Handle::new(universe.get("DAILY").unwrap().quote());

        coordinator.select(&mut universe, date(2024, 1, 1));
        assert_eq!(sparse.value(), 10.0);
        assert_eq!(daily.value(), 1.0);

        coordinator.select(&mut universe, date(2024, 1, 2));
        assert_eq!(sparse.value(), 10.0);
        assert_eq!(daily.value(), 2.0);
    }

    #[test]
    fn test_cursor_round_trip_through_store() {
        let store: InMemoryStore<Option<usize>> = InMemoryStore::new();
        let mut coordinator = SnapshotCoordinator::new();
        let mut universe = universe();

        coordinator.select(&mut universe, date(2024, 1, 2));
        coordinator.save_cursors(&store, &universe).unwrap();
        assert_eq!(store.get("SPARSE"), Some(None));
        assert_eq!(store.get("DAILY"), Some(Some(1)));

        let mut fresh = SnapshotCoordinator::new();
        let mut reloaded = self::universe();
        let restored = fresh.restore_cursors(&store, &mut reloaded);

        assert_eq!(restored, 1);
        assert_eq!(fresh.state(), SnapshotState::Selected(date(2024, 1, 2)));
        assert!(reloaded.get("SPARSE").unwrap().current().is_none());
        assert_eq!(reloaded.get("DAILY").unwrap().current_index(), Some(1));
    }

    #[test]
    fn test_restore_out_of_range_cursor() {
        let store: InMemoryStore<Option<usize>> = InMemoryStore::new();
        store.create("DAILY", Some(40)).unwrap();

        let mut coordinator = SnapshotCoordinator::new();
        let mut universe = universe();
        let restored = coordinator.restore_cursors(&store, &mut universe);

        assert_eq!(restored, 0);
        assert_eq!(coordinator.state(), SnapshotState::Unselected);
        assert!(universe.get("DAILY").unwrap().current().is_none());
    }

    #[test]
    fn test_restore_keeps_one_snapshot_date() {
        let store: InMemoryStore<Option<usize>> = InMemoryStore::new();
        store.create("A", Some(0)).unwrap();
        store.create("B", Some(0)).unwrap();

        let mut universe = Universe::new("mixed");
        universe.add(stock("A", &[(1, 1.0), (2, 2.0)])).unwrap();
        universe.add(stock("B", &[(2, 20.0), (3, 30.0)])).unwrap();

        let mut coordinator = SnapshotCoordinator::new();
        let restored = coordinator.restore_cursors(&store, &mut universe);

        assert_eq!(restored, 1);
        assert_eq!(coordinator.selected_date(), Some(date(2024, 1, 1)));
        assert_eq!(
            universe.get("A").unwrap().current().map(|t| t.observation_date()),
            Some(date(2024, 1, 1))
        );
        assert!(universe.get("B").unwrap().current().is_none());
        assert!(universe
            .with_current()
            .all(|s| s.current().map(|t| t.observation_date()) == coordinator.selected_date()));
    }
}
