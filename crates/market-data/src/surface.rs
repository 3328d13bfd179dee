//! Expiry x strike surfaces built from current option ticks.

use crate::types::{OptionRight, TickField};
use crate::universe::Universe;
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

/// Value of a cell with no current data
pub const EMPTY_CELL: f64 = 0.0;

/// Expiry x strike grid of one tick field.
///
/// `values[row][col]` belongs to `expiries[row]` and `strikes[col]`. Both axes
/// are sorted ascending and hold no duplicates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Surface {
    field: TickField,
    expiries: Vec<NaiveDate>,
    strikes: Vec<f64>,
    values: Vec<Vec<f64>>,
    as_of: Option<NaiveDate>,
}

impl Surface {
    pub fn field(&self) -> TickField {
        self.field
    }

    pub fn expiries(&self) -> &[NaiveDate] {
        &self.expiries
    }

    pub fn strikes(&self) -> &[f64] {
        &self.strikes
    }

    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Latest observation date among the ticks that filled the grid.
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }

    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty() || self.strikes.is_empty()
    }

    pub fn get(&self, expiry: NaiveDate, strike: f64) -> Option<f64> {
        let row = self.expiries.binary_search(&expiry).ok()?;
        let col = strike_position(&self.strikes, strike)?;
        Some(self.values[row][col])
    }

    /// Drop rows, then columns, whose every cell is empty.
    pub fn prune_empty(&mut self) {
        let keep_rows: Vec<bool> = self
            .values
            .iter()
            .map(|row| row.iter().any(|&v| v != EMPTY_CELL))
            .collect();
        let mut keep = keep_rows.iter();
        self.expiries.retain(|_| keep.next().copied().unwrap_or(false));
        let mut keep = keep_rows.iter();
        self.values.retain(|_| keep.next().copied().unwrap_or(false));

        let keep_cols: Vec<bool> = (0..self.strikes.len())
            .map(|col| self.values.iter().any(|row| row[col] != EMPTY_CELL))
            .collect();
        let mut keep = keep_cols.iter();
        self.strikes.retain(|_| keep.next().copied().unwrap_or(false));
        for row in &mut self.values {
            let mut keep = keep_cols.iter();
            row.retain(|_| keep.next().copied().unwrap_or(false));
        }

        if self.strikes.is_empty() {
            self.expiries.clear();
            self.values.clear();
        }
    }
}

fn cmp_strike(a: &f64, b: &f64) -> Ordering {
    a.total_cmp(b)
}

fn strike_position(strikes: &[f64], strike: f64) -> Option<usize> {
    strikes.binary_search_by(|s| cmp_strike(s, &strike)).ok()
}

/// Builds a [`Surface`] from the current ticks of a universe's options.
#[derive(Debug, Clone)]
pub struct SurfaceBuilder {
    field: TickField,
    right: Option<OptionRight>,
    underlying: Option<String>,
}

impl Default for SurfaceBuilder {
    fn default() -> Self {
        Self {
            field: TickField::ImpliedVolatility,
            right: None,
            underlying: None,
        }
    }
}

impl SurfaceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: TickField) -> Self {
        self.field = field;
        self
    }

    /// Only include calls or only puts.
    pub fn right(mut self, right: OptionRight) -> Self {
        self.right = Some(right);
        self
    }

    /// Only include options on `underlying`.
    pub fn underlying(mut self, underlying: impl Into<String>) -> Self {
        self.underlying = Some(underlying.into());
        self
    }

    /// Lay out the grid and fill it from each option's current tick.
    ///
    /// Options without a current tick still contribute their expiry and
    /// strike, with an empty cell. When two options share a cell, the later
    /// one in universe order wins.
    pub fn build(&self, universe: &Universe) -> Surface {
        let options: Vec<_> = universe
            .options()
            .filter(|s| self.right.map_or(true, |r| s.right() == Some(r)))
            .filter(|s| match &self.underlying {
                Some(u) => s.underlying_symbol() == Some(u.as_str()),
                None => true,
            })
            .filter_map(|s| s.terms().map(|t| (s, *t)))
            .collect();

        let mut expiries: Vec<NaiveDate> = options.iter().map(|(_, t)| t.expiry).collect();
        expiries.sort();
        expiries.dedup();

        let mut strikes: Vec<f64> = options.iter().map(|(_, t)| t.strike).collect();
        strikes.sort_by(cmp_strike);
        strikes.dedup();

        let mut values = vec![vec![EMPTY_CELL; strikes.len()]; expiries.len()];
        let mut as_of = None;

        for (security, terms) in &options {
            let (Ok(row), Some(col)) = (
                expiries.binary_search(&terms.expiry),
                strike_position(&strikes, terms.strike),
            ) else {
                continue;
            };

            let tick = security.current();
            values[row][col] = tick.and_then(|t| t.get(self.field)).unwrap_or(EMPTY_CELL);
            if let Some(tick) = tick {
                as_of = as_of.max(Some(tick.observation_date()));
            }
        }

        debug!(
            universe = universe.name(),
            field = %self.field,
            expiries = expiries.len(),
            strikes = strikes.len(),
            "Surface built"
        );

        Surface {
            field: self.field,
            expiries,
            strikes,
            values,
            as_of,
        }
    }
}
