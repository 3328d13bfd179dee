//! Named collections of securities.

use crate::error::MarketDataError;
use crate::security::Security;
use crate::types::{OptionRight, SecurityKind};
use crate::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Ordered set of securities sharing one snapshot cursor concept.
///
/// Order is insertion order and is significant: surfaces resolve duplicate
/// `(expiry, strike)` cells in this order.
#[derive(Debug, Default)]
pub struct Universe {
    name: String,
    securities: Vec<Security>,
    by_symbol: HashMap<String, usize>,
}

/// One row of a snapshot report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotRow {
    pub symbol: String,
    pub underlying_symbol: Option<String>,
    pub kind: SecurityKind,
    pub expiry: Option<NaiveDate>,
    pub right: Option<OptionRight>,
    pub strike: Option<f64>,
    pub observation_date: Option<NaiveDate>,
    pub close: Option<f64>,
    pub implied_volatility: Option<f64>,
}

impl Universe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            securities: Vec::new(),
            by_symbol: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a security. Symbols are unique within a universe.
    pub fn add(&mut self, security: Security) -> Result<()> {
        if self.by_symbol.contains_key(security.symbol()) {
            return Err(MarketDataError::DuplicateSecurity(
                security.symbol().to_string(),
            ));
        }
        self.by_symbol
            .insert(security.symbol().to_string(), self.securities.len());
        self.securities.push(security);
        Ok(())
    }

    pub fn get(&self, symbol: &str) -> Option<&Security> {
        self.by_symbol.get(symbol).map(|&idx| &self.securities[idx])
    }

    /// Mutable access for history maintenance.
    pub fn get_mut(&mut self, symbol: &str) -> Option<&mut Security> {
        let idx = *self.by_symbol.get(symbol)?;
        self.securities.get_mut(idx)
    }

    pub fn len(&self) -> usize {
        self.securities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Security> {
        self.securities.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Security> {
        self.securities.iter_mut()
    }

    pub fn stocks(&self) -> impl Iterator<Item = &Security> {
        self.iter().filter(|s| s.kind() == SecurityKind::Stock)
    }

    pub fn options(&self) -> impl Iterator<Item = &Security> {
        self.iter().filter(|s| s.is_option())
    }

    /// Earliest observation date across all option histories.
    pub fn earliest_option_date(&self) -> Option<NaiveDate> {
        self.options()
            .filter_map(|s| s.first_observation_date())
            .min()
    }

    /// Securities whose current tick is set.
    pub fn with_current(&self) -> impl Iterator<Item = &Security> {
        self.iter().filter(|s| s.current().is_some())
    }

    /// Flat report of every security and its current tick.
    pub fn snapshot_rows(&self) -> Vec<SnapshotRow> {
        self.iter()
            .map(|s| {
                let current = s.current();
                SnapshotRow {
                    symbol: s.symbol().to_string(),
                    underlying_symbol: s.underlying_symbol().map(str::to_string),
                    kind: s.kind(),
                    expiry: s.expiry(),
                    right: s.right(),
                    strike: s.strike(),
                    observation_date: current.map(|t| t.observation_date()),
                    close: current.map(|t| t.close()),
                    implied_volatility: current.and_then(|t| t.implied_volatility()),
                }
            })
            .collect()
    }
}
