//! Securities and their tick histories.

use crate::error::MarketDataError;
use crate::quote::Quote;
use crate::symbol::occ_symbol;
use crate::types::{MarketTick, OptionRight, SecurityKind};
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Contract terms carried only by options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionTerms {
    pub expiry: NaiveDate,
    pub strike: f64,
    pub right: OptionRight,
}

/// One tradable instrument, its tick history and its current-tick cursor.
///
/// History is strictly increasing by observation date. The cursor is an
/// index into that history and is moved only by the snapshot coordinator.
#[derive(Debug)]
pub struct Security {
    symbol: String,
    underlying_symbol: Option<String>,
    kind: SecurityKind,
    terms: Option<OptionTerms>,
    history: Vec<MarketTick>,
    current: Option<usize>,
    quote: Quote,
}

fn validate_symbol(symbol: &str) -> Result<()> {
    if symbol.trim().is_empty() {
        return Err(MarketDataError::InvalidSymbol {
            symbol: symbol.to_string(),
            message: "Symbol is required".to_string(),
        });
    }
    Ok(())
}

impl Security {
    /// Create a stock with an empty history.
    pub fn stock(symbol: impl Into<String>) -> Result<Self> {
        let symbol = symbol.into();
        validate_symbol(&symbol)?;
        Ok(Self {
            symbol,
            underlying_symbol: None,
            kind: SecurityKind::Stock,
            terms: None,
            history: Vec::new(),
            current: None,
            quote: Quote::default(),
        })
    }

    /// Create an option with an empty history.
    pub fn option(
        symbol: impl Into<String>,
        expiry: NaiveDate,
        strike: f64,
        right: OptionRight,
    ) -> Result<Self> {
        let symbol = symbol.into();
        validate_symbol(&symbol)?;
        if !strike.is_finite() || strike <= 0.0 {
            return Err(MarketDataError::InvalidStrike(strike));
        }
        Ok(Self {
            symbol,
            underlying_symbol: None,
            kind: SecurityKind::Option,
            terms: Some(OptionTerms {
                expiry,
                strike,
                right,
            }),
            history: Vec::new(),
            current: None,
            quote: Quote::default(),
        })
    }

    /// Attach the underlying symbol.
    pub fn with_underlying(mut self, underlying_symbol: impl Into<String>) -> Self {
        self.underlying_symbol = Some(underlying_symbol.into());
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn underlying_symbol(&self) -> Option<&str> {
        self.underlying_symbol.as_deref()
    }

    pub fn kind(&self) -> SecurityKind {
        self.kind
    }

    pub fn is_option(&self) -> bool {
        self.kind == SecurityKind::Option
    }

    pub fn terms(&self) -> Option<&OptionTerms> {
        self.terms.as_ref()
    }

    pub fn expiry(&self) -> Option<NaiveDate> {
        self.terms.map(|t| t.expiry)
    }

    pub fn strike(&self) -> Option<f64> {
        self.terms.map(|t| t.strike)
    }

    pub fn right(&self) -> Option<OptionRight> {
        self.terms.map(|t| t.right)
    }

    /// OCC local symbol for options, rooted at the underlying when known.
    pub fn occ_symbol(&self) -> Option<Result<String>> {
        let terms = self.terms?;
        let root = self.underlying_symbol.as_deref().unwrap_or(&self.symbol);
        Some(occ_symbol(root, terms.expiry, terms.right, terms.strike))
    }

    /// Price quote owned by this security.
    pub fn quote(&self) -> &Quote {
        &self.quote
    }

    pub fn history(&self) -> &[MarketTick] {
        &self.history
    }

    /// Append a tick dated strictly after the last one.
    pub fn push_tick(&mut self, tick: MarketTick) -> Result<()> {
        if let Some(last) = self.history.last() {
            if tick.observation_date() <= last.observation_date() {
                return Err(MarketDataError::InvalidHistory {
                    symbol: self.symbol.clone(),
                    message: format!(
                        "tick dated {} does not follow {}",
                        tick.observation_date(),
                        last.observation_date()
                    ),
                });
            }
        }
        self.history.push(tick);
        Ok(())
    }

    /// Replace the history with `ticks` in date order.
    ///
    /// Fails on duplicate dates and leaves the existing history untouched. The
    /// cursor is cleared because old indices no longer mean anything.
    pub fn set_history(&mut self, mut ticks: Vec<MarketTick>) -> Result<()> {
        ticks.sort_by_key(|t| t.observation_date());
        if let Some(pair) = ticks
            .windows(2)
            .find(|w| w[0].observation_date() == w[1].observation_date())
        {
            return Err(MarketDataError::InvalidHistory {
                symbol: self.symbol.clone(),
                message: format!("duplicate tick dated {}", pair[0].observation_date()),
            });
        }
        self.history = ticks;
        self.current = None;
        Ok(())
    }

    /// Index of the tick observed exactly on `date`.
    pub fn position_of(&self, date: NaiveDate) -> Option<usize> {
        self.history
            .binary_search_by_key(&date, |t| t.observation_date())
            .ok()
    }

    pub fn first_observation_date(&self) -> Option<NaiveDate> {
        self.history.first().map(|t| t.observation_date())
    }

    pub fn last_observation_date(&self) -> Option<NaiveDate> {
        self.history.last().map(|t| t.observation_date())
    }

    /// Current tick, or `None` when nothing is selected for this security.
    pub fn current(&self) -> Option<&MarketTick> {
        self.current.and_then(|idx| self.history.get(idx))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub(crate) fn set_current(&mut self, index: Option<usize>) {
        self.current = index.filter(|&idx| idx < self.history.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tick(d: NaiveDate, close: f64) -> MarketTick {
        MarketTick::builder(d).close(close).build()
    }

    #[test]
    fn test_stock_construction() {
        let stock = Security::stock("SPY").unwrap();
        assert_eq!(stock.symbol(), "SPY");
        assert_eq!(stock.kind(), SecurityKind::Stock);
        assert!(stock.terms().is_none());
        assert!(stock.current().is_none());
        assert!(stock.occ_symbol().is_none());
    }

    #[test]
    fn test_option_construction() {
        let option = Security::option(
            "SPY240119C00450000",
            date(2024, 1, 19),
            450.0,
            OptionRight::Call,
        )
        .unwrap()
        .with_underlying("SPY");

        assert!(option.is_option());
        assert_eq!(option.underlying_symbol(), Some("SPY"));
        assert_eq!(option.strike(), Some(450.0));
        assert_eq!(option.expiry(), Some(date(2024, 1, 19)));
        assert_eq!(option.right(), Some(OptionRight::Call));
        assert_eq!(
            option.occ_symbol(),
            Some(Ok("SPY   240119C00450000".to_string()))
        );
    }

    #[test]
    fn test_invalid_construction() {
        assert_matches!(Security::stock("  "), Err(MarketDataError::InvalidSymbol { .. }));
        assert_matches!(
            Security::option("X", date(2024, 1, 1), -5.0, OptionRight::Put),
            Err(MarketDataError::InvalidStrike(_))
        );
        assert_matches!(
            Security::option("X", date(2024, 1, 1), f64::NAN, OptionRight::Put),
            Err(MarketDataError::InvalidStrike(_))
        );
    }

    #[test]
    fn test_push_tick_requires_increasing_dates() {
        let mut stock = Security::stock("SPY").unwrap();
        stock.push_tick(tick(date(2024, 1, 1), 1.0)).unwrap();
        stock.push_tick(tick(date(2024, 1, 3), 2.0)).unwrap();

        assert_matches!(
            stock.push_tick(tick(date(2024, 1, 3), 3.0)),
            Err(MarketDataError::InvalidHistory { .. })
        );
        assert_matches!(
            stock.push_tick(tick(date(2024, 1, 2), 3.0)),
            Err(MarketDataError::InvalidHistory { .. })
        );
        assert_eq!(stock.history().len(), 2);
    }

    #[test]
    fn test_set_history_sorts_and_rejects_duplicates() {
        let mut stock = Security::stock("SPY").unwrap();
        stock
            .set_history(vec![tick(date(2024, 1, 3), 3.0), tick(date(2024, 1, 1), 1.0)])
            .unwrap();
        assert_eq!(stock.first_observation_date(), Some(date(2024, 1, 1)));
        assert_eq!(stock.last_observation_date(), Some(date(2024, 1, 3)));

        let result = stock.set_history(vec![tick(date(2024, 2, 1), 1.0), tick(date(2024, 2, 1), 2.0)]);
        assert_matches!(result, Err(MarketDataError::InvalidHistory { .. }));
        assert_eq!(stock.history().len(), 2);
    }

    #[test]
    fn test_position_of_exact_date_only() {
        let mut stock = Security::stock("SPY").unwrap();
        stock.push_tick(tick(date(2024, 1, 1), 1.0)).unwrap();
        stock.push_tick(tick(date(2024, 1, 3), 3.0)).unwrap();

        assert_eq!(stock.position_of(date(2024, 1, 1)), Some(0));
        assert_eq!(stock.position_of(date(2024, 1, 3)), Some(1));
        assert_eq!(stock.position_of(date(2024, 1, 2)), None);
    }

    #[test]
    fn test_set_current_ignores_out_of_range() {
        let mut stock = Security::stock("SPY").unwrap();
        stock.push_tick(tick(date(2024, 1, 1), 1.0)).unwrap();

        stock.set_current(Some(0));
        assert_eq!(stock.current().map(|t| t.close()), Some(1.0));

        stock.set_current(Some(4));
        assert!(stock.current().is_none());
        assert_eq!(stock.current_index(), None);
    }
}
