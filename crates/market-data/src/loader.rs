//! Grouping typed tick-source rows into a [`Universe`].
//!
//! Rows arrive already typed (dates and numbers parsed); this module decides
//! which security each row belongs to and rejects rows that cannot describe a
//! valid security or tick.

use crate::error::MarketDataError;
use crate::security::Security;
use crate::types::{MarketTick, OptionRight, SecurityKind};
use crate::universe::Universe;
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// One tick-source row, named after the source columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Underlying Symbol", default)]
    pub underlying_symbol: Option<String>,
    #[serde(rename = "Strike Price", default)]
    pub strike_price: Option<f64>,
    #[serde(rename = "Expiry Date", default)]
    pub expiry_date: Option<NaiveDate>,
    /// 3 = stock, 0 = option
    #[serde(rename = "Ins. Type")]
    pub instrument_type: u8,
    /// 0 = call, anything else = put
    #[serde(rename = "Call/Put", default)]
    pub call_put: Option<u8>,
    #[serde(rename = "Open", alias = "Open Price", default)]
    pub open: f64,
    #[serde(rename = "High", alias = "High Price", default)]
    pub high: f64,
    #[serde(rename = "Low", alias = "Low Price", default)]
    pub low: f64,
    #[serde(rename = "Close", alias = "Last Price", default)]
    pub close: f64,
    #[serde(rename = "Volume", default)]
    pub volume: u64,
    #[serde(rename = "Bid Price", default)]
    pub bid_price: f64,
    #[serde(rename = "Bid Size", default)]
    pub bid_size: u64,
    #[serde(rename = "Ask Price", default)]
    pub ask_price: f64,
    #[serde(rename = "Ask Size", default)]
    pub ask_size: u64,
    #[serde(rename = "Implied Volatility", default)]
    pub implied_volatility: Option<f64>,
}

impl TickRow {
    fn tick(&self) -> MarketTick {
        MarketTick::builder(self.date)
            .ohlcv(self.open, self.high, self.low, self.close, self.volume)
            .book(self.bid_price, self.bid_size, self.ask_price, self.ask_size)
            .implied_volatility(self.implied_volatility)
            .build()
    }

    fn security(&self, row: usize) -> Result<Security> {
        let invalid = |message: &str| MarketDataError::InvalidRow {
            row,
            symbol: self.symbol.clone(),
            message: message.to_string(),
        };

        let kind = SecurityKind::from_source_code(self.instrument_type).ok_or_else(|| {
            invalid(&format!("unknown instrument type {}", self.instrument_type))
        })?;

        let security = match kind {
            SecurityKind::Stock => Security::stock(self.symbol.clone()),
            SecurityKind::Option => {
                let expiry = self.expiry_date.ok_or_else(|| invalid("option without expiry"))?;
                let strike = self.strike_price.ok_or_else(|| invalid("option without strike"))?;
                let right = self
                    .call_put
                    .map(OptionRight::from_source_code)
                    .ok_or_else(|| invalid("option without call/put"))?;
                Security::option(self.symbol.clone(), expiry, strike, right)
            }
        }
        .map_err(|e| invalid(&e.to_string()))?;

        Ok(match &self.underlying_symbol {
            Some(underlying) if !underlying.is_empty() => security.with_underlying(underlying),
            _ => security,
        })
    }
}

impl Universe {
    /// Build a universe from tick rows.
    ///
    /// Securities appear in the order their symbol is first seen. Every row is
    /// validated, and later rows must repeat the first row's kind and contract
    /// terms. Each symbol's ticks are sorted by date and a repeated date for
    /// one symbol is rejected.
    pub fn from_rows(name: impl Into<String>, rows: impl IntoIterator<Item = TickRow>) -> Result<Self> {
        let mut order: Vec<Security> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut ticks: HashMap<String, Vec<(usize, MarketTick)>> = HashMap::new();

        for (row_idx, row) in rows.into_iter().enumerate() {
            let security = row.security(row_idx)?;
            match positions.get(&row.symbol).copied() {
                Some(pos) => {
                    let first = &order[pos];
                    if first.kind() != security.kind() || first.terms() != security.terms() {
                        return Err(MarketDataError::InvalidRow {
                            row: row_idx,
                            symbol: row.symbol.clone(),
                            message: "contract terms differ from the first row for this symbol"
                                .to_string(),
                        });
                    }
                }
                None => {
                    positions.insert(row.symbol.clone(), order.len());
                    order.push(security);
                }
            }
            let tick = row.tick();
            ticks.entry(row.symbol).or_default().push((row_idx, tick));
        }

        let mut universe = Universe::new(name);
        for mut security in order {
            let mut rows = ticks.remove(security.symbol()).unwrap_or_default();
            rows.sort_by_key(|(_, t)| t.observation_date());
            if let Some(pair) = rows
                .windows(2)
                .find(|w| w[0].1.observation_date() == w[1].1.observation_date())
            {
                return Err(MarketDataError::InvalidRow {
                    row: pair[1].0,
                    symbol: security.symbol().to_string(),
                    message: format!("duplicate tick dated {}", pair[1].1.observation_date()),
                });
            }
            debug!(symbol = security.symbol(), ticks = rows.len(), "Loaded security history");
            security.set_history(rows.into_iter().map(|(_, t)| t).collect())?;
            universe.add(security)?;
        }

        info!(
            universe = universe.name(),
            securities = universe.len(),
            options = universe.options().count(),
            "Universe built from tick rows"
        );
        Ok(universe)
    }
}
