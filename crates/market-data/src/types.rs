//! Shared types for Market Data

use crate::error::MarketDataError;
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of security held in a universe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityKind {
    Stock,
    Option,
}

impl SecurityKind {
    /// Broker security type code.
    pub fn code(&self) -> &'static str {
        match self {
            SecurityKind::Stock => "STK",
            SecurityKind::Option => "OPT",
        }
    }

    /// Map a tick source instrument type code (3 = stock, 0 = option).
    pub fn from_source_code(code: u8) -> Option<Self> {
        match code {
            3 => Some(SecurityKind::Stock),
            0 => Some(SecurityKind::Option),
            _ => None,
        }
    }
}

impl fmt::Display for SecurityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityKind::Stock => write!(f, "Stock"),
            SecurityKind::Option => write!(f, "Option"),
        }
    }
}

/// Option right (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionRight {
    Call,
    Put,
}

impl OptionRight {
    /// Get the short code for the right.
    pub fn code(&self) -> &'static str {
        match self {
            OptionRight::Call => "C",
            OptionRight::Put => "P",
        }
    }

    /// Map a tick source call/put code (0 = call, anything else = put).
    pub fn from_source_code(code: u8) -> Self {
        if code == 0 {
            OptionRight::Call
        } else {
            OptionRight::Put
        }
    }

    /// Parse from a case-insensitive name ("call", "put", "c", "p").
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "call" | "c" => Some(OptionRight::Call),
            "put" | "p" => Some(OptionRight::Put),
            _ => None,
        }
    }
}

impl fmt::Display for OptionRight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionRight::Call => write!(f, "Call"),
            OptionRight::Put => write!(f, "Put"),
        }
    }
}

/// Named numeric field of a [`MarketTick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickField {
    Open,
    High,
    Low,
    Close,
    Volume,
    BidPrice,
    BidSize,
    AskPrice,
    AskSize,
    ImpliedVolatility,
}

impl TickField {
    pub const ALL: [TickField; 10] = [
        TickField::Open,
        TickField::High,
        TickField::Low,
        TickField::Close,
        TickField::Volume,
        TickField::BidPrice,
        TickField::BidSize,
        TickField::AskPrice,
        TickField::AskSize,
        TickField::ImpliedVolatility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TickField::Open => "open",
            TickField::High => "high",
            TickField::Low => "low",
            TickField::Close => "close",
            TickField::Volume => "volume",
            TickField::BidPrice => "bid_price",
            TickField::BidSize => "bid_size",
            TickField::AskPrice => "ask_price",
            TickField::AskSize => "ask_size",
            TickField::ImpliedVolatility => "implied_volatility",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        let lowered = s.to_lowercase();
        Self::ALL.into_iter().find(|f| f.as_str() == lowered)
    }
}

impl FromStr for TickField {
    type Err = MarketDataError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| MarketDataError::UnknownField(s.to_string()))
    }
}

impl fmt::Display for TickField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable point-in-time market record for one security.
///
/// Fields are private so a tick cannot change once it is part of a history;
/// read them through the accessors or [`MarketTick::get`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTick {
    observation_date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
    bid_price: f64,
    bid_size: u64,
    ask_price: f64,
    ask_size: u64,
    implied_volatility: Option<f64>,
}

impl MarketTick {
    /// Start building a tick for the given date.
    pub fn builder(observation_date: NaiveDate) -> MarketTickBuilder {
        MarketTickBuilder::new(observation_date)
    }

    pub fn observation_date(&self) -> NaiveDate {
        self.observation_date
    }

    pub fn open(&self) -> f64 {
        self.open
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn close(&self) -> f64 {
        self.close
    }

    pub fn volume(&self) -> u64 {
        self.volume
    }

    pub fn bid_price(&self) -> f64 {
        self.bid_price
    }

    pub fn bid_size(&self) -> u64 {
        self.bid_size
    }

    pub fn ask_price(&self) -> f64 {
        self.ask_price
    }

    pub fn ask_size(&self) -> u64 {
        self.ask_size
    }

    pub fn implied_volatility(&self) -> Option<f64> {
        self.implied_volatility
    }

    /// Read a numeric field. Only `implied_volatility` can be absent.
    pub fn get(&self, field: TickField) -> Option<f64> {
        match field {
            TickField::Open => Some(self.open),
            TickField::High => Some(self.high),
            TickField::Low => Some(self.low),
            TickField::Close => Some(self.close),
            TickField::Volume => Some(self.volume as f64),
            TickField::BidPrice => Some(self.bid_price),
            TickField::BidSize => Some(self.bid_size as f64),
            TickField::AskPrice => Some(self.ask_price),
            TickField::AskSize => Some(self.ask_size as f64),
            TickField::ImpliedVolatility => self.implied_volatility,
        }
    }

    /// Read a field by name, failing on names that are not tick fields.
    pub fn field(&self, name: &str) -> Result<Option<f64>> {
        let field: TickField = name.parse()?;
        Ok(self.get(field))
    }

    /// Midpoint of the quote book.
    pub fn mid_price(&self) -> f64 {
        (self.bid_price + self.ask_price) / 2.0
    }
}

/// Builder for [`MarketTick`]; unset numeric fields default to zero.
#[derive(Debug, Clone)]
pub struct MarketTickBuilder {
    tick: MarketTick,
}

impl MarketTickBuilder {
    pub fn new(observation_date: NaiveDate) -> Self {
        Self {
            tick: MarketTick {
                observation_date,
                open: 0.0,
                high: 0.0,
                low: 0.0,
                close: 0.0,
                volume: 0,
                bid_price: 0.0,
                bid_size: 0,
                ask_price: 0.0,
                ask_size: 0,
                implied_volatility: None,
            },
        }
    }

    /// Set open, high, low, close and volume.
    pub fn ohlcv(mut self, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        self.tick.open = open;
        self.tick.high = high;
        self.tick.low = low;
        self.tick.close = close;
        self.tick.volume = volume;
        self
    }

    /// Set the top of the quote book.
    pub fn book(mut self, bid_price: f64, bid_size: u64, ask_price: f64, ask_size: u64) -> Self {
        self.tick.bid_price = bid_price;
        self.tick.bid_size = bid_size;
        self.tick.ask_price = ask_price;
        self.tick.ask_size = ask_size;
        self
    }

    pub fn close(mut self, close: f64) -> Self {
        self.tick.close = close;
        self
    }

    pub fn implied_volatility(mut self, iv: Option<f64>) -> Self {
        self.tick.implied_volatility = iv;
        self
    }

    pub fn build(self) -> MarketTick {
        self.tick
    }
}
