//! OCC option symbology.
//!
//! A local option symbol is 21 characters: the root symbol padded to six
//! characters, the expiry as `yymmdd`, the right (`C`/`P`), and the strike
//! multiplied by 1000 as eight zero-padded digits.
//!
//! ```text
//! AAPL  210716C00145000
//! └root┘└expiry┘│└strike┘
//!               right
//! ```

use crate::error::MarketDataError;
use crate::types::OptionRight;
use crate::Result;
use chrono::NaiveDate;

pub const OCC_SYMBOL_LEN: usize = 21;
pub const OCC_ROOT_LEN: usize = 6;
const STRIKE_SCALE: f64 = 1000.0;
const MAX_SCALED_STRIKE: u64 = 99_999_999;

/// Build the OCC local symbol for an option contract.
pub fn occ_symbol(root: &str, expiry: NaiveDate, right: OptionRight, strike: f64) -> Result<String> {
    if !root.is_ascii() {
        return Err(MarketDataError::InvalidSymbol {
            symbol: root.to_string(),
            message: "OCC root must be ASCII".to_string(),
        });
    }

    if root.is_empty() || root.len() > OCC_ROOT_LEN {
        return Err(MarketDataError::InvalidSymbol {
            symbol: root.to_string(),
            message: format!("OCC root must be 1 to {} characters", OCC_ROOT_LEN),
        });
    }

    if !strike.is_finite() || strike <= 0.0 {
        return Err(MarketDataError::InvalidStrike(strike));
    }

    let scaled = (strike * STRIKE_SCALE).round() as u64;
    if scaled > MAX_SCALED_STRIKE {
        return Err(MarketDataError::InvalidStrike(strike));
    }

    let symbol = format!(
        "{:<width$}{}{}{:08}",
        root,
        expiry.format("%y%m%d"),
        right.code(),
        scaled,
        width = OCC_ROOT_LEN,
    );
    debug_assert_eq!(symbol.len(), OCC_SYMBOL_LEN);
    Ok(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 7, 16).unwrap()
    }

    #[test]
    fn test_occ_symbol_padding() {
        let symbol = occ_symbol("AAPL", expiry(), OptionRight::Call, 145.0).unwrap();
        assert_eq!(symbol, "AAPL  210716C00145000");
        assert_eq!(symbol.len(), OCC_SYMBOL_LEN);
    }

    #[test]
    fn test_occ_symbol_full_root_and_fractional_strike() {
        let symbol = occ_symbol("GOOGLX", expiry(), OptionRight::Put, 12.5).unwrap();
        assert_eq!(symbol, "GOOGLX210716P00012500");
    }

    #[test]
    fn test_occ_symbol_rejects_long_root() {
        let result = occ_symbol("TOOLONG", expiry(), OptionRight::Call, 10.0);
        assert_matches!(result, Err(MarketDataError::InvalidSymbol { .. }));
    }

    #[test]
    fn test_occ_symbol_rejects_non_ascii_root() {
        let result = occ_symbol("ÄB", expiry(), OptionRight::Call, 100.0);
        assert_matches!(result, Err(MarketDataError::InvalidSymbol { .. }));
    }

    #[test]
    fn test_security_occ_symbol_with_non_ascii_underlying() {
        let option = crate::security::Security::option("X", expiry(), 100.0, OptionRight::Put)
            .unwrap()
            .with_underlying("ÉTF");
        assert_matches!(
            option.occ_symbol(),
            Some(Err(MarketDataError::InvalidSymbol { .. }))
        );
    }

    #[test]
    fn test_occ_symbol_rejects_bad_strike() {
        assert_matches!(
            occ_symbol("SPY", expiry(), OptionRight::Call, 0.0),
            Err(MarketDataError::InvalidStrike(_))
        );
        assert_matches!(
            occ_symbol("SPY", expiry(), OptionRight::Call, 100_000.0),
            Err(MarketDataError::InvalidStrike(_))
        );
    }
}
