//! Market segment classification and vendor ticker formatting.

use serde::{Deserialize, Serialize};

/// Market segment of a tradable security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    /// TWSE main board (上市).
    Listed,
    /// TPEX over-the-counter board (上櫃).
    Otc,
}

impl Market {
    /// Parse the exchange's market label.
    ///
    /// Unrecognized labels fall back to [`Market::Listed`] so their tickers
    /// still resolve with the main-board suffix.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "上櫃" | "OTC" | "TPEx" => Market::Otc,
            _ => Market::Listed,
        }
    }

    /// Exchange label as stored in the `stocks.market` column.
    pub fn label(&self) -> &'static str {
        match self {
            Market::Listed => "上市",
            Market::Otc => "上櫃",
        }
    }

    /// Suffix the market-data vendor appends to the exchange code.
    pub fn vendor_suffix(&self) -> &'static str {
        match self {
            Market::Listed => ".TW",
            Market::Otc => ".TWO",
        }
    }

    /// Vendor-format ticker for an exchange code, e.g. `2330` → `2330.TW`.
    pub fn vendor_ticker(&self, code: &str) -> String {
        format!("{}{}", code, self.vendor_suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_round_trip() {
        assert_eq!(Market::from_label("上市"), Market::Listed);
        assert_eq!(Market::from_label("上櫃"), Market::Otc);
        assert_eq!(Market::from_label(" 上櫃 "), Market::Otc);
        assert_eq!(Market::Listed.label(), "上市");
        assert_eq!(Market::Otc.label(), "上櫃");
    }

    #[test]
    fn unknown_label_defaults_to_listed() {
        assert_eq!(Market::from_label("興櫃"), Market::Listed);
        assert_eq!(Market::from_label(""), Market::Listed);
    }

    #[test]
    fn vendor_ticker_suffixes() {
        assert_eq!(Market::Listed.vendor_ticker("2330"), "2330.TW");
        assert_eq!(Market::Otc.vendor_ticker("5483"), "5483.TWO");
    }
}
