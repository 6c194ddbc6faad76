//! Vendor-ticker to surrogate-id mapping.

use std::collections::HashMap;

use twstock_core::StockRef;

/// Build the vendor-ticker → stock id lookup from the registry rows.
///
/// The vendor suffix depends on the board, so "2330" on the listed board maps
/// as "2330.TW" while an OTC code maps with ".TWO".
pub fn build_ticker_map(refs: &[StockRef]) -> HashMap<String, i32> {
    refs.iter()
        .map(|r| (r.market.vendor_ticker(&r.code), r.id))
        .collect()
}
