//! Stock listing reference table access.

use sqlx::{PgPool, QueryBuilder};
use tracing::info;
use twstock_core::{Market, StockListing, StockRef};

use crate::error::{DataError, Result};

const STATEMENT_CHUNK: usize = 500;

/// Repository over the `stocks` reference table.
///
/// Listings are long-lived reference data: upserts are keyed on the
/// exchange code and never touch the surrogate id, and rows are never
/// deleted here.
pub struct StockRepository {
    pool: PgPool,
}

impl StockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert exchange listings keyed on `code`.
    pub async fn upsert_listings(&self, listings: &[StockListing]) -> Result<u64> {
        if listings.is_empty() {
            return Ok(0);
        }

        let mut total_affected = 0u64;

        for chunk in listings.chunks(STATEMENT_CHUNK) {
            let mut query_builder = QueryBuilder::new(
                "INSERT INTO stocks (code, name, market, industry, category, list_date) ",
            );

            query_builder.push_values(chunk, |mut b, listing| {
                b.push_bind(&listing.code)
                    .push_bind(&listing.name)
                    .push_bind(listing.market.label())
                    .push_bind(listing.industry.as_deref())
                    .push_bind(listing.category.as_deref())
                    .push_bind(listing.list_date);
            });

            query_builder.push(
                " ON CONFLICT (code) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 market = EXCLUDED.market, \
                 industry = EXCLUDED.industry, \
                 category = EXCLUDED.category, \
                 list_date = EXCLUDED.list_date",
            );

            let result = query_builder
                .build()
                .execute(&self.pool)
                .await
                .map_err(|e| DataError::Insert(e.to_string()))?;
            total_affected += result.rows_affected();
        }

        info!(
            listings = listings.len(),
            affected = total_affected,
            "stock listings upserted"
        );

        Ok(total_affected)
    }

    /// Read back `(id, code, market)` for the ticker mapper.
    pub async fn fetch_refs(&self) -> Result<Vec<StockRef>> {
        let rows: Vec<(i32, String, String)> =
            sqlx::query_as("SELECT id, code, market FROM stocks ORDER BY code")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| DataError::Query(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(id, code, market)| StockRef {
                id,
                code,
                market: Market::from_label(&market),
            })
            .collect())
    }
}
