//! Suite context captured from the product listing.
//!
//! Built at the start of each listing suite from whatever the page renders;
//! scenarios get it by shared reference and never mutate it.

use serde::Serialize;
use tracing::info;

use crate::actions::Session;
use crate::driver::SessionDriver;
use crate::locator::names;
use crate::result::{SwagError, SwagResult};
use crate::verify::ProductSnapshot;

/// Read-only facts about the listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteContext {
    product_count: usize,
    snapshot: ProductSnapshot,
}

impl SuiteContext {
    /// Count the product cards and read every name and price. The session
    /// must be on the product listing in its default order.
    pub async fn capture<D: SessionDriver>(session: &Session<D>) -> SwagResult<Self> {
        let product_count = session.count(names::PRODUCT_CARD).await?;
        let product_names = session
            .collect_texts(names::PRODUCT_NAME, product_count)
            .await?;
        let prices = session
            .collect_texts(names::PRODUCT_PRICE, product_count)
            .await?;
        let snapshot = ProductSnapshot::from_texts(&product_names, &prices)?;
        let context = Self::new(product_count, snapshot)?;
        info!(products = product_count, "captured listing snapshot");
        Ok(context)
    }

    /// Context from known values; the snapshot must hold `product_count` rows
    pub fn new(product_count: usize, snapshot: ProductSnapshot) -> SwagResult<Self> {
        if snapshot.len() != product_count {
            return Err(SwagError::assertion(format!(
                "snapshot has {} products, page shows {product_count}",
                snapshot.len()
            )));
        }
        Ok(Self {
            product_count,
            snapshot,
        })
    }

    /// Number of products the listing rendered
    #[must_use]
    pub const fn product_count(&self) -> usize {
        self.product_count
    }

    /// Names and prices in listing order
    #[must_use]
    pub const fn snapshot(&self) -> &ProductSnapshot {
        &self.snapshot
    }
}
