use serde::{Deserialize, Serialize};

use crate::api::DriverOffer;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    PriceAsc,
    PriceDesc,
    Rating,
    Reviews,
}

/// Stable sort on one key. Price keys use the full quote, before promo.
pub fn rank(offers: &mut [DriverOffer], key: SortKey) {
    match key {
        SortKey::PriceAsc => offers.sort_by_key(|offer| offer.quote.total),
        SortKey::PriceDesc => offers.sort_by(|a, b| b.quote.total.cmp(&a.quote.total)),
        SortKey::Rating => offers.sort_by(|a, b| b.driver.rating.total_cmp(&a.driver.rating)),
        SortKey::Reviews => {
            offers.sort_by(|a, b| b.driver.review_count.cmp(&a.driver.review_count))
        }
    }
}
