use serde::{Deserialize, Serialize};

/// Price breakdown for one driver on one search, in whole GEL.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub distance_price: i64,
    pub approach_fee: i64,
    /// Home city the approach fee was charged from.
    pub approach_city: Option<String>,
    pub total: i64,
    pub promo_applied: bool,
}
