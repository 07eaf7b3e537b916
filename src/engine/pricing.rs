//! Per-driver trip pricing.

use crate::catalog::LocationTable;
use crate::engine::distance::road_km;
use crate::entities::{Driver, Quote, RateCard, TripSearch};

/// Approach legs inside this radius are free.
pub const FREE_APPROACH_RADIUS_KM: f64 = 15.0;
/// Share of the normal rate charged for driving empty to the pickup.
pub const APPROACH_RATE_SHARE: f64 = 0.6;
/// Flat 20% off.
pub const PROMO_MULTIPLIER: f64 = 0.8;

#[derive(Clone, Debug, Default)]
pub struct PromoCodes {
    codes: Vec<String>,
}

impl PromoCodes {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            codes: codes
                .into_iter()
                .map(|code| code.as_ref().trim().to_uppercase())
                .filter(|code| !code.is_empty())
                .collect(),
        }
    }

    pub fn is_valid(&self, code: &str) -> bool {
        let code = code.trim().to_uppercase();
        !code.is_empty() && self.codes.contains(&code)
    }
}

pub fn approach_fee_for(km: f64, price_per_km: f64) -> i64 {
    if km <= FREE_APPROACH_RADIUS_KM {
        return 0;
    }

    (km * price_per_km * APPROACH_RATE_SHARE).round() as i64
}

/// Deadhead charge from the driver's home city to the first stop, with the
/// home city's display name when a fee applies.
fn approach(
    locations: &LocationTable,
    rates: &RateCard,
    home_city: Option<&str>,
    search: &TripSearch,
) -> (i64, Option<String>) {
    let home = home_city.and_then(|city| locations.resolve(city));
    let pickup = search.pickup().and_then(|stop| locations.resolve(stop));

    match (home, pickup) {
        (Some(home), Some(pickup)) => {
            let fee = approach_fee_for(road_km(home, pickup), rates.price_per_km);
            match fee {
                0 => (0, None),
                fee => (fee, Some(home.name_en.clone())),
            }
        }
        _ => (0, None),
    }
}

pub fn apply_promo(total: i64) -> i64 {
    (total as f64 * PROMO_MULTIPLIER).round() as i64
}

/// Prices a search against a rate card. The promo discounts the whole
/// amount, approach fee included.
pub fn quote(
    locations: &LocationTable,
    rates: &RateCard,
    home_city: Option<&str>,
    search: &TripSearch,
    promo: bool,
) -> Quote {
    let distance_price = (search.distance_km * rates.price_per_km).round() as i64;
    let (approach_fee, approach_city) = approach(locations, rates, home_city, search);

    // whole GEL, rounded up so the floor is never undercut
    let base_price = rates.base_price.ceil() as i64;
    let raw_total = distance_price.max(base_price) + approach_fee;

    let total = match promo {
        true => apply_promo(raw_total),
        false => raw_total,
    };

    Quote {
        distance_price,
        approach_fee,
        approach_city,
        total,
        promo_applied: promo,
    }
}

pub fn price_for(
    locations: &LocationTable,
    driver: &Driver,
    search: &TripSearch,
    promo: bool,
) -> Quote {
    quote(
        locations,
        &driver.rates,
        driver.home_city.as_deref(),
        search,
        promo,
    )
}

/// Price for a booking nobody has been assigned to yet.
pub fn standard_quote(locations: &LocationTable, search: &TripSearch, promo: bool) -> Quote {
    quote(locations, &RateCard::default(), None, search, promo)
}
