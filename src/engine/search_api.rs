use super::availability::eligible_drivers;
use super::pricing::price_for;
use super::ranking::rank;
use super::{distance, Engine};

use async_trait::async_trait;

use crate::{
    api::{DriverOffer, SearchAPI, SearchRequest, SearchResults},
    entities::{validate_date, validate_guests, TripSearch},
    error::Error,
};

#[async_trait]
impl SearchAPI for Engine {
    fn estimate_distance(&self, stops: &[String]) -> Result<f64, Error> {
        distance::estimate_distance(&self.locations, stops)
    }

    fn is_valid_promo(&self, code: &str) -> bool {
        self.promos.is_valid(code)
    }

    #[tracing::instrument(skip(self))]
    async fn search(&self, request: SearchRequest) -> Result<SearchResults, Error> {
        validate_date(&request.date, self.today())?;
        validate_guests(request.guests)?;

        let distance_km = self.estimate_distance(&request.stops)?;
        let promo = self.check_promo(request.promo_code.as_deref())?;
        let search = TripSearch::new(request.stops, &request.date, request.guests, distance_km);

        let snapshot = self.snapshot().await?;

        let mut offers: Vec<DriverOffer> =
            eligible_drivers(&snapshot.drivers, &snapshot.bookings, &search.date, search.guests)
                .into_iter()
                .map(|driver| {
                    let quote = price_for(&self.locations, driver, &search, false);
                    let payable = match promo {
                        true => price_for(&self.locations, driver, &search, true).total,
                        false => quote.total,
                    };

                    DriverOffer {
                        driver: driver.clone(),
                        quote,
                        payable,
                    }
                })
                .collect();

        rank(&mut offers, request.sort);

        Ok(SearchResults {
            search,
            promo_applied: promo,
            offers,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::super::fixtures::{
        active_driver, engine, engine_with, future_date, test_config, RecordingNotifier,
    };
    use super::*;
    use crate::config::Config;
    use crate::db::MemoryStore;
    use crate::engine::SortKey;
    use crate::entities::{test_booking, BookingStatus, RateCard};

    fn request(stops: &[&str], date: &str, guests: u32) -> SearchRequest {
        SearchRequest {
            stops: stops.iter().map(|stop| stop.to_string()).collect(),
            date: date.into(),
            guests,
            sort: SortKey::PriceAsc,
            promo_code: None,
        }
    }

    #[tokio::test]
    async fn filters_prices_and_ranks() {
        let date = future_date();

        let mut cheap = active_driver("Cheap", "+995555000001", Some(4));
        cheap.rates = RateCard {
            price_per_km: 1.0,
            base_price: 30.0,
        };
        let pricey = active_driver("Pricey", "+995555000002", Some(4));
        let small = active_driver("Small", "+995555000003", Some(2));
        let busy = active_driver("Busy", "+995555000004", Some(4));

        let bookings = vec![test_booking(&date, Some(busy.id), BookingStatus::Confirmed)];
        let store = MemoryStore::new()
            .with_drivers(vec![pricey, small, busy, cheap])
            .with_bookings(bookings);
        let (engine, _) = engine(store);

        let results = engine
            .search(request(&["Tbilisi", "Gudauri"], &date, 3))
            .await
            .unwrap();

        let names: Vec<&str> = results
            .offers
            .iter()
            .map(|offer| offer.driver.name.as_str())
            .collect();
        assert_eq!(names, vec!["Cheap", "Pricey"]);
        assert!(!results.promo_applied);
        assert!(results.offers.iter().all(|offer| offer.payable == offer.quote.total));
        assert!(results.search.distance_km > 100.0);
    }

    #[tokio::test]
    async fn promo_discounts_payable_only() {
        let date = future_date();
        let store = MemoryStore::new()
            .with_drivers(vec![active_driver("Giorgi", "+995555000001", Some(4))]);
        let (engine, _) = engine(store);

        let mut with_promo = request(&["Tbilisi", "Gudauri"], &date, 2);
        with_promo.promo_code = Some(" orbi20 ".into());

        let results = engine.search(with_promo).await.unwrap();
        let offer = &results.offers[0];

        assert!(results.promo_applied);
        assert!(offer.payable < offer.quote.total);
        assert_eq!(offer.payable, (offer.quote.total as f64 * 0.8).round() as i64);
    }

    #[tokio::test]
    async fn rejects_bad_input_before_reading_the_store() {
        let (engine, _) = engine(MemoryStore::new());
        let date = future_date();

        let err = engine
            .search(request(&["Tbilisi"], &date, 1))
            .await
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("stops"));

        let err = engine
            .search(request(&["Tbilisi", "Batumi"], "2020-01-01", 1))
            .await
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("date"));

        let err = engine
            .search(request(&["Tbilisi", "Batumi"], &date, 0))
            .await
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("guests"));

        let mut bad_promo = request(&["Tbilisi", "Batumi"], &date, 1);
        bad_promo.promo_code = Some("FREE100".into());
        let err = engine.search(bad_promo).await.unwrap_err();
        assert_eq!(err.field.as_deref(), Some("promo_code"));
    }

    #[tokio::test]
    async fn cached_results_refresh_after_change_signal() {
        let date = future_date();
        let driver = active_driver("Giorgi", "+995555000001", Some(4));
        let store = MemoryStore::new().with_drivers(vec![driver.clone()]);
        let (engine, _) = engine(store);

        let first = engine
            .search(request(&["Tbilisi", "Batumi"], &date, 1))
            .await
            .unwrap();
        assert_eq!(first.offers.len(), 1);

        let mut blocked = driver.clone();
        blocked.toggle_blocked_date(&date).unwrap();
        engine.store.update_driver(&blocked).await.unwrap();

        // the write bypassed the engine and the snapshot is still fresh
        let cached = engine
            .search(request(&["Tbilisi", "Batumi"], &date, 1))
            .await
            .unwrap();
        assert_eq!(cached.offers.len(), 1);

        engine.signal().emit();

        let refreshed = engine
            .search(request(&["Tbilisi", "Batumi"], &date, 1))
            .await
            .unwrap();
        assert!(refreshed.offers.is_empty());
    }

    #[tokio::test]
    async fn cached_results_expire_after_ttl() {
        tokio::time::pause();

        let date = future_date();
        let driver = active_driver("Giorgi", "+995555000001", Some(4));
        let store = MemoryStore::new().with_drivers(vec![driver.clone()]);
        let config = Config {
            snapshot_ttl: Duration::from_secs(30),
            ..test_config()
        };
        let (notifier, _) = RecordingNotifier::new();
        let engine = engine_with(store, notifier, &config);

        let first = engine
            .search(request(&["Tbilisi", "Batumi"], &date, 1))
            .await
            .unwrap();
        assert_eq!(first.offers.len(), 1);

        // written by another process, no change signal
        let mut blocked = driver.clone();
        blocked.toggle_blocked_date(&date).unwrap();
        engine.store.update_driver(&blocked).await.unwrap();

        tokio::time::advance(Duration::from_secs(31)).await;

        let reloaded = engine
            .search(request(&["Tbilisi", "Batumi"], &date, 1))
            .await
            .unwrap();
        assert!(reloaded.offers.is_empty());
    }
}
