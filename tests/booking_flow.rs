use std::sync::Arc;

use chrono::Utc;

use orbitrip::api::{BookingAPI, BookingRequest, DriverAPI, SearchAPI, SearchRequest, TripContext};
use orbitrip::config::Config;
use orbitrip::db::MemoryStore;
use orbitrip::engine::{Engine, SortKey};
use orbitrip::entities::{
    BookingStatus, ContactForm, Driver, DriverStatus, Language, Vehicle, VehicleType,
};
use orbitrip::external::LogNotifier;
use orbitrip::signal::ChangeSignal;

fn driver(name: &str, kind: VehicleType, price_per_km: f64) -> Driver {
    let mut driver = Driver::new(
        name,
        "+995555000000",
        Vehicle {
            model: "Any".into(),
            kind,
            max_passengers: None,
        },
    );
    driver.status = DriverStatus::Active;
    driver.rates.price_per_km = price_per_km;
    driver
}

fn next_month() -> String {
    (Utc::now().date_naive() + chrono::Duration::days(30))
        .format("%b %d, %Y")
        .to_string()
}

fn stops() -> Vec<String> {
    vec!["Kutaisi Airport".into(), "Mestia".into()]
}

#[tokio::test]
async fn search_book_claim_complete() {
    let sedan = driver("Levan", VehicleType::Sedan, 1.0);
    let minivan = driver("Tamar", VehicleType::Minivan, 1.4);
    let store = MemoryStore::new().with_drivers(vec![sedan.clone(), minivan.clone()]);
    let engine = Engine::new(
        Arc::new(store),
        Arc::new(LogNotifier),
        ChangeSignal::new(),
        &Config::default(),
    );
    let date = next_month();

    // four guests do not fit a sedan
    let results = engine
        .search(SearchRequest {
            stops: stops(),
            date: date.clone(),
            guests: 4,
            sort: SortKey::PriceAsc,
            promo_code: Some("GEORGIA20".into()),
        })
        .await
        .unwrap();

    assert_eq!(results.offers.len(), 1);
    let offer = &results.offers[0];
    assert_eq!(offer.driver.id, minivan.id);
    assert!(offer.payable < offer.quote.total);

    // an open booking any driver can take
    let booking = engine
        .submit_booking(BookingRequest {
            contact: ContactForm {
                name: "Ivan Petrov".into(),
                email: "ivan@example.ru".into(),
                phone: "8 (900) 123-45-67".into(),
            },
            driver_id: None,
            trip: TripContext {
                stops: stops(),
                date: date.clone(),
                time: Some("09:30".into()),
                guests: 2,
                promo_code: None,
                tour_id: None,
                language: Language::Ru,
            },
        })
        .await
        .unwrap();

    assert!(engine
        .open_bookings()
        .await
        .unwrap()
        .iter()
        .any(|open| open.id == booking.id));

    let claimed = engine.claim_booking(booking.id, sedan.id).await.unwrap();
    assert_eq!(claimed.status, BookingStatus::Confirmed);
    assert_eq!(claimed.driver_name.as_deref(), Some("Levan"));

    let err = engine
        .claim_booking(booking.id, minivan.id)
        .await
        .unwrap_err();
    assert!(err.is_race_lost_error());

    // the sedan is now busy that day
    let results = engine
        .search(SearchRequest {
            stops: stops(),
            date: date.clone(),
            guests: 1,
            sort: SortKey::Rating,
            promo_code: None,
        })
        .await
        .unwrap();
    let ids: Vec<_> = results.offers.iter().map(|offer| offer.driver.id).collect();
    assert_eq!(ids, vec![minivan.id]);

    let completed = engine
        .update_booking_status(booking.id, BookingStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.status, BookingStatus::Completed);

    let err = engine
        .update_booking_status(booking.id, BookingStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(err.is_invalid_state_error());

    // blocking a date takes the minivan out of that day's results
    engine
        .toggle_blocked_date(minivan.id, date.clone())
        .await
        .unwrap();
    let results = engine
        .search(SearchRequest {
            stops: stops(),
            date,
            guests: 1,
            sort: SortKey::PriceAsc,
            promo_code: None,
        })
        .await
        .unwrap();
    assert!(results.offers.is_empty());
}
