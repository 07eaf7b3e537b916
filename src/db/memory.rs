use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::entities::{Booking, BookingStatus, Driver, Settings, Tour};
use crate::error::{invalid_input_error, not_found_error, Error};

/// In-process store for development and tests. Every write happens under a
/// single lock, so claims are strictly serialized.
#[derive(Debug, Default)]
pub struct MemoryStore {
    drivers: RwLock<Vec<Driver>>,
    bookings: RwLock<Vec<Booking>>,
    tours: RwLock<Vec<Tour>>,
    settings: RwLock<Settings>,
    latency: Duration,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drivers(mut self, drivers: Vec<Driver>) -> Self {
        self.drivers = RwLock::new(drivers);
        self
    }

    pub fn with_bookings(mut self, bookings: Vec<Booking>) -> Self {
        self.bookings = RwLock::new(bookings);
        self
    }

    pub fn with_tours(mut self, tours: Vec<Tour>) -> Self {
        self.tours = RwLock::new(tours);
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = RwLock::new(settings);
        self
    }

    /// Delay applied before every call, to exercise timeouts.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn all_drivers(&self) -> Result<Vec<Driver>, Error> {
        self.simulate_latency().await;
        Ok(self.drivers.read().await.clone())
    }

    async fn find_driver(&self, id: Uuid) -> Result<Driver, Error> {
        self.simulate_latency().await;

        self.drivers
            .read()
            .await
            .iter()
            .find(|driver| driver.id == id)
            .cloned()
            .ok_or_else(|| not_found_error("driver"))
    }

    async fn update_driver(&self, driver: &Driver) -> Result<(), Error> {
        self.simulate_latency().await;

        let mut drivers = self.drivers.write().await;
        let slot = drivers
            .iter_mut()
            .find(|existing| existing.id == driver.id)
            .ok_or_else(|| not_found_error("driver"))?;

        *slot = driver.clone();
        Ok(())
    }

    async fn all_bookings(&self) -> Result<Vec<Booking>, Error> {
        self.simulate_latency().await;
        Ok(self.bookings.read().await.clone())
    }

    async fn find_booking(&self, id: Uuid) -> Result<Booking, Error> {
        self.simulate_latency().await;

        self.bookings
            .read()
            .await
            .iter()
            .find(|booking| booking.id == id)
            .cloned()
            .ok_or_else(|| not_found_error("booking"))
    }

    async fn create_booking(&self, booking: &Booking) -> Result<(), Error> {
        self.simulate_latency().await;

        let mut bookings = self.bookings.write().await;
        if bookings.iter().any(|existing| existing.id == booking.id) {
            return Err(invalid_input_error());
        }

        bookings.push(booking.clone());
        Ok(())
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, Error> {
        self.simulate_latency().await;

        let mut bookings = self.bookings.write().await;
        let booking = bookings
            .iter_mut()
            .find(|booking| booking.id == id)
            .ok_or_else(|| not_found_error("booking"))?;

        booking.transition(status)?;
        Ok(booking.clone())
    }

    async fn assign_driver(&self, booking_id: Uuid, driver: &Driver) -> Result<bool, Error> {
        self.simulate_latency().await;

        let mut bookings = self.bookings.write().await;
        let booking = bookings
            .iter_mut()
            .find(|booking| booking.id == booking_id)
            .ok_or_else(|| not_found_error("booking"))?;

        match booking.claim(driver) {
            Ok(()) => Ok(true),
            Err(err) if err.is_race_lost_error() => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn all_tours(&self) -> Result<Vec<Tour>, Error> {
        self.simulate_latency().await;
        Ok(self.tours.read().await.clone())
    }

    async fn find_tour(&self, id: &str) -> Result<Tour, Error> {
        self.simulate_latency().await;

        self.tours
            .read()
            .await
            .iter()
            .find(|tour| tour.id == id)
            .cloned()
            .ok_or_else(|| not_found_error("tour"))
    }

    async fn settings(&self) -> Result<Settings, Error> {
        self.simulate_latency().await;
        Ok(self.settings.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{test_booking, Vehicle, VehicleType};

    fn driver(name: &str) -> Driver {
        Driver::new(
            name,
            "+995555000000",
            Vehicle {
                model: "Prius".into(),
                kind: VehicleType::Sedan,
                max_passengers: Some(4),
            },
        )
    }

    #[tokio::test]
    async fn assign_driver_is_compare_and_swap() {
        let booking = test_booking("Oct 20, 2026", None, BookingStatus::Pending);
        let store = MemoryStore::new().with_bookings(vec![booking.clone()]);

        let first = driver("Giorgi");
        let second = driver("Nino");

        assert!(store.assign_driver(booking.id, &first).await.unwrap());
        assert!(!store.assign_driver(booking.id, &second).await.unwrap());

        let stored = store.find_booking(booking.id).await.unwrap();
        assert_eq!(stored.driver_id, Some(first.id));
        assert_eq!(stored.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn status_updates_respect_lifecycle() {
        let booking = test_booking("Oct 20, 2026", None, BookingStatus::Completed);
        let store = MemoryStore::new().with_bookings(vec![booking.clone()]);

        let err = store
            .update_booking_status(booking.id, BookingStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(err.is_invalid_state_error());

        let stored = store.find_booking(booking.id).await.unwrap();
        assert_eq!(stored.status, BookingStatus::Completed);
    }

    #[tokio::test]
    async fn update_unknown_driver_fails() {
        let store = MemoryStore::new();
        assert!(store.update_driver(&driver("Ghost")).await.is_err());
    }

    #[test]
    fn tours_are_found_by_id() {
        use tokio_test::block_on;

        let store = MemoryStore::new().with_tours(vec![Tour {
            id: "kazbegi-day".into(),
            title_en: "Kazbegi Day Trip".into(),
            title_ru: None,
            stops: vec!["Tbilisi".into(), "Kazbegi".into()],
        }]);

        assert_eq!(block_on(store.all_tours()).unwrap().len(), 1);
        assert_eq!(block_on(store.find_tour("kazbegi-day")).unwrap().stops.len(), 2);
        assert!(block_on(store.find_tour("atlantis"))
            .unwrap_err()
            .is_invalid_input_error());
    }

    #[tokio::test]
    async fn missing_settings_fall_back_to_defaults() {
        let settings = MemoryStore::new().settings().await.unwrap();
        assert!(settings.admin_phone.is_none());
    }
}
