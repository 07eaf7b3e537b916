//! Persistence collaborator: tours, drivers, bookings and settings.

mod memory;
mod pg;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::{Booking, BookingStatus, Driver, Settings, Tour};
use crate::error::Error;

pub use memory::MemoryStore;
pub use pg::PgStore;

#[async_trait]
pub trait Store {
    async fn all_drivers(&self) -> Result<Vec<Driver>, Error>;
    async fn find_driver(&self, id: Uuid) -> Result<Driver, Error>;
    async fn update_driver(&self, driver: &Driver) -> Result<(), Error>;

    async fn all_bookings(&self) -> Result<Vec<Booking>, Error>;
    async fn find_booking(&self, id: Uuid) -> Result<Booking, Error>;
    async fn create_booking(&self, booking: &Booking) -> Result<(), Error>;

    /// Applies a lifecycle transition under the store's own lock, so an
    /// illegal transition can never be written.
    async fn update_booking_status(&self, id: Uuid, status: BookingStatus)
        -> Result<Booking, Error>;

    /// Compare-and-swap on the booking's driver. `Ok(false)` means another
    /// driver already holds it and the caller must refresh.
    async fn assign_driver(&self, booking_id: Uuid, driver: &Driver) -> Result<bool, Error>;

    async fn all_tours(&self) -> Result<Vec<Tour>, Error>;
    async fn find_tour(&self, id: &str) -> Result<Tour, Error>;

    async fn settings(&self) -> Result<Settings, Error>;
}

pub type DynStore = Arc<dyn Store + Send + Sync>;
