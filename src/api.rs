use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::SortKey;
use crate::entities::{
    Booking, BookingStatus, ContactForm, Driver, Language, Location, Quote, Tour, TripSearch,
};
use crate::error::Error;

fn one_guest() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchRequest {
    pub stops: Vec<String>,
    pub date: String,
    #[serde(default = "one_guest")]
    pub guests: u32,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default)]
    pub promo_code: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DriverOffer {
    pub driver: Driver,
    /// Full price before any promo; ranking uses this.
    pub quote: Quote,
    /// What the customer pays with the promo applied, if any.
    pub payable: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResults {
    pub search: TripSearch,
    pub promo_applied: bool,
    pub offers: Vec<DriverOffer>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TripContext {
    pub stops: Vec<String>,
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default = "one_guest")]
    pub guests: u32,
    #[serde(default)]
    pub promo_code: Option<String>,
    #[serde(default)]
    pub tour_id: Option<String>,
    #[serde(default)]
    pub language: Language,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BookingRequest {
    pub contact: ContactForm,
    #[serde(default)]
    pub driver_id: Option<Uuid>,
    pub trip: TripContext,
}

pub trait LocationAPI {
    fn locations(&self) -> Vec<Location>;
    fn resolve_location(&self, name: &str) -> Result<Location, Error>;
}

#[async_trait]
pub trait SearchAPI {
    fn estimate_distance(&self, stops: &[String]) -> Result<f64, Error>;
    fn is_valid_promo(&self, code: &str) -> bool;
    async fn search(&self, request: SearchRequest) -> Result<SearchResults, Error>;
}

#[async_trait]
pub trait BookingAPI {
    async fn submit_booking(&self, request: BookingRequest) -> Result<Booking, Error>;
    async fn find_booking(&self, id: Uuid) -> Result<Booking, Error>;
    async fn open_bookings(&self) -> Result<Vec<Booking>, Error>;
    async fn update_booking_status(&self, id: Uuid, status: BookingStatus)
        -> Result<Booking, Error>;
    async fn claim_booking(&self, id: Uuid, driver_id: Uuid) -> Result<Booking, Error>;
}

#[async_trait]
pub trait DriverAPI {
    async fn find_driver(&self, id: Uuid) -> Result<Driver, Error>;
    async fn toggle_blocked_date(&self, id: Uuid, date: String) -> Result<Driver, Error>;
    async fn update_driver_rate(
        &self,
        id: Uuid,
        price_per_km: f64,
        base_price: f64,
    ) -> Result<Driver, Error>;
}

#[async_trait]
pub trait TourAPI {
    async fn tours(&self) -> Result<Vec<Tour>, Error>;
    async fn find_tour(&self, id: &str) -> Result<Tour, Error>;
}

pub trait API: LocationAPI + SearchAPI + BookingAPI + DriverAPI + TourAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
