use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::normalize_date;
use crate::error::{validation_error, Error};

pub const DEFAULT_PRICE_PER_KM: f64 = 1.2;
pub const DEFAULT_BASE_PRICE: f64 = 30.0;
pub const DEFAULT_RATING: f64 = 5.0;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Catalog id of the city the driver starts from.
    #[serde(default)]
    pub home_city: Option<String>,
    pub vehicle: Vehicle,
    #[serde(default)]
    pub rates: RateCard,
    #[serde(default)]
    pub blocked_dates: Vec<String>,
    pub status: Status,
    #[serde(default = "default_rating")]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vehicle {
    pub model: String,
    #[serde(rename = "type")]
    pub kind: VehicleType,
    #[serde(default)]
    pub max_passengers: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleType {
    Sedan,
    Minivan,
    #[serde(rename = "SUV")]
    Suv,
    Bus,
}

impl VehicleType {
    /// Seats assumed when a driver has not declared a passenger limit.
    pub fn default_capacity(&self) -> u32 {
        match self {
            Self::Sedan => 3,
            Self::Suv => 4,
            Self::Minivan => 7,
            Self::Bus => 20,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateCard {
    #[serde(default = "default_price_per_km")]
    pub price_per_km: f64,
    #[serde(default = "default_base_price")]
    pub base_price: f64,
}

impl Default for RateCard {
    fn default() -> Self {
        Self {
            price_per_km: DEFAULT_PRICE_PER_KM,
            base_price: DEFAULT_BASE_PRICE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Active,
    Inactive,
    Pending,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Active => "ACTIVE".into(),
            Self::Inactive => "INACTIVE".into(),
            Self::Pending => "PENDING".into(),
        }
    }
}

fn default_price_per_km() -> f64 {
    DEFAULT_PRICE_PER_KM
}

fn default_base_price() -> f64 {
    DEFAULT_BASE_PRICE
}

fn default_rating() -> f64 {
    DEFAULT_RATING
}

impl Driver {
    pub fn new(name: &str, phone: &str, vehicle: Vehicle) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            phone: phone.into(),
            email: None,
            home_city: None,
            vehicle,
            rates: RateCard::default(),
            blocked_dates: vec![],
            status: Status::Pending,
            rating: DEFAULT_RATING,
            review_count: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, Status::Active)
    }

    /// The one place seating capacity is decided.
    pub fn capacity(&self) -> u32 {
        self.vehicle
            .max_passengers
            .unwrap_or_else(|| self.vehicle.kind.default_capacity())
    }

    pub fn can_seat(&self, guests: u32) -> bool {
        guests <= self.capacity()
    }

    pub fn is_blocked_on(&self, date: &str) -> bool {
        let date = normalize_date(date);

        self.blocked_dates
            .iter()
            .any(|blocked| normalize_date(blocked) == date)
    }

    /// Adds the date if absent, removes it if present. Returns whether the
    /// date is blocked afterwards.
    #[tracing::instrument(skip(self), fields(driver_id = %self.id))]
    pub fn toggle_blocked_date(&mut self, date: &str) -> Result<bool, Error> {
        let normalized = normalize_date(date);
        if normalized.is_empty() {
            return Err(validation_error("date", "date is required"));
        }

        let before = self.blocked_dates.len();
        self.blocked_dates
            .retain(|blocked| normalize_date(blocked) != normalized);

        if self.blocked_dates.len() < before {
            return Ok(false);
        }

        self.blocked_dates.push(date.trim().into());
        Ok(true)
    }

    pub fn update_rates(&mut self, price_per_km: f64, base_price: f64) -> Result<(), Error> {
        if !(price_per_km.is_finite() && price_per_km > 0.0) {
            return Err(validation_error("price_per_km", "rate must be positive"));
        }

        if !(base_price.is_finite() && base_price >= 0.0) {
            return Err(validation_error("base_price", "base fare must not be negative"));
        }

        self.rates = RateCard {
            price_per_km,
            base_price,
        };

        Ok(())
    }
}

#[test]
fn capacity_falls_back_to_vehicle_type() {
    let mut driver = Driver::new(
        "Giorgi",
        "+995555000000",
        Vehicle {
            model: "Toyota Prius".into(),
            kind: VehicleType::Sedan,
            max_passengers: None,
        },
    );

    assert_eq!(driver.capacity(), 3);
    assert!(!driver.can_seat(4));

    driver.vehicle.max_passengers = Some(4);
    assert!(driver.can_seat(4));
    assert!(!driver.can_seat(5));

    driver.vehicle = Vehicle {
        model: "Mercedes Sprinter".into(),
        kind: VehicleType::Bus,
        max_passengers: None,
    };
    assert!(driver.can_seat(15));
}

#[test]
fn toggle_blocked_date_is_normalized() {
    let mut driver = Driver::new(
        "Nino",
        "+995555000001",
        Vehicle {
            model: "Hyundai H1".into(),
            kind: VehicleType::Minivan,
            max_passengers: Some(7),
        },
    );

    assert_eq!(driver.toggle_blocked_date("Oct 20, 2026"), Ok(true));
    assert!(driver.is_blocked_on("oct 20 2026"));
    assert!(driver.is_blocked_on("  OCT 20, 2026 "));

    assert_eq!(driver.toggle_blocked_date("OCT 20 2026"), Ok(false));
    assert!(!driver.is_blocked_on("Oct 20, 2026"));
    assert!(driver.blocked_dates.is_empty());

    assert!(driver.toggle_blocked_date("  ").unwrap_err().is_validation_error());
}

#[test]
fn missing_rate_card_fields_are_sanitized() {
    let driver: Driver = serde_json::from_value(serde_json::json!({
        "id": Uuid::nil(),
        "name": "Levan",
        "phone": "+995555000002",
        "vehicle": { "model": "Prius", "type": "Sedan" },
        "rates": {},
        "status": "ACTIVE"
    }))
    .unwrap();

    assert_eq!(driver.rates, RateCard::default());
    assert_eq!(driver.rating, DEFAULT_RATING);
    assert_eq!(driver.review_count, 0);
    assert!(driver.blocked_dates.is_empty());
    assert!(driver.is_active());
}

#[test]
fn update_rates_rejects_nonsense() {
    let mut driver = Driver::new(
        "Dato",
        "+995555000003",
        Vehicle {
            model: "Prius".into(),
            kind: VehicleType::Sedan,
            max_passengers: None,
        },
    );

    assert!(driver.update_rates(0.0, 30.0).is_err());
    assert!(driver.update_rates(1.0, -1.0).is_err());
    assert!(driver.update_rates(1.0, 25.0).is_ok());
    assert_eq!(driver.rates.base_price, 25.0);
}
