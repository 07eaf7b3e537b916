use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{normalize_date, Customer, Driver, Language};
use crate::error::{invalid_state_error, race_lost_error, Error};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub kind: Kind,
    pub customer: Customer,
    pub route: Vec<String>,
    /// Free-form date as entered, e.g. "Oct 20, 2026".
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    pub guests: u32,
    pub driver_id: Option<Uuid>,
    pub driver_name: Option<String>,
    pub distance_km: f64,
    /// Authoritative amount in GEL.
    pub numeric_price: i64,
    /// Display string kept in sync with `numeric_price`.
    pub total_price: String,
    pub promo_code: Option<String>,
    pub language: Language,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Kind {
    Tour { tour_id: String },
    Transfer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Pending => "PENDING".into(),
            Self::Confirmed => "CONFIRMED".into(),
            Self::Completed => "COMPLETED".into(),
            Self::Cancelled => "CANCELLED".into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether a booking in this state occupies its driver for the day.
    pub fn occupies_driver(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    pub fn can_transition_to(&self, next: Status) -> bool {
        if self.is_terminal() {
            return false;
        }

        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Completed)
                | (Self::Confirmed, Self::Cancelled)
        )
    }
}

pub fn format_price(amount: i64, promo_applied: bool) -> String {
    match promo_applied {
        true => format!("{} GEL (Promo)", amount),
        false => format!("{} GEL", amount),
    }
}

impl Booking {
    pub fn is_transfer(&self) -> bool {
        matches!(self.kind, Kind::Transfer)
    }

    pub fn is_claimable(&self) -> bool {
        self.status == Status::Pending && self.driver_id.is_none()
    }

    pub fn display_date(&self) -> String {
        match &self.time {
            Some(time) => format!("{} {}", self.date, time),
            None => self.date.clone(),
        }
    }

    /// Whether this booking falls on the given display date. Records that
    /// carry the time inside `date` still match on their day.
    pub fn occurs_on(&self, date: &str) -> bool {
        let date = normalize_date(date);
        if date.is_empty() {
            return false;
        }

        let own = normalize_date(&self.date);
        own == date || own.starts_with(&format!("{} ", date))
    }

    /// Whether this booking keeps `driver_id` busy on `date`.
    pub fn blocks(&self, driver_id: &Uuid, date: &str) -> bool {
        self.driver_id.as_ref() == Some(driver_id)
            && self.status.occupies_driver()
            && self.occurs_on(date)
    }

    #[tracing::instrument(skip(self), fields(booking_id = %self.id))]
    pub fn transition(&mut self, next: Status) -> Result<(), Error> {
        if !self.status.can_transition_to(next) {
            tracing::warn!(
                "rejected transition {} -> {}",
                self.status.name(),
                next.name()
            );
            return Err(invalid_state_error());
        }

        self.status = next;
        Ok(())
    }

    /// Assigns the driver and confirms in one step. The driver a pending
    /// booking was made for confirms it the same way.
    #[tracing::instrument(skip(self, driver), fields(booking_id = %self.id, driver_id = %driver.id))]
    pub fn claim(&mut self, driver: &Driver) -> Result<(), Error> {
        match self.driver_id {
            Some(current) if current != driver.id => return Err(race_lost_error()),
            Some(_) if self.status == Status::Confirmed => return Ok(()),
            _ => (),
        }

        if self.status != Status::Pending {
            return Err(invalid_state_error());
        }

        self.driver_id = Some(driver.id);
        self.driver_name = Some(driver.name.clone());
        self.status = Status::Confirmed;

        Ok(())
    }

    pub fn commission(&self, rate: f64) -> f64 {
        self.numeric_price as f64 * rate
    }

    /// Short text used in SMS notifications.
    pub fn summary(&self) -> String {
        let driver = match &self.driver_name {
            Some(name) => name.as_str(),
            None => "unassigned",
        };

        format!(
            "New booking {}: {} | {} | {} guests | {} | {} ({}) | driver: {}",
            short_id(&self.id),
            self.route.join(" -> "),
            self.display_date(),
            self.guests,
            self.total_price,
            self.customer.name,
            self.customer.phone,
            driver,
        )
    }
}

fn short_id(id: &Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

#[cfg(test)]
pub(crate) fn test_booking(date: &str, driver_id: Option<Uuid>, status: Status) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        kind: Kind::Transfer,
        customer: Customer {
            name: "Anna".into(),
            email: "anna@example.com".into(),
            phone: "+995599123456".into(),
        },
        route: vec!["Tbilisi".into(), "Gudauri".into()],
        date: date.into(),
        time: None,
        guests: 2,
        driver_id,
        driver_name: driver_id.map(|_| "Giorgi".into()),
        distance_km: 168.0,
        numeric_price: 202,
        total_price: format_price(202, false),
        promo_code: None,
        language: Language::En,
        status,
        created_at: Utc::now(),
    }
}

#[test]
fn terminal_states_are_closed() {
    let all = [
        Status::Pending,
        Status::Confirmed,
        Status::Completed,
        Status::Cancelled,
    ];

    for terminal in [Status::Completed, Status::Cancelled] {
        for next in all {
            let mut booking = test_booking("Oct 20, 2026", None, terminal);
            assert!(booking.transition(next).is_err());
            assert_eq!(booking.status, terminal);
        }
    }
}

#[test]
fn lifecycle_transitions() {
    let mut booking = test_booking("Oct 20, 2026", None, Status::Pending);
    booking.transition(Status::Confirmed).unwrap();
    booking.transition(Status::Completed).unwrap();

    let mut booking = test_booking("Oct 20, 2026", None, Status::Confirmed);
    booking.transition(Status::Cancelled).unwrap();

    let mut booking = test_booking("Oct 20, 2026", None, Status::Pending);
    assert!(booking.transition(Status::Completed).unwrap_err().is_invalid_state_error());
    assert!(booking.transition(Status::Pending).is_err());
}

#[test]
fn claim_assigns_and_confirms() {
    use crate::entities::{Vehicle, VehicleType};

    let driver = Driver::new(
        "Giorgi",
        "+995555000000",
        Vehicle {
            model: "Prius".into(),
            kind: VehicleType::Sedan,
            max_passengers: None,
        },
    );
    let other = Driver::new("Nino", "+995555000001", driver.vehicle.clone());

    let mut booking = test_booking("Oct 20, 2026", None, Status::Pending);
    assert!(booking.is_claimable());

    booking.claim(&driver).unwrap();
    assert_eq!(booking.status, Status::Confirmed);
    assert_eq!(booking.driver_id, Some(driver.id));
    assert_eq!(booking.driver_name.as_deref(), Some("Giorgi"));

    // same driver again is a no-op, anyone else lost the race
    booking.claim(&driver).unwrap();
    assert!(booking.claim(&other).unwrap_err().is_race_lost_error());

    let mut cancelled = test_booking("Oct 20, 2026", None, Status::Cancelled);
    assert!(cancelled.claim(&driver).unwrap_err().is_invalid_state_error());

    // requested driver accepting their own booking
    let mut requested = test_booking("Oct 20, 2026", Some(driver.id), Status::Pending);
    requested.claim(&driver).unwrap();
    assert_eq!(requested.status, Status::Confirmed);

    let mut requested = test_booking("Oct 20, 2026", Some(driver.id), Status::Pending);
    assert!(requested.claim(&other).unwrap_err().is_race_lost_error());
    assert_eq!(requested.status, Status::Pending);
}

#[test]
fn occurs_on_matches_date_prefix() {
    let booking = test_booking("Oct 20, 2026 10:00", None, Status::Pending);

    assert!(booking.occurs_on("Oct 20, 2026"));
    assert!(booking.occurs_on("oct 20 2026"));
    assert!(!booking.occurs_on("Oct 2, 2026"));
    assert!(!booking.occurs_on(""));
}

#[test]
fn cancelled_bookings_do_not_block() {
    let driver_id = Uuid::new_v4();

    for status in [Status::Pending, Status::Confirmed, Status::Completed] {
        assert!(test_booking("Oct 20, 2026", Some(driver_id), status).blocks(&driver_id, "Oct 20, 2026"));
    }

    let cancelled = test_booking("Oct 20, 2026", Some(driver_id), Status::Cancelled);
    assert!(!cancelled.blocks(&driver_id, "Oct 20, 2026"));
    assert!(!test_booking("Oct 20, 2026", Some(driver_id), Status::Pending)
        .blocks(&Uuid::new_v4(), "Oct 20, 2026"));
}

#[test]
fn display_price_and_commission() {
    assert_eq!(format_price(24, true), "24 GEL (Promo)");
    assert_eq!(format_price(30, false), "30 GEL");

    let booking = test_booking("Oct 20, 2026", None, Status::Pending);
    assert!((booking.commission(0.15) - 30.3).abs() < 1e-9);
}
