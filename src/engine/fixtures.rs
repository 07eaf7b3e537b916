use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;

use super::Engine;
use crate::config::Config;
use crate::db::MemoryStore;
use crate::entities::{Booking, Driver, DriverStatus, Language, Tour, Vehicle, VehicleType};
use crate::error::{upstream_error, Error};
use crate::external::Notifier;
use crate::signal::ChangeSignal;

#[derive(Clone, Debug, PartialEq)]
pub enum Sent {
    Admin(String),
    Driver(String),
    Email { to: String, language: Language, tour: Option<String> },
}

/// Records every message instead of sending it. `failing` makes every
/// call error after recording.
pub struct RecordingNotifier {
    sender: mpsc::UnboundedSender<Sent>,
    failing: bool,
}

impl RecordingNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Sent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender, failing: false }, receiver)
    }

    pub fn failing() -> (Self, mpsc::UnboundedReceiver<Sent>) {
        let (notifier, receiver) = Self::new();
        (Self { failing: true, ..notifier }, receiver)
    }

    fn record(&self, sent: Sent) -> Result<(), Error> {
        let _ = self.sender.send(sent);

        match self.failing {
            true => Err(upstream_error()),
            false => Ok(()),
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_admin(&self, phone: &str, _summary: &str) -> Result<(), Error> {
        self.record(Sent::Admin(phone.into()))
    }

    async fn notify_driver(&self, phone: &str, _summary: &str) -> Result<(), Error> {
        self.record(Sent::Driver(phone.into()))
    }

    async fn send_confirmation_email(
        &self,
        booking: &Booking,
        tour: Option<&Tour>,
        language: Language,
    ) -> Result<(), Error> {
        self.record(Sent::Email {
            to: booking.customer.email.clone(),
            language,
            tour: tour.map(|tour| tour.id.clone()),
        })
    }
}

pub fn active_driver(name: &str, phone: &str, max_passengers: Option<u32>) -> Driver {
    let mut driver = Driver::new(
        name,
        phone,
        Vehicle {
            model: "Toyota Prius".into(),
            kind: VehicleType::Sedan,
            max_passengers,
        },
    );
    driver.status = DriverStatus::Active;
    driver
}

/// A month from today, in the display format the booking form uses.
pub fn future_date() -> String {
    (Utc::now().date_naive() + chrono::Duration::days(30))
        .format("%b %d, %Y")
        .to_string()
}

pub fn test_config() -> Config {
    Config {
        admin_phone: Some("+995500000000".into()),
        ..Config::default()
    }
}

pub fn engine_with(store: MemoryStore, notifier: RecordingNotifier, config: &Config) -> Engine {
    Engine::new(
        Arc::new(store),
        Arc::new(notifier),
        ChangeSignal::new(),
        config,
    )
}

pub fn engine(store: MemoryStore) -> (Engine, mpsc::UnboundedReceiver<Sent>) {
    let (notifier, sent) = RecordingNotifier::new();
    (engine_with(store, notifier, &test_config()), sent)
}
