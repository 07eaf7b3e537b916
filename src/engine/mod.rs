pub mod availability;
pub mod distance;
pub mod pricing;
pub mod ranking;

mod booking_api;
mod driver_api;
mod helpers;
mod location_api;
mod search_api;
mod snapshot;
mod tour_api;

#[cfg(test)]
pub(crate) mod fixtures;

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use tokio::sync::Mutex as AsyncMutex;

use crate::api::API;
use crate::catalog::LocationTable;
use crate::config::Config;
use crate::db::DynStore;
use crate::entities::{local_today, Booking, Driver, Tour};
use crate::error::{validation_error, Error};
use crate::external::DynNotifier;
use crate::signal::ChangeSignal;

use helpers::{log_dispatch, with_timeout};
use pricing::PromoCodes;
use snapshot::{Snapshot, SnapshotCache};

pub use ranking::SortKey;

/// Pricing and booking core. Storage and messaging are injected; every call
/// to them is bounded by `timeout`.
pub struct Engine {
    store: DynStore,
    notifier: DynNotifier,
    signal: ChangeSignal,
    locations: LocationTable,
    promos: PromoCodes,
    timeout: Duration,
    timezone: FixedOffset,
    admin_phone: Option<String>,
    snapshot: AsyncMutex<SnapshotCache>,
    in_flight: Mutex<HashSet<String>>,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub fn new(
        store: DynStore,
        notifier: DynNotifier,
        signal: ChangeSignal,
        config: &Config,
    ) -> Self {
        tracing::info!(
            "engine ready, {} promo codes, collaborator timeout {:?}",
            config.promo_codes.len(),
            config.collaborator_timeout
        );

        Self {
            store,
            notifier,
            snapshot: AsyncMutex::new(SnapshotCache::new(
                signal.subscribe(),
                config.snapshot_ttl,
            )),
            signal,
            locations: LocationTable::georgia(),
            promos: PromoCodes::new(&config.promo_codes),
            timeout: config.collaborator_timeout,
            timezone: FixedOffset::east_opt(config.utc_offset_hours * 3600).unwrap_or_else(|| {
                tracing::warn!("invalid UTC offset {}, using UTC", config.utc_offset_hours);
                Utc.fix()
            }),
            admin_phone: config.admin_phone.clone(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn signal(&self) -> &ChangeSignal {
        &self.signal
    }

    /// The service's calendar day, for rejecting past dates.
    fn today(&self) -> NaiveDate {
        local_today(Utc::now(), self.timezone)
    }

    async fn call<T, F>(&self, what: &str, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        with_timeout(self.timeout, what, fut).await
    }

    /// Drivers and bookings for the search path. Served from cache until the
    /// change signal fires.
    async fn snapshot(&self) -> Result<Arc<Snapshot>, Error> {
        let mut cache = self.snapshot.lock().await;
        if let Some(snapshot) = cache.get() {
            return Ok(snapshot);
        }

        tracing::info!("loading drivers and bookings");
        let (drivers, bookings) = futures::try_join!(
            self.call("all_drivers", self.store.all_drivers()),
            self.call("all_bookings", self.store.all_bookings()),
        )?;

        Ok(cache.put(Snapshot { drivers, bookings }))
    }

    /// `Ok(true)` for a known code, `Ok(false)` when none was given.
    fn check_promo(&self, code: Option<&str>) -> Result<bool, Error> {
        match code.map(str::trim).filter(|code| !code.is_empty()) {
            None => Ok(false),
            Some(code) if self.promos.is_valid(code) => Ok(true),
            Some(_) => Err(validation_error("promo_code", "promo code is not valid")),
        }
    }

    /// Fire-and-forget messages for a new booking. Failures are logged only.
    fn dispatch_notifications(&self, booking: Booking, tour: Option<Tour>, driver: Option<Driver>) {
        let store = self.store.clone();
        let notifier = self.notifier.clone();
        let fallback_phone = self.admin_phone.clone();
        let timeout = self.timeout;

        tokio::spawn(async move {
            let summary = booking.summary();

            let admin_phone = match with_timeout(timeout, "settings", store.settings()).await {
                Ok(settings) => {
                    tracing::info!(
                        booking_id = %booking.id,
                        "platform commission {:.2} GEL",
                        booking.commission(settings.commission_rate)
                    );
                    settings.admin_phone.or(fallback_phone)
                }
                Err(err) => {
                    tracing::warn!("could not read settings: {}", err);
                    fallback_phone
                }
            };

            match admin_phone {
                Some(phone) => log_dispatch(
                    "admin sms",
                    with_timeout(timeout, "notify_admin", notifier.notify_admin(&phone, &summary))
                        .await,
                ),
                None => tracing::warn!("no admin phone configured, skipping admin sms"),
            }

            if let Some(driver) = driver {
                log_dispatch(
                    "driver sms",
                    with_timeout(
                        timeout,
                        "notify_driver",
                        notifier.notify_driver(&driver.phone, &summary),
                    )
                    .await,
                );
            }

            log_dispatch(
                "confirmation email",
                with_timeout(
                    timeout,
                    "send_confirmation_email",
                    notifier.send_confirmation_email(&booking, tour.as_ref(), booking.language),
                )
                .await,
            );
        });
    }
}

impl API for Engine {}
