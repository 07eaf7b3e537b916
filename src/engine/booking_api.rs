use super::availability::unavailability;
use super::helpers::{log_dispatch, with_timeout, InFlight};
use super::pricing::{price_for, standard_quote};
use super::Engine;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    api::{BookingAPI, BookingRequest, SearchAPI, TourAPI},
    entities::{
        format_price, normalize_date, validate_date, validate_guests, Booking, BookingKind,
        BookingStatus, Driver, TripSearch,
    },
    error::{availability_conflict_error, invalid_state_error, race_lost_error, Error},
};

impl Engine {
    /// Latest-moment availability check, read straight from the store.
    /// `claiming` is left out of the driver's existing bookings.
    #[tracing::instrument(skip(self))]
    async fn available_driver(
        &self,
        id: Uuid,
        date: &str,
        guests: u32,
        claiming: Option<Uuid>,
    ) -> Result<Driver, Error> {
        let (driver, mut bookings) = futures::try_join!(
            self.call("find_driver", self.store.find_driver(id)),
            self.call("all_bookings", self.store.all_bookings()),
        )?;
        bookings.retain(|booking| Some(booking.id) != claiming);

        if let Some(reason) = unavailability(&driver, &bookings, date, guests) {
            tracing::warn!("driver {} unavailable: {}", driver.id, reason.message());
            return Err(availability_conflict_error(reason.message()));
        }

        Ok(driver)
    }

    fn notify_cancellation(&self, booking: Booking) {
        let driver_id = match booking.driver_id {
            Some(driver_id) => driver_id,
            None => return,
        };

        let store = self.store.clone();
        let notifier = self.notifier.clone();
        let timeout = self.timeout;

        tokio::spawn(async move {
            let driver = match with_timeout(timeout, "find_driver", store.find_driver(driver_id)).await
            {
                Ok(driver) => driver,
                Err(err) => {
                    tracing::warn!("cannot notify driver {}: {}", driver_id, err);
                    return;
                }
            };

            let text = format!("Cancelled: {}", booking.summary());
            log_dispatch(
                "driver cancellation sms",
                with_timeout(timeout, "notify_driver", notifier.notify_driver(&driver.phone, &text))
                    .await,
            );
        });
    }
}

fn submission_key(email: &str, driver_id: Option<Uuid>, date: &str) -> String {
    let driver = match driver_id {
        Some(id) => id.to_string(),
        None => "any".into(),
    };

    format!("{}|{}|{}", email.to_lowercase(), driver, normalize_date(date))
}

#[async_trait]
impl BookingAPI for Engine {
    #[tracing::instrument(skip(self, request), fields(driver_id = ?request.driver_id))]
    async fn submit_booking(&self, request: BookingRequest) -> Result<Booking, Error> {
        let BookingRequest {
            contact,
            driver_id,
            trip,
        } = request;

        let customer = contact.validate()?;
        validate_date(&trip.date, self.today())?;
        validate_guests(trip.guests)?;
        let distance_km = self.estimate_distance(&trip.stops)?;
        let promo = self.check_promo(trip.promo_code.as_deref())?;

        let _in_flight = InFlight::acquire(
            &self.in_flight,
            submission_key(&customer.email, driver_id, &trip.date),
        )?;

        let tour = match &trip.tour_id {
            Some(tour_id) => Some(self.find_tour(tour_id).await?),
            None => None,
        };

        let search = TripSearch::new(trip.stops, &trip.date, trip.guests, distance_km);

        // the date may have been edited since the driver was picked
        let driver = match driver_id {
            Some(id) => Some(
                self.available_driver(id, &search.date, search.guests, None)
                    .await?,
            ),
            None => None,
        };

        let quote = match &driver {
            Some(driver) => price_for(&self.locations, driver, &search, promo),
            None => standard_quote(&self.locations, &search, promo),
        };

        let booking = Booking {
            id: Uuid::new_v4(),
            kind: match &tour {
                Some(tour) => BookingKind::Tour {
                    tour_id: tour.id.clone(),
                },
                None => BookingKind::Transfer,
            },
            customer,
            route: search.stops.clone(),
            date: search.date.clone(),
            time: trip
                .time
                .map(|time| time.trim().to_string())
                .filter(|time| !time.is_empty()),
            guests: search.guests,
            driver_id: driver.as_ref().map(|driver| driver.id),
            driver_name: driver.as_ref().map(|driver| driver.name.clone()),
            distance_km,
            numeric_price: quote.total,
            total_price: format_price(quote.total, promo),
            promo_code: trip
                .promo_code
                .filter(|_| promo)
                .map(|code| code.trim().to_uppercase()),
            language: trip.language,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        };

        self.call("create_booking", self.store.create_booking(&booking))
            .await?;
        tracing::info!(booking_id = %booking.id, "booking created for {}", booking.total_price);

        self.signal.emit();
        self.dispatch_notifications(booking.clone(), tour, driver);

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn find_booking(&self, id: Uuid) -> Result<Booking, Error> {
        self.call("find_booking", self.store.find_booking(id)).await
    }

    #[tracing::instrument(skip(self))]
    async fn open_bookings(&self) -> Result<Vec<Booking>, Error> {
        let bookings = self.call("all_bookings", self.store.all_bookings()).await?;

        Ok(bookings
            .into_iter()
            .filter(Booking::is_claimable)
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, Error> {
        let booking = self
            .call(
                "update_booking_status",
                self.store.update_booking_status(id, status),
            )
            .await?;

        self.signal.emit();

        if booking.status == BookingStatus::Cancelled {
            self.notify_cancellation(booking.clone());
        }

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn claim_booking(&self, id: Uuid, driver_id: Uuid) -> Result<Booking, Error> {
        let booking = self.call("find_booking", self.store.find_booking(id)).await?;

        match booking.driver_id {
            Some(current) if current != driver_id => {
                tracing::info!("booking already taken by {}", current);
                self.signal.emit();
                return Err(race_lost_error());
            }
            Some(_) if booking.status == BookingStatus::Confirmed => return Ok(booking),
            _ => (),
        }

        if booking.status != BookingStatus::Pending {
            return Err(invalid_state_error());
        }

        let driver = self
            .available_driver(driver_id, &booking.date, booking.guests, Some(booking.id))
            .await?;

        let won = self
            .call("assign_driver", self.store.assign_driver(id, &driver))
            .await?;

        // either way the caller's list is stale now
        self.signal.emit();

        if !won {
            tracing::warn!("lost the race for booking {}", id);
            return Err(race_lost_error());
        }

        tracing::info!("booking {} claimed", id);
        self.call("find_booking", self.store.find_booking(id)).await
    }
}
