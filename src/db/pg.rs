use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, Executor, Pool, Postgres, Row, Transaction};
use uuid::Uuid;

use super::Store;
use crate::entities::{Booking, BookingStatus, Driver, Settings, Tour};
use crate::error::{not_found_error, Error};

type Database = Postgres;

/// Postgres-backed store keeping each record as a JSONB document next to the
/// columns that are queried on.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: Pool<Database>,
}

impl PgStore {
    #[tracing::instrument(name = "PgStore::new", skip(db_uri))]
    pub async fn new(db_uri: &str, max_connections: u32) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(db_uri)
            .await?;

        pool.execute("CREATE TABLE IF NOT EXISTS drivers (id UUID PRIMARY KEY, status VARCHAR NOT NULL, data JSONB NOT NULL)")
            .await?;
        pool.execute("CREATE TABLE IF NOT EXISTS bookings (id UUID PRIMARY KEY, status VARCHAR NOT NULL, driver_id UUID, created_at TIMESTAMPTZ NOT NULL, data JSONB NOT NULL)")
            .await?;
        pool.execute("CREATE TABLE IF NOT EXISTS tours (id VARCHAR PRIMARY KEY, data JSONB NOT NULL)")
            .await?;
        pool.execute("CREATE TABLE IF NOT EXISTS settings (id INT4 PRIMARY KEY, data JSONB NOT NULL)")
            .await?;

        Ok(Self { pool })
    }
}

#[tracing::instrument(skip(tx))]
async fn fetch_booking_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Booking, Error> {
    let Json(booking): Json<Booking> =
        sqlx::query("SELECT data FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("booking"))?
            .try_get("data")?;

    Ok(booking)
}

#[tracing::instrument(skip(tx, booking), fields(booking_id = %booking.id))]
async fn update_booking(
    tx: &mut Transaction<'_, Database>,
    booking: &Booking,
) -> Result<(), Error> {
    sqlx::query("UPDATE bookings SET status = $2, driver_id = $3, data = $4 WHERE id = $1")
        .bind(&booking.id)
        .bind(booking.status.name())
        .bind(&booking.driver_id)
        .bind(Json(booking))
        .execute(&mut *tx)
        .await?;

    Ok(())
}

#[async_trait]
impl Store for PgStore {
    #[tracing::instrument(skip(self))]
    async fn all_drivers(&self) -> Result<Vec<Driver>, Error> {
        let rows = sqlx::query("SELECT data FROM drivers ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<Driver, Error> {
                let Json(driver): Json<Driver> = row.try_get("data")?;
                Ok(driver)
            })
            .collect()
    }

    #[tracing::instrument(skip(self))]
    async fn find_driver(&self, id: Uuid) -> Result<Driver, Error> {
        let Json(driver): Json<Driver> = sqlx::query("SELECT data FROM drivers WHERE id = $1")
            .bind(&id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found_error("driver"))?
            .try_get("data")?;

        Ok(driver)
    }

    #[tracing::instrument(skip(self, driver), fields(driver_id = %driver.id))]
    async fn update_driver(&self, driver: &Driver) -> Result<(), Error> {
        let result = sqlx::query("UPDATE drivers SET status = $2, data = $3 WHERE id = $1")
            .bind(&driver.id)
            .bind(driver.status.name())
            .bind(Json(driver))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("driver"));
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn all_bookings(&self) -> Result<Vec<Booking>, Error> {
        let rows = sqlx::query("SELECT data FROM bookings ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<Booking, Error> {
                let Json(booking): Json<Booking> = row.try_get("data")?;
                Ok(booking)
            })
            .collect()
    }

    #[tracing::instrument(skip(self))]
    async fn find_booking(&self, id: Uuid) -> Result<Booking, Error> {
        let Json(booking): Json<Booking> = sqlx::query("SELECT data FROM bookings WHERE id = $1")
            .bind(&id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found_error("booking"))?
            .try_get("data")?;

        Ok(booking)
    }

    #[tracing::instrument(skip(self, booking), fields(booking_id = %booking.id))]
    async fn create_booking(&self, booking: &Booking) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO bookings (id, status, driver_id, created_at, data) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&booking.id)
        .bind(booking.status.name())
        .bind(&booking.driver_id)
        .bind(&booking.created_at)
        .bind(Json(booking))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, Error> {
        let mut tx = self.pool.begin().await?;

        let mut booking = fetch_booking_for_update(&mut tx, &id).await?;
        booking.transition(status)?;

        update_booking(&mut tx, &booking).await?;
        tx.commit().await?;

        Ok(booking)
    }

    #[tracing::instrument(skip(self, driver), fields(driver_id = %driver.id))]
    async fn assign_driver(&self, booking_id: Uuid, driver: &Driver) -> Result<bool, Error> {
        let mut tx = self.pool.begin().await?;

        // the row lock serializes competing claims on the same booking
        let mut booking = fetch_booking_for_update(&mut tx, &booking_id).await?;

        match booking.claim(driver) {
            Ok(()) => (),
            Err(err) if err.is_race_lost_error() => {
                tx.rollback().await?;
                return Ok(false);
            }
            Err(err) => return Err(err),
        }

        update_booking(&mut tx, &booking).await?;
        tx.commit().await?;

        Ok(true)
    }

    #[tracing::instrument(skip(self))]
    async fn all_tours(&self) -> Result<Vec<Tour>, Error> {
        let rows = sqlx::query("SELECT data FROM tours ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<Tour, Error> {
                let Json(tour): Json<Tour> = row.try_get("data")?;
                Ok(tour)
            })
            .collect()
    }

    #[tracing::instrument(skip(self))]
    async fn find_tour(&self, id: &str) -> Result<Tour, Error> {
        let Json(tour): Json<Tour> = sqlx::query("SELECT data FROM tours WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found_error("tour"))?
            .try_get("data")?;

        Ok(tour)
    }

    #[tracing::instrument(skip(self))]
    async fn settings(&self) -> Result<Settings, Error> {
        let maybe_row = sqlx::query("SELECT data FROM settings WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;

        match maybe_row {
            Some(row) => {
                let Json(settings): Json<Settings> = row.try_get("data")?;
                Ok(settings)
            }
            None => Ok(Settings::default()),
        }
    }
}
