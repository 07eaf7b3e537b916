use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{BookingRequest, DynAPI};
use crate::entities::{Booking, BookingStatus};
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct UpdateStatusParams {
    status: BookingStatus,
}

#[derive(Serialize, Deserialize)]
pub struct ClaimParams {
    driver_id: Uuid,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<Booking>, Error> {
    let booking = api.submit_booking(request).await?;

    Ok(booking.into())
}

pub async fn open(Extension(api): Extension<DynAPI>) -> Result<Json<Vec<Booking>>, Error> {
    let bookings = api.open_bookings().await?;

    Ok(bookings.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, Error> {
    let booking = api.find_booking(id).await?;

    Ok(booking.into())
}

pub async fn update_status(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
    Json(params): Json<UpdateStatusParams>,
) -> Result<Json<Booking>, Error> {
    let booking = api.update_booking_status(id, params.status).await?;

    Ok(booking.into())
}

pub async fn claim(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
    Json(params): Json<ClaimParams>,
) -> Result<Json<Booking>, Error> {
    let booking = api.claim_booking(id, params.driver_id).await?;

    Ok(booking.into())
}
