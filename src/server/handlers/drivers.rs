use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::DynAPI;
use crate::entities::Driver;
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct ToggleBlockedDateParams {
    date: String,
}

#[derive(Serialize, Deserialize)]
pub struct UpdateRateParams {
    price_per_km: f64,
    base_price: f64,
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<Driver>, Error> {
    let driver = api.find_driver(id).await?;

    Ok(driver.into())
}

pub async fn toggle_blocked_date(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
    Json(params): Json<ToggleBlockedDateParams>,
) -> Result<Json<Driver>, Error> {
    let driver = api.toggle_blocked_date(id, params.date).await?;

    Ok(driver.into())
}

pub async fn update_rate(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
    Json(params): Json<UpdateRateParams>,
) -> Result<Json<Driver>, Error> {
    let driver = api
        .update_driver_rate(id, params.price_per_km, params.base_price)
        .await?;

    Ok(driver.into())
}
