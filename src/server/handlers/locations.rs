use axum::extract::{Extension, Json, Query};
use serde::{Deserialize, Serialize};

use crate::api::DynAPI;
use crate::entities::Location;
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct ResolveParams {
    name: String,
}

pub async fn list(Extension(api): Extension<DynAPI>) -> Json<Vec<Location>> {
    api.locations().into()
}

pub async fn resolve(
    Extension(api): Extension<DynAPI>,
    Query(params): Query<ResolveParams>,
) -> Result<Json<Location>, Error> {
    let location = api.resolve_location(&params.name)?;

    Ok(location.into())
}
