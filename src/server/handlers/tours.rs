use axum::extract::{Extension, Json, Path};

use crate::api::DynAPI;
use crate::entities::Tour;
use crate::error::Error;

pub async fn list(Extension(api): Extension<DynAPI>) -> Result<Json<Vec<Tour>>, Error> {
    let tours = api.tours().await?;

    Ok(tours.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<String>,
) -> Result<Json<Tour>, Error> {
    let tour = api.find_tour(&id).await?;

    Ok(tour.into())
}
