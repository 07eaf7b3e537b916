use axum::extract::{Extension, Json};

use crate::api::{DynAPI, SearchRequest, SearchResults};
use crate::error::Error;

pub async fn search(
    Extension(api): Extension<DynAPI>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResults>, Error> {
    let results = api.search(request).await?;

    Ok(results.into())
}
