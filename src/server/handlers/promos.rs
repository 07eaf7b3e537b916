use axum::extract::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct ValidateParams {
    code: String,
}

#[derive(Serialize, Deserialize)]
pub struct Validity {
    valid: bool,
}

pub async fn validate(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<ValidateParams>,
) -> Json<Validity> {
    Validity {
        valid: api.is_valid_promo(&params.code),
    }
    .into()
}
