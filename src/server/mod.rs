mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, patch, post},
    Router,
};

use crate::api::{DynAPI, API};
use crate::error::{unexpected_error, Error};
use crate::server::handlers::{bookings, drivers, locations, promos, search, tours};

pub fn router(api: DynAPI) -> Router {
    Router::new()
        .route("/locations", get(locations::list))
        .route("/locations/resolve", get(locations::resolve))
        .route("/search", post(search::search))
        .route("/promos/validate", post(promos::validate))
        .route("/bookings", post(bookings::create).get(bookings::open))
        .route("/bookings/:id", get(bookings::find))
        .route("/bookings/:id/status", patch(bookings::update_status))
        .route("/bookings/:id/claim", patch(bookings::claim))
        .route("/tours", get(tours::list))
        .route("/tours/:id", get(tours::find))
        .route("/drivers/:id", get(drivers::find))
        .route("/drivers/:id/blocked_dates", patch(drivers::toggle_blocked_date))
        .route("/drivers/:id/rate", patch(drivers::update_rate))
        .layer(Extension(api))
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) -> Result<(), Error> {
    let app = router(Arc::new(api) as DynAPI);

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(|err| {
            tracing::error!("server error: {}", err);
            unexpected_error()
        })
}
