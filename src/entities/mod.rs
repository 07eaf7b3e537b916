mod booking;
mod contact;
mod driver;
mod location;
mod quote;
mod settings;
mod tour;
mod trip_search;

pub use booking::{format_price, Booking, Kind as BookingKind, Status as BookingStatus};
pub use contact::{sanitize_phone, ContactForm, Customer, Language};
pub use driver::{
    Driver, RateCard, Status as DriverStatus, Vehicle, VehicleType, DEFAULT_BASE_PRICE,
    DEFAULT_PRICE_PER_KM,
};
pub use location::{Category, Coordinates, Location};
pub use quote::Quote;
pub use settings::Settings;
pub use tour::Tour;
pub use trip_search::{
    local_today, normalize_date, parse_display_date, stop_key, validate_date, validate_guests,
    validate_stops, TripSearch,
};

#[cfg(test)]
pub(crate) use booking::test_booking;
