pub mod bookings;
pub mod drivers;
pub mod locations;
pub mod promos;
pub mod search;
pub mod tours;
