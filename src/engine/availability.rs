//! Which drivers can take a trip on a given date.

use crate::entities::{Booking, Driver};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Unavailable {
    Inactive,
    BlockedDate,
    AlreadyBooked,
    Capacity { capacity: u32, guests: u32 },
}

impl Unavailable {
    pub fn message(&self) -> String {
        match self {
            Self::Inactive => "driver is not accepting bookings".into(),
            Self::BlockedDate => "driver is not available on this date".into(),
            Self::AlreadyBooked => "driver is already booked on this date".into(),
            Self::Capacity { capacity, guests } => format!(
                "vehicle seats {} passengers, {} requested",
                capacity, guests
            ),
        }
    }
}

/// First reason the driver cannot take the trip, if any.
pub fn unavailability(
    driver: &Driver,
    bookings: &[Booking],
    date: &str,
    guests: u32,
) -> Option<Unavailable> {
    if !driver.is_active() {
        return Some(Unavailable::Inactive);
    }

    if driver.is_blocked_on(date) {
        return Some(Unavailable::BlockedDate);
    }

    if bookings.iter().any(|booking| booking.blocks(&driver.id, date)) {
        return Some(Unavailable::AlreadyBooked);
    }

    if !driver.can_seat(guests) {
        return Some(Unavailable::Capacity {
            capacity: driver.capacity(),
            guests,
        });
    }

    None
}

pub fn eligible_drivers<'a>(
    drivers: &'a [Driver],
    bookings: &[Booking],
    date: &str,
    guests: u32,
) -> Vec<&'a Driver> {
    let eligible: Vec<&Driver> = drivers
        .iter()
        .filter(|driver| unavailability(driver, bookings, date, guests).is_none())
        .collect();

    tracing::info!(
        "{} of {} drivers available on {:?} for {} guests",
        eligible.len(),
        drivers.len(),
        date,
        guests
    );

    eligible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{test_booking, BookingStatus, DriverStatus, Vehicle, VehicleType};

    const DATE: &str = "Oct 20, 2026";

    fn driver(name: &str, max_passengers: Option<u32>, kind: VehicleType) -> Driver {
        let mut driver = Driver::new(
            name,
            "+995555000000",
            Vehicle {
                model: "Any".into(),
                kind,
                max_passengers,
            },
        );
        driver.status = DriverStatus::Active;
        driver
    }

    #[test]
    fn excludes_inactive_and_pending_drivers() {
        let mut inactive = driver("Inactive", Some(4), VehicleType::Sedan);
        inactive.status = DriverStatus::Inactive;
        let mut pending = driver("Pending", Some(4), VehicleType::Sedan);
        pending.status = DriverStatus::Pending;

        assert_eq!(unavailability(&inactive, &[], DATE, 1), Some(Unavailable::Inactive));
        assert_eq!(unavailability(&pending, &[], DATE, 1), Some(Unavailable::Inactive));
    }

    #[test]
    fn excludes_self_blocked_dates() {
        let mut blocked = driver("Blocked", Some(4), VehicleType::Sedan);
        blocked.blocked_dates = vec!["oct 20 2026".into()];

        assert_eq!(unavailability(&blocked, &[], DATE, 1), Some(Unavailable::BlockedDate));
        assert_eq!(unavailability(&blocked, &[], "Oct 21, 2026", 1), None);
    }

    #[test]
    fn existing_bookings_block_unless_cancelled() {
        let busy = driver("Busy", Some(4), VehicleType::Sedan);

        for status in [BookingStatus::Pending, BookingStatus::Confirmed, BookingStatus::Completed] {
            let bookings = vec![test_booking("Oct 20, 2026 09:00", Some(busy.id), status)];
            assert_eq!(unavailability(&busy, &bookings, DATE, 1), Some(Unavailable::AlreadyBooked));
        }

        let bookings = vec![test_booking(DATE, Some(busy.id), BookingStatus::Cancelled)];
        assert_eq!(unavailability(&busy, &bookings, DATE, 1), None);
    }

    #[test]
    fn capacity_excludes_small_vehicles() {
        let sedan = driver("Sedan", Some(4), VehicleType::Sedan);

        assert_eq!(
            unavailability(&sedan, &[], DATE, 5),
            Some(Unavailable::Capacity { capacity: 4, guests: 5 })
        );

        let undeclared = driver("Undeclared", None, VehicleType::Sedan);
        assert!(unavailability(&undeclared, &[], DATE, 4).is_some());
        assert!(unavailability(&undeclared, &[], DATE, 3).is_none());
    }

    #[test]
    fn eligible_list_never_contains_undersized_vehicles() {
        let drivers = vec![
            driver("Sedan", Some(4), VehicleType::Sedan),
            driver("Suv", None, VehicleType::Suv),
            driver("Minivan", Some(7), VehicleType::Minivan),
            driver("Minivan undeclared", None, VehicleType::Minivan),
            driver("Bus", None, VehicleType::Bus),
        ];

        for guests in 1..=25 {
            for eligible in eligible_drivers(&drivers, &[], DATE, guests) {
                assert!(eligible.capacity() >= guests, "{} took {}", eligible.name, guests);
            }
        }

        let names: Vec<&str> = eligible_drivers(&drivers, &[], DATE, 5)
            .iter()
            .map(|driver| driver.name.as_str())
            .collect();
        assert_eq!(names, vec!["Minivan", "Minivan undeclared", "Bus"]);
    }
}
