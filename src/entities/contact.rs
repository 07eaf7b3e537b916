use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{validation_error, Error};

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

const MIN_PHONE_DIGITS: usize = 6;

/// Contact fields exactly as typed into the booking form.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Validated contact details stored on a booking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ru,
}

impl ContactForm {
    pub fn validate(&self) -> Result<Customer, Error> {
        let name = self.name.trim();
        if name.chars().count() <= 2 {
            return Err(validation_error("name", "name must be longer than 2 characters"));
        }

        let email = self.email.trim();
        if !EMAIL.is_match(email) {
            return Err(validation_error("email", "invalid email address"));
        }

        let phone = sanitize_phone(&self.phone);
        if phone.chars().filter(|c| c.is_ascii_digit()).count() < MIN_PHONE_DIGITS {
            return Err(validation_error("phone", "phone number is too short"));
        }

        Ok(Customer {
            name: name.into(),
            email: email.into(),
            phone,
        })
    }
}

/// Drops everything but digits, keeping a leading `+`.
pub fn sanitize_phone(phone: &str) -> String {
    let phone = phone.trim();
    let digits = phone.chars().filter(|c| c.is_ascii_digit());

    match phone.starts_with('+') {
        true => std::iter::once('+').chain(digits).collect(),
        false => digits.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, phone: &str) -> ContactForm {
        ContactForm {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    #[test]
    fn accepts_well_formed_contact() {
        let customer = form(" Anna ", "anna@example.com", "+995 (599) 12-34-56")
            .validate()
            .unwrap();

        assert_eq!(customer.name, "Anna");
        assert_eq!(customer.phone, "+995599123456");
    }

    #[test]
    fn rejects_short_name() {
        let err = form("Al", "al@example.com", "599123456").validate().unwrap_err();
        assert_eq!(err.field.as_deref(), Some("name"));
    }

    #[test]
    fn rejects_bad_email() {
        for email in ["anna", "anna@example", "anna @example.com", "@example.com"] {
            let err = form("Anna", email, "599123456").validate().unwrap_err();
            assert_eq!(err.field.as_deref(), Some("email"), "{}", email);
        }
    }

    #[test]
    fn rejects_short_phone() {
        let err = form("Anna", "anna@example.com", "+12-34-5").validate().unwrap_err();
        assert_eq!(err.field.as_deref(), Some("phone"));
    }

    #[test]
    fn sanitize_keeps_only_leading_plus() {
        assert_eq!(sanitize_phone("+995 599-12"), "+99559912");
        assert_eq!(sanitize_phone("599+123"), "599123");
    }
}
