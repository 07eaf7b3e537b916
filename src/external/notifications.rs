use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::Endpoint;
use crate::entities::{Booking, Language, Tour};
use crate::error::{invalid_input_error, upstream_error, Error};

/// Messaging collaborator. Callers treat every method as fire-and-forget.
#[async_trait]
pub trait Notifier {
    async fn notify_admin(&self, phone: &str, summary: &str) -> Result<(), Error>;
    async fn notify_driver(&self, phone: &str, summary: &str) -> Result<(), Error>;
    async fn send_confirmation_email(
        &self,
        booking: &Booking,
        tour: Option<&Tour>,
        language: Language,
    ) -> Result<(), Error>;
}

pub type DynNotifier = Arc<dyn Notifier + Send + Sync>;

#[derive(Serialize)]
struct SmsRequest<'a> {
    to: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
struct EmailRequest<'a> {
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Sends SMS and email through HTTP gateways. A missing endpoint turns that
/// channel into a logged no-op.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    sms: Option<Endpoint>,
    email: Option<Endpoint>,
}

impl HttpNotifier {
    pub fn new(
        sms: Option<Endpoint>,
        email: Option<Endpoint>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client, sms, email })
    }

    #[tracing::instrument(skip(self, text))]
    async fn send_sms(&self, to: &str, text: &str) -> Result<(), Error> {
        let endpoint = match &self.sms {
            Some(endpoint) => endpoint,
            None => {
                tracing::info!("sms gateway not configured, skipping message to {}", to);
                return Ok(());
            }
        };

        let res = self
            .client
            .post(format!("https://{}/sms/send", endpoint.api_base))
            .bearer_auth(&endpoint.api_key)
            .json(&SmsRequest { to, text })
            .send()
            .await?;

        check_status(res.status())
    }

    #[tracing::instrument(skip(self, subject, text))]
    async fn send_email(&self, to: &str, subject: &str, text: &str) -> Result<(), Error> {
        let endpoint = match &self.email {
            Some(endpoint) => endpoint,
            None => {
                tracing::info!("email gateway not configured, skipping mail to {}", to);
                return Ok(());
            }
        };

        let res = self
            .client
            .post(format!("https://{}/email/send", endpoint.api_base))
            .bearer_auth(&endpoint.api_key)
            .json(&EmailRequest { to, subject, text })
            .send()
            .await?;

        check_status(res.status())
    }
}

fn check_status(status: reqwest::StatusCode) -> Result<(), Error> {
    if status.is_client_error() {
        return Err(invalid_input_error());
    } else if !status.is_success() {
        return Err(upstream_error());
    }

    Ok(())
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify_admin(&self, phone: &str, summary: &str) -> Result<(), Error> {
        self.send_sms(phone, summary).await
    }

    async fn notify_driver(&self, phone: &str, summary: &str) -> Result<(), Error> {
        self.send_sms(phone, summary).await
    }

    async fn send_confirmation_email(
        &self,
        booking: &Booking,
        tour: Option<&Tour>,
        language: Language,
    ) -> Result<(), Error> {
        let (subject, text) = confirmation_email(booking, tour, language);
        self.send_email(&booking.customer.email, &subject, &text)
            .await
    }
}

/// Writes every notification to the log instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_admin(&self, phone: &str, summary: &str) -> Result<(), Error> {
        tracing::info!(to = phone, "admin sms: {}", summary);
        Ok(())
    }

    async fn notify_driver(&self, phone: &str, summary: &str) -> Result<(), Error> {
        tracing::info!(to = phone, "driver sms: {}", summary);
        Ok(())
    }

    async fn send_confirmation_email(
        &self,
        booking: &Booking,
        tour: Option<&Tour>,
        language: Language,
    ) -> Result<(), Error> {
        let (subject, _) = confirmation_email(booking, tour, language);
        tracing::info!(to = %booking.customer.email, "confirmation email: {}", subject);
        Ok(())
    }
}

pub fn confirmation_email(
    booking: &Booking,
    tour: Option<&Tour>,
    language: Language,
) -> (String, String) {
    let route = booking.route.join(" → ");
    let title = match tour {
        Some(tour) => tour.title(language).to_string(),
        None => route.clone(),
    };

    match language {
        Language::En => (
            format!("OrbiTrip booking received: {}", title),
            format!(
                "Hello {},\n\nWe received your booking.\n\nTrip: {}\nRoute: {}\nDate: {}\nGuests: {}\nPrice: {}\n\nA driver will confirm shortly.\nOrbiTrip",
                booking.customer.name, title, route, booking.display_date(), booking.guests, booking.total_price,
            ),
        ),
        Language::Ru => (
            format!("OrbiTrip: заявка получена: {}", title),
            format!(
                "Здравствуйте, {}!\n\nМы получили вашу заявку.\n\nПоездка: {}\nМаршрут: {}\nДата: {}\nГостей: {}\nЦена: {}\n\nВодитель скоро подтвердит заказ.\nOrbiTrip",
                booking.customer.name, title, route, booking.display_date(), booking.guests, booking.total_price,
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{test_booking, BookingStatus};

    #[test]
    fn confirmation_email_uses_tour_title_in_language() {
        let booking = test_booking("Oct 20, 2026", None, BookingStatus::Pending);
        let tour = Tour {
            id: "kazbegi-day".into(),
            title_en: "Kazbegi Day Trip".into(),
            title_ru: Some("Однодневный тур в Казбеги".into()),
            stops: vec![],
        };

        let (subject, text) = confirmation_email(&booking, Some(&tour), Language::Ru);
        assert!(subject.contains("Однодневный тур в Казбеги"));
        assert!(text.contains("Tbilisi → Gudauri"));

        let (subject, text) = confirmation_email(&booking, None, Language::En);
        assert!(subject.contains("Tbilisi → Gudauri"));
        assert!(text.contains("202 GEL"));
    }

    #[test]
    fn gateway_status_mapping() {
        assert!(check_status(reqwest::StatusCode::OK).is_ok());
        assert!(check_status(reqwest::StatusCode::BAD_REQUEST)
            .unwrap_err()
            .is_invalid_input_error());
        assert_eq!(
            check_status(reqwest::StatusCode::BAD_GATEWAY).unwrap_err().code,
            upstream_error().code
        );
    }

    #[tokio::test]
    async fn unconfigured_gateways_are_no_ops() {
        let notifier = HttpNotifier::new(None, None, Duration::from_secs(1)).unwrap();
        let booking = test_booking("Oct 20, 2026", None, BookingStatus::Pending);

        notifier.notify_admin("+995555000000", "hi").await.unwrap();
        notifier
            .send_confirmation_email(&booking, None, Language::En)
            .await
            .unwrap();
    }
}
