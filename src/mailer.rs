//! mailer.rs
//!
//! Booking confirmation email over SMTP. Deployments without SMTP
//! credentials skip delivery and log the intended recipient instead, so a
//! booking never depends on a mail server being reachable.

use chrono::NaiveDateTime;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::SmtpConfig;
use crate::models::SeatCode;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("email build error: {0}")]
    Build(String),
}

/// Everything the ticket email shows about a fresh booking.
#[derive(Debug, Clone)]
pub struct TicketEmail {
    pub recipient_name: String,
    pub booking_reference: String,
    pub event_title: String,
    pub event_location: String,
    pub theater_name: String,
    pub show_time: NaiveDateTime,
    pub seats: Vec<SeatCode>,
    pub amount: i64,
}

impl TicketEmail {
    fn seats_line(&self) -> String {
        self.seats
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn pretty_show_time(&self) -> String {
        self.show_time.format("%I:%M %p | %a, %d %b %Y").to_string()
    }

    fn html(&self) -> String {
        format!(
            r#"<html>
  <body style="margin:0;padding:0;background:#f4f5f7;font-family:Arial,sans-serif;color:#222;">
    <div style="max-width:620px;margin:24px auto;background:#fff;border:1px solid #ddd;">
      <div style="padding:18px 24px;border-bottom:1px solid #eee;">
        <h2 style="margin:0;font-size:22px;color:#444;">Your Tickets</h2>
      </div>
      <div style="padding:26px 24px;">
        <div style="text-align:center;margin-bottom:18px;">
          <h1 style="margin:0;font-size:34px;color:#4338ca;">StagePass</h1>
          <p style="margin:8px 0 0;color:#2fbf71;font-size:28px;font-weight:700;">Your booking is confirmed!</p>
          <p style="margin:8px 0 0;color:#888;">Booking ID <strong style="color:#222;">{reference}</strong></p>
        </div>
        <div style="border:1px solid #ececec;padding:16px;border-radius:8px;">
          <p style="margin:0 0 8px;font-size:22px;font-weight:700;color:#222;">{title}</p>
          <p style="margin:0 0 6px;font-size:16px;color:#444;">{show_time}</p>
          <p style="margin:0 0 6px;font-size:15px;color:#666;">{location}</p>
          <p style="margin:0 0 14px;font-size:15px;color:#666;">{theater}</p>
          <p style="margin:0 0 10px;font-size:24px;font-weight:700;color:#111;">{seats}</p>
          <p style="margin:0;font-size:16px;color:#0f7a4a;">Total paid: {amount}</p>
        </div>
        <p style="margin:18px 0 0;color:#555;">Booked for: <strong>{name}</strong></p>
      </div>
    </div>
  </body>
</html>
"#,
            reference = self.booking_reference,
            title = self.event_title,
            show_time = self.pretty_show_time(),
            location = self.event_location,
            theater = self.theater_name,
            seats = self.seats_line(),
            amount = self.amount,
            name = self.recipient_name,
        )
    }
}

/// Sends ticket emails when SMTP is configured; otherwise every send is a
/// logged no-op.
#[derive(Clone)]
pub struct Mailer {
    smtp: Option<SmtpConfig>,
}

impl Mailer {
    pub fn new(smtp: Option<SmtpConfig>) -> Self {
        Self { smtp }
    }

    pub fn is_configured(&self) -> bool {
        self.smtp.is_some()
    }

    /// Sends the ticket to the patron and, when an admin address is
    /// configured, the same ticket as a new-booking alert to the admin.
    pub async fn send_booking_confirmation(
        &self,
        to: &str,
        ticket: &TicketEmail,
    ) -> Result<(), MailError> {
        let Some(smtp) = &self.smtp else {
            tracing::info!(
                "Email skipped, SMTP not configured: recipient={}, booking={}",
                to,
                ticket.booking_reference
            );
            return Ok(());
        };

        let html = ticket.html();
        let subject = format!("Your Tickets - {}", ticket.event_title);
        send_html(smtp, to, &subject, html.clone()).await?;

        if let Some(admin) = &smtp.admin_email {
            let subject = format!("New Booking Alert - {}", ticket.booking_reference);
            send_html(smtp, admin, &subject, html).await?;
        }
        Ok(())
    }
}

async fn send_html(
    smtp: &SmtpConfig,
    to: &str,
    subject: &str,
    html: String,
) -> Result<(), MailError> {
    let email = Message::builder()
        .from(smtp.from_email.parse()?)
        .to(to.parse()?)
        .subject(subject)
        .header(ContentType::TEXT_HTML)
        .body(html)
        .map_err(|e| MailError::Build(e.to_string()))?;

    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
        .port(smtp.port)
        .credentials(Credentials::new(smtp.user.clone(), smtp.password.clone()))
        .build();
    transport.send(email).await?;

    tracing::info!("Sent '{}' to {}", subject, to);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ticket() -> TicketEmail {
        TicketEmail {
            recipient_name: "Aruzhan".to_string(),
            booking_reference: "SP-9F3A21BC".to_string(),
            event_title: "City Lights Live".to_string(),
            event_location: "Almaty Arena".to_string(),
            theater_name: "Hall 2".to_string(),
            show_time: NaiveDate::from_ymd_opt(2026, 9, 12)
                .unwrap()
                .and_hms_opt(19, 30, 0)
                .unwrap(),
            seats: vec!["A1".parse().unwrap(), "A2".parse().unwrap()],
            amount: 532,
        }
    }

    #[test]
    fn ticket_html_carries_every_booking_fact() {
        let html = ticket().html();
        assert!(html.contains("SP-9F3A21BC"));
        assert!(html.contains("City Lights Live"));
        assert!(html.contains("Almaty Arena"));
        assert!(html.contains("Hall 2"));
        assert!(html.contains("A1, A2"));
        assert!(html.contains("Total paid: 532"));
        assert!(html.contains("Booked for: <strong>Aruzhan</strong>"));
    }

    #[test]
    fn show_times_render_in_ticket_format() {
        assert_eq!(ticket().pretty_show_time(), "07:30 PM | Sat, 12 Sep 2026");
    }

    #[tokio::test]
    async fn unconfigured_smtp_skips_without_error() {
        let mailer = Mailer::new(None);
        assert!(!mailer.is_configured());
        let sent = mailer
            .send_booking_confirmation("patron@example.com", &ticket())
            .await;
        assert!(sent.is_ok());
    }
}
