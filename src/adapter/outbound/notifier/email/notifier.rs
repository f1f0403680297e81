//! SMTP email notifier.
//!
//! Provides the [`EmailNotifier`], which queues events on a channel and sends
//! them from a background task so that `notify` never blocks a caller.
//!
//! Requires the `email` feature to be enabled.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::port::outbound::notifier::{Event, Notifier};

use super::format::{format_event_email, EmailMessage};
use super::settings::{EmailConfig, SmtpEndpoint, SmtpSecurity};

type Transport = AsyncSmtpTransport<Tokio1Executor>;

/// Email notifier that mails every purchase to one recipient.
pub struct EmailNotifier {
    sender: mpsc::UnboundedSender<Event>,
}

impl EmailNotifier {
    /// Resolve the endpoint, build the SMTP transport and spawn the worker.
    ///
    /// No connection is made until the first email is sent. Must be called
    /// from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be resolved, an address does
    /// not parse, or the TLS setup for the host fails.
    pub fn new(config: &EmailConfig, password: String) -> Result<Self> {
        let endpoint = config.endpoint()?;
        let from = parse_mailbox(&endpoint.from)?;
        let to = parse_mailbox(&endpoint.to)?;
        let transport = build_transport(&endpoint, password, config)?;

        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(email_worker(
            transport,
            Envelope { from, to },
            endpoint,
            config.notify_pauses,
            receiver,
        ));
        Ok(Self { sender })
    }
}

impl Notifier for EmailNotifier {
    fn notify(&self, event: Event) {
        if self.sender.send(event).is_err() {
            warn!("Email notifier channel closed");
        }
    }
}

struct Envelope {
    from: Mailbox,
    to: Mailbox,
}

impl Envelope {
    fn message(&self, mail: EmailMessage) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(mail.subject)
            .header(ContentType::TEXT_HTML)
            .body(mail.html)
            .map_err(|e| Error::Email(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| Error::Email(format!("invalid address {address}: {e}")))
}

fn build_transport(
    endpoint: &SmtpEndpoint,
    password: String,
    config: &EmailConfig,
) -> Result<Transport> {
    let builder = match endpoint.security {
        SmtpSecurity::Implicit => Transport::relay(&endpoint.host),
        SmtpSecurity::StartTls => Transport::starttls_relay(&endpoint.host),
        SmtpSecurity::Plain => Ok(Transport::builder_dangerous(&endpoint.host)),
    }
    .map_err(|e| Error::Email(e.to_string()))?;

    Ok(builder
        .port(endpoint.port)
        .credentials(Credentials::new(endpoint.username.clone(), password))
        .timeout(Some(config.timeout()))
        .build())
}

/// Background worker that sends emails.
async fn email_worker(
    transport: Transport,
    envelope: Envelope,
    endpoint: SmtpEndpoint,
    notify_pauses: bool,
    mut receiver: mpsc::UnboundedReceiver<Event>,
) {
    info!(
        host = %endpoint.host,
        port = endpoint.port,
        security = %endpoint.security,
        to = %endpoint.to,
        "Email notifier started"
    );

    while let Some(event) = receiver.recv().await {
        let Some(mail) = format_event_email(&event, notify_pauses) else {
            continue;
        };
        let subject = mail.subject.clone();
        let message = match envelope.message(mail) {
            Ok(message) => message,
            Err(e) => {
                error!(error = %e, "Failed to build email");
                continue;
            }
        };
        match transport.send(message).await {
            Ok(_) => debug!(subject = %subject, "Email sent"),
            Err(e) => error!(error = %e, host = %endpoint.host, "Failed to send email"),
        }
    }

    warn!("Email notifier worker shutting down");
}
