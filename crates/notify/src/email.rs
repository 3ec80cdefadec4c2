use aprwatch_core::common::tls::ensure_crypto_provider;
use aprwatch_core::config::EmailConfig;
use aprwatch_core::notify::error::NotifyError;
use aprwatch_core::notify::message::AprChange;
use aprwatch_core::notify::port::Notifier;
use async_trait::async_trait;
use lettre::message::{Mailbox, Message, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::time::Duration;

/// # Summary
/// A notifier implementation that sends messages via SMTP (e.g., Gmail, QQ Mail).
///
/// # Invariants
/// - Requires valid SMTP credentials and server configuration.
/// - Addresses are parsed once at construction.
pub struct EmailNotifier {
    /// The asynchronous SMTP transport.
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    /// The sender's mailbox.
    from: Mailbox,
    /// The recipient's mailbox.
    to: Mailbox,
}

/// Subject line, e.g. `📈 USDC Supply APR Changed on Aave`.
pub fn format_subject(change: &AprChange) -> String {
    format!(
        "{} {} Supply APR Changed on {}",
        change.emoji(),
        change.market.asset,
        change.market.protocol
    )
}

/// Plain text body.
pub fn format_body(change: &AprChange) -> String {
    format!(
        "The {} supply APR has changed.\n\nOld APR: {}%\nNew APR: {}%\nChange: {}\n\n{}\n{}\n",
        change.market,
        change.previous,
        change.current,
        change.signed_change(),
        change.checked_at_text(),
        change.market.page_url,
    )
}

impl EmailNotifier {
    /// # Summary
    /// Creates a new `EmailNotifier`.
    ///
    /// # Logic
    /// 1. Parses the sender and recipient addresses.
    /// 2. Sets up the SMTP credentials.
    /// 3. Configures the relay transport with TLS, authentication and timeout.
    ///
    /// # Arguments
    /// * `config` - SMTP host, credentials and addresses.
    /// * `timeout` - SMTP command timeout.
    ///
    /// # Returns
    /// * A new instance of `EmailNotifier` or `NotifyError::Config`.
    pub fn new(config: &EmailConfig, timeout: Duration) -> Result<Self, NotifyError> {
        ensure_crypto_provider();

        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| NotifyError::Config(format!("Invalid from address: {}", e)))?;
        let to: Mailbox = config
            .to
            .parse()
            .map_err(|e| NotifyError::Config(format!("Invalid to address: {}", e)))?;

        let creds = Credentials::new(config.smtp_user.clone(), config.smtp_pass.clone());

        // Use default submission port 587 with STARTTLS
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| NotifyError::Config(format!("Invalid SMTP host: {}", e)))?
            .credentials(creds)
            .timeout(Some(timeout))
            .build();

        Ok(Self { mailer, from, to })
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn channel(&self) -> &'static str {
        "email"
    }

    /// # Summary
    /// Sends a notification email.
    ///
    /// # Logic
    /// 1. Builds a plain text message from the change.
    /// 2. Sends the email using the configured SMTP transport.
    ///
    /// # Returns
    /// * `Ok(())` if the email was successfully sent.
    /// * `Err(NotifyError)` if a network or SMTP error occurs.
    async fn notify(&self, change: &AprChange) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(format_subject(change))
            .header(ContentType::TEXT_PLAIN)
            .body(format_body(change))
            .map_err(|e| NotifyError::Platform(format!("Failed to build email: {}", e)))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| NotifyError::Network(format!("SMTP error: {}", e)))?;

        Ok(())
    }
}
