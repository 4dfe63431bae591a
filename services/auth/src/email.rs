//! Email delivery for verification and password-reset links
//!
//! Uses SMTP via lettre. Messages are plain text carrying the signed
//! temporary link; the links expire after ten minutes.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use thiserror::Error;

/// Email configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
    /// Public base URL the emailed links point at
    pub public_base_url: String,
}

impl EmailConfig {
    /// Create a new EmailConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SMTP_HOST`, `SMTP_PORT` (default: 587), `SMTP_USERNAME`, `SMTP_PASSWORD`
    /// - `MAIL_FROM_ADDRESS`: sender address
    /// - `PUBLIC_BASE_URL`: base URL for emailed links (default: "http://localhost:3000")
    pub fn from_env() -> anyhow::Result<Self> {
        let smtp_host = std::env::var("SMTP_HOST")
            .map_err(|_| anyhow::anyhow!("SMTP_HOST environment variable not set"))?;
        let smtp_port = std::env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse()
            .unwrap_or(587);
        let smtp_username = std::env::var("SMTP_USERNAME")
            .map_err(|_| anyhow::anyhow!("SMTP_USERNAME environment variable not set"))?;
        let smtp_password = std::env::var("SMTP_PASSWORD")
            .map_err(|_| anyhow::anyhow!("SMTP_PASSWORD environment variable not set"))?;
        let from_address = std::env::var("MAIL_FROM_ADDRESS")
            .map_err(|_| anyhow::anyhow!("MAIL_FROM_ADDRESS environment variable not set"))?;
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(EmailConfig {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            from_address,
            public_base_url,
        })
    }
}

/// Errors that can occur when sending email
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build the email message
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Mailer for the auth service's transactional emails
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    base_url: String,
}

impl Mailer {
    /// Create a new mailer from configuration
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
            base_url: config.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send the email-verification link
    pub async fn send_verification_link(&self, to: &str, token: &str) -> Result<(), EmailError> {
        let url = verification_url(&self.base_url, token);
        let body = format!(
            "Welcome to Butik!\n\n\
             Please verify your email address by opening the link below. \
             The link expires in 10 minutes.\n\n{url}\n\n\
             If you did not register, you can ignore this message.\n"
        );

        self.send(to, "Verify your Butik account", body).await
    }

    /// Send the password-reset link
    pub async fn send_password_reset_link(&self, to: &str, token: &str) -> Result<(), EmailError> {
        let url = password_reset_url(&self.base_url, token);
        let body = format!(
            "A password reset was requested for your Butik account.\n\n\
             Open the link below to choose a new password. \
             The link expires in 10 minutes.\n\n{url}\n\n\
             If you did not request a reset, you can ignore this message.\n"
        );

        self.send(to, "Reset your Butik password", body).await
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        self.transport.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// Build the emailed verification URL
pub fn verification_url(base_url: &str, token: &str) -> String {
    format!("{base_url}/auth/verify?token={token}")
}

/// Build the emailed password-reset URL
pub fn password_reset_url(base_url: &str, token: &str) -> String {
    format!("{base_url}/auth/password/reset?token={token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_urls() {
        assert_eq!(
            verification_url("http://localhost:3000", "abc.def.ghi"),
            "http://localhost:3000/auth/verify?token=abc.def.ghi"
        );
        assert_eq!(
            password_reset_url("https://butik.example", "t0k"),
            "https://butik.example/auth/password/reset?token=t0k"
        );
    }
}
