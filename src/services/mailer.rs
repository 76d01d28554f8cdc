use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Mail delivery failed: {0}")]
    Delivery(String),
}

/// Outbound-mail seam. Delivery itself happens outside this service; the
/// default implementation records the message on the log stream, which is
/// where development and test environments read reset links from.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, text: &str) -> Result<(), MailerError>;
}

pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, text: &str) -> Result<(), MailerError> {
        tracing::info!(to = to, subject = subject, "outbound mail: {}", text);
        Ok(())
    }
}

static MAILER: LogMailer = LogMailer;

pub fn mailer() -> &'static dyn Mailer {
    &MAILER
}
