//! Development mailer: logs each message and keeps it in an outbox.

use async_trait::async_trait;
use tokio::sync::Mutex;

use quill_core::ports::{Email, MailError, Mailer};

/// Keeps at most this many messages in the outbox.
const OUTBOX_CAPACITY: usize = 100;

#[derive(Default)]
pub struct LogMailer {
    outbox: Mutex<Vec<Email>>,
}

impl LogMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first.
    pub async fn sent(&self) -> Vec<Email> {
        self.outbox.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        tracing::info!(to = %email.to, subject = %email.subject, "Mail sent (log transport)");

        let mut outbox = self.outbox.lock().await;
        if outbox.len() == OUTBOX_CAPACITY {
            outbox.remove(0);
        }
        outbox.push(email);
        Ok(())
    }
}
