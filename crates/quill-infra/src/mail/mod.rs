//! Mail transports.

mod log;
#[cfg(feature = "smtp")]
mod smtp;

pub use self::log::LogMailer;
#[cfg(feature = "smtp")]
pub use self::smtp::{MailConfig, SmtpConfig, SmtpMailer};
