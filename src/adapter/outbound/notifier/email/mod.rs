//! Email notifications over SMTP.
//!
//! Mails every completed purchase with the paid price, the join price and
//! the discount between them. The `[email]` section is always parsed so a
//! build without the `email` feature can still validate it.

pub mod settings;

#[cfg(feature = "email")]
mod format;
#[cfg(feature = "email")]
pub mod notifier;
