//! Outbound notifications. Email is the only channel: invitation delivery
//! is a side effect of the write path and never blocks or fails it.

mod email;

pub use email::Mailer;
