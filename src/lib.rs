//! Missive is a small email composer and sender.
//!
//! It opens an authenticated, encrypted connection to a mail relay, assembles a
//! `multipart/mixed` message out of plain text, HTML and attachment parts, and
//! transmits it with a single SMTP transaction.
//!
//! Two pieces cooperate:
//!
//! * a [`Session`] owns the relay connection and sequences the transaction
//!   (`MAIL FROM`, one `RCPT TO` per recipient, `DATA`)
//! * a [`MessageBuilder`] accumulates recipients, subject and body parts, and is
//!   finalized into an immutable [`Message`] right before it is sent
//!
//! ## Example
//!
//! ```rust,no_run
//! use missive::{MessageBuilder, Session};
//!
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let mut session = Session::open("me@example.com", "secret", "smtp.example.com", 587)?;
//!
//! let mut message = MessageBuilder::new();
//! message
//!     .recipients(["friend@example.org".parse()?])
//!     .cc(["boss@example.org".parse()?])
//!     .subject("Quarterly report");
//! message.text("Report attached.")?;
//! message.attachment("report.csv", b"q1,q2\n10,12\n")?;
//!
//! session.send(message)?;
//! session.close();
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! * **tracing**: log the session steps with the `tracing` crate (secrets are never logged)
//! * **tera**: render HTML parts from templates with [`TeraRenderer`](message::render::TeraRenderer)
//! * **hostname**: use the machine hostname in `EHLO` instead of an address literal
//!
//! All three are enabled by default.

#![doc(html_root_url = "https://docs.rs/missive/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![deny(
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications,
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms
)]

pub mod address;
mod base64;
pub mod error;
pub mod message;
pub mod session;
pub mod transport;

pub use crate::{
    address::{Address, Envelope},
    error::Error,
    message::{Message, MessageBuilder},
    session::Session,
    transport::Transport,
};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;
