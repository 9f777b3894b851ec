//! The mail-transport side of a session
//!
//! A [`Session`](crate::Session) only needs the three steps of an SMTP
//! transaction from its connection, plus a way to close it. They form the
//! [`Transport`] trait, implemented by:
//!
//! * [`SmtpConnection`](smtp::SmtpConnection), a blocking connection
//!   to a mail relay, from the `lettre` crate
//! * [`StubTransport`](stub::StubTransport), which records every step and can
//!   be told to reject one, for tests

use std::error::Error as StdError;

use crate::{Address, Message};

pub mod smtp;
pub mod stub;

/// The steps of an SMTP transaction
///
/// A transaction is one call to [`mail`](Transport::mail), one call to
/// [`rcpt`](Transport::rcpt) per envelope recipient, and one call to
/// [`data`](Transport::data). An error from any step leaves the connection
/// in an undefined state.
pub trait Transport {
    /// Produced by an accepted message
    type Ok;
    /// Error produced by the transport
    type Error: StdError + Send + Sync + 'static;

    /// Starts a transaction for `sender` (`MAIL FROM`)
    fn mail(&mut self, sender: &Address, options: MailOptions) -> Result<(), Self::Error>;

    /// Adds an envelope recipient (`RCPT TO`)
    fn rcpt(&mut self, recipient: &Address) -> Result<(), Self::Error>;

    /// Transmits the formatted message and ends the transaction (`DATA`)
    ///
    /// The transport takes care of the transparency procedure and of the
    /// end-of-data marker.
    fn data(&mut self, message: &[u8]) -> Result<Self::Ok, Self::Error>;

    /// Ends the connection, best effort
    fn close(&mut self);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Ok = T::Ok;
    type Error = T::Error;

    fn mail(&mut self, sender: &Address, options: MailOptions) -> Result<(), Self::Error> {
        (**self).mail(sender, options)
    }

    fn rcpt(&mut self, recipient: &Address) -> Result<(), Self::Error> {
        (**self).rcpt(recipient)
    }

    fn data(&mut self, message: &[u8]) -> Result<Self::Ok, Self::Error> {
        (**self).data(message)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// What the message being sent requires from the relay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MailOptions {
    eight_bit: bool,
    smtp_utf8: bool,
}

impl MailOptions {
    /// Options for sending `message`
    pub fn for_message(message: &Message) -> Self {
        MailOptions {
            eight_bit: !message.formatted().is_ascii(),
            smtp_utf8: message.envelope().has_non_ascii_addresses(),
        }
    }

    /// Whether the content has bytes outside of ASCII
    pub fn eight_bit(&self) -> bool {
        self.eight_bit
    }

    /// Whether an envelope address has characters outside of ASCII
    pub fn smtp_utf8(&self) -> bool {
        self.smtp_utf8
    }
}
