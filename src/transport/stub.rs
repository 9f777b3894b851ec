//! The stub transport records every step of the transactions it is given,
//! without any network activity. It can be told to reject one step, which
//! makes it useful to test the error paths of a [`Session`](crate::Session).
//!
//! ```rust
//! use missive::{transport::stub::{Event, StubTransport}, MessageBuilder, Session};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = Session::with_transport("me@example.com".parse()?, StubTransport::new_ok());
//!
//! let mut message = MessageBuilder::new();
//! message.recipients(["you@example.org".parse()?]);
//! message.text("Hello")?;
//! session.send(message)?;
//!
//! let events = session.transport().events();
//! assert_eq!(events[0], Event::Mail("me@example.com".parse()?));
//! assert_eq!(events[1], Event::Rcpt("you@example.org".parse()?));
//! # Ok(())
//! # }
//! ```

use std::{error::Error as StdError, fmt};

use crate::{
    transport::{MailOptions, Transport},
    Address,
};

/// An error returned by the stub transport
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("stub error")
    }
}

impl StdError for Error {}

/// A step recorded by the stub transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `MAIL FROM`
    Mail(Address),
    /// `RCPT TO`
    Rcpt(Address),
    /// `DATA`, with the message as given to the transport
    Data(Vec<u8>),
    /// The connection was closed
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Reject {
    Nothing,
    Mail,
    Rcpt(Address),
    Data,
}

/// This transport records the transaction steps and accepts or rejects them
#[derive(Debug, Clone)]
pub struct StubTransport {
    reject: Reject,
    events: Vec<Event>,
}

impl StubTransport {
    /// Creates a new transport that accepts every step
    pub fn new_ok() -> StubTransport {
        StubTransport {
            reject: Reject::Nothing,
            events: Vec::new(),
        }
    }

    /// Creates a new transport that rejects `MAIL FROM`
    pub fn rejecting_mail() -> StubTransport {
        StubTransport {
            reject: Reject::Mail,
            events: Vec::new(),
        }
    }

    /// Creates a new transport that rejects `RCPT TO` for `recipient`
    pub fn rejecting_recipient(recipient: Address) -> StubTransport {
        StubTransport {
            reject: Reject::Rcpt(recipient),
            events: Vec::new(),
        }
    }

    /// Creates a new transport that rejects the message content
    pub fn rejecting_data() -> StubTransport {
        StubTransport {
            reject: Reject::Data,
            events: Vec::new(),
        }
    }

    /// Every step seen so far, rejected ones included
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The envelope recipients seen so far
    pub fn recipients(&self) -> Vec<&Address> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Rcpt(address) => Some(address),
                _ => None,
            })
            .collect()
    }

    /// The messages seen so far
    pub fn messages(&self) -> Vec<&[u8]> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Data(message) => Some(message.as_slice()),
                _ => None,
            })
            .collect()
    }
}

impl Transport for StubTransport {
    type Ok = ();
    type Error = Error;

    fn mail(&mut self, sender: &Address, _options: MailOptions) -> Result<(), Error> {
        #[cfg(feature = "tracing")]
        tracing::debug!("MAIL FROM:<{sender}>");
        self.events.push(Event::Mail(sender.clone()));

        match self.reject {
            Reject::Mail => Err(Error),
            _ => Ok(()),
        }
    }

    fn rcpt(&mut self, recipient: &Address) -> Result<(), Error> {
        #[cfg(feature = "tracing")]
        tracing::debug!("RCPT TO:<{recipient}>");
        self.events.push(Event::Rcpt(recipient.clone()));

        match self.reject {
            Reject::Rcpt(ref rejected) if rejected == recipient => Err(Error),
            _ => Ok(()),
        }
    }

    fn data(&mut self, message: &[u8]) -> Result<(), Error> {
        #[cfg(feature = "tracing")]
        tracing::debug!("DATA, {} bytes", message.len());
        self.events.push(Event::Data(message.to_vec()));

        match self.reject {
            Reject::Data => Err(Error),
            _ => Ok(()),
        }
    }

    fn close(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!("close");
        self.events.push(Event::Close);
    }
}
