//! Error type returned by sessions and message builders

use std::{error::Error as StdError, fmt};

use crate::BoxError;

/// The errors that may occur while composing or sending a message
///
/// The kind of failure can be inspected with the `is_*` methods, the
/// underlying cause (an SMTP reply, an I/O or TLS error, a template error...)
/// is available through [`source`](StdError::source).
pub struct Error {
    inner: Box<Inner>,
}

struct Inner {
    kind: Kind,
    source: Option<BoxError>,
}

impl Error {
    pub(crate) fn new<E>(kind: Kind, source: Option<E>) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            inner: Box::new(Inner {
                kind,
                source: source.map(Into::into),
            }),
        }
    }

    /// Returns true if dialing, the TLS upgrade or authentication failed
    pub fn is_connection(&self) -> bool {
        matches!(self.inner.kind, Kind::Connection)
    }

    /// Returns true if an email address could not be parsed
    pub fn is_address(&self) -> bool {
        matches!(self.inner.kind, Kind::Address)
    }

    /// Returns true if a body part could not be added to the message
    pub fn is_part(&self) -> bool {
        matches!(self.inner.kind, Kind::Part)
    }

    /// Returns true if an HTML template could not be rendered
    pub fn is_render(&self) -> bool {
        matches!(self.inner.kind, Kind::Render)
    }

    /// Returns true if the SMTP transaction failed
    ///
    /// The connection of the session is in an undefined state afterwards,
    /// it must be closed and a new session opened before trying again.
    pub fn is_transaction(&self) -> bool {
        matches!(self.inner.kind, Kind::Transaction)
    }
}

#[derive(Debug)]
pub(crate) enum Kind {
    /// Dial, TLS upgrade or authentication failure
    Connection,
    /// Invalid email address
    Address,
    /// Structural MIME failure
    Part,
    /// Template rendering failure
    Render,
    /// Failure of a command of the SMTP transaction
    Transaction,
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("missive::Error");

        builder.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            builder.field("source", source);
        }

        builder.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.kind {
            Kind::Connection => f.write_str("connection error")?,
            Kind::Address => f.write_str("invalid address")?,
            Kind::Part => f.write_str("message part error")?,
            Kind::Render => f.write_str("template rendering error")?,
            Kind::Transaction => f.write_str("transaction error")?,
        };

        if let Some(ref e) = self.inner.source {
            write!(f, ": {e}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| {
            let r: &(dyn StdError + 'static) = &**e;
            r
        })
    }
}

impl From<crate::address::AddressError> for Error {
    fn from(err: crate::address::AddressError) -> Self {
        address(err)
    }
}

pub(crate) fn connection<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Connection, Some(e))
}

pub(crate) fn address<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Address, Some(e))
}

pub(crate) fn part<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Part, Some(e))
}

pub(crate) fn render<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Render, Some(e))
}

pub(crate) fn transaction<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Transaction, Some(e))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kinds_are_distinct() {
        let err = render("unknown variable `name`");
        assert!(err.is_render());
        assert!(!err.is_part());
        assert!(!err.is_transaction());

        let err = part("filename contains a line break");
        assert!(err.is_part());
        assert!(!err.is_render());
    }

    #[test]
    fn display_includes_source() {
        let err = transaction("550 5.1.1 no such user");
        assert_eq!(err.to_string(), "transaction error: 550 5.1.1 no such user");
        assert!(err.source().is_some());
    }
}
