use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use super::Address;

/// The addresses given to the relay for routing, independent of the visible
/// `To` and `Cc` headers
///
/// Every address of To, Cc and Bcc ends up in the forward path. An address
/// listed more than once is kept only at its first position, so it receives a
/// single `RCPT TO`.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Envelope {
    forward_path: Vec<Address>,
    reverse_path: Address,
}

impl Envelope {
    /// Creates a new envelope, which fails if `to` is empty
    ///
    /// ```
    /// use missive::{Address, Envelope};
    ///
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// let from: Address = "from@example.com".parse()?;
    /// let to: Address = "to@example.com".parse()?;
    ///
    /// let envelope = Envelope::new(from, vec![to.clone(), to.clone()])?;
    /// assert_eq!(envelope.to(), &[to]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new<I>(from: Address, to: I) -> Result<Envelope, EnvelopeError>
    where
        I: IntoIterator<Item = Address>,
    {
        let mut forward_path: Vec<Address> = Vec::new();
        for address in to {
            if !forward_path.contains(&address) {
                forward_path.push(address);
            }
        }

        if forward_path.is_empty() {
            return Err(EnvelopeError::MissingTo);
        }

        Ok(Envelope {
            forward_path,
            reverse_path: from,
        })
    }

    /// The envelope recipients, in first-seen order
    pub fn to(&self) -> &[Address] {
        &self.forward_path
    }

    /// The envelope sender
    pub fn from(&self) -> &Address {
        &self.reverse_path
    }

    /// Whether any address of the envelope needs SMTPUTF8
    pub fn has_non_ascii_addresses(&self) -> bool {
        !self.reverse_path.is_ascii() || self.forward_path.iter().any(|a| !a.is_ascii())
    }
}

/// Reasons an envelope can not be built
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum EnvelopeError {
    /// No recipient in To, Cc or Bcc
    MissingTo,
}

impl Error for EnvelopeError {}

impl Display for EnvelopeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeError::MissingTo => f.write_str("missing destination address, invalid envelope"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[test]
    fn keeps_first_occurrence_order() {
        let envelope = Envelope::new(
            addr("me@x.com"),
            vec![addr("b@x.com"), addr("a@x.com"), addr("b@x.com"), addr("c@x.com")],
        )
        .unwrap();

        assert_eq!(
            envelope.to(),
            &[addr("b@x.com"), addr("a@x.com"), addr("c@x.com")]
        );
        assert_eq!(envelope.from(), &addr("me@x.com"));
    }

    #[test]
    fn empty_forward_path() {
        assert_eq!(
            Envelope::new(addr("me@x.com"), Vec::new()),
            Err(EnvelopeError::MissingTo)
        );
    }

    #[test]
    fn non_ascii() {
        let envelope = Envelope::new(addr("me@x.com"), vec![addr("a@x.com")]).unwrap();
        assert!(!envelope.has_non_ascii_addresses());

        let envelope = Envelope::new(addr("me@x.com"), vec![addr("jörg@x.com")]).unwrap();
        assert!(envelope.has_non_ascii_addresses());
    }
}
