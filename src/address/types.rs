//! Representation of an email address

use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

/// A bare email address, `user@domain`, without a display name.
///
/// Addresses are validated when they are created, so a message builder
/// only ever holds addresses a relay can be expected to route. The syntax
/// checks are the ones of [`lettre::Address`], with international domains
/// and address literals such as `[192.0.2.1]`.
///
/// ```
/// use missive::Address;
///
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let address = "user@example.com".parse::<Address>()?;
/// assert_eq!(address.user(), "user");
/// assert_eq!(address.domain(), "example.com");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct Address(lettre::Address);

impl Address {
    /// Creates an address from its user and domain parts
    pub fn new<U: AsRef<str>, D: AsRef<str>>(user: U, domain: D) -> Result<Self, AddressError> {
        let (user, domain) = (user.as_ref(), domain.as_ref());
        if has_forbidden_chars(user) || has_forbidden_chars(domain) {
            return Err(AddressError::InvalidInput);
        }

        lettre::Address::new(user, domain)
            .map(Address)
            .map_err(AddressError::from)
    }

    /// The part before the `@`
    pub fn user(&self) -> &str {
        self.0.user()
    }

    /// The part after the `@`
    pub fn domain(&self) -> &str {
        self.0.domain()
    }

    /// Whether the address can be sent without the SMTPUTF8 extension
    pub(crate) fn is_ascii(&self) -> bool {
        self.as_ref().is_ascii()
    }

    pub(crate) fn as_lettre(&self) -> &lettre::Address {
        &self.0
    }
}

/// Characters that would let an address escape a header line or an SMTP path
fn has_forbidden_chars(val: &str) -> bool {
    val.chars().any(|c| c.is_control() || c == '<' || c == '>')
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(val: &str) -> Result<Self, AddressError> {
        let (user, domain) = val
            .trim()
            .rsplit_once('@')
            .ok_or(AddressError::MissingParts)?;
        Address::new(user, domain)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(val: String) -> Result<Self, AddressError> {
        val.parse()
    }
}

impl TryFrom<&str> for Address {
    type Error = AddressError;

    fn try_from(val: &str) -> Result<Self, AddressError> {
        val.parse()
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

/// Why a string is not an acceptable address
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum AddressError {
    /// No `@` separating user and domain
    MissingParts,
    /// The local part is not valid
    InvalidUser,
    /// The domain is neither a host name nor an address literal
    InvalidDomain,
    /// Control characters or angle brackets
    InvalidInput,
}

impl From<lettre::address::AddressError> for AddressError {
    fn from(err: lettre::address::AddressError) -> Self {
        use lettre::address::AddressError as Lettre;

        match err {
            Lettre::MissingParts => AddressError::MissingParts,
            Lettre::InvalidUser => AddressError::InvalidUser,
            Lettre::InvalidDomain => AddressError::InvalidDomain,
            _ => AddressError::InvalidInput,
        }
    }
}

impl Error for AddressError {}

impl Display for AddressError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            AddressError::MissingParts => "no `@` between user and domain",
            AddressError::InvalidUser => "invalid local part",
            AddressError::InvalidDomain => "invalid domain",
            AddressError::InvalidInput => "control character or angle bracket in address",
        })
    }
}
