//! Email addresses and the SMTP envelope built from them

mod envelope;
mod types;

pub use self::{
    envelope::{Envelope, EnvelopeError},
    types::{Address, AddressError},
};
