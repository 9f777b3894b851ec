//! Ordered message and part headers
// https://tools.ietf.org/html/rfc5322#section-2.2

use std::{
    borrow::Cow,
    error::Error,
    fmt::{self, Display, Formatter},
};

use crate::base64;

/// Line length header lines are folded at, RFC 5322 section 2.1.1
const FOLD_LEN: usize = 78;
/// Longest encoded word, RFC 2047 section 2
const MAX_ENCODED_WORD_LEN: usize = 75;
/// Input octets per encoded word: 45 octets give 60 base64 characters, which
/// fit in [`MAX_ENCODED_WORD_LEN`] with the `=?utf-8?b?` `?=` delimiters
const ENCODED_WORD_CHUNK: usize = 45;

/// `From` header name
pub const FROM: &str = "From";
/// `To` header name
pub const TO: &str = "To";
/// `Cc` header name
pub const CC: &str = "Cc";
/// `Subject` header name
pub const SUBJECT: &str = "Subject";
/// `MIME-Version` header name
pub const MIME_VERSION: &str = "MIME-Version";
/// `Content-Type` header name
pub const CONTENT_TYPE: &str = "Content-Type";
/// `Content-Disposition` header name
pub const CONTENT_DISPOSITION: &str = "Content-Disposition";
/// `Content-Transfer-Encoding` header name
pub const CONTENT_TRANSFER_ENCODING: &str = "Content-Transfer-Encoding";

/// A list of headers, rendered in insertion order
///
/// Names are compared case-insensitively. Values can not contain CR or LF,
/// which keeps a value from starting a header of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    headers: Vec<(HeaderName, String)>,
}

impl Headers {
    /// Creates an empty header list
    #[inline]
    pub const fn new() -> Self {
        Self {
            headers: Vec::new(),
        }
    }

    /// Sets a header, replacing the value of an existing header with the same name
    /// while keeping its position
    pub fn set<N, V>(&mut self, name: N, value: V) -> Result<(), HeaderError>
    where
        N: Into<HeaderName>,
        V: Into<String>,
    {
        let name = name.into();
        name.check()?;
        let value = value.into();
        if value.contains(['\r', '\n']) {
            return Err(HeaderError::LineBreak(name.to_string()));
        }

        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some((_, current)) => *current = value,
            None => self.headers.push((name, value)),
        }
        Ok(())
    }

    /// Appends a header built by this crate out of validated pieces
    pub(crate) fn push_trusted<V: Into<String>>(&mut self, name: &'static str, value: V) {
        let value = value.into();
        debug_assert!(HeaderName::from(name).check().is_ok());
        debug_assert!(!value.contains(['\r', '\n']));
        self.headers.push((name.into(), value));
    }

    /// Gets the value of a header
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether a header is present
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over `(name, value)` pairs in rendering order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_ref(), value.as_str()))
    }

    /// Number of headers
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl Display for Headers {
    /// Writes one `Name: value` field per header, each ended by CRLF
    ///
    /// Fields longer than 78 characters are folded before a space.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.headers {
            write_folded(f, name, value)?;
        }
        Ok(())
    }
}

fn write_folded(f: &mut Formatter<'_>, name: &str, value: &str) -> fmt::Result {
    f.write_str(name)?;
    f.write_str(":")?;

    let mut line_len = name.len() + 1;
    for (i, word) in value.split(' ').enumerate() {
        // unfolding removes the CRLF and keeps the space, so the value is unchanged
        if i > 0 && !word.is_empty() && line_len + 1 + word.len() > FOLD_LEN {
            f.write_str("\r\n")?;
            line_len = 0;
        }
        f.write_str(" ")?;
        f.write_str(word)?;
        line_len += 1 + word.len();
    }
    f.write_str("\r\n")
}

/// A header name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderName(Cow<'static, str>);

impl HeaderName {
    fn check(&self) -> Result<(), HeaderError> {
        // RFC 5322 field names: printable ASCII except colon
        let valid = !self.0.is_empty()
            && self
                .0
                .bytes()
                .all(|b| (33..=126).contains(&b) && b != b':');
        if valid {
            Ok(())
        } else {
            Err(HeaderError::InvalidName(self.0.to_string()))
        }
    }
}

impl From<&'static str> for HeaderName {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for HeaderName {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl AsRef<str> for HeaderName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for HeaderName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Display for HeaderName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reasons a header can not be set
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HeaderError {
    /// The name is empty or contains characters outside of printable ASCII, or a colon
    InvalidName(String),
    /// The value of the named header contains CR or LF
    LineBreak(String),
}

impl Error for HeaderError {}

impl Display for HeaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            HeaderError::InvalidName(name) => write!(f, "invalid header name `{name}`"),
            HeaderError::LineBreak(name) => write!(f, "value of `{name}` contains a line break"),
        }
    }
}

/// Makes free text safe for an unstructured header such as `Subject`
///
/// Printable ASCII made of words short enough to be folded is kept as is.
/// Anything else, including CR and LF, turns the whole text into a run of
/// RFC 2047 encoded words separated by spaces, cut at char boundaries.
pub(crate) fn encode_unstructured(text: &str) -> Cow<'_, str> {
    let plain = text.bytes().all(|b| (32..=126).contains(&b) || b == b'\t')
        && !text.contains("=?")
        && text
            .split([' ', '\t'])
            .all(|word| word.len() <= MAX_ENCODED_WORD_LEN);
    if plain {
        return Cow::Borrowed(text);
    }

    let mut words = Vec::with_capacity(text.len() / ENCODED_WORD_CHUNK + 1);
    let mut rest = text;
    while !rest.is_empty() {
        let mut end = rest.len().min(ENCODED_WORD_CHUNK);
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        let (chunk, tail) = rest.split_at(end);
        words.push(format!("=?utf-8?b?{}?=", base64::encode(chunk)));
        rest = tail;
    }
    Cow::Owned(words.join(" "))
}
