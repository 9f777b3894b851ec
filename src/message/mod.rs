//! Composing multipart messages
//!
//! A [`MessageBuilder`] collects the recipients, the subject and the body
//! parts of a message. Every part is written right away into a
//! `multipart/mixed` body using a boundary chosen when the builder is created.
//! [`MessageBuilder::build`] closes the body and produces an immutable
//! [`Message`], ready to be handed to a [`Transport`](crate::Transport).
//!
//! ```
//! use missive::MessageBuilder;
//!
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let mut builder = MessageBuilder::new();
//! builder
//!     .recipients(["a@example.com".parse()?])
//!     .bcc(["archive@example.com".parse()?])
//!     .subject("Hello");
//! builder.text("hi")?.attachment("notes.txt", b"some notes")?;
//!
//! let message = builder.build("me@example.com".parse()?)?;
//! assert_eq!(message.headers().get("To"), Some("a@example.com"));
//! assert!(!message.headers().contains("Bcc"));
//! assert_eq!(message.envelope().to().len(), 2);
//! # Ok(())
//! # }
//! ```

use serde::Serialize;

use crate::{address::Envelope, error, Address, Error};

pub mod header;
mod multipart;
pub mod render;

pub use self::{
    header::{HeaderError, HeaderName, Headers},
    multipart::{MultipartWriter, Part},
    render::Render,
};

/// Value of the `To` header when a message only has Cc or Bcc recipients
const UNDISCLOSED_RECIPIENTS: &str = "undisclosed-recipients:;";

/// Accumulates the fields and body parts of a message
///
/// Setters replace the previous value of their field. Parts are appended in
/// the order they are added, and can not be removed.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    to: Vec<Address>,
    cc: Vec<Address>,
    bcc: Vec<Address>,
    subject: String,
    body: MultipartWriter,
}

impl MessageBuilder {
    /// Creates an empty message with a random boundary
    pub fn new() -> Self {
        Self::from_writer(MultipartWriter::new())
    }

    /// Creates an empty message using the given boundary
    ///
    /// The boundary must follow RFC 2046. Parts containing the boundary
    /// delimiter are then rejected with a part error.
    pub fn with_boundary<S: Into<String>>(boundary: S) -> Result<Self, Error> {
        MultipartWriter::with_boundary(boundary).map(Self::from_writer)
    }

    fn from_writer(body: MultipartWriter) -> Self {
        Self {
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: String::new(),
            body,
        }
    }

    /// Sets the primary recipients, shown in the `To` header
    pub fn recipients<I: IntoIterator<Item = Address>>(&mut self, to: I) -> &mut Self {
        self.to = to.into_iter().collect();
        self
    }

    /// Sets the carbon copy recipients, shown in the `Cc` header
    pub fn cc<I: IntoIterator<Item = Address>>(&mut self, cc: I) -> &mut Self {
        self.cc = cc.into_iter().collect();
        self
    }

    /// Sets the blind carbon copy recipients, which never appear in any header
    pub fn bcc<I: IntoIterator<Item = Address>>(&mut self, bcc: I) -> &mut Self {
        self.bcc = bcc.into_iter().collect();
        self
    }

    /// Sets the subject
    pub fn subject<S: Into<String>>(&mut self, subject: S) -> &mut Self {
        self.subject = subject.into();
        self
    }

    /// Appends a `text/plain` part
    pub fn text<S: AsRef<str>>(&mut self, text: S) -> Result<&mut Self, Error> {
        self.part(Part::text(text.as_ref()))
    }

    /// Appends a `text/html` part
    pub fn html<S: AsRef<str>>(&mut self, html: S) -> Result<&mut Self, Error> {
        self.part(Part::html(html.as_ref().as_bytes()))
    }

    /// Renders a template and appends the result as a `text/html` part
    ///
    /// A rendering failure is reported as a render error and leaves the
    /// message untouched.
    pub fn html_template<R, T>(
        &mut self,
        renderer: &R,
        template: &str,
        data: &T,
    ) -> Result<&mut Self, Error>
    where
        R: Render + ?Sized,
        T: Serialize + ?Sized,
    {
        let html = renderer.render(template, data).map_err(|e| {
            #[cfg(feature = "tracing")]
            tracing::debug!("could not render template {template}: {e}");
            error::render(e)
        })?;
        self.part(Part::html(&html))
    }

    /// Appends a base64 encoded `application/octet-stream` attachment
    ///
    /// The filename is not sanitized: it is rejected if it is empty or contains
    /// CR, LF, a double quote or a backslash.
    pub fn attachment<S: AsRef<str>>(
        &mut self,
        filename: S,
        content: &[u8],
    ) -> Result<&mut Self, Error> {
        let part = Part::attachment(filename.as_ref(), content)?;
        self.part(part)
    }

    /// Appends an arbitrary part
    ///
    /// The part needs a `Content-Type` header, and its content must not
    /// contain the boundary delimiter. The message is left untouched on error.
    pub fn part(&mut self, part: Part) -> Result<&mut Self, Error> {
        if !part.headers().contains(header::CONTENT_TYPE) {
            return Err(error::part("part has no Content-Type header"));
        }
        self.body.write_part(&part)?;
        Ok(self)
    }

    /// The boundary shared by all parts and the `Content-Type` header
    pub fn boundary(&self) -> &str {
        self.body.boundary()
    }

    /// Number of parts added so far
    pub fn parts(&self) -> usize {
        self.body.parts()
    }

    /// The header block the message would get if it was sent by `from`
    ///
    /// Headers come in a fixed order: `From`, `To`, `Cc` (only with carbon copy
    /// recipients), `Subject`, `MIME-Version`, `Content-Type`.
    pub fn headers(&self, from: &Address) -> Headers {
        let mut headers = Headers::new();

        headers.push_trusted(header::FROM, from.to_string());
        if self.to.is_empty() {
            headers.push_trusted(header::TO, UNDISCLOSED_RECIPIENTS);
        } else {
            headers.push_trusted(header::TO, join(&self.to));
        }
        if !self.cc.is_empty() {
            headers.push_trusted(header::CC, join(&self.cc));
        }
        headers.push_trusted(
            header::SUBJECT,
            header::encode_unstructured(&self.subject).into_owned(),
        );
        headers.push_trusted(header::MIME_VERSION, "1.0");
        headers.push_trusted(
            header::CONTENT_TYPE,
            format!("multipart/mixed; boundary={}", self.body.boundary()),
        );

        headers
    }

    /// Finalizes the body and produces the message sent by `from`
    ///
    /// The envelope gathers To, Cc and Bcc. This fails with a part error when
    /// no part was added, and with a transaction error when there is no
    /// recipient at all: a relay would reject both.
    pub fn build(self, from: Address) -> Result<Message, Error> {
        if self.body.parts() == 0 {
            return Err(error::part("message has no body part"));
        }

        let headers = self.headers(&from);
        let envelope = Envelope::new(
            from,
            self.to
                .into_iter()
                .chain(self.cc)
                .chain(self.bcc),
        )
        .map_err(error::transaction)?;

        let parts = self.body.parts();
        let boundary = self.body.boundary().to_owned();
        Ok(Message {
            headers,
            body: self.body.finish(),
            boundary,
            parts,
            envelope,
        })
    }
}

impl Default for MessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn join(addresses: &[Address]) -> String {
    addresses
        .iter()
        .map(Address::as_ref)
        .collect::<Vec<&str>>()
        .join(", ")
}

/// A finalized message: its header block, its closed multipart body and the
/// envelope used to route it
#[derive(Debug, Clone)]
pub struct Message {
    headers: Headers,
    body: Vec<u8>,
    boundary: String,
    parts: usize,
    envelope: Envelope,
}

impl Message {
    /// The top-level headers
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The multipart body, closing delimiter included
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The multipart boundary
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Number of body parts
    pub fn parts(&self) -> usize {
        self.parts
    }

    /// Sender and recipients given to the relay
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// The message as transmitted: headers, blank line, body
    pub fn formatted(&self) -> Vec<u8> {
        let headers = self.headers.to_string();
        let mut out = Vec::with_capacity(headers.len() + 2 + self.body.len());
        out.extend_from_slice(headers.as_bytes());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[test]
    fn canonical_header_order() {
        let mut builder = MessageBuilder::with_boundary("b0und4ry").unwrap();
        builder
            .subject("Status")
            .cc([addr("b@x.com"), addr("c@x.com")])
            .recipients([addr("a@x.com")]);

        assert_eq!(
            builder.headers(&addr("me@x.com")).to_string(),
            concat!(
                "From: me@x.com\r\n",
                "To: a@x.com\r\n",
                "Cc: b@x.com, c@x.com\r\n",
                "Subject: Status\r\n",
                "MIME-Version: 1.0\r\n",
                "Content-Type: multipart/mixed; boundary=b0und4ry\r\n",
            )
        );
    }

    #[test]
    fn cc_only_when_present() {
        let mut builder = MessageBuilder::new();
        builder.recipients([addr("a@x.com")]);
        assert!(!builder.headers(&addr("me@x.com")).contains("Cc"));

        builder.cc([addr("b@x.com")]);
        assert!(builder.headers(&addr("me@x.com")).contains("Cc"));

        builder.cc([]);
        assert!(!builder.headers(&addr("me@x.com")).contains("Cc"));
    }

    #[test]
    fn setters_replace() {
        let mut builder = MessageBuilder::new();
        builder
            .subject("first")
            .subject("second")
            .recipients([addr("a@x.com"), addr("b@x.com")])
            .recipients([addr("c@x.com")]);

        let headers = builder.headers(&addr("me@x.com"));
        assert_eq!(headers.get("Subject"), Some("second"));
        assert_eq!(headers.get("To"), Some("c@x.com"));
    }

    #[test]
    fn undisclosed_recipients() {
        let mut builder = MessageBuilder::new();
        builder.bcc([addr("hidden@x.com")]);
        builder.text("hi").unwrap();

        let message = builder.build(addr("me@x.com")).unwrap();
        assert_eq!(message.headers().get("To"), Some(UNDISCLOSED_RECIPIENTS));
        assert_eq!(message.envelope().to(), &[addr("hidden@x.com")]);
    }

    #[test]
    fn build_requires_a_part() {
        let mut builder = MessageBuilder::new();
        builder.recipients([addr("a@x.com")]);
        assert!(builder.build(addr("me@x.com")).unwrap_err().is_part());
    }

    #[test]
    fn build_requires_a_recipient() {
        let mut builder = MessageBuilder::new();
        builder.text("hi").unwrap();
        assert!(builder.build(addr("me@x.com")).unwrap_err().is_transaction());
    }

    #[test]
    fn custom_part_needs_content_type() {
        let mut builder = MessageBuilder::new();
        assert!(builder
            .part(Part::new(Headers::new(), b"raw".to_vec()))
            .unwrap_err()
            .is_part());
        assert_eq!(builder.parts(), 0);
    }

    #[test]
    fn formatted_message() {
        let mut builder = MessageBuilder::with_boundary("XYZ").unwrap();
        builder.recipients([addr("a@x.com")]).subject("Hi");
        builder.text("hello").unwrap();

        let message = builder.build(addr("me@x.com")).unwrap();
        assert_eq!(message.parts(), 1);
        assert_eq!(message.boundary(), "XYZ");
        assert_eq!(
            String::from_utf8(message.formatted()).unwrap(),
            concat!(
                "From: me@x.com\r\n",
                "To: a@x.com\r\n",
                "Subject: Hi\r\n",
                "MIME-Version: 1.0\r\n",
                "Content-Type: multipart/mixed; boundary=XYZ\r\n",
                "\r\n",
                "--XYZ\r\n",
                "Content-Type: text/plain; charset=\"utf-8\"\r\n",
                "\r\n",
                "hello",
                "\r\n--XYZ--\r\n",
            )
        );
    }

    #[test]
    fn part_containing_the_delimiter_is_refused() {
        let mut builder = MessageBuilder::with_boundary("XYZ").unwrap();
        builder.recipients([addr("a@x.com")]);
        let err = builder
            .text("before\r\n--XYZ\r\nContent-Type: text/html\r\n\r\n<injected>")
            .unwrap_err();
        assert!(err.is_part());
        assert_eq!(builder.parts(), 0);

        builder.text("fine").unwrap();
        let message = builder.build(addr("me@x.com")).unwrap();
        let body = String::from_utf8(message.body().to_vec()).unwrap();
        let delimiters = body
            .split("\r\n")
            .filter(|line| *line == "--XYZ")
            .count();
        assert_eq!(delimiters, message.parts());
    }

    #[test]
    fn header_lines_stay_short() {
        let mut builder = MessageBuilder::new();
        builder
            .recipients((0..40).map(|i| addr(&format!("recipient{i}@example.com"))))
            .subject("é".repeat(600));
        builder.text("hi").unwrap();

        let message = builder.build(addr("me@x.com")).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();
        let (head, _) = formatted.split_once("\r\n\r\n").unwrap();
        let longest = head.split("\r\n").map(str::len).max().unwrap();
        assert!(longest <= 998, "longest header line = {longest}");
        assert!(longest <= 81);
    }
}
