//! `multipart/mixed` body assembly

use std::fmt::{self, Debug, Formatter};

use super::header::{
    Headers, CONTENT_DISPOSITION, CONTENT_TRANSFER_ENCODING, CONTENT_TYPE,
};
use crate::{base64, error, Error};

const BOUNDARY_LEN: usize = 40;
/// RFC 2045 line length limit for encoded content
const BASE64_LINE_LEN: usize = 76;
/// RFC 5322 line length limit, CRLF excluded
const MAX_LINE_LEN: usize = 998;

/// Creates a random boundary token
pub(crate) fn make_boundary() -> String {
    std::iter::repeat_with(fastrand::alphanumeric)
        .take(BOUNDARY_LEN)
        .collect()
}

/// Checks a boundary against the RFC 2046 grammar, restricted to characters
/// that need no quoting in the `Content-Type` parameter
pub(crate) fn check_boundary(boundary: &str) -> Result<(), Error> {
    let valid = (1..=70).contains(&boundary.len())
        && boundary
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"'()+_-./=".contains(&b));
    if valid {
        Ok(())
    } else {
        Err(error::part(format!("invalid multipart boundary `{boundary}`")))
    }
}

/// One section of a multipart body
#[derive(Clone, PartialEq, Eq)]
pub struct Part {
    headers: Headers,
    content: Vec<u8>,
}

impl Part {
    /// Creates a part out of its headers and already encoded content
    pub fn new(headers: Headers, content: Vec<u8>) -> Self {
        Self { headers, content }
    }

    /// A `text/plain` part, sent as UTF-8
    ///
    /// Line endings are normalized to CRLF. Content with a line longer than
    /// 998 octets is base64 encoded, other non-ASCII content is sent as
    /// `8bit`.
    pub fn text(text: &str) -> Self {
        Self::textual("text/plain; charset=\"utf-8\"", text.as_bytes())
    }

    /// A `text/html` part, sent as UTF-8, encoded like [`Part::text`]
    pub fn html(html: &[u8]) -> Self {
        Self::textual("text/html; charset=\"utf-8\"", html)
    }

    /// An `application/octet-stream` attachment, base64 encoded
    ///
    /// The filename is placed in a quoted string, so it must not be empty nor
    /// contain a line break, a double quote or a backslash.
    pub fn attachment(filename: &str, content: &[u8]) -> Result<Self, Error> {
        if filename.is_empty() {
            return Err(error::part("attachment filename is empty"));
        }
        if filename.contains(['\r', '\n', '"', '\\']) {
            return Err(error::part(format!(
                "attachment filename {filename:?} contains a line break, a quote or a backslash"
            )));
        }

        let mut headers = Headers::new();
        headers
            .set(
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            )
            .map_err(error::part)?;
        headers
            .set(CONTENT_TYPE, "application/octet-stream")
            .map_err(error::part)?;
        headers
            .set(CONTENT_TRANSFER_ENCODING, "base64")
            .map_err(error::part)?;

        Ok(Self {
            headers,
            content: base64::encode_wrapped(content, BASE64_LINE_LEN).into_bytes(),
        })
    }

    fn textual(content_type: &'static str, content: &[u8]) -> Self {
        let content = normalize_line_endings(content);
        let mut headers = Headers::new();
        headers.push_trusted(CONTENT_TYPE, content_type);

        let too_long = content
            .split(|&b| b == b'\n')
            .any(|line| line.strip_suffix(b"\r").unwrap_or(line).len() > MAX_LINE_LEN);
        if too_long {
            headers.push_trusted(CONTENT_TRANSFER_ENCODING, "base64");
            let content = base64::encode_wrapped(&content, BASE64_LINE_LEN).into_bytes();
            return Self { headers, content };
        }

        if !content.is_ascii() {
            headers.push_trusted(CONTENT_TRANSFER_ENCODING, "8bit");
        }
        Self { headers, content }
    }

    /// The headers of the part
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The content of the part, as written on the wire
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

/// Rewrites bare CR and bare LF as CRLF
fn normalize_line_endings(content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len());
    let mut bytes = content.iter().copied().peekable();
    while let Some(byte) = bytes.next() {
        match byte {
            b'\r' => {
                bytes.next_if_eq(&b'\n');
                out.extend_from_slice(b"\r\n");
            }
            b'\n' => out.extend_from_slice(b"\r\n"),
            _ => out.push(byte),
        }
    }
    out
}

impl Debug for Part {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Part")
            .field("headers", &self.headers)
            .field("content_len", &self.content.len())
            .finish()
    }
}

/// Writes parts one after the other into a body buffer, all separated by the
/// same boundary
///
/// [`finish`](MultipartWriter::finish) consumes the writer, so the closing
/// delimiter is emitted exactly once and no part can follow it.
#[derive(Clone)]
pub struct MultipartWriter {
    boundary: String,
    buffer: Vec<u8>,
    parts: usize,
}

impl MultipartWriter {
    /// Creates a writer with a random boundary
    pub fn new() -> Self {
        Self::from_boundary(make_boundary())
    }

    /// Creates a writer with the given boundary
    pub fn with_boundary<S: Into<String>>(boundary: S) -> Result<Self, Error> {
        let boundary = boundary.into();
        check_boundary(&boundary)?;
        Ok(Self::from_boundary(boundary))
    }

    fn from_boundary(boundary: String) -> Self {
        Self {
            boundary,
            buffer: Vec::new(),
            parts: 0,
        }
    }

    /// The boundary token shared by every delimiter
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Number of parts written so far
    pub fn parts(&self) -> usize {
        self.parts
    }

    /// Appends a part, preceded by its delimiter line
    ///
    /// A part whose content contains `--` followed by the boundary is
    /// rejected with a part error, it would end the part early.
    pub fn write_part(&mut self, part: &Part) -> Result<(), Error> {
        let delimiter = format!("--{}", self.boundary);
        if part
            .content
            .windows(delimiter.len())
            .any(|window| window == delimiter.as_bytes())
        {
            return Err(error::part(format!(
                "part content contains the boundary delimiter `{delimiter}`"
            )));
        }

        if self.parts > 0 {
            self.buffer.extend_from_slice(b"\r\n");
        }
        self.buffer.extend_from_slice(b"--");
        self.buffer.extend_from_slice(self.boundary.as_bytes());
        self.buffer.extend_from_slice(b"\r\n");
        self.buffer
            .extend_from_slice(part.headers.to_string().as_bytes());
        self.buffer.extend_from_slice(b"\r\n");
        self.buffer.extend_from_slice(&part.content);
        self.parts += 1;
        Ok(())
    }

    /// Emits the closing delimiter and returns the finished body
    pub fn finish(mut self) -> Vec<u8> {
        self.buffer.extend_from_slice(b"\r\n--");
        self.buffer.extend_from_slice(self.boundary.as_bytes());
        self.buffer.extend_from_slice(b"--\r\n");
        self.buffer
    }
}

impl Default for MultipartWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for MultipartWriter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultipartWriter")
            .field("boundary", &self.boundary)
            .field("parts", &self.parts)
            .field("len", &self.buffer.len())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn random_boundaries() {
        let a = make_boundary();
        let b = make_boundary();
        assert_eq!(a.len(), BOUNDARY_LEN);
        assert!(a.bytes().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
        assert!(check_boundary(&a).is_ok());
    }

    #[test]
    fn boundary_grammar() {
        assert!(check_boundary("simple-boundary").is_ok());
        assert!(check_boundary("").is_err());
        assert!(check_boundary(&"a".repeat(71)).is_err());
        assert!(check_boundary("has space").is_err());
        assert!(check_boundary("quote\"d").is_err());
    }

    #[test]
    fn wire_layout() {
        let mut writer = MultipartWriter::with_boundary("XYZ").unwrap();
        writer.write_part(&Part::text("hi")).unwrap();
        writer.write_part(&Part::html(b"<b>hi</b>")).unwrap();
        assert_eq!(writer.parts(), 2);

        let body = String::from_utf8(writer.finish()).unwrap();
        assert_eq!(
            body,
            concat!(
                "--XYZ\r\n",
                "Content-Type: text/plain; charset=\"utf-8\"\r\n",
                "\r\n",
                "hi",
                "\r\n--XYZ\r\n",
                "Content-Type: text/html; charset=\"utf-8\"\r\n",
                "\r\n",
                "<b>hi</b>",
                "\r\n--XYZ--\r\n",
            )
        );
    }

    #[test]
    fn attachment_headers_and_content() {
        let part = Part::attachment("f.txt", &[0x00, 0xFF]).unwrap();
        assert_eq!(
            part.headers().to_string(),
            concat!(
                "Content-Disposition: attachment; filename=\"f.txt\"\r\n",
                "Content-Type: application/octet-stream\r\n",
                "Content-Transfer-Encoding: base64\r\n",
            )
        );
        assert_eq!(part.content(), b"AP8=");
    }

    #[test]
    fn attachment_filename_checks() {
        assert!(Part::attachment("", b"x").unwrap_err().is_part());
        assert!(Part::attachment("a\r\nb", b"x").unwrap_err().is_part());
        assert!(Part::attachment("a\"b", b"x").unwrap_err().is_part());
        assert!(Part::attachment("a\\b", b"x").unwrap_err().is_part());
        assert!(Part::attachment("résumé.pdf", b"x").is_ok());
    }

    #[test]
    fn delimiter_in_content_is_rejected() {
        let mut writer = MultipartWriter::with_boundary("XYZ").unwrap();
        let injected = Part::text("before\r\n--XYZ\r\nContent-Type: text/html\r\n\r\n<injected>");
        assert!(writer.write_part(&injected).unwrap_err().is_part());
        assert_eq!(writer.parts(), 0);

        // the boundary alone, without the leading dashes, is harmless
        writer.write_part(&Part::text("XYZ")).unwrap();
        let body = String::from_utf8(writer.finish()).unwrap();
        assert_eq!(body.lines().filter(|l| l.starts_with("--XYZ")).count(), 2);
    }

    #[test]
    fn line_endings_are_normalized() {
        assert_eq!(normalize_line_endings(b"a\nb\rc\r\nd\n\n"), b"a\r\nb\r\nc\r\nd\r\n\r\n");
        assert_eq!(Part::text("one\ntwo").content(), b"one\r\ntwo");
        assert_eq!(Part::html(b"<p>\r</p>").content(), b"<p>\r\n</p>");
    }

    #[test]
    fn transfer_encoding_follows_content() {
        let ascii = Part::text("plain");
        assert_eq!(ascii.headers().get(CONTENT_TRANSFER_ENCODING), None);

        let utf8 = Part::text("Grüße");
        assert_eq!(utf8.headers().get(CONTENT_TRANSFER_ENCODING), Some("8bit"));
        assert_eq!(utf8.content(), "Grüße".as_bytes());

        let long_line = "x".repeat(MAX_LINE_LEN + 1);
        let long = Part::html(long_line.as_bytes());
        assert_eq!(long.headers().get(CONTENT_TRANSFER_ENCODING), Some("base64"));
        assert!(long.content().split(|&b| b == b'\n').all(|l| l.len() <= BASE64_LINE_LEN + 1));
        assert_eq!(
            base64::decode(String::from_utf8_lossy(long.content()).replace("\r\n", "")).unwrap(),
            long_line.as_bytes()
        );

        // exactly at the limit stays as is
        let at_limit = "y".repeat(MAX_LINE_LEN);
        assert_eq!(Part::text(&at_limit).content(), at_limit.as_bytes());
    }
}
