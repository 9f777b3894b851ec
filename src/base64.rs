#[cfg(test)]
use ::base64::DecodeError;
use ::base64::engine::{general_purpose::STANDARD, Engine};

pub(crate) fn encode<T: AsRef<[u8]>>(input: T) -> String {
    STANDARD.encode(input)
}

#[cfg(test)]
pub(crate) fn decode<T: AsRef<[u8]>>(input: T) -> Result<Vec<u8>, DecodeError> {
    STANDARD.decode(input)
}

/// Encodes `input` and breaks the output into CRLF separated lines of at most
/// `line_len` characters, as MIME bodies require.
pub(crate) fn encode_wrapped<T: AsRef<[u8]>>(input: T, line_len: usize) -> String {
    let encoded = encode(input);
    let mut out = String::with_capacity(encoded.len() + 2 * (encoded.len() / line_len + 1));

    // base64 output is pure ASCII, so splitting on bytes never cuts a char
    for (i, chunk) in encoded.as_bytes().chunks(line_len).enumerate() {
        if i > 0 {
            out.push_str("\r\n");
        }
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
    }
    out
}
