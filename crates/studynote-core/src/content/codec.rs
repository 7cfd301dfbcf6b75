//! Wire encoding for note content.
//!
//! Content travels as percent-encoded markup. Older clients produced
//! form-style encoding where a space became `+`; strict percent-encoding
//! never emits a literal `+` (it becomes `%2B`), so a `+` in the wire string
//! identifies the legacy format.

use super::tree::RichText;
use std::borrow::Cow;

/// Lossless encoder/decoder between content trees and wire strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentCodec;

impl ContentCodec {
    /// Encodes a content tree for transport.
    pub fn encode(content: &RichText) -> String {
        Self::encode_markup(&content.to_html())
    }

    /// Decodes a wire string into a content tree.
    ///
    /// Never fails: undecodable input is treated as raw markup.
    pub fn decode(wire: &str) -> RichText {
        RichText::from_html(&Self::decode_markup(wire))
    }

    /// Percent-encodes a markup string.
    pub fn encode_markup(markup: &str) -> String {
        urlencoding::encode(markup).into_owned()
    }

    /// Reverses [`encode_markup`](Self::encode_markup), accepting the legacy
    /// `+`-for-space format.
    pub fn decode_markup(wire: &str) -> String {
        let candidate: Cow<'_, str> = if Self::is_legacy(wire) {
            Cow::Owned(wire.replace('+', " "))
        } else {
            Cow::Borrowed(wire)
        };

        match urlencoding::decode(&candidate) {
            Ok(decoded) => decoded.into_owned(),
            Err(e) => {
                tracing::warn!(
                    "[ContentCodec] Content is not valid percent-encoded UTF-8, using raw value: {}",
                    e
                );
                wire.to_string()
            }
        }
    }

    /// Legacy form encoding is the only producer of literal `+`.
    pub fn is_legacy(wire: &str) -> bool {
        wire.contains('+')
    }
}
