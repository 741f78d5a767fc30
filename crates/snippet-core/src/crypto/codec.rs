//! Text and base64url transforms shared by keys and frames
//!
//! Output is always URL-safe base64 without padding, so every encoded value
//! can be dropped into a URL fragment unchanged. Decoding accepts unpadded
//! input as well as canonically padded input.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};

use crate::error::{Result, SnippetError};

const BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode a string as UTF-8 bytes
pub fn text_to_bytes(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// Decode UTF-8 bytes into a string
pub fn bytes_to_text(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|e| SnippetError::DecodeError(format!("Invalid UTF-8: {}", e)))
}

/// Encode bytes as unpadded URL-safe base64
pub fn bytes_to_base64url(bytes: &[u8]) -> String {
    BASE64URL.encode(bytes)
}

/// Decode URL-safe base64, with or without padding
pub fn base64url_to_bytes(encoded: &str) -> Result<Vec<u8>> {
    BASE64URL
        .decode(encoded)
        .map_err(|e| SnippetError::DecodeError(format!("Invalid base64url: {}", e)))
}
