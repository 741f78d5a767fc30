//! Envelope encryption flows for shared snippets
//!
//! Keyless: content is encrypted under a random data key and the exported key
//! is returned separately, to travel in a URL fragment the backend never sees.
//!
//! Password: content is encrypted under a random data key, and that key is
//! wrapped under a PBKDF2 key derived from the password and a fresh salt.
//! Only the salt, both IVs, the wrapped key and the ciphertext are framed.
//!
//! Every function here is a single-shot transform with no retained state.

use tracing::debug;

use crate::crypto::codec::{bytes_to_text, text_to_bytes};
use crate::crypto::{
    decrypt, derive_wrapping_key, encrypt, export_key, generate_data_key, generate_salt,
    import_key, unwrap_key, wrap_key,
};
use crate::error::Result;
use crate::frame::{KeylessFrame, PasswordFrame};

/// Output of [`encrypt_keyless`]
#[derive(Clone)]
pub struct KeylessEnvelope {
    /// Opaque payload for storage
    pub frame: String,
    /// Exported data key. Never stored alongside the frame.
    pub key: String,
}

impl std::fmt::Debug for KeylessEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeylessEnvelope")
            .field("frame", &self.frame)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Encrypt plaintext under a fresh data key
pub fn encrypt_keyless(plaintext: &str) -> Result<KeylessEnvelope> {
    let data_key = generate_data_key();
    let content = encrypt(&text_to_bytes(plaintext), &data_key)?;
    let frame = KeylessFrame::new(&content).encode()?;

    debug!(frame_len = frame.len(), "Encrypted keyless snippet");

    Ok(KeylessEnvelope {
        frame,
        key: export_key(&data_key),
    })
}

/// Decrypt a keyless frame with its exported data key
pub fn decrypt_keyless(frame: &str, key: &str) -> Result<String> {
    let content = KeylessFrame::decode(frame)?.content()?;
    let data_key = import_key(key)?;

    let plaintext = decrypt(&content, &data_key)?;
    debug!("Decrypted keyless snippet");
    bytes_to_text(plaintext)
}

/// Encrypt plaintext so that only the password can recover it
pub fn encrypt_with_password(plaintext: &str, password: &str) -> Result<String> {
    let salt = generate_salt();
    let wrapping_key = derive_wrapping_key(password, &salt);
    let data_key = generate_data_key();

    let content = encrypt(&text_to_bytes(plaintext), &data_key)?;
    let wrapped_key = wrap_key(&data_key, &wrapping_key)?;

    let frame = PasswordFrame::new(&salt, &content, &wrapped_key).encode()?;
    debug!(frame_len = frame.len(), "Encrypted password-protected snippet");
    Ok(frame)
}

/// Decrypt a password frame
///
/// A wrong password fails while unwrapping the data key and surfaces as
/// [`SnippetError::DecryptionError`](crate::SnippetError::DecryptionError).
/// Attempt counting is up to the caller.
pub fn decrypt_with_password(frame: &str, password: &str) -> Result<String> {
    let frame = PasswordFrame::decode(frame)?;
    let salt = frame.salt()?;
    let wrapped_key = frame.wrapped_key()?;
    let content = frame.content()?;

    let wrapping_key = derive_wrapping_key(password, &salt);
    let data_key = unwrap_key(&wrapped_key, &wrapping_key)?;

    let plaintext = decrypt(&content, &data_key)?;
    debug!("Decrypted password-protected snippet");
    bytes_to_text(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::codec::{base64url_to_bytes, bytes_to_base64url};
    use crate::crypto::{encrypt_with_iv, SymmetricKey};
    use crate::error::SnippetError;
    use proptest::prelude::*;

    // Fixed-input frames in the web client's layout, generated with Python
    // `cryptography` AESGCM and `hashlib.pbkdf2_hmac("sha256", pw, salt, 100_000)`:
    //   keyless:  key = bytes 0..=31, iv = b"defghijklmno", text "Secret ✓ snippet"
    //   password: pw "correct horse", salt = bytes 0..=15, text_iv = [0x07; 12],
    //             wrapped_iv = [0x09; 12], data key = [0x42; 32], text "API_KEY=sk_live_abc123"
    // Each frame is base64url(JSON) with unpadded base64url fields in the order shown.
    const BROWSER_KEY: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8";
    const BROWSER_KEYLESS_FRAME: &str = "eyJpdiI6IlpHVm1aMmhwYW10c2JXNXYiLCJjaXBoZXJ0ZXh0IjoiRzM2OUZCeWRkbnlpOFgtYnRBd2FqU2UyQ2hONzVmeWdsQTctelNscS1CZ3lmZyJ9";
    const BROWSER_PASSWORD_FRAME: &str = "eyJzYWx0IjoiQUFFQ0F3UUZCZ2NJQ1FvTERBME9EdyIsInRleHRfaXYiOiJCd2NIQndjSEJ3Y0hCd2NIIiwid3JhcHBlZF9pdiI6IkNRa0pDUWtKQ1FrSkNRa0oiLCJ3cmFwcGVkX2RhdGFfa2V5IjoiNUhTVXZTU2dYLUlVQmJ2dUZZQzBoNVNDZ0ZXWmdyUjF3MXhZU2VuRnJtaTN0UHhneFgxcmR2ZGgtYmltNklSciIsImNpcGhlcnRleHQiOiJPYklVOF82MEs4WlFQN05jdEMxREk1UTRiQXpQNXRweUFLZFVyaUtqY2Y0TVF1WkJjVU0ifQ";

    fn flip_bit(encoded: &str, byte: usize) -> String {
        let mut bytes = base64url_to_bytes(encoded).unwrap();
        bytes[byte] ^= 0x01;
        bytes_to_base64url(&bytes)
    }

    #[test]
    fn test_keyless_roundtrip() {
        for plaintext in ["", "hello", "DATABASE_URL=postgresql://user:pw@host/db\n", "🔐 ünïcødé"] {
            let envelope = encrypt_keyless(plaintext).unwrap();
            assert_eq!(decrypt_keyless(&envelope.frame, &envelope.key).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_keyless_key_not_in_frame() {
        let envelope = encrypt_keyless("secret").unwrap();
        let frame = KeylessFrame::decode(&envelope.frame).unwrap();

        assert_ne!(frame.iv, envelope.key);
        assert_ne!(frame.ciphertext, envelope.key);
        assert!(!format!("{:?}", envelope).contains(&envelope.key));
    }

    #[test]
    fn test_keyless_wrong_key() {
        let envelope = encrypt_keyless("secret").unwrap();
        let other = encrypt_keyless("secret").unwrap();

        assert!(matches!(
            decrypt_keyless(&envelope.frame, &other.key),
            Err(SnippetError::DecryptionError)
        ));
    }

    #[test]
    fn test_keyless_truncated_key() {
        let envelope = encrypt_keyless("secret").unwrap();
        assert!(matches!(
            decrypt_keyless(&envelope.frame, &envelope.key[..20]),
            Err(SnippetError::KeyFormatError { .. }) | Err(SnippetError::DecodeError(_))
        ));
    }

    #[test]
    fn test_keyless_same_plaintext_differs() {
        let first = encrypt_keyless("same").unwrap();
        let second = encrypt_keyless("same").unwrap();

        let a = KeylessFrame::decode(&first.frame).unwrap();
        let b = KeylessFrame::decode(&second.frame).unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_keyless_same_key_fresh_nonces() {
        let key = generate_data_key();
        let first = encrypt(b"identical", &key).unwrap();
        let second = encrypt(b"identical", &key).unwrap();

        assert_ne!(first.iv, second.iv);
        assert_ne!(first.ciphertext, second.ciphertext);
    }

    #[test]
    fn test_keyless_tampered_ciphertext() {
        let envelope = encrypt_keyless("tamper me").unwrap();
        let mut frame = KeylessFrame::decode(&envelope.frame).unwrap();
        frame.ciphertext = flip_bit(&frame.ciphertext, 0);

        assert!(matches!(
            decrypt_keyless(&frame.encode().unwrap(), &envelope.key),
            Err(SnippetError::DecryptionError)
        ));
    }

    #[test]
    fn test_keyless_fixed_vector() {
        let key = SymmetricKey::new([0u8; 32]);
        let content = encrypt_with_iv(b"hello", &key, [0u8; 12]).unwrap();
        let frame = KeylessFrame::new(&content).encode().unwrap();

        assert_eq!(
            decrypt_keyless(&frame, "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA").unwrap(),
            "hello"
        );
    }

    #[test]
    fn test_decrypts_browser_keyless_frame() {
        assert_eq!(
            decrypt_keyless(BROWSER_KEYLESS_FRAME, BROWSER_KEY).unwrap(),
            "Secret ✓ snippet"
        );
    }

    #[test]
    fn test_decrypts_browser_password_frame() {
        assert_eq!(
            decrypt_with_password(BROWSER_PASSWORD_FRAME, "correct horse").unwrap(),
            "API_KEY=sk_live_abc123"
        );
        assert!(matches!(
            decrypt_with_password(BROWSER_PASSWORD_FRAME, "correct horse "),
            Err(SnippetError::DecryptionError)
        ));
    }

    #[test]
    fn test_password_roundtrip() {
        let frame = encrypt_with_password("line one\nline two ✓", "s3cret pass").unwrap();
        assert_eq!(
            decrypt_with_password(&frame, "s3cret pass").unwrap(),
            "line one\nline two ✓"
        );
    }

    #[test]
    fn test_password_roundtrip_empty_values() {
        let frame = encrypt_with_password("", "").unwrap();
        assert_eq!(decrypt_with_password(&frame, "").unwrap(), "");
    }

    #[test]
    fn test_wrong_password_fails_closed() {
        let frame = encrypt_with_password("top secret", "pw1").unwrap();
        assert!(matches!(
            decrypt_with_password(&frame, "pw2"),
            Err(SnippetError::DecryptionError)
        ));
    }

    #[test]
    fn test_password_frame_ivs_independent() {
        let frame = PasswordFrame::decode(&encrypt_with_password("x", "pw").unwrap()).unwrap();
        assert_ne!(frame.text_iv, frame.wrapped_iv);
    }

    #[test]
    fn test_password_tampered_fields() {
        let encoded = encrypt_with_password("tamper me", "pw").unwrap();
        let original = PasswordFrame::decode(&encoded).unwrap();

        let mut tampered_ciphertext = original.clone();
        tampered_ciphertext.ciphertext = flip_bit(&original.ciphertext, 3);
        assert!(matches!(
            decrypt_with_password(&tampered_ciphertext.encode().unwrap(), "pw"),
            Err(SnippetError::DecryptionError)
        ));

        let mut tampered_key = original.clone();
        tampered_key.wrapped_data_key = flip_bit(&original.wrapped_data_key, 31);
        assert!(matches!(
            decrypt_with_password(&tampered_key.encode().unwrap(), "pw"),
            Err(SnippetError::DecryptionError)
        ));
    }

    #[test]
    fn test_same_password_gets_independent_salts() {
        let first = PasswordFrame::decode(&encrypt_with_password("same", "pw").unwrap()).unwrap();
        let second = PasswordFrame::decode(&encrypt_with_password("same", "pw").unwrap()).unwrap();

        assert_ne!(first.salt, second.salt);
        assert_ne!(first.ciphertext, second.ciphertext);

        let key1 = derive_wrapping_key("pw", &first.salt().unwrap());
        let key2 = derive_wrapping_key("pw", &second.salt().unwrap());
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_malformed_frames_are_decode_errors() {
        let not_json = bytes_to_base64url(b"<html>410 Gone</html>");

        for payload in ["%%% not base64 %%%", not_json.as_str()] {
            assert!(matches!(
                decrypt_keyless(payload, BROWSER_KEY),
                Err(SnippetError::DecodeError(_))
            ));
            assert!(matches!(
                decrypt_with_password(payload, "pw"),
                Err(SnippetError::DecodeError(_))
            ));
        }
    }

    #[test]
    fn test_flow_mismatch_is_decode_error() {
        let keyless = encrypt_keyless("x").unwrap();
        assert!(matches!(
            decrypt_with_password(&keyless.frame, "pw"),
            Err(SnippetError::DecodeError(_))
        ));
    }

    #[test]
    fn test_concurrent_callers() {
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    scope.spawn(move || {
                        let plaintext = format!("snippet {}", i);
                        let envelope = encrypt_keyless(&plaintext).unwrap();
                        assert_eq!(decrypt_keyless(&envelope.frame, &envelope.key).unwrap(), plaintext);
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
        });
    }

    proptest! {
        #[test]
        fn prop_keyless_roundtrip(plaintext in any::<String>()) {
            let envelope = encrypt_keyless(&plaintext).unwrap();
            prop_assert_eq!(decrypt_keyless(&envelope.frame, &envelope.key).unwrap(), plaintext);
        }

        #[test]
        fn prop_keyless_tampered_ciphertext_rejected(
            plaintext in any::<String>(),
            bit in any::<prop::sample::Index>(),
        ) {
            let envelope = encrypt_keyless(&plaintext).unwrap();
            let mut frame = KeylessFrame::decode(&envelope.frame).unwrap();
            let mut ciphertext = base64url_to_bytes(&frame.ciphertext).unwrap();
            let flipped = bit.index(ciphertext.len() * 8);
            ciphertext[flipped / 8] ^= 1 << (flipped % 8);
            frame.ciphertext = bytes_to_base64url(&ciphertext);

            prop_assert!(matches!(
                decrypt_keyless(&frame.encode().unwrap(), &envelope.key),
                Err(SnippetError::DecryptionError)
            ));
        }
    }

    proptest! {
        // 100k PBKDF2 iterations per derivation
        #![proptest_config(ProptestConfig::with_cases(4))]

        #[test]
        fn prop_password_roundtrip(plaintext in any::<String>(), password in any::<String>()) {
            let frame = encrypt_with_password(&plaintext, &password).unwrap();
            prop_assert_eq!(decrypt_with_password(&frame, &password).unwrap(), plaintext);
        }
    }
}
