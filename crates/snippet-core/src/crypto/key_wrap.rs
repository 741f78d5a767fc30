//! Data key wrapping under a password-derived key

use super::encryption::{decrypt, encrypt, EncryptedData};
use super::{SymmetricKey, KEY_SIZE};
use crate::error::{Result, SnippetError};

/// Encrypt the raw bytes of `data_key` under `wrapping_key`
///
/// Uses its own fresh IV, independent of the one used for content.
pub fn wrap_key(data_key: &SymmetricKey, wrapping_key: &SymmetricKey) -> Result<EncryptedData> {
    encrypt(data_key.as_bytes(), wrapping_key)
}

/// Recover a data key wrapped with [`wrap_key`]
///
/// A wrong wrapping key (wrong password) fails authentication and yields
/// [`SnippetError::DecryptionError`].
pub fn unwrap_key(wrapped: &EncryptedData, wrapping_key: &SymmetricKey) -> Result<SymmetricKey> {
    let mut raw = decrypt(wrapped, wrapping_key)?;
    let key = SymmetricKey::from_slice(&raw).ok_or(SnippetError::KeyFormatError {
        expected: KEY_SIZE,
        actual: raw.len(),
    });
    zeroize::Zeroize::zeroize(&mut raw);
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{encrypt, generate_data_key, TAG_SIZE};

    #[test]
    fn test_wrap_unwrap_roundtrip() {
        let data_key = generate_data_key();
        let wrapping_key = generate_data_key();

        let wrapped = wrap_key(&data_key, &wrapping_key).unwrap();
        assert_eq!(wrapped.ciphertext.len(), KEY_SIZE + TAG_SIZE);

        let unwrapped = unwrap_key(&wrapped, &wrapping_key).unwrap();
        assert_eq!(unwrapped, data_key);
    }

    #[test]
    fn test_wrapped_key_hides_raw_bytes() {
        let data_key = generate_data_key();
        let wrapped = wrap_key(&data_key, &generate_data_key()).unwrap();

        assert_ne!(&wrapped.ciphertext[..KEY_SIZE], data_key.as_bytes());
    }

    #[test]
    fn test_unwrap_with_wrong_key() {
        let wrapped = wrap_key(&generate_data_key(), &generate_data_key()).unwrap();
        let result = unwrap_key(&wrapped, &generate_data_key());

        assert!(matches!(result, Err(SnippetError::DecryptionError)));
    }

    #[test]
    fn test_unwrap_tampered_key() {
        let wrapping_key = generate_data_key();
        let mut wrapped = wrap_key(&generate_data_key(), &wrapping_key).unwrap();
        wrapped.ciphertext[5] ^= 0x10;

        assert!(matches!(
            unwrap_key(&wrapped, &wrapping_key),
            Err(SnippetError::DecryptionError)
        ));
    }

    #[test]
    fn test_unwrap_authenticated_but_wrong_length() {
        let wrapping_key = generate_data_key();
        let wrapped = encrypt(&[9u8; 16], &wrapping_key).unwrap();

        assert!(matches!(
            unwrap_key(&wrapped, &wrapping_key),
            Err(SnippetError::KeyFormatError { expected: 32, actual: 16 })
        ));
    }
}
