//! AES-256-GCM encryption with scrypt key derivation.
//!
//! The key is derived once from a configured passphrase and passed in
//! explicitly; nothing in this module holds global state. Every encryption
//! call draws a fresh random iv, and the ciphertext, iv, and authentication
//! tag are kept as three separate base64 fields so stored bundles match the
//! layout existing records were written in.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::Aead;
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::RngCore;
use scrypt::{scrypt, Params};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroizing;

use controle_core::SecretString;

use crate::types::CipherBundle;

/// Key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Initialization vector length in bytes. Stored bundles carry 16-byte ivs,
/// so this cannot shrink to the 12 bytes GCM implementations default to.
pub const IV_LEN: usize = 16;

/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Fixed KDF salt. Changing it orphans every previously stored bundle.
const KDF_SALT: &[u8] = b"salt";

/// scrypt cost parameters: N = 2^14, r = 8, p = 1.
const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

/// AES-256-GCM parameterized for the 16-byte iv of the stored bundle layout.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Errors from key derivation, encryption, and decryption.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Key derivation failed: {0}")]
    Kdf(String),

    #[error("Cipher failure: {0}")]
    Cipher(String),

    #[error("Integrity check failed: bundle was tampered with or encrypted under a different key")]
    Integrity,

    #[error("Malformed cipher bundle: {0}")]
    InvalidBundle(String),
}

/// Convenience result alias for crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;

/// A derived AES-256 key.
///
/// Immutable once constructed. Derivation is deterministic: the same
/// passphrase always yields the same key, so bundles written before a
/// restart stay decryptable after it. The raw bytes are zeroed on drop and
/// never printed.
pub struct EncryptionKey {
    bytes: Zeroizing<[u8; KEY_LEN]>,
}

impl EncryptionKey {
    /// Derive a key from a configured passphrase with scrypt.
    ///
    /// Length policy on the passphrase is enforced by configuration
    /// validation before this runs.
    pub fn derive(passphrase: &SecretString) -> Result<Self> {
        let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN)
            .map_err(|e| CryptoError::Kdf(e.to_string()))?;

        let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
        scrypt(
            passphrase.expose_secret().as_bytes(),
            KDF_SALT,
            &params,
            &mut bytes[..],
        )
        .map_err(|e| CryptoError::Kdf(e.to_string()))?;

        Ok(Self { bytes })
    }

    /// Build a key directly from raw bytes.
    ///
    /// Intended for tests and callers that manage their own derivation.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey([REDACTED])")
    }
}

/// Encrypt `plaintext` into a [`CipherBundle`].
///
/// A fresh random iv is drawn per call, so encrypting the same plaintext
/// twice produces different bundles.
pub fn encrypt(key: &EncryptionKey, plaintext: &str) -> Result<CipherBundle> {
    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);

    let cipher = Aes256Gcm16::new_from_slice(&key.bytes[..])
        .map_err(|e| CryptoError::Cipher(e.to_string()))?;

    let nonce = Nonce::from_slice(&iv);
    let mut ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| CryptoError::Cipher(e.to_string()))?;

    // The AEAD output ends with the tag; the stored layout keeps
    // ciphertext and tag as separate fields.
    let tag = ciphertext.split_off(ciphertext.len() - TAG_LEN);

    Ok(CipherBundle {
        encrypted_value: STANDARD.encode(&ciphertext),
        iv: STANDARD.encode(iv),
        auth_tag: STANDARD.encode(&tag),
    })
}

/// Decrypt a [`CipherBundle`] produced by [`encrypt`].
///
/// Fails closed: a tampered or corrupted bundle, or one encrypted under a
/// different key, yields [`CryptoError::Integrity`] and never partial
/// plaintext. Both failure modes are deterministic for given inputs, so
/// callers must not retry.
pub fn decrypt(key: &EncryptionKey, bundle: &CipherBundle) -> Result<String> {
    let ciphertext = decode_field(&bundle.encrypted_value, "encrypted_value")?;
    let iv = decode_field(&bundle.iv, "iv")?;
    let tag = decode_field(&bundle.auth_tag, "auth_tag")?;

    if iv.len() != IV_LEN {
        return Err(CryptoError::InvalidBundle(format!(
            "iv must be {IV_LEN} bytes, got {}",
            iv.len()
        )));
    }
    if tag.len() != TAG_LEN {
        return Err(CryptoError::InvalidBundle(format!(
            "auth_tag must be {TAG_LEN} bytes, got {}",
            tag.len()
        )));
    }

    let cipher = Aes256Gcm16::new_from_slice(&key.bytes[..])
        .map_err(|e| CryptoError::Cipher(e.to_string()))?;

    let mut sealed = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    sealed.extend_from_slice(&ciphertext);
    sealed.extend_from_slice(&tag);

    let nonce = Nonce::from_slice(&iv);
    let plaintext = cipher
        .decrypt(nonce, sealed.as_slice())
        .map_err(|_| CryptoError::Integrity)?;

    String::from_utf8(plaintext)
        .map_err(|e| CryptoError::InvalidBundle(format!("plaintext is not valid UTF-8: {e}")))
}

/// SHA-256 fingerprint of a value, lowercase hex.
///
/// For fingerprinting only; this is not a password hash.
pub fn fingerprint(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate `byte_len` random bytes, hex-encoded.
///
/// The returned string is `2 * byte_len` characters long.
pub fn generate_token(byte_len: usize) -> String {
    let mut bytes = vec![0u8; byte_len];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn decode_field(value: &str, field: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| CryptoError::InvalidBundle(format!("{field} is not valid base64: {e}")))
}
