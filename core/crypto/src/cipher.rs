//! Cipher invocation for AES-CBC and AES-GCM.
//!
//! AES-GCM runs with a 16-byte nonce and appends the (possibly truncated)
//! authentication tag to the ciphertext. AES-CBC uses PKCS#7 padding and
//! provides no integrity.

use aes::cipher::block_padding::{Pkcs7, UnpadError};
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, InvalidLength, KeyIvInit};
use aes::{Aes128, Aes192, Aes256};
use aes_gcm::aead::{consts::U16, generic_array::GenericArray, AeadInPlace, KeyInit};
use aes_gcm::AesGcm;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::keys::{DerivedKey, ImportedKey};
use crate::params::{AlgorithmParameters, IV_SIZE};
use cryptoshield_common::{Algorithm, Error, KeyLength, KeyUsage, Result};

/// Full GCM tag size (16 bytes).
pub const FULL_TAG_SIZE: usize = 16;

type Aes128Gcm16 = AesGcm<Aes128, U16>;
type Aes192Gcm16 = AesGcm<Aes192, U16>;
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Turn derived bytes into a key usable with `algorithm`.
///
/// # Errors
/// - Returns error if the byte length does not match `key_length`
/// - Returns error if `usages` is empty
pub fn import_key(
    derived: DerivedKey,
    algorithm: Algorithm,
    key_length: KeyLength,
    usages: &[KeyUsage],
    extractable: bool,
) -> Result<ImportedKey> {
    if derived.len() != key_length.bytes() {
        return Err(Error::KeyImport(format!(
            "Invalid key length: expected {} bytes for {}, got {}",
            key_length.bytes(),
            algorithm,
            derived.len()
        )));
    }

    if usages.is_empty() {
        return Err(Error::KeyImport(
            "Usages cannot be empty when creating a key".to_string(),
        ));
    }

    let mut usages = usages.to_vec();
    usages.sort();
    usages.dedup();

    Ok(ImportedKey::new(
        derived.as_bytes().to_vec(),
        algorithm,
        key_length,
        usages,
        extractable,
    ))
}

fn check_key(key: &ImportedKey, params: &AlgorithmParameters, usage: KeyUsage) -> Result<()> {
    let fail = |msg: String| match usage {
        KeyUsage::Encrypt => Error::Encryption(msg),
        KeyUsage::Decrypt => Error::Decryption(msg),
    };

    if !key.allows(usage) {
        return Err(fail(format!("Key does not permit {}", usage)));
    }
    if key.algorithm() != params.algorithm {
        return Err(fail(format!(
            "Key was imported for {}, not {}",
            key.algorithm(),
            params.algorithm
        )));
    }
    Ok(())
}

/// Encrypt `plaintext` under `key`.
///
/// # Postconditions
/// - AES-GCM: returns ciphertext || tag, tag truncated to the configured length
/// - AES-CBC: returns PKCS#7-padded ciphertext
///
/// # Errors
/// - Key lacks the encrypt usage or belongs to another algorithm
/// - Cipher failure
pub fn encrypt_bytes(
    plaintext: &[u8],
    key: &ImportedKey,
    params: &AlgorithmParameters,
) -> Result<Vec<u8>> {
    check_key(key, params, KeyUsage::Encrypt)?;

    let bytes = key.as_bytes();
    match params.algorithm {
        Algorithm::AesGcm => {
            let tag_len = params.tag_length.bytes();
            match key.key_length() {
                KeyLength::Bits128 => gcm_encrypt::<Aes128Gcm16>(bytes, &params.iv, tag_len, plaintext),
                KeyLength::Bits192 => gcm_encrypt::<Aes192Gcm16>(bytes, &params.iv, tag_len, plaintext),
                KeyLength::Bits256 => gcm_encrypt::<Aes256Gcm16>(bytes, &params.iv, tag_len, plaintext),
            }
        }
        Algorithm::AesCbc => cbc_encrypt(key.key_length(), bytes, &params.iv, plaintext),
    }
}

/// Decrypt `ciphertext` under `key`.
///
/// # Errors
/// - Key lacks the decrypt usage or belongs to another algorithm
/// - AES-GCM: authentication tag mismatch (tampered data or wrong key)
/// - AES-CBC: invalid padding
pub fn decrypt_bytes(
    ciphertext: &[u8],
    key: &ImportedKey,
    params: &AlgorithmParameters,
) -> Result<Vec<u8>> {
    check_key(key, params, KeyUsage::Decrypt)?;

    let bytes = key.as_bytes();
    match params.algorithm {
        Algorithm::AesGcm => {
            let tag_len = params.tag_length.bytes();
            match key.key_length() {
                KeyLength::Bits128 => gcm_decrypt::<Aes128Gcm16>(bytes, &params.iv, tag_len, ciphertext),
                KeyLength::Bits192 => gcm_decrypt::<Aes192Gcm16>(bytes, &params.iv, tag_len, ciphertext),
                KeyLength::Bits256 => gcm_decrypt::<Aes256Gcm16>(bytes, &params.iv, tag_len, ciphertext),
            }
        }
        Algorithm::AesCbc => cbc_decrypt(key.key_length(), bytes, &params.iv, ciphertext),
    }
}

fn gcm_encrypt<C>(key: &[u8], iv: &[u8; IV_SIZE], tag_len: usize, plaintext: &[u8]) -> Result<Vec<u8>>
where
    C: AeadInPlace<NonceSize = U16, TagSize = U16> + KeyInit,
{
    let cipher = C::new_from_slice(key)
        .map_err(|e| Error::Encryption(format!("Invalid key length: {}", e)))?;

    let mut buffer = Vec::with_capacity(plaintext.len() + tag_len);
    buffer.extend_from_slice(plaintext);

    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(iv.as_slice()), b"", &mut buffer)
        .map_err(|e| Error::Encryption(format!("Encryption failed: {}", e)))?;

    buffer.extend_from_slice(&tag.as_slice()[..tag_len]);
    Ok(buffer)
}

fn gcm_decrypt<C>(key: &[u8], iv: &[u8; IV_SIZE], tag_len: usize, data: &[u8]) -> Result<Vec<u8>>
where
    C: AeadInPlace<NonceSize = U16, TagSize = U16> + KeyInit,
{
    if data.len() < tag_len {
        return Err(Error::Decryption("Ciphertext too short".to_string()));
    }

    let cipher = C::new_from_slice(key)
        .map_err(|e| Error::Decryption(format!("Invalid key length: {}", e)))?;
    let nonce = GenericArray::from_slice(iv.as_slice());
    let (ciphertext, tag) = data.split_at(data.len() - tag_len);
    let mut buffer = ciphertext.to_vec();

    if tag_len == FULL_TAG_SIZE {
        cipher
            .decrypt_in_place_detached(nonce, b"", &mut buffer, GenericArray::from_slice(tag))
            .map_err(|_| Error::Decryption("Authentication tag mismatch".to_string()))?;
        return Ok(buffer);
    }

    // Truncated tag. The GCM keystream is its own inverse, so one pass turns
    // the ciphertext into plaintext and a second pass reproduces the original
    // ciphertext together with its full tag.
    cipher
        .encrypt_in_place_detached(nonce, b"", &mut buffer)
        .map_err(|e| Error::Decryption(format!("Decryption failed: {}", e)))?;
    let mut check = buffer.clone();
    let expected = cipher
        .encrypt_in_place_detached(nonce, b"", &mut check)
        .map_err(|e| Error::Decryption(format!("Decryption failed: {}", e)))?;

    if bool::from(expected.as_slice()[..tag_len].ct_eq(tag)) {
        Ok(buffer)
    } else {
        buffer.zeroize();
        Err(Error::Decryption("Authentication tag mismatch".to_string()))
    }
}

fn cbc_encrypt(
    key_length: KeyLength,
    key: &[u8],
    iv: &[u8; IV_SIZE],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let invalid = |e: InvalidLength| Error::Encryption(format!("Invalid key or IV length: {}", e));

    let ciphertext = match key_length {
        KeyLength::Bits128 => cbc::Encryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(invalid)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        KeyLength::Bits192 => cbc::Encryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(invalid)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        KeyLength::Bits256 => cbc::Encryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(invalid)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
    };
    Ok(ciphertext)
}

fn cbc_decrypt(
    key_length: KeyLength,
    key: &[u8],
    iv: &[u8; IV_SIZE],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    let invalid = |e: InvalidLength| Error::Decryption(format!("Invalid key or IV length: {}", e));
    let unpad = |e: UnpadError| Error::Decryption(format!("Decryption failed: {}", e));

    match key_length {
        KeyLength::Bits128 => cbc::Decryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(invalid)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(unpad),
        KeyLength::Bits192 => cbc::Decryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(invalid)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(unpad),
        KeyLength::Bits256 => cbc::Decryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(invalid)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(unpad),
    }
}
