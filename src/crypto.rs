use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{self, Argon2, Params};
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

const FORMAT_VERSION: u8 = 1;
const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;
/// version (1) + memory, iterations, lanes (3 x u32 LE)
const HEADER_LEN: usize = 1 + 3 * 4;
/// Magic bytes prepended to plaintext before encryption.
/// On decrypt, we check for these to validate the passphrase.
const MAGIC: &[u8] = b"CYKEL_RECORDS";
/// Ceilings on the Argon2 costs `open` will accept from a header.
const MAX_MEMORY_KIB: u32 = 4 * 65536;
const MAX_ITERATIONS: u32 = 10;
const MAX_LANES: u32 = 16;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("key derivation failed")]
    KeyDerivation,
    #[error("encryption failed")]
    Encryption,
    #[error("decryption failed: wrong passphrase or corrupted data")]
    Decryption,
    #[error("invalid data format")]
    InvalidFormat,
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),
}

/// Argon2id cost parameters. Written into every sealed blob so files keep
/// opening after the defaults change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub lanes: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            lanes: 1,
        }
    }
}

impl KdfParams {
    fn to_bytes(self) -> [u8; HEADER_LEN - 1] {
        let mut out = [0u8; HEADER_LEN - 1];
        out[0..4].copy_from_slice(&self.memory_kib.to_le_bytes());
        out[4..8].copy_from_slice(&self.iterations.to_le_bytes());
        out[8..12].copy_from_slice(&self.lanes.to_le_bytes());
        out
    }

    fn within_limits(&self) -> bool {
        self.memory_kib <= MAX_MEMORY_KIB
            && (1..=MAX_ITERATIONS).contains(&self.iterations)
            && (1..=MAX_LANES).contains(&self.lanes)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let word = |i: usize| -> Result<u32, CryptoError> {
            let chunk: [u8; 4] = bytes
                .get(i * 4..i * 4 + 4)
                .and_then(|b| b.try_into().ok())
                .ok_or(CryptoError::InvalidFormat)?;
            Ok(u32::from_le_bytes(chunk))
        };
        Ok(Self {
            memory_kib: word(0)?,
            iterations: word(1)?,
            lanes: word(2)?,
        })
    }
}

/// Derive a 256-bit key from a passphrase and salt using Argon2id.
fn derive_key(
    passphrase: &str,
    salt: &[u8],
    kdf: KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, CryptoError> {
    let params = Params::new(kdf.memory_kib, kdf.iterations, kdf.lanes, Some(KEY_LEN))
        .map_err(|_| CryptoError::KeyDerivation)?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut *key)
        .map_err(|_| CryptoError::KeyDerivation)?;
    Ok(key)
}

/// Seal plaintext under a passphrase.
/// Returns: version || kdf params || salt || nonce || ciphertext
pub fn seal(passphrase: &str, plaintext: &[u8], kdf: KdfParams) -> Result<Vec<u8>, CryptoError> {
    if !kdf.within_limits() {
        return Err(CryptoError::KeyDerivation);
    }
    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let key = derive_key(passphrase, &salt, kdf)?;
    let cipher = Aes256Gcm::new_from_slice(&*key).map_err(|_| CryptoError::Encryption)?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let mut payload = Zeroizing::new(Vec::with_capacity(MAGIC.len() + plaintext.len()));
    payload.extend_from_slice(MAGIC);
    payload.extend_from_slice(plaintext);

    let ciphertext = cipher
        .encrypt(nonce, payload.as_slice())
        .map_err(|_| CryptoError::Encryption)?;

    let mut output =
        Vec::with_capacity(HEADER_LEN + SALT_LEN + NONCE_LEN + ciphertext.len());
    output.push(FORMAT_VERSION);
    output.extend_from_slice(&kdf.to_bytes());
    output.extend_from_slice(&salt);
    output.extend_from_slice(&nonce_bytes);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Cost parameters a blob was sealed with.
pub fn sealed_kdf(sealed: &[u8]) -> Result<KdfParams, CryptoError> {
    let version = *sealed.first().ok_or(CryptoError::InvalidFormat)?;
    if version != FORMAT_VERSION {
        return Err(CryptoError::UnsupportedVersion(version));
    }
    let header = sealed.get(1..HEADER_LEN).ok_or(CryptoError::InvalidFormat)?;
    let kdf = KdfParams::from_bytes(header)?;
    if !kdf.within_limits() {
        tracing::warn!(?kdf, "sealed header asks for out-of-range key derivation costs");
        return Err(CryptoError::InvalidFormat);
    }
    Ok(kdf)
}

/// Open a blob produced by [`seal`].
/// Fails with [`CryptoError::Decryption`] when the passphrase is wrong.
pub fn open(passphrase: &str, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let kdf = sealed_kdf(sealed)?;
    if sealed.len() < HEADER_LEN + SALT_LEN + NONCE_LEN + MAGIC.len() {
        return Err(CryptoError::InvalidFormat);
    }

    let salt = &sealed[HEADER_LEN..HEADER_LEN + SALT_LEN];
    let nonce_bytes = &sealed[HEADER_LEN + SALT_LEN..HEADER_LEN + SALT_LEN + NONCE_LEN];
    let ciphertext = &sealed[HEADER_LEN + SALT_LEN + NONCE_LEN..];

    let key = derive_key(passphrase, salt, kdf)?;
    let cipher = Aes256Gcm::new_from_slice(&*key).map_err(|_| CryptoError::Decryption)?;
    let nonce = Nonce::from_slice(nonce_bytes);

    let mut decrypted = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::Decryption)?;

    if decrypted.len() < MAGIC.len() || &decrypted[..MAGIC.len()] != MAGIC {
        decrypted.zeroize();
        return Err(CryptoError::Decryption);
    }

    let plaintext = decrypted[MAGIC.len()..].to_vec();
    decrypted.zeroize();
    Ok(plaintext)
}

#[cfg(test)]
pub(crate) fn test_kdf() -> KdfParams {
    KdfParams {
        memory_kib: 64,
        iterations: 1,
        lanes: 1,
    }
}
