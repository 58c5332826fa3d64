use std::fs;
use std::path::{Path, PathBuf};

use zeroize::Zeroize;

use crate::crypto::{self, KdfParams};
use crate::models::{Cycle, SymptomLog};
use crate::records::{RecordSource, Records};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("crypto error: {0}")]
    Crypto(#[from] crypto::CryptoError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("data directory not found")]
    NoDataDir,
    #[error("a vault already exists at {0}")]
    AlreadyExists(PathBuf),
}

/// Path of the encrypted data file under the platform's local data directory.
pub fn default_data_path() -> Result<PathBuf, StorageError> {
    let dir = dirs::data_local_dir()
        .ok_or(StorageError::NoDataDir)?
        .join("cykel");
    Ok(dir.join("data.cykel"))
}

/// Passphrase-sealed record file on disk.
///
/// Records are held decrypted in memory while the vault is open; changes
/// reach the disk only on [`Vault::save`]. The passphrase is wiped from
/// memory when the vault is dropped.
pub struct Vault {
    path: PathBuf,
    passphrase: String,
    kdf: KdfParams,
    records: Records,
}

impl Vault {
    /// Check if a vault file exists (i.e., the app has been set up before).
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn create(path: impl Into<PathBuf>, passphrase: &str) -> Result<Self, StorageError> {
        Self::create_with(path, passphrase, KdfParams::default())
    }

    pub fn create_with(
        path: impl Into<PathBuf>,
        passphrase: &str,
        kdf: KdfParams,
    ) -> Result<Self, StorageError> {
        let path = path.into();
        if path.exists() {
            return Err(StorageError::AlreadyExists(path));
        }
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let vault = Self {
            path,
            passphrase: passphrase.to_string(),
            kdf,
            records: Records::default(),
        };
        vault.save()?;
        tracing::debug!(path = %vault.path.display(), "created vault");
        Ok(vault)
    }

    /// Load and decrypt the vault with the given passphrase.
    pub fn open(path: impl Into<PathBuf>, passphrase: &str) -> Result<Self, StorageError> {
        let path = path.into();
        let sealed = fs::read(&path)?;
        let kdf = crypto::sealed_kdf(&sealed)?;
        let mut json = crypto::open(passphrase, &sealed).map_err(|e| {
            tracing::warn!(path = %path.display(), "failed to unlock vault");
            e
        })?;
        let parsed = serde_json::from_slice::<Records>(&json);
        json.zeroize();
        let records = parsed?;
        tracing::debug!(
            path = %path.display(),
            cycles = records.cycles.len(),
            symptoms = records.symptoms.len(),
            "opened vault"
        );
        Ok(Self {
            path,
            passphrase: passphrase.to_string(),
            kdf,
            records,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut Records {
        &mut self.records
    }

    /// Seal the current records and replace the file on disk.
    pub fn save(&self) -> Result<(), StorageError> {
        let mut json = serde_json::to_vec(&self.records)?;
        let sealed = crypto::seal(&self.passphrase, &json, self.kdf);
        json.zeroize();
        let sealed = sealed?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, sealed)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(
            path = %self.path.display(),
            cycles = self.records.cycles.len(),
            symptoms = self.records.symptoms.len(),
            "saved vault"
        );
        Ok(())
    }

    pub fn change_passphrase(&mut self, new_passphrase: &str) -> Result<(), StorageError> {
        self.passphrase.zeroize();
        self.passphrase = new_passphrase.to_string();
        self.save()
    }

    /// Delete all data permanently.
    pub fn wipe(self) -> Result<(), StorageError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        tracing::debug!(path = %self.path.display(), "wiped vault");
        Ok(())
    }
}

impl Drop for Vault {
    fn drop(&mut self) {
        self.passphrase.zeroize();
    }
}

impl RecordSource for Vault {
    fn cycles(&self) -> Result<Vec<Cycle>, StorageError> {
        self.records.cycles()
    }

    fn symptoms(&self) -> Result<Vec<SymptomLog>, StorageError> {
        self.records.symptoms()
    }
}

/// Where records can live on this device. Checked once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCapability {
    EncryptedFile(PathBuf),
    InMemory,
}

impl StorageCapability {
    pub fn detect() -> Self {
        let capability = match default_data_path() {
            Ok(path) => StorageCapability::EncryptedFile(path),
            Err(_) => StorageCapability::InMemory,
        };
        tracing::debug!(?capability, "selected storage backend");
        capability
    }
}

/// The backend chosen for this session.
pub enum Store {
    Vault(Vault),
    Memory(Records),
}

impl Store {
    /// Open the vault if one exists, create it otherwise. In-memory stores
    /// start empty.
    pub fn open(capability: &StorageCapability, passphrase: &str) -> Result<Self, StorageError> {
        match capability {
            StorageCapability::EncryptedFile(path) if Vault::exists(path) => {
                Ok(Store::Vault(Vault::open(path.clone(), passphrase)?))
            }
            StorageCapability::EncryptedFile(path) => {
                Ok(Store::Vault(Vault::create(path.clone(), passphrase)?))
            }
            StorageCapability::InMemory => Ok(Store::Memory(Records::default())),
        }
    }

    pub fn records(&self) -> &Records {
        match self {
            Store::Vault(vault) => vault.records(),
            Store::Memory(records) => records,
        }
    }

    pub fn records_mut(&mut self) -> &mut Records {
        match self {
            Store::Vault(vault) => vault.records_mut(),
            Store::Memory(records) => records,
        }
    }

    /// Persist pending changes. A no-op for in-memory stores.
    pub fn save(&self) -> Result<(), StorageError> {
        match self {
            Store::Vault(vault) => vault.save(),
            Store::Memory(_) => Ok(()),
        }
    }
}

impl RecordSource for Store {
    fn cycles(&self) -> Result<Vec<Cycle>, StorageError> {
        self.records().cycles()
    }

    fn symptoms(&self) -> Result<Vec<SymptomLog>, StorageError> {
        self.records().symptoms()
    }
}
