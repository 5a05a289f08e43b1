use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufReader};
use uuid::Uuid;

use super::MediaError;

/// Local object storage for uploaded media, rooted at `<data_dir>/media`.
///
/// Keys are `<kind>/<sha256>.<ext>`, so storing the same bytes twice lands on
/// the same object and a retried write is harmless.
pub struct MediaStorage {
    base_path: PathBuf,
}

/// Result of [`MediaStorage::put`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    /// False when the same bytes were already stored under this key.
    pub created: bool,
}

/// Content-addressed key for `data`.
#[must_use]
pub fn object_key(kind: &str, data: &[u8], ext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{kind}/{}.{ext}", hex::encode(hasher.finalize()))
}

impl MediaStorage {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            base_path: data_dir.join("media"),
        }
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path.join("tmp").join(Uuid::new_v4().to_string())
    }

    pub async fn exists(&self, key: &str) -> Result<bool, MediaError> {
        validate_key(key)?;
        Ok(fs::try_exists(self.object_path(key)).await?)
    }

    pub async fn get(&self, key: &str) -> Result<(BufReader<File>, u64), MediaError> {
        validate_key(key)?;
        let file = File::open(self.object_path(key))
            .await
            .map_err(MediaError::from_io)?;

        let size = file.metadata().await?.len();

        Ok((BufReader::new(file), size))
    }

    /// Writes `data` under a key derived from its content.
    ///
    /// The object is published with a hard link, which fails if the key is
    /// already present, so exactly one concurrent writer of the same bytes
    /// sees `created == true`.
    pub async fn put(&self, kind: &str, data: &[u8], ext: &str) -> Result<StoredObject, MediaError> {
        let key = object_key(kind, data, ext);
        validate_key(&key)?;

        let temp_path = self.temp_path();
        if let Some(parent) = temp_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut temp_file = File::create(&temp_path).await?;
        temp_file.write_all(data).await?;
        temp_file.sync_all().await?;
        drop(temp_file);

        let final_path = self.object_path(&key);
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let created = match fs::hard_link(&temp_path, &final_path).await {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => false,
            Err(e) => {
                let _ = fs::remove_file(&temp_path).await;
                return Err(MediaError::Io(e));
            }
        };
        fs::remove_file(&temp_path).await?;

        Ok(StoredObject { key, created })
    }

    pub async fn delete(&self, key: &str) -> Result<bool, MediaError> {
        validate_key(key)?;

        match fs::remove_file(self.object_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(MediaError::Io(e)),
        }
    }
}

/// Accepts `<kind>/<64 lowercase hex>.<ext>` with lowercase alphanumeric kind and ext.
fn validate_key(key: &str) -> Result<(), MediaError> {
    let (kind, file) = key.split_once('/').ok_or(MediaError::InvalidKey)?;
    let (hash, ext) = file.split_once('.').ok_or(MediaError::InvalidKey)?;

    let simple = |s: &str| {
        !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    };

    if !simple(kind) || !simple(ext) {
        return Err(MediaError::InvalidKey);
    }
    if hash.len() != 64
        || !hash
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_uppercase())
    {
        return Err(MediaError::InvalidKey);
    }

    Ok(())
}

#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    validate_key(key).is_ok()
}
