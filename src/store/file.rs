use super::{publish, CredentialRecord, CredentialStore, PersistedRecord, StoreError};
use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tokio::{sync::watch, task::JoinHandle, time::interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// JSON file store that survives process restarts.
///
/// Other processes may write the same file; [`FileStore::refresh`] and
/// [`FileStore::watch_file`] pick those writes up and publish them.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    tx: watch::Sender<CredentialRecord>,
}

impl FileStore {
    /// Opens the store, reading the file when it exists.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let record = read_record(&path)?;
        let (tx, _rx) = watch::channel(record);
        Ok(Self { path, tx })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the file and publishes the record if it changed on disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn refresh(&self) -> Result<bool, StoreError> {
        let record = read_record(&self.path)?;
        Ok(publish(&self.tx, record))
    }

    /// Polls the file on `every` until `cancel` fires.
    pub fn watch_file(
        self: Arc<Self>,
        every: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(every);
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => match self.refresh() {
                        Ok(true) => debug!("credential file changed: {}", self.path.display()),
                        Ok(false) => {}
                        Err(err) => warn!("failed to reload credential file: {err}"),
                    },
                }
            }
        })
    }

    #[instrument(skip(self, record), fields(path = %self.path.display()))]
    fn write(&self, record: &PersistedRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let payload = serde_json::to_vec_pretty(record)?;
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = open_private(&tmp)?;
            file.write_all(&payload)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn load(&self) -> CredentialRecord {
        self.tx.borrow().clone()
    }

    fn save(&self, record: CredentialRecord) -> Result<(), StoreError> {
        self.write(&record.to_persisted())?;
        publish(&self.tx, record);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let removed = match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::Io(err)),
        };
        // memory view is cleared even when the file could not be removed
        publish(&self.tx, CredentialRecord::default());
        removed
    }

    fn watch(&self) -> watch::Receiver<CredentialRecord> {
        self.tx.subscribe()
    }
}

fn read_record(path: &Path) -> Result<CredentialRecord, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(CredentialRecord::default()),
        Err(err) => return Err(err.into()),
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(CredentialRecord::default());
    }

    let persisted: PersistedRecord = serde_json::from_slice(&bytes)?;
    Ok(CredentialRecord::from_persisted(persisted))
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use tokio::time::{sleep, timeout};

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("quizgate-store-{}", uuid::Uuid::new_v4()))
            .join("credentials.json")
    }

    fn cleanup(path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn missing_file_is_an_empty_record() -> Result<(), StoreError> {
        let path = temp_path();
        let store = FileStore::open(&path)?;
        assert!(store.load().is_empty());
        Ok(())
    }

    #[test]
    fn save_persists_across_reopen() -> Result<(), StoreError> {
        let path = temp_path();
        {
            let store = FileStore::open(&path)?;
            store.save(CredentialRecord::new("persisted-token", "admin"))?;
        }

        let reopened = FileStore::open(&path)?;
        let record = reopened.load();
        assert_eq!(
            record.token().map(|t| t.expose_secret().to_string()),
            Some("persisted-token".to_string())
        );
        assert!(record.is_admin());

        let raw: serde_json::Value = serde_json::from_slice(&fs::read(&path)?)?;
        assert_eq!(raw["token"], "persisted-token");
        assert_eq!(raw["userRole"], "admin");

        cleanup(&path);
        Ok(())
    }

    #[test]
    fn clear_removes_file_and_is_idempotent() -> Result<(), StoreError> {
        let path = temp_path();
        let store = FileStore::open(&path)?;
        store.save(CredentialRecord::new("t", "user"))?;
        assert!(path.exists());

        store.clear()?;
        assert!(!path.exists());
        assert!(store.load().is_empty());

        store.clear()?;
        assert!(store.load().is_empty());

        cleanup(&path);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn credential_file_is_private() -> Result<(), StoreError> {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_path();
        let store = FileStore::open(&path)?;
        store.save(CredentialRecord::new("t", "user"))?;
        let mode = fs::metadata(&path)?.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);

        cleanup(&path);
        Ok(())
    }

    #[test]
    fn corrupt_file_is_reported() -> Result<(), StoreError> {
        let path = temp_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, b"not json")?;
        assert!(matches!(FileStore::open(&path), Err(StoreError::Json(_))));

        cleanup(&path);
        Ok(())
    }

    #[test]
    fn refresh_picks_up_external_writes() -> Result<(), StoreError> {
        let path = temp_path();
        let store = FileStore::open(&path)?;
        let other = FileStore::open(&path)?;

        other.save(CredentialRecord::new("from-elsewhere", "user"))?;
        assert!(store.load().is_empty());
        assert!(store.refresh()?);
        assert!(store.load().has_token());
        assert!(!store.refresh()?);

        cleanup(&path);
        Ok(())
    }

    #[tokio::test]
    async fn watch_file_publishes_changes() -> Result<(), Box<dyn std::error::Error>> {
        let path = temp_path();
        let store = Arc::new(FileStore::open(&path)?);
        let other = FileStore::open(&path)?;
        let mut rx = store.watch();
        let cancel = CancellationToken::new();
        let handle = store.clone().watch_file(Duration::from_millis(20), cancel.clone());

        sleep(Duration::from_millis(30)).await;
        other.save(CredentialRecord::new("polled", "admin"))?;

        timeout(Duration::from_secs(2), rx.changed()).await??;
        assert!(rx.borrow_and_update().is_admin());

        cancel.cancel();
        handle.await?;
        cleanup(&path);
        Ok(())
    }
}
