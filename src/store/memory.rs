use super::{publish, CredentialRecord, CredentialStore, StoreError};
use tokio::sync::watch;

/// In-process store. The watch channel itself holds the record.
#[derive(Debug)]
pub struct MemoryStore {
    tx: watch::Sender<CredentialRecord>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_record(CredentialRecord::default())
    }

    #[must_use]
    pub fn with_record(record: CredentialRecord) -> Self {
        let (tx, _rx) = watch::channel(record);
        Self { tx }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> CredentialRecord {
        self.tx.borrow().clone()
    }

    fn save(&self, record: CredentialRecord) -> Result<(), StoreError> {
        publish(&self.tx, record);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        publish(&self.tx, CredentialRecord::default());
        Ok(())
    }

    fn watch(&self) -> watch::Receiver<CredentialRecord> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn save_and_clear_replace_the_whole_record() -> Result<(), StoreError> {
        let store = MemoryStore::new();
        assert!(store.load().is_empty());

        store.save(CredentialRecord::new("token-1", "admin"))?;
        let record = store.load();
        assert_eq!(
            record.token().map(|t| t.expose_secret().to_string()),
            Some("token-1".to_string())
        );
        assert_eq!(record.user_role(), Some("admin"));

        store.clear()?;
        assert!(store.load().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn watchers_see_changes() -> Result<(), Box<dyn std::error::Error>> {
        let store = MemoryStore::new();
        let mut rx = store.watch();

        store.save(CredentialRecord::new("token-2", "user"))?;
        rx.changed().await?;
        assert!(rx.borrow_and_update().has_token());

        // clearing twice only notifies once
        store.clear()?;
        store.clear()?;
        rx.changed().await?;
        assert!(rx.borrow_and_update().is_empty());
        assert!(!rx.has_changed()?);
        Ok(())
    }
}
