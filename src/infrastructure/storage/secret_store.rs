//! 보안 저장소 구현(OS 키체인, 프로세스 메모리).

use std::collections::HashMap;
use std::sync::Mutex;

use keyring::Entry;
use tracing::debug;

use crate::application::ports::SecretStore;
use crate::domain::error::StorageError;

/// OS 키체인(`keyring`) 기반 보안 저장소.
#[derive(Debug, Default)]
pub struct KeyringSecretStore;

fn entry(service: &str, key: &str) -> Result<Entry, StorageError> {
    Entry::new(service, key)
        .map_err(|e| StorageError(format!("failed to open keyring entry {service}/{key}: {e}")))
}

impl SecretStore for KeyringSecretStore {
    fn save(&self, service: &str, key: &str, secret: &str) -> Result<(), StorageError> {
        let entry = entry(service, key)?;
        // 기존 항목을 지운 뒤 새로 기록한다.
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(err) => {
                return Err(StorageError(format!(
                    "failed to replace keyring entry {service}/{key}: {err}"
                )));
            }
        }
        entry
            .set_password(secret)
            .map_err(|e| StorageError(format!("failed to write keyring entry {service}/{key}: {e}")))?;
        debug!(service, key, "saved secret to keyring");
        Ok(())
    }

    fn read(&self, service: &str, key: &str) -> Result<Option<String>, StorageError> {
        match entry(service, key)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(StorageError(format!(
                "failed to read keyring entry {service}/{key}: {err}"
            ))),
        }
    }

    fn delete(&self, service: &str, key: &str) -> Result<(), StorageError> {
        match entry(service, key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(StorageError(format!(
                "failed to delete keyring entry {service}/{key}: {err}"
            ))),
        }
    }
}

/// 프로세스 메모리 보안 저장소(헤드리스 실행/테스트용).
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    entries: Mutex<HashMap<(String, String), String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<(String, String), String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError("memory secret store lock poisoned".to_string()))
    }
}

impl SecretStore for MemorySecretStore {
    fn save(&self, service: &str, key: &str, secret: &str) -> Result<(), StorageError> {
        let mut entries = self.lock()?;
        let slot = (service.to_string(), key.to_string());
        entries.remove(&slot);
        entries.insert(slot, secret.to_string());
        Ok(())
    }

    fn read(&self, service: &str, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .lock()?
            .get(&(service.to_string(), key.to_string()))
            .cloned())
    }

    fn delete(&self, service: &str, key: &str) -> Result<(), StorageError> {
        self.lock()?
            .remove(&(service.to_string(), key.to_string()));
        Ok(())
    }
}
