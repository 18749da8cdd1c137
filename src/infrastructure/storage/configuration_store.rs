//! provider별 OAuth 앱 설정 저장소(`providers.json`).
//!
//! client secret은 파일에 쓰지 않고 보안 저장소(`repolink.client-secrets`)에 둔다.
//! 예전 파일에 남아 있는 `client_secret`은 읽어 들인 뒤 다음 저장 때 옮겨진다.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::ports::{ProviderConfigRepository, SecretStore};
use crate::domain::error::StorageError;
use crate::domain::remote::{ProviderConfiguration, ProviderKind};

use super::json_file::JsonFileStore;

pub const PROVIDERS_FILE: &str = "providers.json";
pub const CLIENT_SECRET_SERVICE: &str = "repolink.client-secrets";

type ProviderMap = BTreeMap<ProviderKind, ProviderConfiguration>;

pub struct ConfigurationStore {
    file: JsonFileStore<ProviderMap>,
    secrets: Arc<dyn SecretStore>,
}

impl ConfigurationStore {
    pub fn new(path: PathBuf, secrets: Arc<dyn SecretStore>) -> Self {
        Self {
            file: JsonFileStore::new(path),
            secrets,
        }
    }
}

impl ProviderConfigRepository for ConfigurationStore {
    fn load(&self) -> Result<ProviderMap, StorageError> {
        let mut configs = self.file.load()?;
        for (kind, config) in configs.iter_mut() {
            if config.client_secret().is_some() {
                debug!(provider = %kind, "client secret found in providers file");
                continue;
            }
            config.client_secret = match self.secrets.read(CLIENT_SECRET_SERVICE, kind.as_str()) {
                Ok(secret) => secret,
                Err(err) => {
                    warn!(provider = %kind, "failed to read client secret: {err}");
                    None
                }
            };
        }
        Ok(configs)
    }

    fn save(&self, configs: &ProviderMap) -> Result<(), StorageError> {
        let mut public = configs.clone();
        for (kind, config) in public.iter_mut() {
            match config.client_secret() {
                Some(secret) => self
                    .secrets
                    .save(CLIENT_SECRET_SERVICE, kind.as_str(), secret)?,
                None => self.secrets.delete(CLIENT_SECRET_SERVICE, kind.as_str())?,
            }
            config.client_secret = None;
        }
        self.file.save(&public)
    }
}
