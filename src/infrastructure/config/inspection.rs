//! 적용 설정 진단(inspection) 뷰 모델.

use serde::Serialize;

use super::loader::LoadedConfig;
use crate::application::config::DefaultsConfig;
use crate::infrastructure::storage::{ACCOUNTS_FILE, PROVIDERS_FILE, data_dir};

#[derive(Debug, Clone, Serialize)]
pub struct ConfigInspection {
    pub searched_paths: Vec<String>,
    pub loaded_paths: Vec<String>,
    pub defaults: DefaultsConfig,
    pub effective_defaults: EffectiveDefaults,
    pub data_paths: DataPaths,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveDefaults {
    pub callback_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub open_browser: bool,
    pub secret_store: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataPaths {
    pub data_dir: Option<String>,
    pub accounts_file: Option<String>,
    pub providers_file: Option<String>,
}

impl ConfigInspection {
    pub(crate) fn from_loaded(loaded: LoadedConfig) -> Self {
        let config = &loaded.config;
        // 데이터 디렉터리를 결정할 수 없어도 진단은 계속한다.
        let dir = data_dir(config).ok();

        Self {
            searched_paths: loaded
                .searched_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            loaded_paths: loaded
                .loaded_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            defaults: config.defaults.clone(),
            effective_defaults: EffectiveDefaults {
                callback_timeout_secs: config.callback_timeout_secs(),
                http_timeout_secs: config.http_timeout_secs(),
                open_browser: config.open_browser(),
                secret_store: config.secret_store().code().to_string(),
            },
            data_paths: DataPaths {
                data_dir: dir.as_ref().map(|d| d.display().to_string()),
                accounts_file: dir
                    .as_ref()
                    .map(|d| d.join(ACCOUNTS_FILE).display().to_string()),
                providers_file: dir
                    .as_ref()
                    .map(|d| d.join(PROVIDERS_FILE).display().to_string()),
            },
        }
    }
}
