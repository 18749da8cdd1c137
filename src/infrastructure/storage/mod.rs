//! 로컬 저장소 구현(JSON 파일 + OS 보안 저장소).

mod account_store;
mod configuration_store;
mod json_file;
mod secret_store;
mod token_store;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::config::Config;

pub use account_store::{ACCOUNTS_FILE, AccountStore};
pub use configuration_store::{CLIENT_SECRET_SERVICE, ConfigurationStore, PROVIDERS_FILE};
pub use json_file::JsonFileStore;
pub use secret_store::{KeyringSecretStore, MemorySecretStore};
pub use token_store::{TOKEN_SERVICE, TokenStore};

/// 계정/provider 설정 파일 디렉터리를 결정한다.
pub fn data_dir(config: &Config) -> Result<PathBuf> {
    if let Some(dir) = config.data_dir_override() {
        return Ok(dir);
    }
    let base = dirs::data_dir().context("failed to determine the OS data directory")?;
    Ok(base.join("repolink"))
}
