//! provider별 OAuth 앱 설정 조회/저장 유스케이스.

use std::collections::BTreeMap;

use tracing::info;

use crate::application::ports::ProviderConfigRepository;
use crate::domain::error::StorageError;
use crate::domain::remote::{ProviderConfiguration, ProviderKind};

/// `config set`에서 받은 부분 변경값. `None`은 기존 값 유지.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationPatch {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub clear_secret: bool,
    pub redirect_uri: Option<String>,
    pub scopes: Option<String>,
    pub base_url: Option<String>,
}

impl ConfigurationPatch {
    pub fn is_empty(&self) -> bool {
        self.client_id.is_none()
            && self.client_secret.is_none()
            && !self.clear_secret
            && self.redirect_uri.is_none()
            && self.scopes.is_none()
            && self.base_url.is_none()
    }

    pub fn apply(self, config: &mut ProviderConfiguration) {
        if let Some(v) = self.client_id {
            config.client_id = v.trim().to_string();
        }
        if self.clear_secret {
            config.client_secret = None;
        } else if let Some(v) = self.client_secret {
            config.client_secret = Some(v.trim().to_string()).filter(|s| !s.is_empty());
        }
        if let Some(v) = self.redirect_uri {
            config.redirect_uri = v.trim().to_string();
        }
        if let Some(v) = self.scopes {
            config.scopes = v.trim().to_string();
        }
        if let Some(v) = self.base_url {
            config.base_url = v.trim().to_string();
        }
    }
}

pub struct SaveConfigurationUseCase<'a> {
    pub provider_configs: &'a dyn ProviderConfigRepository,
}

impl<'a> SaveConfigurationUseCase<'a> {
    /// 저장된 설정(없으면 기본값)을 반환한다.
    pub fn load(&self, kind: ProviderKind) -> Result<ProviderConfiguration, StorageError> {
        Ok(self
            .provider_configs
            .load()?
            .remove(&kind)
            .unwrap_or_else(|| ProviderConfiguration::defaults(kind)))
    }

    pub fn load_all(&self) -> Result<BTreeMap<ProviderKind, ProviderConfiguration>, StorageError> {
        self.provider_configs.load()
    }

    /// 한 provider 설정을 교체한다(전체 맵 읽기-수정-쓰기).
    pub fn execute(
        &self,
        kind: ProviderKind,
        config: ProviderConfiguration,
    ) -> Result<(), StorageError> {
        let mut configs = self.provider_configs.load()?;
        configs.insert(kind, config);
        self.provider_configs.save(&configs)?;
        info!(provider = %kind, "saved provider configuration");
        Ok(())
    }

    /// 부분 변경값을 적용해 저장하고 결과 설정을 돌려준다.
    pub fn patch(
        &self,
        kind: ProviderKind,
        patch: ConfigurationPatch,
    ) -> Result<ProviderConfiguration, StorageError> {
        let mut config = self.load(kind)?;
        patch.apply(&mut config);
        self.execute(kind, config.clone())?;
        Ok(config)
    }
}
