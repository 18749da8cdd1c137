//! 설정 파일 탐색/병합 결과와 provider 설정을 확인하는 유스케이스.

use anyhow::Result;
use serde_json::{Map, Value, json};

use crate::application::ports::{ConfigRepository, ProviderConfigRepository};
use crate::domain::remote::{ProviderConfiguration, ProviderKind};

/// 현재 적용 중인 설정을 사람이 읽기 쉬운 JSON으로 반환한다.
/// client secret은 값 대신 설정 여부만 보여준다.
pub struct InspectConfigUseCase<'a> {
    pub config_repo: &'a dyn ConfigRepository,
    pub provider_configs: &'a dyn ProviderConfigRepository,
}

impl<'a> InspectConfigUseCase<'a> {
    /// 설정 점검 결과 문자열을 생성한다.
    pub fn execute(&self) -> Result<String> {
        let mut inspection = match self.config_repo.inspect()? {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("settings".to_string(), other);
                map
            }
        };

        let stored = self.provider_configs.load()?;
        let providers: Map<String, Value> = ProviderKind::ALL
            .iter()
            .map(|kind| {
                let (source, config) = match stored.get(kind) {
                    Some(config) => ("saved", config.clone()),
                    None => ("default", ProviderConfiguration::defaults(*kind)),
                };
                (kind.as_str().to_string(), provider_view(source, &config))
            })
            .collect();
        inspection.insert("providers".to_string(), Value::Object(providers));

        Ok(serde_json::to_string_pretty(&Value::Object(inspection))?)
    }
}

fn provider_view(source: &str, config: &ProviderConfiguration) -> Value {
    json!({
        "source": source,
        "client_id": config.client_id,
        "client_secret_set": config.client_secret().is_some(),
        "redirect_uri": config.redirect_uri,
        "scopes": config.scopes,
        "base_url": config.base_url,
    })
}
