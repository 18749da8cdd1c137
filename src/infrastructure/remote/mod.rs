//! 원격 provider(GitHub/GitLab) 프로토콜 구현.
//! 공통 REST 클라이언트와 provider별 endpoint/응답 매핑을 묶는다.

pub mod client;
pub mod github;
pub mod gitlab;

use reqwest::Client;
use url::Url;

use crate::application::ports::RemoteProvider;
use crate::domain::error::ConfigurationError;
use crate::domain::remote::{ProviderConfiguration, ProviderKind};

pub use client::build_http_client;
pub use github::{GitHubEndpoints, GitHubProvider};
pub use gitlab::GitLabProvider;

/// 목록 조회는 첫 페이지만 사용한다.
pub const MAX_PAGE_SIZE: usize = 100;

/// 네트워크 호출 전에 설정을 검증한다.
pub fn validate_configuration(config: &ProviderConfiguration) -> Result<(), ConfigurationError> {
    if config.client_id.trim().is_empty() {
        return Err(ConfigurationError::MissingClientId);
    }
    Url::parse(config.redirect_uri.trim())
        .map_err(|_| ConfigurationError::InvalidRedirectUri(config.redirect_uri.clone()))?;
    Ok(())
}

/// provider 종류에 맞는 구현체를 만든다.
pub fn build_remote_provider(kind: ProviderKind, client: Client) -> Box<dyn RemoteProvider> {
    match kind {
        ProviderKind::GitHub => Box::new(GitHubProvider::new(client)),
        ProviderKind::GitLab => Box::new(GitLabProvider::new(client)),
    }
}
