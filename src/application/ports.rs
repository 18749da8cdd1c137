//! 애플리케이션 계층이 의존하는 포트(추상 인터페이스) 모음.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use url::Url;

use crate::application::config::Config;
use crate::domain::error::{
    AuthorizationError, ConfigurationError, ConnectError, ListError, StorageError,
};
use crate::domain::remote::{
    Account, Identity, ProviderConfiguration, ProviderKind, RemoteRepository,
};
use crate::domain::token::Token;

/// 설정 로딩/점검을 담당하는 저장소 포트.
pub trait ConfigRepository: Send + Sync {
    fn load(&self) -> Result<Config>;
    /// 탐색/적용된 설정 파일과 유효 설정값 진단 정보.
    fn inspect(&self) -> Result<serde_json::Value>;
}

/// 계정의 웹/API 기준 URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountUrls {
    pub web_base_url: String,
    pub api_base_url: String,
}

/// 원격 provider(GitHub/GitLab) 프로토콜 추상화 포트.
///
/// endpoint/요청/응답 형태의 차이는 모두 구현체 안에 둔다.
#[async_trait]
pub trait RemoteProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// authorize 요청 URL(PKCE challenge + state 포함)을 만든다.
    fn authorization_url(
        &self,
        config: &ProviderConfiguration,
        code_challenge: &str,
        state: &str,
    ) -> Result<Url, ConfigurationError>;

    /// 연결될 계정의 웹/API 기준 URL을 계산한다.
    fn account_urls(&self, config: &ProviderConfiguration)
    -> Result<AccountUrls, ConfigurationError>;

    /// authorization code를 토큰으로 교환한다.
    async fn exchange_token(
        &self,
        config: &ProviderConfiguration,
        code: &str,
        code_verifier: &str,
    ) -> Result<Token, ConnectError>;

    /// 새 토큰으로 사용자 identity를 조회한다.
    async fn resolve_identity(
        &self,
        config: &ProviderConfiguration,
        token: &Token,
    ) -> Result<Identity, ConnectError>;

    /// 첫 페이지(최대 100개) 저장소 목록을 조회한다.
    async fn list_repositories(
        &self,
        account: &Account,
        token: &Token,
    ) -> Result<Vec<RemoteRepository>, ListError>;
}

/// provider 종류에 맞는 구현체를 생성하는 팩토리 포트.
pub trait RemoteProviderFactory: Send + Sync {
    fn build(&self, kind: ProviderKind) -> Box<dyn RemoteProvider>;
}

/// 외부 브라우저 인증 단계 포트.
///
/// 콜백 URL, 취소(`AuthorizationError::Cancelled`), 실패 중 하나로 끝난다.
#[async_trait]
pub trait AuthorizationSession: Send + Sync {
    async fn authenticate(
        &self,
        authorize_url: &Url,
        callback_scheme: &str,
    ) -> Result<Url, AuthorizationError>;
}

/// OS 보안 저장소 포트((service, key) 쌍으로 식별).
pub trait SecretStore: Send + Sync {
    /// 같은 키의 기존 항목은 삭제 후 새로 저장한다.
    fn save(&self, service: &str, key: &str, secret: &str) -> Result<(), StorageError>;
    fn read(&self, service: &str, key: &str) -> Result<Option<String>, StorageError>;
    /// 항목이 없어도 오류가 아니다.
    fn delete(&self, service: &str, key: &str) -> Result<(), StorageError>;
}

/// 계정별 토큰 저장소 포트.
pub trait TokenRepository: Send + Sync {
    fn save(&self, token: &Token, account: &Account) -> Result<(), StorageError>;
    /// 없거나 읽기/디코딩에 실패하면 `None`(재연결 안내 대상).
    fn read(&self, account: &Account) -> Option<Token>;
    fn delete(&self, account: &Account) -> Result<(), StorageError>;
}

/// 연결된 계정 목록 저장소 포트(전체 읽기/전체 쓰기).
pub trait AccountRepository: Send + Sync {
    fn load(&self) -> Result<Vec<Account>, StorageError>;
    fn save(&self, accounts: &[Account]) -> Result<(), StorageError>;
}

/// provider별 OAuth 앱 설정 저장소 포트(전체 읽기/전체 쓰기).
pub trait ProviderConfigRepository: Send + Sync {
    fn load(&self) -> Result<BTreeMap<ProviderKind, ProviderConfiguration>, StorageError>;
    fn save(
        &self,
        configs: &BTreeMap<ProviderKind, ProviderConfiguration>,
    ) -> Result<(), StorageError>;
}

/// 원격 저장소 clone 실행 포트.
pub trait GitCloner: Send + Sync {
    fn clone_repository(&self, url: &str, destination: Option<&Path>) -> Result<()>;
}

/// 콘솔/로그 출력 추상화 포트.
pub trait Reporter: Send + Sync {
    fn section(&self, name: &str);
    fn kv(&self, key: &str, value: &str);
    fn status(&self, scope: &str, message: &str);
    fn raw(&self, line: &str);
}
