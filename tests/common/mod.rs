//! 통합 테스트 공용 fixture.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Client;
use tempfile::TempDir;
use url::Url;

use repolink::application::ports::{
    AccountRepository, AuthorizationSession, RemoteProvider, RemoteProviderFactory,
};
use repolink::application::usecases::connect_account::{ConnectAccountUseCase, ConnectGate};
use repolink::application::usecases::list_repositories::ListRepositoriesUseCase;
use repolink::domain::error::{AuthorizationError, StorageError};
use repolink::domain::remote::{Account, ProviderKind};
use repolink::infrastructure::remote::{GitHubEndpoints, GitHubProvider, GitLabProvider};
use repolink::infrastructure::storage::{
    ACCOUNTS_FILE, AccountStore, ConfigurationStore, MemorySecretStore, PROVIDERS_FILE,
    TokenStore,
};

/// GitHub endpoint를 mock 서버로 돌리는 팩토리. GitLab은 설정의 base_url을 따른다.
pub struct MockServerFactory {
    pub github_base: String,
}

impl RemoteProviderFactory for MockServerFactory {
    fn build(&self, kind: ProviderKind) -> Box<dyn RemoteProvider> {
        match kind {
            ProviderKind::GitHub => Box::new(GitHubProvider::with_endpoints(
                Client::new(),
                GitHubEndpoints::under(&self.github_base),
            )),
            ProviderKind::GitLab => Box::new(GitLabProvider::new(Client::new())),
        }
    }
}

type Respond = dyn Fn(&Url) -> Result<Url, AuthorizationError> + Send + Sync;

/// 브라우저 대신 미리 정한 콜백을 돌려주는 세션.
pub struct ScriptedSession {
    respond: Box<Respond>,
    calls: AtomicUsize,
    last_authorize_url: Mutex<Option<Url>>,
}

impl ScriptedSession {
    pub fn new(
        respond: impl Fn(&Url) -> Result<Url, AuthorizationError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
            last_authorize_url: Mutex::new(None),
        }
    }

    /// authorize URL의 redirect_uri/state를 그대로 되돌려주는 정상 승인.
    pub fn approving(code: &'static str) -> Self {
        Self::new(move |authorize| {
            let mut callback = Url::parse(&query_value(authorize, "redirect_uri")).expect("redirect");
            callback
                .query_pairs_mut()
                .append_pair("code", code)
                .append_pair("state", &query_value(authorize, "state"));
            Ok(callback)
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_authorize_url(&self) -> Option<Url> {
        self.last_authorize_url.lock().expect("lock").clone()
    }
}

#[async_trait]
impl AuthorizationSession for ScriptedSession {
    async fn authenticate(
        &self,
        authorize_url: &Url,
        _callback_scheme: &str,
    ) -> Result<Url, AuthorizationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_authorize_url.lock().expect("lock") = Some(authorize_url.clone());
        (self.respond)(authorize_url)
    }
}

pub fn query_value(url: &Url, key: &str) -> String {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.to_string())
        .unwrap_or_default()
}

/// 저장에 항상 실패하는 계정 저장소(롤백 검증용).
pub struct FailingAccountStore;

impl AccountRepository for FailingAccountStore {
    fn load(&self) -> Result<Vec<Account>, StorageError> {
        Ok(Vec::new())
    }

    fn save(&self, _accounts: &[Account]) -> Result<(), StorageError> {
        Err(StorageError("disk full".to_string()))
    }
}

/// 임시 디렉터리 + 메모리 보안 저장소로 구성한 저장소 묶음.
pub struct Stores {
    pub dir: TempDir,
    pub secrets: Arc<MemorySecretStore>,
    pub accounts: AccountStore,
    pub tokens: TokenStore,
    pub configs: ConfigurationStore,
    pub gate: ConnectGate,
}

impl Stores {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let secrets = Arc::new(MemorySecretStore::new());
        Self {
            accounts: AccountStore::new(dir.path().join(ACCOUNTS_FILE)),
            tokens: TokenStore::new(secrets.clone()),
            configs: ConfigurationStore::new(dir.path().join(PROVIDERS_FILE), secrets.clone()),
            gate: ConnectGate::new(),
            secrets,
            dir,
        }
    }

    pub fn connect<'a>(
        &'a self,
        factory: &'a MockServerFactory,
        session: &'a ScriptedSession,
    ) -> ConnectAccountUseCase<'a> {
        ConnectAccountUseCase {
            provider_configs: &self.configs,
            providers: factory,
            session,
            tokens: &self.tokens,
            accounts: &self.accounts,
            gate: &self.gate,
        }
    }

    pub fn listing<'a>(&'a self, factory: &'a MockServerFactory) -> ListRepositoriesUseCase<'a> {
        ListRepositoriesUseCase {
            providers: factory,
            tokens: &self.tokens,
        }
    }
}
