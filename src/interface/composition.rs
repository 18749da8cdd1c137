//! 애플리케이션 조립(composition root) 모듈.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use crate::application::config::{Config, SecretStoreKind};
use crate::application::ports::{AccountRepository, SecretStore};
use crate::application::usecases::clone_repository::CloneRepositoryUseCase;
use crate::application::usecases::connect_account::{ConnectAccountUseCase, ConnectGate};
use crate::application::usecases::inspect_config::InspectConfigUseCase;
use crate::application::usecases::list_accounts::ListAccountsUseCase;
use crate::application::usecases::list_repositories::ListRepositoriesUseCase;
use crate::application::usecases::remove_account::RemoveAccountUseCase;
use crate::application::usecases::save_configuration::SaveConfigurationUseCase;
use crate::domain::error::StorageError;
use crate::domain::remote::Account;
use crate::infrastructure::adapters::{
    ConsoleReporter, GitCommandCloner, JsonConfigRepository, RemoteProviderFactoryAdapter,
    SystemAuthorizationSession,
};
use crate::infrastructure::remote::build_http_client;
use crate::infrastructure::storage::{
    ACCOUNTS_FILE, AccountStore, ConfigurationStore, KeyringSecretStore, MemorySecretStore,
    PROVIDERS_FILE, TokenStore, data_dir,
};

/// 실행 시점 의존성을 한 곳에서 조립하는 컨테이너.
pub struct AppComposition {
    config_repo: JsonConfigRepository,
    provider_configs: ConfigurationStore,
    accounts: AccountStore,
    tokens: TokenStore,
    provider_factory: RemoteProviderFactoryAdapter,
    session: SystemAuthorizationSession,
    cloner: GitCommandCloner,
    reporter: ConsoleReporter,
    gate: ConnectGate,
}

impl AppComposition {
    /// 병합된 설정으로 저장소/세션/HTTP 클라이언트를 조립한다.
    pub fn from_config(config: &Config) -> Result<Self> {
        let dir = data_dir(config)?;
        debug!(data_dir = %dir.display(), secret_store = config.secret_store().code(), "composing application");

        let secrets: Arc<dyn SecretStore> = match config.secret_store() {
            SecretStoreKind::Keyring => Arc::new(KeyringSecretStore),
            SecretStoreKind::Memory => Arc::new(MemorySecretStore::new()),
        };
        let client = build_http_client(Duration::from_secs(config.http_timeout_secs()));

        Ok(Self {
            config_repo: JsonConfigRepository,
            provider_configs: ConfigurationStore::new(dir.join(PROVIDERS_FILE), secrets.clone()),
            accounts: AccountStore::new(dir.join(ACCOUNTS_FILE)),
            tokens: TokenStore::new(secrets),
            provider_factory: RemoteProviderFactoryAdapter::new(client),
            session: SystemAuthorizationSession::new(
                Duration::from_secs(config.callback_timeout_secs()),
                config.open_browser(),
            ),
            cloner: GitCommandCloner,
            reporter: ConsoleReporter::new(),
            gate: ConnectGate::new(),
        })
    }

    pub fn reporter(&self) -> &ConsoleReporter {
        &self.reporter
    }

    /// 저장된 계정 목록(선택자 해석용).
    pub fn accounts(&self) -> Result<Vec<Account>, StorageError> {
        self.accounts.load()
    }

    /// 계정 연결 유스케이스를 생성한다.
    pub fn connect_usecase(&self) -> ConnectAccountUseCase<'_> {
        ConnectAccountUseCase {
            provider_configs: &self.provider_configs,
            providers: &self.provider_factory,
            session: &self.session,
            tokens: &self.tokens,
            accounts: &self.accounts,
            gate: &self.gate,
        }
    }

    pub fn list_accounts_usecase(&self) -> ListAccountsUseCase<'_> {
        ListAccountsUseCase {
            accounts: &self.accounts,
            tokens: &self.tokens,
        }
    }

    pub fn list_repositories_usecase(&self) -> ListRepositoriesUseCase<'_> {
        ListRepositoriesUseCase {
            providers: &self.provider_factory,
            tokens: &self.tokens,
        }
    }

    pub fn remove_account_usecase(&self) -> RemoveAccountUseCase<'_> {
        RemoveAccountUseCase {
            accounts: &self.accounts,
            tokens: &self.tokens,
        }
    }

    pub fn save_configuration_usecase(&self) -> SaveConfigurationUseCase<'_> {
        SaveConfigurationUseCase {
            provider_configs: &self.provider_configs,
        }
    }

    pub fn clone_usecase(&self) -> CloneRepositoryUseCase<'_> {
        CloneRepositoryUseCase {
            listing: self.list_repositories_usecase(),
            cloner: &self.cloner,
        }
    }

    /// 설정 점검 유스케이스를 생성한다.
    pub fn inspect_config_usecase(&self) -> InspectConfigUseCase<'_> {
        InspectConfigUseCase {
            config_repo: &self.config_repo,
            provider_configs: &self.provider_configs,
        }
    }
}
