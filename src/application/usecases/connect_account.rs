//! 원격 계정 연결(OAuth Authorization Code + PKCE) 유스케이스.
//!
//! 흐름: 설정 검증 → 트랜잭션 시작 → 브라우저 인증 → 콜백 검증 → 토큰 교환 →
//! identity 조회 → 토큰/계정 저장. 실패하면 아무것도 저장하지 않는다.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::application::ports::{
    AccountRepository, AuthorizationSession, ProviderConfigRepository, RemoteProviderFactory,
    TokenRepository,
};
use crate::domain::error::ConnectError;
use crate::domain::remote::{Account, ProviderConfiguration, ProviderKind, token_hint};
use crate::domain::token::{Token, mask_secret};
use crate::infrastructure::oauth::AuthorizationTransaction;
use crate::infrastructure::remote::validate_configuration;

/// 동시에 하나의 연결 시도만 허용하는 프로세스 전역 게이트.
#[derive(Debug, Default)]
pub struct ConnectGate {
    busy: AtomicBool,
}

impl ConnectGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 진행 중인 시도가 있으면 `ConnectError::Busy`.
    pub fn try_enter(&self) -> Result<ConnectGuard<'_>, ConnectError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ConnectError::Busy)?;
        Ok(ConnectGuard { gate: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// drop 시 게이트를 해제한다.
pub struct ConnectGuard<'a> {
    gate: &'a ConnectGate,
}

impl Drop for ConnectGuard<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

/// 연결에 성공한 계정과 토큰.
#[derive(Debug, Clone)]
pub struct ConnectedAccount {
    pub account: Account,
    pub token: Token,
}

pub struct ConnectAccountUseCase<'a> {
    pub provider_configs: &'a dyn ProviderConfigRepository,
    pub providers: &'a dyn RemoteProviderFactory,
    pub session: &'a dyn AuthorizationSession,
    pub tokens: &'a dyn TokenRepository,
    pub accounts: &'a dyn AccountRepository,
    pub gate: &'a ConnectGate,
}

impl<'a> ConnectAccountUseCase<'a> {
    /// 저장된 설정(없으면 기본값)으로 provider 계정을 연결한다.
    pub async fn execute(&self, kind: ProviderKind) -> Result<ConnectedAccount, ConnectError> {
        let _guard = self.gate.try_enter()?;

        let config = self
            .provider_configs
            .load()?
            .remove(&kind)
            .unwrap_or_else(|| ProviderConfiguration::defaults(kind));

        self.connect(kind, &config).await
    }

    async fn connect(
        &self,
        kind: ProviderKind,
        config: &ProviderConfiguration,
    ) -> Result<ConnectedAccount, ConnectError> {
        // 네트워크 호출 전 설정 오류를 먼저 드러낸다.
        validate_configuration(config)?;
        let provider = self.providers.build(kind);
        let urls = provider.account_urls(config)?;
        let transaction = AuthorizationTransaction::begin(&config.redirect_uri)?;
        let authorize_url =
            provider.authorization_url(config, transaction.code_challenge(), transaction.state())?;

        debug!(provider = %kind, "starting authorization session");
        let callback_scheme = transaction.redirect_scheme().to_string();
        let callback = self
            .session
            .authenticate(&authorize_url, &callback_scheme)
            .await?;

        let verified = transaction.verify_callback(&callback)?;
        let token = provider
            .exchange_token(config, &verified.code, &verified.code_verifier)
            .await?;
        debug!(provider = %kind, token = %mask_secret(&token.access_token), "token exchanged");

        let identity = provider.resolve_identity(config, &token).await?;
        let account = Account::new(
            kind,
            identity.username,
            token_hint(&token.access_token),
            urls.web_base_url,
            urls.api_base_url,
        );

        self.persist(&account, &token)?;
        info!(account = %account.label(), "connected account");
        Ok(ConnectedAccount { account, token })
    }

    /// 토큰 → 계정 목록 순으로 저장하고, 계정 저장 실패 시 토큰을 되돌린다.
    fn persist(&self, account: &Account, token: &Token) -> Result<(), ConnectError> {
        let mut accounts = self.accounts.load()?;
        let previous_token = self.tokens.read(account);

        self.tokens.save(token, account)?;

        match accounts.iter_mut().find(|a| a.same_identity(account)) {
            Some(existing) => *existing = account.clone(),
            None => accounts.push(account.clone()),
        }

        if let Err(err) = self.accounts.save(&accounts) {
            let rollback = match &previous_token {
                Some(previous) => self.tokens.save(previous, account),
                None => self.tokens.delete(account),
            };
            if let Err(rollback_err) = rollback {
                warn!(account = %account.label(), "failed to roll back token: {rollback_err}");
            }
            return Err(err.into());
        }
        Ok(())
    }
}
