//! 연결된 계정의 원격 저장소 목록 조회 유스케이스.

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tracing::{debug, info};

use crate::application::ports::{RemoteProviderFactory, TokenRepository};
use crate::domain::error::ListError;
use crate::domain::remote::{Account, RemoteRepository};

/// 목록이 비어 있는 이유(재연결 안내).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingNotice {
    TokenMissing,
    TokenExpired,
}

impl ListingNotice {
    pub fn message(self) -> &'static str {
        match self {
            Self::TokenMissing => "no stored token, reconnect this account",
            Self::TokenExpired => "token expired, reconnect this account",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryListing {
    pub repositories: Vec<RemoteRepository>,
    pub notice: Option<ListingNotice>,
}

impl RepositoryListing {
    fn notice(notice: ListingNotice) -> Self {
        Self {
            repositories: Vec::new(),
            notice: Some(notice),
        }
    }
}

pub struct ListRepositoriesUseCase<'a> {
    pub providers: &'a dyn RemoteProviderFactory,
    pub tokens: &'a dyn TokenRepository,
}

impl<'a> ListRepositoriesUseCase<'a> {
    /// 토큰이 없거나 만료되었으면 네트워크 호출 없이 빈 목록을 돌려준다.
    pub async fn execute(&self, account: &Account) -> Result<RepositoryListing, ListError> {
        let Some(token) = self.tokens.read(account) else {
            info!(account = %account.label(), "no token stored");
            return Ok(RepositoryListing::notice(ListingNotice::TokenMissing));
        };
        if token.is_expired() {
            info!(account = %account.label(), "token expired");
            return Ok(RepositoryListing::notice(ListingNotice::TokenExpired));
        }

        let provider = self.providers.build(account.provider);
        let repositories = provider.list_repositories(account, &token).await?;
        debug!(account = %account.label(), count = repositories.len(), "listed repositories");
        Ok(RepositoryListing {
            repositories,
            notice: None,
        })
    }

    /// 여러 계정을 동시에 조회한다. 결과는 입력 순서를 따른다.
    pub async fn execute_all(
        &self,
        accounts: &[Account],
    ) -> Vec<(Account, Result<RepositoryListing, ListError>)> {
        let mut pending: FuturesUnordered<_> = accounts
            .iter()
            .enumerate()
            .map(|(idx, account)| async move { (idx, self.execute(account).await) })
            .collect();

        let mut results: Vec<Option<Result<RepositoryListing, ListError>>> =
            accounts.iter().map(|_| None).collect();
        while let Some((idx, result)) = pending.next().await {
            results[idx] = Some(result);
        }

        accounts
            .iter()
            .cloned()
            .zip(results)
            .filter_map(|(account, result)| result.map(|r| (account, r)))
            .collect()
    }
}
