//! 목록에 있는 원격 저장소를 clone하는 유스케이스.

use std::path::Path;

use anyhow::{Result, anyhow, bail};
use tracing::info;

use super::list_repositories::ListRepositoriesUseCase;
use crate::application::ports::GitCloner;
use crate::domain::remote::{Account, RemoteRepository};

/// clone에 사용할 원격 URL 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloneProtocol {
    #[default]
    Https,
    Ssh,
}

impl CloneProtocol {
    pub fn url(self, repo: &RemoteRepository) -> &str {
        match self {
            Self::Https => &repo.http_clone_url,
            Self::Ssh => &repo.ssh_clone_url,
        }
    }
}

pub struct CloneRepositoryUseCase<'a> {
    pub listing: ListRepositoriesUseCase<'a>,
    pub cloner: &'a dyn GitCloner,
}

impl<'a> CloneRepositoryUseCase<'a> {
    /// 계정의 저장소 목록에서 `full_name`(대소문자 무시)을 찾아 clone한다.
    pub async fn execute(
        &self,
        account: &Account,
        full_name: &str,
        destination: Option<&Path>,
        protocol: CloneProtocol,
    ) -> Result<RemoteRepository> {
        let listing = self.listing.execute(account).await?;
        if let Some(notice) = listing.notice {
            bail!("{}: {}", account.label(), notice.message());
        }

        let repo = listing
            .repositories
            .into_iter()
            .find(|r| r.full_name.eq_ignore_ascii_case(full_name.trim()))
            .ok_or_else(|| {
                anyhow!(
                    "repository {full_name} not found in the first page of {}",
                    account.label()
                )
            })?;

        let url = protocol.url(&repo);
        info!(repository = %repo.full_name, %url, "cloning repository");
        self.cloner.clone_repository(url, destination)?;
        Ok(repo)
    }
}
