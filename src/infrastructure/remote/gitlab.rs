//! GitLab OAuth/REST 연동 구현.
//! gitlab.com과 self-managed 인스턴스를 설정의 `base_url`로 구분한다.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::client::{RemoteApiClient, post_token_form};
use super::{MAX_PAGE_SIZE, validate_configuration};
use crate::application::ports::{AccountUrls, RemoteProvider};
use crate::domain::error::{ConfigurationError, ConnectError, ListError};
use crate::domain::remote::{
    Account, GITLAB_DEFAULT_BASE_URL, Identity, ProviderConfiguration, ProviderKind,
    RemoteRepository,
};
use crate::domain::token::Token;

pub struct GitLabProvider {
    client: Client,
}

impl GitLabProvider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// 설정의 base URL(비어 있으면 gitlab.com)에서 끝의 `/` 하나를 제거한다.
pub fn gitlab_base_url(config: &ProviderConfiguration) -> Result<String, ConfigurationError> {
    let raw = config.base_url.trim();
    let raw = if raw.is_empty() {
        GITLAB_DEFAULT_BASE_URL
    } else {
        raw
    };
    let base = raw.strip_suffix('/').unwrap_or(raw);

    let parsed =
        Url::parse(base).map_err(|_| ConfigurationError::InvalidBaseUrl(raw.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ConfigurationError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(base.to_string())
}

fn api_base_url(base: &str) -> String {
    format!("{base}/api/v4")
}

#[derive(Debug, Deserialize)]
struct GitLabTokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    created_at: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

impl From<GitLabTokenResponse> for Token {
    fn from(resp: GitLabTokenResponse) -> Self {
        Token {
            access_token: resp.access_token,
            token_type: resp.token_type.unwrap_or_else(|| "Bearer".to_string()),
            refresh_token: resp.refresh_token.filter(|s| !s.is_empty()),
            expires_in: resp.expires_in,
            created_at: resp.created_at,
            scope: resp.scope.filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitLabUser {
    username: String,
}

#[derive(Debug, Deserialize)]
struct GitLabProject {
    id: u64,
    name: String,
    path_with_namespace: String,
    #[serde(default)]
    description: Option<String>,
    web_url: String,
    http_url_to_repo: String,
    ssh_url_to_repo: String,
    #[serde(default)]
    visibility: Option<String>,
}

impl From<GitLabProject> for RemoteRepository {
    fn from(project: GitLabProject) -> Self {
        RemoteRepository {
            id: project.id.to_string(),
            name: project.name,
            full_name: project.path_with_namespace,
            description: project.description.unwrap_or_default(),
            web_url: project.web_url,
            http_clone_url: project.http_url_to_repo,
            ssh_clone_url: project.ssh_url_to_repo,
            is_private: project.visibility.as_deref() == Some("private"),
            provider: ProviderKind::GitLab,
        }
    }
}

#[async_trait]
impl RemoteProvider for GitLabProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitLab
    }

    fn authorization_url(
        &self,
        config: &ProviderConfiguration,
        code_challenge: &str,
        state: &str,
    ) -> Result<Url, ConfigurationError> {
        validate_configuration(config)?;
        let base = gitlab_base_url(config)?;
        let authorize = format!("{base}/oauth/authorize");
        let mut url =
            Url::parse(&authorize).map_err(|_| ConfigurationError::InvalidBaseUrl(base.clone()))?;
        url.query_pairs_mut()
            .append_pair("client_id", config.client_id.trim())
            .append_pair("redirect_uri", config.redirect_uri.trim())
            .append_pair("response_type", "code")
            .append_pair("scope", config.scopes.trim())
            .append_pair("state", state)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "S256");
        Ok(url)
    }

    fn account_urls(
        &self,
        config: &ProviderConfiguration,
    ) -> Result<AccountUrls, ConfigurationError> {
        let base = gitlab_base_url(config)?;
        Ok(AccountUrls {
            api_base_url: api_base_url(&base),
            web_base_url: base,
        })
    }

    async fn exchange_token(
        &self,
        config: &ProviderConfiguration,
        code: &str,
        code_verifier: &str,
    ) -> Result<Token, ConnectError> {
        let token_url = format!("{}/oauth/token", gitlab_base_url(config)?);
        let mut params = vec![
            ("client_id", config.client_id.trim()),
            ("code", code),
            ("redirect_uri", config.redirect_uri.trim()),
            ("code_verifier", code_verifier),
            ("grant_type", "authorization_code"),
        ];
        if let Some(secret) = config.client_secret() {
            params.push(("client_secret", secret));
        }

        let resp: GitLabTokenResponse =
            post_token_form(&self.client, &token_url, &params, "gitlab: token exchange").await?;
        Ok(resp.into())
    }

    async fn resolve_identity(
        &self,
        config: &ProviderConfiguration,
        token: &Token,
    ) -> Result<Identity, ConnectError> {
        let base = api_base_url(&gitlab_base_url(config)?);
        let api = RemoteApiClient::new(&self.client, &base);
        let user: GitLabUser = api.get_json("user", token, "gitlab: user").await?;
        Ok(Identity {
            username: user.username,
        })
    }

    async fn list_repositories(
        &self,
        account: &Account,
        token: &Token,
    ) -> Result<Vec<RemoteRepository>, ListError> {
        let api = RemoteApiClient::new(&self.client, &account.api_base_url);
        let path = format!(
            "projects?membership=true&per_page={MAX_PAGE_SIZE}&order_by=last_activity_at"
        );
        let projects: Vec<GitLabProject> =
            api.get_json(&path, token, "gitlab: projects").await?;
        Ok(projects
            .into_iter()
            .take(MAX_PAGE_SIZE)
            .map(RemoteRepository::from)
            .collect())
    }
}
