//! GitHub OAuth/REST 연동 구현.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::client::{RemoteApiClient, post_token_form};
use super::{MAX_PAGE_SIZE, validate_configuration};
use crate::application::ports::{AccountUrls, RemoteProvider};
use crate::domain::error::{ConfigurationError, ConnectError, ListError};
use crate::domain::remote::{
    Account, Identity, ProviderConfiguration, ProviderKind, RemoteRepository,
};
use crate::domain::token::Token;

/// GitHub endpoint 묶음. 기본값은 github.com 공개 서비스다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubEndpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub api_base_url: String,
    pub web_base_url: String,
}

impl Default for GitHubEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: "https://github.com/login/oauth/authorize".to_string(),
            token_url: "https://github.com/login/oauth/access_token".to_string(),
            api_base_url: "https://api.github.com".to_string(),
            web_base_url: "https://github.com".to_string(),
        }
    }
}

impl GitHubEndpoints {
    /// 하나의 서버 주소 아래에 모든 endpoint를 둔다(테스트/프록시용).
    pub fn under(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            authorize_url: format!("{base}/login/oauth/authorize"),
            token_url: format!("{base}/login/oauth/access_token"),
            api_base_url: base.to_string(),
            web_base_url: base.to_string(),
        }
    }
}

pub struct GitHubProvider {
    client: Client,
    endpoints: GitHubEndpoints,
}

impl GitHubProvider {
    pub fn new(client: Client) -> Self {
        Self::with_endpoints(client, GitHubEndpoints::default())
    }

    pub fn with_endpoints(client: Client, endpoints: GitHubEndpoints) -> Self {
        Self { client, endpoints }
    }
}

#[derive(Debug, Deserialize)]
struct GitHubTokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

impl From<GitHubTokenResponse> for Token {
    fn from(resp: GitHubTokenResponse) -> Self {
        // GitHub OAuth 앱 토큰은 만료/refresh 정보가 없다.
        Token {
            access_token: resp.access_token,
            token_type: resp.token_type.unwrap_or_else(|| "bearer".to_string()),
            refresh_token: None,
            expires_in: None,
            created_at: None,
            scope: resp.scope.filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GitHubRepo {
    id: u64,
    name: String,
    full_name: String,
    #[serde(default)]
    description: Option<String>,
    html_url: String,
    clone_url: String,
    ssh_url: String,
    #[serde(default)]
    private: bool,
}

impl From<GitHubRepo> for RemoteRepository {
    fn from(repo: GitHubRepo) -> Self {
        RemoteRepository {
            id: repo.id.to_string(),
            name: repo.name,
            full_name: repo.full_name,
            description: repo.description.unwrap_or_default(),
            web_url: repo.html_url,
            http_clone_url: repo.clone_url,
            ssh_clone_url: repo.ssh_url,
            is_private: repo.private,
            provider: ProviderKind::GitHub,
        }
    }
}

#[async_trait]
impl RemoteProvider for GitHubProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    fn authorization_url(
        &self,
        config: &ProviderConfiguration,
        code_challenge: &str,
        state: &str,
    ) -> Result<Url, ConfigurationError> {
        validate_configuration(config)?;
        let mut url = Url::parse(&self.endpoints.authorize_url)
            .map_err(|_| ConfigurationError::InvalidBaseUrl(self.endpoints.authorize_url.clone()))?;
        url.query_pairs_mut()
            .append_pair("client_id", config.client_id.trim())
            .append_pair("redirect_uri", config.redirect_uri.trim())
            .append_pair("scope", config.scopes.trim())
            .append_pair("state", state)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "S256");
        Ok(url)
    }

    fn account_urls(
        &self,
        _config: &ProviderConfiguration,
    ) -> Result<AccountUrls, ConfigurationError> {
        Ok(AccountUrls {
            web_base_url: self.endpoints.web_base_url.clone(),
            api_base_url: self.endpoints.api_base_url.clone(),
        })
    }

    async fn exchange_token(
        &self,
        config: &ProviderConfiguration,
        code: &str,
        code_verifier: &str,
    ) -> Result<Token, ConnectError> {
        let mut params = vec![
            ("client_id", config.client_id.trim()),
            ("code", code),
            ("redirect_uri", config.redirect_uri.trim()),
            ("code_verifier", code_verifier),
        ];
        if let Some(secret) = config.client_secret() {
            params.push(("client_secret", secret));
        }

        let resp: GitHubTokenResponse = post_token_form(
            &self.client,
            &self.endpoints.token_url,
            &params,
            "github: token exchange",
        )
        .await?;
        Ok(resp.into())
    }

    async fn resolve_identity(
        &self,
        _config: &ProviderConfiguration,
        token: &Token,
    ) -> Result<Identity, ConnectError> {
        let api = RemoteApiClient::new(&self.client, &self.endpoints.api_base_url);
        let user: GitHubUser = api.get_json("user", token, "github: user").await?;
        Ok(Identity {
            username: user.login,
        })
    }

    async fn list_repositories(
        &self,
        account: &Account,
        token: &Token,
    ) -> Result<Vec<RemoteRepository>, ListError> {
        let api = RemoteApiClient::new(&self.client, &account.api_base_url);
        let path = format!("user/repos?per_page={MAX_PAGE_SIZE}&sort=updated");
        let repos: Vec<GitHubRepo> = api.get_json(&path, token, "github: repositories").await?;
        Ok(repos
            .into_iter()
            .take(MAX_PAGE_SIZE)
            .map(RemoteRepository::from)
            .collect())
    }
}
