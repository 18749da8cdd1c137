//! 원격 코드 호스팅(GitHub/GitLab) 계정/저장소 도메인 모델.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8976/callback";
pub const GITLAB_DEFAULT_BASE_URL: &str = "https://gitlab.com";
const TOKEN_HINT_LEN: usize = 4;

/// 지원하는 원격 provider 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    GitHub,
    GitLab,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::GitHub, ProviderKind::GitLab];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::GitHub => "GitHub",
            Self::GitLab => "GitLab",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "github" | "gh" => Ok(Self::GitHub),
            "gitlab" | "gl" => Ok(Self::GitLab),
            other => Err(format!("unknown provider: {other} (expected github or gitlab)")),
        }
    }
}

/// provider별 OAuth 앱 설정(사용자 편집 가능).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfiguration {
    #[serde(default)]
    pub client_id: String,
    /// 공개(PKCE 전용) 클라이언트는 비워둔다.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub redirect_uri: String,
    /// 공백 구분 scope 문자열
    #[serde(default)]
    pub scopes: String,
    #[serde(default)]
    pub base_url: String,
}

impl ProviderConfiguration {
    /// provider 종류별 기본 설정을 반환한다.
    pub fn defaults(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::GitHub => Self {
                client_id: String::new(),
                client_secret: None,
                redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
                scopes: "repo read:user".to_string(),
                base_url: String::new(),
            },
            ProviderKind::GitLab => Self {
                client_id: String::new(),
                client_secret: None,
                redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
                scopes: "read_api read_user".to_string(),
                base_url: GITLAB_DEFAULT_BASE_URL.to_string(),
            },
        }
    }

    /// 공백뿐인 secret은 미설정으로 취급한다.
    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// 연결된 원격 계정(공개 정보만 보관한다).
///
/// 모든 필드가 같아야 같은 계정으로 본다(선택 상태 비교에 사용).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub provider: ProviderKind,
    pub username: String,
    /// 표시용 access token 끝 4글자
    pub token_hint: String,
    pub web_base_url: String,
    pub api_base_url: String,
}

impl Account {
    pub fn new(
        provider: ProviderKind,
        username: String,
        token_hint: String,
        web_base_url: String,
        api_base_url: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider,
            username,
            token_hint,
            web_base_url,
            api_base_url,
        }
    }

    /// 보안 저장소 키(`provider|username`).
    pub fn token_key(&self) -> String {
        format!("{}|{}", self.provider.as_str(), self.username)
    }

    /// 같은 provider/사용자를 가리키는지(토큰 키 공유 여부) 판단한다.
    pub fn same_identity(&self, other: &Account) -> bool {
        self.provider == other.provider && self.username == other.username
    }

    pub fn label(&self) -> String {
        format!("{}:{}", self.provider.as_str(), self.username)
    }
}

/// identity endpoint 조회 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

/// provider 응답을 정규화한 저장소 모델(저장하지 않음).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RemoteRepository {
    pub id: String,
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub web_url: String,
    pub http_clone_url: String,
    pub ssh_clone_url: String,
    pub is_private: bool,
    pub provider: ProviderKind,
}

/// access token의 표시용 힌트(마지막 4글자)를 만든다.
pub fn token_hint(access_token: &str) -> String {
    let count = access_token.chars().count();
    access_token
        .chars()
        .skip(count.saturating_sub(TOKEN_HINT_LEN))
        .collect()
}
