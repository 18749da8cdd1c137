//! OAuth 토큰 값 객체와 만료 판정 규칙.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// provider에서 발급받은 토큰(보안 저장소에만 보관한다).
///
/// 만료 시각은 `expires_in`과 `created_at`이 모두 있을 때만 정의된다.
/// 둘 중 하나라도 없으면 만료되지 않는 토큰으로 본다(GitHub OAuth 앱 기본값).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// 발급 시점부터 유효한 초
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// 발급 시각(unix epoch 초)
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl Token {
    pub fn expires_at(&self) -> Option<i64> {
        let created_at = self.created_at?;
        let expires_in = self.expires_in?;
        Some(created_at.saturating_add(expires_in))
    }

    /// `now >= created_at + expires_in`이면 만료로 판정한다.
    pub fn is_expired_at(&self, now: i64) -> bool {
        match self.expires_at() {
            Some(expiry) => now >= expiry,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_unix_seconds())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &mask_secret(&self.access_token))
            .field("token_type", &self.token_type)
            .field(
                "refresh_token",
                &self.refresh_token.as_deref().map(mask_secret),
            )
            .field("expires_in", &self.expires_in)
            .field("created_at", &self.created_at)
            .field("scope", &self.scope)
            .finish()
    }
}

pub fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// 로그/진단 출력용으로 비밀값 대부분을 가린다.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 8 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{tail}")
}
