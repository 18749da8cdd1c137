//! 원격 계정 연결/조회 흐름의 오류 분류.
//!
//! 모든 오류는 호출자에게 타입으로 반환되며, 실패 시 기존 계정/토큰 상태는 바뀌지 않는다.

use thiserror::Error;

/// 네트워크 호출 전에 검출되는 설정 오류.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("missing configuration: client id is empty")]
    MissingClientId,
    #[error("invalid redirect URI: {0}")]
    InvalidRedirectUri(String),
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// 브라우저 인증 단계/콜백 검증에서 발생하는 오류.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("authorization callback is missing `code`")]
    MissingCode,
    #[error("authorization callback is missing `state`")]
    MissingState,
    #[error("authorization callback state does not match this attempt")]
    StateMismatch,
    #[error("authorization was cancelled")]
    Cancelled,
    #[error("authorization timed out")]
    TimedOut,
    #[error("authorization denied by provider: {error}{}", description.as_deref().map(|d| format!(" ({d})")).unwrap_or_default())]
    Denied {
        error: String,
        description: Option<String>,
    },
    #[error("unexpected callback URL: {0}")]
    UnexpectedCallback(String),
    #[error("authorization session failed: {0}")]
    Session(String),
}

impl AuthorizationError {
    /// 사용자가 직접 중단한 경우(조용히 재시도 가능한 경우)인지 여부.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// HTTP 전송 오류(2xx 이외 응답 포함).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("request failed: {0}")]
    Network(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(_) => None,
        }
    }
}

/// 응답 JSON이 기대한 형태와 다른 경우.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{context}: invalid response JSON: {message}")]
pub struct DecodeError {
    pub context: String,
    pub message: String,
}

/// 보안 저장소/파일 저장소 작업 실패.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("storage error: {0}")]
pub struct StorageError(pub String);

/// REST 호출 한 번의 실패(전송 또는 디코딩).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// `connect` 실패 원인.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("another connect attempt is already in progress")]
    Busy,
}

impl From<ApiError> for ConnectError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport(e) => Self::Transport(e),
            ApiError::Decode(e) => Self::Decode(e),
        }
    }
}

/// `list_repositories` 실패 원인.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl From<ApiError> for ListError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport(e) => Self::Transport(e),
            ApiError::Decode(e) => Self::Decode(e),
        }
    }
}

/// `remove_account` 실패 원인.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoveAccountError {
    #[error("account not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
