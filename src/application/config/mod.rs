//! 애플리케이션이 사용하는 설정 스키마(순수 데이터).
//!
//! 주의: 파일/환경변수/프로세스 접근은 `infrastructure`에서만 수행한다.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CALLBACK_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// 전역 기본값
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DefaultsConfig {
    /// 계정/provider 설정 파일을 둘 디렉터리(미지정 시 OS 데이터 디렉터리)
    pub data_dir: Option<String>,
    /// 브라우저 콜백 대기 제한 시간(초)
    pub callback_timeout_secs: Option<u64>,
    /// 인증 URL을 브라우저로 자동으로 열지 여부(기본 true)
    pub open_browser: Option<bool>,
    /// 토큰 보관소 종류(keyring/memory, 기본 keyring)
    pub secret_store: Option<String>,
    /// provider API 요청 타임아웃(초)
    pub http_timeout_secs: Option<u64>,
}

/// 토큰/클라이언트 secret 보관소 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretStoreKind {
    /// OS 키체인(macOS Keychain, Windows Credential Manager, Linux Secret Service + keyutils 캐시)
    Keyring,
    /// 프로세스 메모리(헤드리스/CI용, 종료 시 사라짐)
    Memory,
}

impl SecretStoreKind {
    /// 설정 문자열을 보관소 종류로 변환한다(알 수 없는 값은 keyring).
    pub fn from_config(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("memory") | Some("mem") => Self::Memory,
            _ => Self::Keyring,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Keyring => "keyring",
            Self::Memory => "memory",
        }
    }
}

impl Config {
    pub fn callback_timeout_secs(&self) -> u64 {
        self.defaults
            .callback_timeout_secs
            .unwrap_or(DEFAULT_CALLBACK_TIMEOUT_SECS)
    }

    pub fn http_timeout_secs(&self) -> u64 {
        self.defaults
            .http_timeout_secs
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
    }

    pub fn open_browser(&self) -> bool {
        self.defaults.open_browser.unwrap_or(true)
    }

    pub fn secret_store(&self) -> SecretStoreKind {
        SecretStoreKind::from_config(self.defaults.secret_store.as_deref())
    }

    /// 명시된 `data_dir`이 있으면 그 경로를 사용한다.
    pub fn data_dir_override(&self) -> Option<PathBuf> {
        self.defaults
            .data_dir
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    /// 후순위(나중 파일) 값으로 덮어쓰는 병합 규칙.
    pub fn merge_from(&mut self, other: Config) {
        self.defaults.merge_from(other.defaults);
    }
}

impl DefaultsConfig {
    pub fn merge_from(&mut self, other: DefaultsConfig) {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.callback_timeout_secs.is_some() {
            self.callback_timeout_secs = other.callback_timeout_secs;
        }
        if other.open_browser.is_some() {
            self.open_browser = other.open_browser;
        }
        if other.secret_store.is_some() {
            self.secret_store = other.secret_store;
        }
        if other.http_timeout_secs.is_some() {
            self.http_timeout_secs = other.http_timeout_secs;
        }
    }
}
