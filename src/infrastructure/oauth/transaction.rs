//! 연결 시도 하나에 묶인 PKCE/state 트랜잭션.
//!
//! 트랜잭션은 시도마다 새로 만들고 값으로 넘긴다. 콜백 검증이 트랜잭션을 소비하므로
//! 같은 verifier/state를 두 번 사용할 수 없다.

use subtle::ConstantTimeEq;
use url::Url;

use super::pkce::{PkcePair, generate_pkce, generate_state};
use crate::domain::error::{AuthorizationError, ConfigurationError};

#[derive(Debug)]
pub struct AuthorizationTransaction {
    pkce: PkcePair,
    state: String,
    redirect_scheme: String,
}

/// state 검증을 통과한 콜백(교환 단계 입력).
#[derive(Debug)]
pub struct VerifiedCallback {
    pub code: String,
    pub code_verifier: String,
}

/// 콜백 URL 쿼리에서 추출한 값.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    pub fn from_url(url: &Url) -> Self {
        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            let value = Some(value.to_string()).filter(|v| !v.is_empty());
            match key.as_ref() {
                "code" if params.code.is_none() => params.code = value,
                "state" if params.state.is_none() => params.state = value,
                "error" if params.error.is_none() => params.error = value,
                "error_description" if params.error_description.is_none() => {
                    params.error_description = value
                }
                _ => {}
            }
        }
        params
    }
}

impl AuthorizationTransaction {
    /// 새 PKCE 쌍과 state로 트랜잭션을 시작한다.
    pub fn begin(redirect_uri: &str) -> Result<Self, ConfigurationError> {
        let scheme = redirect_scheme(redirect_uri)?;
        Ok(Self::from_parts(generate_pkce(), generate_state(), scheme))
    }

    pub fn from_parts(pkce: PkcePair, state: String, redirect_scheme: String) -> Self {
        Self {
            pkce,
            state,
            redirect_scheme,
        }
    }

    pub fn code_challenge(&self) -> &str {
        &self.pkce.challenge
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn redirect_scheme(&self) -> &str {
        &self.redirect_scheme
    }

    /// 콜백 URL을 검증하고 code/verifier를 돌려준다.
    ///
    /// 순서: provider 오류 → code 누락 → state 누락 → state 불일치.
    pub fn verify_callback(self, callback: &Url) -> Result<VerifiedCallback, AuthorizationError> {
        let params = CallbackParams::from_url(callback);

        if let Some(error) = params.error
            && params.code.is_none()
        {
            return Err(AuthorizationError::Denied {
                error,
                description: params.error_description,
            });
        }

        let code = params.code.ok_or(AuthorizationError::MissingCode)?;
        let returned_state = params.state.ok_or(AuthorizationError::MissingState)?;

        if !bool::from(returned_state.as_bytes().ct_eq(self.state.as_bytes())) {
            return Err(AuthorizationError::StateMismatch);
        }

        Ok(VerifiedCallback {
            code,
            code_verifier: self.pkce.verifier,
        })
    }
}

/// redirect URI의 scheme을 추출한다(scheme이 없으면 설정 오류).
pub fn redirect_scheme(redirect_uri: &str) -> Result<String, ConfigurationError> {
    let parsed = Url::parse(redirect_uri.trim())
        .map_err(|_| ConfigurationError::InvalidRedirectUri(redirect_uri.to_string()))?;
    Ok(parsed.scheme().to_string())
}
