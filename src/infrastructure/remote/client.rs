//! provider REST 호출 공통 클라이언트.
//! 상태 코드 검사, 본문 보존, JSON 디코딩 오류 분류를 한 곳에서 처리한다.

use std::time::Duration;

use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::error::{ApiError, AuthorizationError, ConnectError, DecodeError, TransportError};
use crate::domain::token::Token;

pub const USER_AGENT_VALUE: &str = "repolink";
const JSON_ACCEPT: &str = "application/json";

/// provider 호출용 HTTP 클라이언트를 생성한다.
pub fn build_http_client(timeout: Duration) -> Client {
    match Client::builder()
        .user_agent(USER_AGENT_VALUE)
        .timeout(timeout)
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            warn!("failed to build configured HTTP client, using defaults: {err}");
            Client::new()
        }
    }
}

/// 인증이 필요한 API 호출 클라이언트(기준 URL 고정).
pub struct RemoteApiClient<'a> {
    client: &'a Client,
    base: String,
}

impl<'a> RemoteApiClient<'a> {
    pub fn new(client: &'a Client, base: &str) -> Self {
        Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, url: String, token: &Token) -> RequestBuilder {
        // 공통 헤더/인증 적용.
        self.client
            .request(method, url)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(ACCEPT, JSON_ACCEPT)
            .bearer_auth(&token.access_token)
    }

    /// GET 요청 후 JSON 본문을 디코딩한다.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &Token,
        context: &str,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path);
        debug!(%url, "{context}: GET");
        let body = send(self.request(Method::GET, url, token)).await?;
        Ok(decode(&body, context)?)
    }
}

/// 토큰 endpoint에 form-urlencoded POST를 보내고 응답을 디코딩한다.
///
/// 일부 provider는 2xx 상태로 `{"error": ...}` 본문을 돌려주므로,
/// `access_token` 없이 `error`만 있는 응답은 인증 거부로 분류한다.
pub async fn post_token_form<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    params: &[(&str, &str)],
    context: &str,
) -> Result<T, ConnectError> {
    debug!(%url, "{context}: POST");
    let request = client
        .post(url)
        .header(USER_AGENT, USER_AGENT_VALUE)
        .header(ACCEPT, JSON_ACCEPT)
        .form(params);
    let body = send(request).await?;

    if let Ok(value) = serde_json::from_str::<Value>(&body)
        && value.get("access_token").is_none()
        && let Some(error) = value.get("error").and_then(Value::as_str)
    {
        return Err(AuthorizationError::Denied {
            error: error.to_string(),
            description: value
                .get("error_description")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
        .into());
    }

    Ok(decode(&body, context)?)
}

async fn send(request: RequestBuilder) -> Result<String, TransportError> {
    let resp = request
        .send()
        .await
        .map_err(|e| TransportError::Network(e.to_string()))?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| TransportError::Network(format!("failed to read response body: {e}")))?;

    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str, context: &str) -> Result<T, DecodeError> {
    serde_json::from_str(body).map_err(|e| DecodeError {
        context: context.to_string(),
        message: e.to_string(),
    })
}
