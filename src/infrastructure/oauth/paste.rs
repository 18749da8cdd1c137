//! 사용자 정의 scheme(예: `repolink://oauth`) 리다이렉트용 붙여넣기 세션.
//! 터미널 도구는 커스텀 scheme을 직접 받을 수 없으므로, 브라우저 주소창의
//! 리다이렉트 URL을 사용자가 붙여넣게 한다.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use url::Url;

use super::present_authorize_url;
use crate::application::ports::AuthorizationSession;
use crate::domain::error::AuthorizationError;

pub struct PasteCallbackSession {
    open_browser: bool,
}

impl PasteCallbackSession {
    pub fn new(open_browser: bool) -> Self {
        Self { open_browser }
    }
}

#[async_trait]
impl AuthorizationSession for PasteCallbackSession {
    async fn authenticate(
        &self,
        authorize_url: &Url,
        callback_scheme: &str,
    ) -> Result<Url, AuthorizationError> {
        present_authorize_url(authorize_url, self.open_browser);
        eprintln!(
            "After approving, copy the `{callback_scheme}://` URL the browser was redirected to and paste it here (empty line to cancel):"
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let line = tokio::select! {
            line = lines.next_line() => line
                .map_err(|e| AuthorizationError::Session(format!("failed to read stdin: {e}")))?,
            _ = tokio::signal::ctrl_c() => return Err(AuthorizationError::Cancelled),
        };

        parse_pasted_callback(line.as_deref(), callback_scheme)
    }
}

/// 붙여넣은 값을 콜백 URL로 해석한다. 빈 입력/EOF는 취소로 본다.
pub(crate) fn parse_pasted_callback(
    line: Option<&str>,
    callback_scheme: &str,
) -> Result<Url, AuthorizationError> {
    let Some(raw) = line.map(str::trim).filter(|v| !v.is_empty()) else {
        return Err(AuthorizationError::Cancelled);
    };

    let url = Url::parse(raw)
        .map_err(|_| AuthorizationError::UnexpectedCallback(raw.to_string()))?;
    if !url.scheme().eq_ignore_ascii_case(callback_scheme) {
        return Err(AuthorizationError::UnexpectedCallback(raw.to_string()));
    }
    Ok(url)
}
