//! 브라우저 인증 세션 포트 구현 어댑터.
//! redirect URI 형태에 따라 루프백 리스너 또는 붙여넣기 세션을 고른다.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::application::ports::AuthorizationSession;
use crate::domain::error::AuthorizationError;
use crate::infrastructure::oauth::{LoopbackSession, PasteCallbackSession};

pub struct SystemAuthorizationSession {
    loopback: LoopbackSession,
    paste: PasteCallbackSession,
}

impl SystemAuthorizationSession {
    pub fn new(callback_timeout: Duration, open_browser: bool) -> Self {
        Self {
            loopback: LoopbackSession::new(callback_timeout, open_browser),
            paste: PasteCallbackSession::new(open_browser),
        }
    }
}

#[async_trait]
impl AuthorizationSession for SystemAuthorizationSession {
    async fn authenticate(
        &self,
        authorize_url: &Url,
        callback_scheme: &str,
    ) -> Result<Url, AuthorizationError> {
        let loopback = authorize_url
            .query_pairs()
            .find(|(k, _)| k == "redirect_uri")
            .and_then(|(_, v)| Url::parse(&v).ok())
            .is_some_and(|redirect| LoopbackSession::supports(&redirect));

        if loopback {
            self.loopback
                .authenticate(authorize_url, callback_scheme)
                .await
        } else {
            self.paste.authenticate(authorize_url, callback_scheme).await
        }
    }
}
