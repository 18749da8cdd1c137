//! OAuth Authorization Code + PKCE 보조 모듈.
//! PKCE/state 생성, 연결 시도별 트랜잭션, 브라우저 인증 세션 구현을 묶는다.

mod loopback;
mod paste;
pub mod pkce;
mod transaction;

pub use loopback::LoopbackSession;
pub use paste::PasteCallbackSession;
pub use pkce::{PkcePair, generate_pkce, generate_state, random_string};
pub use transaction::{AuthorizationTransaction, CallbackParams, VerifiedCallback, redirect_scheme};

use tracing::warn;
use url::Url;

/// 인증 URL을 브라우저로 열고, 실패하거나 비활성화된 경우 URL을 출력한다.
fn present_authorize_url(authorize_url: &Url, open_browser: bool) {
    if open_browser {
        eprintln!("Opening browser for authentication...");
        match open::that(authorize_url.as_str()) {
            Ok(()) => return,
            Err(err) => warn!("failed to open browser: {err}"),
        }
    }
    eprintln!("Visit this URL to authorize:\n{authorize_url}");
}
