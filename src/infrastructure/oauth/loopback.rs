//! 로컬 루프백(127.0.0.1, ::1) 리다이렉트를 받는 1회성 콜백 리스너 세션.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use url::{Host, Url};

use super::present_authorize_url;
use crate::application::ports::AuthorizationSession;
use crate::domain::error::AuthorizationError;

const SUCCESS_HTML: &str = "<html><body><h1>Authentication successful</h1><p>You may close this window and return to the terminal.</p></body></html>";
const ERROR_HTML: &str =
    "<html><body><h1>Authentication failed</h1><p>You may close this window and retry.</p></body></html>";
const NOT_FOUND_HTML: &str = "<html><body><h1>Not found</h1></body></html>";

/// 연결 하나가 요청을 보내기까지 기다리는 최대 시간.
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// redirect URI가 `http://127.0.0.1:<port>/<path>` 형태일 때 사용하는 세션.
pub struct LoopbackSession {
    timeout: Duration,
    open_browser: bool,
}

impl LoopbackSession {
    pub fn new(timeout: Duration, open_browser: bool) -> Self {
        Self {
            timeout,
            open_browser,
        }
    }

    /// 루프백 리스너로 받을 수 있는 redirect URI인지 판단한다.
    pub fn supports(redirect: &Url) -> bool {
        redirect.scheme() == "http" && loopback_addrs(redirect).is_some()
    }
}

#[async_trait]
impl AuthorizationSession for LoopbackSession {
    async fn authenticate(
        &self,
        authorize_url: &Url,
        callback_scheme: &str,
    ) -> Result<Url, AuthorizationError> {
        let redirect = redirect_from_authorize_url(authorize_url)?;
        if redirect.scheme() != callback_scheme {
            return Err(AuthorizationError::UnexpectedCallback(redirect.to_string()));
        }
        let addrs = loopback_addrs(&redirect).ok_or_else(|| {
            AuthorizationError::Session(format!("redirect URI is not a loopback address: {redirect}"))
        })?;
        let listeners = bind_listeners(&addrs).await?;

        present_authorize_url(authorize_url, self.open_browser);
        eprintln!("Waiting for the browser to redirect to {redirect} (Ctrl-C to cancel) ...");

        tokio::select! {
            result = tokio::time::timeout(self.timeout, wait_for_callback(listeners, redirect)) => {
                result.map_err(|_| AuthorizationError::TimedOut)?
            }
            _ = tokio::signal::ctrl_c() => Err(AuthorizationError::Cancelled),
        }
    }
}

/// 주소마다 바인딩을 시도하고, 하나라도 열리면 진행한다.
async fn bind_listeners(addrs: &[SocketAddr]) -> Result<Vec<TcpListener>, AuthorizationError> {
    let mut listeners = Vec::new();
    let mut bind_errors = Vec::new();
    for addr in addrs {
        match TcpListener::bind(*addr).await {
            Ok(listener) => {
                debug!(%addr, "waiting for oauth callback");
                listeners.push(listener);
            }
            Err(err) => bind_errors.push(format!("{addr} ({err})")),
        }
    }

    if listeners.is_empty() {
        return Err(AuthorizationError::Session(format!(
            "failed to listen on {}",
            bind_errors.join("; ")
        )));
    }
    if !bind_errors.is_empty() {
        debug!(errors = %bind_errors.join("; "), "some loopback addresses are unavailable");
    }
    Ok(listeners)
}

/// 콜백 경로로 들어온 첫 GET 요청의 전체 URL을 반환한다.
/// 연결은 각각 따로 처리하므로 요청 없이 열린 연결이 콜백을 막지 않는다.
/// 다른 경로(favicon 등)는 404로 응답하고 계속 기다린다.
pub(crate) async fn wait_for_callback(
    listeners: Vec<TcpListener>,
    redirect: Url,
) -> Result<Url, AuthorizationError> {
    let (found, mut callbacks) = mpsc::channel(1);
    // 반환 시 drop되면서 accept/연결 태스크가 모두 중단된다.
    let mut acceptors = JoinSet::new();
    for listener in listeners {
        acceptors.spawn(accept_connections(listener, redirect.clone(), found.clone()));
    }
    drop(found);

    callbacks
        .recv()
        .await
        .ok_or_else(|| AuthorizationError::Session("callback listener stopped".to_string()))
}

async fn accept_connections(listener: TcpListener, redirect: Url, found: mpsc::Sender<Url>) {
    let mut connections = JoinSet::new();
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(err) => {
                warn!("callback accept failed: {err}");
                return;
            }
        };
        while connections.try_join_next().is_some() {}
        connections.spawn(serve_connection(socket, peer, redirect.clone(), found.clone()));
    }
}

async fn serve_connection(
    mut socket: TcpStream,
    peer: SocketAddr,
    redirect: Url,
    found: mpsc::Sender<Url>,
) {
    let mut buffer = vec![0u8; 8192];
    let size = match tokio::time::timeout(REQUEST_READ_TIMEOUT, socket.read(&mut buffer)).await {
        Ok(Ok(0)) => return,
        Ok(Ok(size)) => size,
        Ok(Err(err)) => {
            warn!(%peer, "failed to read callback request: {err}");
            return;
        }
        Err(_) => {
            debug!(%peer, "closing idle callback connection");
            return;
        }
    };

    let request = String::from_utf8_lossy(&buffer[..size]);
    let Some(target) = request_target(&request) else {
        respond(&mut socket, "400 Bad Request", ERROR_HTML).await;
        return;
    };

    let callback = match redirect.join(target) {
        Ok(url) if url.path() == redirect.path() => url,
        _ => {
            respond(&mut socket, "404 Not Found", NOT_FOUND_HTML).await;
            return;
        }
    };

    let is_error = callback.query_pairs().any(|(k, _)| k == "error");
    if is_error {
        respond(&mut socket, "400 Bad Request", ERROR_HTML).await;
    } else {
        respond(&mut socket, "200 OK", SUCCESS_HTML).await;
    }
    let _ = found.send(callback).await;
}

fn request_target(request: &str) -> Option<&str> {
    let first = request.lines().next()?;
    let mut parts = first.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    if method != "GET" || !target.starts_with('/') {
        return None;
    }
    Some(target)
}

async fn respond(socket: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    // 브라우저가 먼저 연결을 끊어도 콜백 처리에는 영향이 없다.
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

fn redirect_from_authorize_url(authorize_url: &Url) -> Result<Url, AuthorizationError> {
    let raw = authorize_url
        .query_pairs()
        .find(|(k, _)| k == "redirect_uri")
        .map(|(_, v)| v.to_string())
        .ok_or_else(|| {
            AuthorizationError::Session("authorize URL has no redirect_uri".to_string())
        })?;
    Url::parse(&raw).map_err(|e| AuthorizationError::Session(format!("invalid redirect_uri: {e}")))
}

/// `localhost`는 브라우저가 어느 쪽으로 해석하든 받도록 IPv4/IPv6 둘 다 연다.
fn loopback_addrs(redirect: &Url) -> Option<Vec<SocketAddr>> {
    let ips = match redirect.host()? {
        Host::Ipv4(ip) if ip.is_loopback() => vec![IpAddr::V4(ip)],
        Host::Ipv6(ip) if ip.is_loopback() => vec![IpAddr::V6(ip)],
        Host::Domain("localhost") => vec![
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(Ipv6Addr::LOCALHOST),
        ],
        _ => return None,
    };
    let port = redirect.port_or_known_default()?;
    Some(ips.into_iter().map(|ip| SocketAddr::new(ip, port)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn send(port: u16, request: &str) -> String {
        let mut stream = TcpStream::connect(("127.0.0.1", port))
            .await
            .expect("connect");
        stream.write_all(request.as_bytes()).await.expect("write");
        let mut response = String::new();
        stream
            .read_to_string(&mut response)
            .await
            .expect("read response");
        response
    }

    #[test]
    fn supports_only_http_loopback_redirects() {
        let ok = |raw: &str| LoopbackSession::supports(&Url::parse(raw).expect("url"));
        assert!(ok("http://127.0.0.1:8976/callback"));
        assert!(ok("http://localhost:8976/callback"));
        assert!(ok("http://[::1]:8976/callback"));
        assert!(!ok("https://127.0.0.1:8976/callback"));
        assert!(!ok("http://example.com/callback"));
        assert!(!ok("repolink://oauth"));
    }

    #[test]
    fn request_target_requires_get_with_absolute_path() {
        assert_eq!(
            request_target("GET /callback?code=1 HTTP/1.1\r\nHost: x\r\n\r\n"),
            Some("/callback?code=1")
        );
        assert_eq!(request_target("POST /callback HTTP/1.1\r\n"), None);
        assert_eq!(request_target(""), None);
    }

    #[test]
    fn redirect_is_read_from_authorize_query() {
        let authorize = Url::parse(
            "https://github.com/login/oauth/authorize?client_id=x&redirect_uri=http%3A%2F%2F127.0.0.1%3A8976%2Fcallback",
        )
        .expect("url");
        let redirect = redirect_from_authorize_url(&authorize).expect("redirect");
        assert_eq!(redirect.as_str(), "http://127.0.0.1:8976/callback");
    }

    #[tokio::test]
    async fn wait_for_callback_ignores_other_paths() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let redirect = Url::parse(&format!("http://127.0.0.1:{port}/callback")).expect("url");

        let waiter = tokio::spawn(wait_for_callback(vec![listener], redirect));

        let favicon = send(port, "GET /favicon.ico HTTP/1.1\r\nHost: 127.0.0.1\r\n\r\n").await;
        assert!(favicon.starts_with("HTTP/1.1 404"));

        let ok = send(
            port,
            "GET /callback?code=abc&state=s1 HTTP/1.1\r\nHost: 127.0.0.1\r\n\r\n",
        )
        .await;
        assert!(ok.starts_with("HTTP/1.1 200"));

        let callback = waiter.await.expect("join").expect("callback");
        assert_eq!(callback.path(), "/callback");
        assert_eq!(callback.query(), Some("code=abc&state=s1"));
    }

    #[tokio::test]
    async fn idle_connection_does_not_hold_up_callback() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let redirect = Url::parse(&format!("http://127.0.0.1:{port}/callback")).expect("url");

        let waiter = tokio::spawn(wait_for_callback(vec![listener], redirect));

        // 브라우저 preconnect처럼 아무것도 보내지 않는 연결
        let _idle = TcpStream::connect(("127.0.0.1", port))
            .await
            .expect("idle connect");

        let ok = tokio::time::timeout(
            Duration::from_secs(3),
            send(
                port,
                "GET /callback?code=abc&state=s1 HTTP/1.1\r\nHost: 127.0.0.1\r\n\r\n",
            ),
        )
        .await
        .expect("callback answered while another connection is idle");
        assert!(ok.starts_with("HTTP/1.1 200"));

        let callback = tokio::time::timeout(Duration::from_secs(3), waiter)
            .await
            .expect("callback delivered")
            .expect("join")
            .expect("callback");
        assert_eq!(callback.query(), Some("code=abc&state=s1"));
    }

    #[test]
    fn localhost_listens_on_both_loopback_families() {
        let addrs = |raw: &str| loopback_addrs(&Url::parse(raw).expect("url")).expect("loopback");
        assert_eq!(
            addrs("http://localhost:8976/callback"),
            vec![
                SocketAddr::from(([127, 0, 0, 1], 8976)),
                SocketAddr::from((Ipv6Addr::LOCALHOST, 8976)),
            ]
        );
        assert_eq!(
            addrs("http://127.0.0.1:8976/callback"),
            vec![SocketAddr::from(([127, 0, 0, 1], 8976))]
        );
    }

    #[tokio::test]
    async fn binding_succeeds_when_one_address_is_taken() {
        let taken = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind");
        let taken_addr = taken.local_addr().expect("addr");
        let free = SocketAddr::from(([127, 0, 0, 1], 0));

        let listeners = bind_listeners(&[taken_addr, free]).await.expect("one bound");
        assert_eq!(listeners.len(), 1);

        let err = bind_listeners(&[taken_addr]).await.expect_err("all taken");
        assert!(matches!(err, AuthorizationError::Session(ref m) if m.contains("failed to listen")));
    }
}
