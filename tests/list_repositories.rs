mod common;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use mockito::Matcher;

use common::{MockServerFactory, Stores};
use repolink::application::ports::{GitCloner, TokenRepository};
use repolink::application::usecases::clone_repository::{CloneProtocol, CloneRepositoryUseCase};
use repolink::application::usecases::list_repositories::ListingNotice;
use repolink::domain::error::{ListError, TransportError};
use repolink::domain::remote::{Account, ProviderKind};
use repolink::domain::token::{Token, now_unix_seconds};

fn github_account(api_base: &str, username: &str) -> Account {
    Account::new(
        ProviderKind::GitHub,
        username.to_string(),
        "1234".to_string(),
        api_base.to_string(),
        api_base.to_string(),
    )
}

fn gitlab_account(base: &str, username: &str) -> Account {
    Account::new(
        ProviderKind::GitLab,
        username.to_string(),
        "9876".to_string(),
        base.to_string(),
        format!("{base}/api/v4"),
    )
}

fn token(access: &str) -> Token {
    Token {
        access_token: access.to_string(),
        token_type: "bearer".to_string(),
        refresh_token: None,
        expires_in: None,
        created_at: None,
        scope: None,
    }
}

const GITHUB_REPOS: &str = r#"[
    {"id":1,"name":"alpha","full_name":"octo/alpha","description":"first","html_url":"https://github.com/octo/alpha","clone_url":"https://github.com/octo/alpha.git","ssh_url":"git@github.com:octo/alpha.git","private":false},
    {"id":2,"name":"beta","full_name":"octo/beta","description":null,"html_url":"https://github.com/octo/beta","clone_url":"https://github.com/octo/beta.git","ssh_url":"git@github.com:octo/beta.git","private":true}
]"#;

#[tokio::test]
async fn github_listing_uses_first_page_sorted_by_update() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/user/repos")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("per_page".into(), "100".into()),
            Matcher::UrlEncoded("sort".into(), "updated".into()),
        ]))
        .match_header("authorization", "Bearer gho_1234")
        .match_header("accept", "application/json")
        .with_status(200)
        .with_body(GITHUB_REPOS)
        .expect(1)
        .create_async()
        .await;

    let stores = Stores::new();
    let account = github_account(&server.url(), "octo");
    stores.tokens.save(&token("gho_1234"), &account).expect("token");
    let factory = MockServerFactory {
        github_base: server.url(),
    };

    let listing = stores.listing(&factory).execute(&account).await.expect("list");

    mock.assert_async().await;
    assert_eq!(listing.notice, None);
    let names: Vec<&str> = listing
        .repositories
        .iter()
        .map(|r| r.full_name.as_str())
        .collect();
    assert_eq!(names, ["octo/alpha", "octo/beta"]);
    assert_eq!(listing.repositories[1].description, "");
    assert!(listing.repositories[1].is_private);
}

#[tokio::test]
async fn gitlab_listing_maps_visibility() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v4/projects")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("membership".into(), "true".into()),
            Matcher::UrlEncoded("per_page".into(), "100".into()),
            Matcher::UrlEncoded("order_by".into(), "last_activity_at".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"[{"id":10,"name":"svc","path_with_namespace":"team/svc","description":"","web_url":"w","http_url_to_repo":"h","ssh_url_to_repo":"s","visibility":"private"}]"#,
        )
        .create_async()
        .await;

    let stores = Stores::new();
    let account = gitlab_account(&server.url(), "alice");
    stores.tokens.save(&token("glat"), &account).expect("token");
    let factory = MockServerFactory {
        github_base: server.url(),
    };

    let listing = stores.listing(&factory).execute(&account).await.expect("list");

    mock.assert_async().await;
    assert_eq!(listing.repositories.len(), 1);
    assert_eq!(listing.repositories[0].full_name, "team/svc");
    assert_eq!(listing.repositories[0].provider, ProviderKind::GitLab);
    assert!(listing.repositories[0].is_private);
}

#[tokio::test]
async fn missing_token_returns_empty_without_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let stores = Stores::new();
    let account = github_account(&server.url(), "octo");
    let factory = MockServerFactory {
        github_base: server.url(),
    };

    let listing = stores.listing(&factory).execute(&account).await.expect("list");

    mock.assert_async().await;
    assert!(listing.repositories.is_empty());
    assert_eq!(listing.notice, Some(ListingNotice::TokenMissing));
}

#[tokio::test]
async fn expired_token_returns_empty_without_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let stores = Stores::new();
    let account = gitlab_account(&server.url(), "alice");
    let expired = Token {
        expires_in: Some(7200),
        created_at: Some(now_unix_seconds() - 7200),
        ..token("glat")
    };
    stores.tokens.save(&expired, &account).expect("token");
    let factory = MockServerFactory {
        github_base: server.url(),
    };

    let listing = stores.listing(&factory).execute(&account).await.expect("list");

    mock.assert_async().await;
    assert!(listing.repositories.is_empty());
    assert_eq!(listing.notice, Some(ListingNotice::TokenExpired));
}

#[tokio::test]
async fn unauthorized_listing_keeps_status_and_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/user/repos")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"message":"Bad credentials"}"#)
        .create_async()
        .await;

    let stores = Stores::new();
    let account = github_account(&server.url(), "octo");
    stores.tokens.save(&token("revoked"), &account).expect("token");
    let factory = MockServerFactory {
        github_base: server.url(),
    };

    let err = stores
        .listing(&factory)
        .execute(&account)
        .await
        .expect_err("401");

    assert_eq!(
        err,
        ListError::Transport(TransportError::Status {
            status: 401,
            body: r#"{"message":"Bad credentials"}"#.to_string(),
        })
    );
}

#[tokio::test]
async fn unexpected_listing_shape_is_a_decode_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/user/repos")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"message":"not a list"}"#)
        .create_async()
        .await;

    let stores = Stores::new();
    let account = github_account(&server.url(), "octo");
    stores.tokens.save(&token("t"), &account).expect("token");
    let factory = MockServerFactory {
        github_base: server.url(),
    };

    let err = stores
        .listing(&factory)
        .execute(&account)
        .await
        .expect_err("decode");

    assert!(matches!(err, ListError::Decode(ref e) if e.context == "github: repositories"));
}

#[tokio::test]
async fn listing_all_accounts_keeps_input_order() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/user/repos")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(GITHUB_REPOS)
        .create_async()
        .await;

    let stores = Stores::new();
    let with_token = github_account(&server.url(), "octo");
    let without_token = gitlab_account(&server.url(), "alice");
    stores.tokens.save(&token("gho"), &with_token).expect("token");
    let factory = MockServerFactory {
        github_base: server.url(),
    };

    let results = stores
        .listing(&factory)
        .execute_all(&[without_token.clone(), with_token.clone()])
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, without_token);
    assert_eq!(
        results[0].1.as_ref().expect("listing").notice,
        Some(ListingNotice::TokenMissing)
    );
    assert_eq!(results[1].0, with_token);
    assert_eq!(
        results[1].1.as_ref().expect("listing").repositories.len(),
        2
    );
}

#[derive(Default)]
struct RecordingCloner {
    calls: Mutex<Vec<(String, Option<PathBuf>)>>,
}

impl GitCloner for RecordingCloner {
    fn clone_repository(&self, url: &str, destination: Option<&Path>) -> anyhow::Result<()> {
        self.calls
            .lock()
            .expect("lock")
            .push((url.to_string(), destination.map(Path::to_path_buf)));
        Ok(())
    }
}

#[tokio::test]
async fn clone_picks_listed_repository_by_protocol() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/user/repos")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(GITHUB_REPOS)
        .expect(2)
        .create_async()
        .await;

    let stores = Stores::new();
    let account = github_account(&server.url(), "octo");
    stores.tokens.save(&token("gho"), &account).expect("token");
    let factory = MockServerFactory {
        github_base: server.url(),
    };
    let cloner = RecordingCloner::default();
    let usecase = CloneRepositoryUseCase {
        listing: stores.listing(&factory),
        cloner: &cloner,
    };

    let repo = usecase
        .execute(&account, "OCTO/Beta", Some(Path::new("work")), CloneProtocol::Ssh)
        .await
        .expect("clone");
    assert_eq!(repo.full_name, "octo/beta");

    let err = usecase
        .execute(&account, "octo/gamma", None, CloneProtocol::Https)
        .await
        .expect_err("unknown repository");
    assert!(err.to_string().contains("octo/gamma"));

    assert_eq!(
        *cloner.calls.lock().expect("lock"),
        [(
            "git@github.com:octo/beta.git".to_string(),
            Some(PathBuf::from("work"))
        )]
    );
}
