//! 원격 provider 포트 구현 어댑터.

use reqwest::Client;

use crate::application::ports::{RemoteProvider, RemoteProviderFactory};
use crate::domain::remote::ProviderKind;
use crate::infrastructure::remote;

/// 공유 HTTP 클라이언트로 provider 구현체를 만드는 팩토리 어댑터.
pub struct RemoteProviderFactoryAdapter {
    client: Client,
}

impl RemoteProviderFactoryAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl RemoteProviderFactory for RemoteProviderFactoryAdapter {
    fn build(&self, kind: ProviderKind) -> Box<dyn RemoteProvider> {
        remote::build_remote_provider(kind, self.client.clone())
    }
}
