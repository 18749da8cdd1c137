//! 저장소 clone 포트 구현(git CLI).

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::application::ports::GitCloner;

/// 외부 `git` 명령으로 저장소를 clone한다.
pub struct GitCommandCloner;

impl GitCloner for GitCommandCloner {
    fn clone_repository(&self, url: &str, destination: Option<&Path>) -> Result<()> {
        let mut cmd = Command::new("git");
        cmd.args(["clone", url]);
        if let Some(dest) = destination {
            cmd.arg(dest);
        }
        debug!(%url, "running git clone");

        let status = cmd
            .status()
            .with_context(|| "failed to run `git clone` (install git)")?;
        if !status.success() {
            bail!("`git clone {url}` exited with {status}");
        }
        Ok(())
    }
}
