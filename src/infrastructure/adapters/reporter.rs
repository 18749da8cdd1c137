//! 콘솔 리포터 포트 구현 어댑터.

use std::io::{self, IsTerminal};

use crate::application::ports::Reporter;

/// 콘솔 전용 리포터 어댑터.
pub struct ConsoleReporter {
    interactive: bool,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleReporter {
    /// stdout이 TTY일 때만 상태 색상을 사용한다.
    pub fn new() -> Self {
        Self {
            interactive: io::stdout().is_terminal(),
        }
    }

    pub fn plain() -> Self {
        Self { interactive: false }
    }

    fn paint(&self, text: &str) -> String {
        if self.interactive {
            colorize_status(text)
        } else {
            text.to_string()
        }
    }
}

impl Reporter for ConsoleReporter {
    fn section(&self, name: &str) {
        println!();
        println!("==================== {} ====================", name);
    }

    fn kv(&self, key: &str, value: &str) {
        println!("{:<12}: {}", key, value);
    }

    fn status(&self, scope: &str, message: &str) {
        println!("[{:<8}] {}", self.paint(scope), message);
    }

    fn raw(&self, line: &str) {
        println!("{}", line);
    }
}

fn colorize_status(status: &str) -> String {
    match status {
        "valid" | "ok" | "public" => format!("\x1b[32m{status}\x1b[0m"),
        "expired" | "private" => format!("\x1b[33m{status}\x1b[0m"),
        "missing" | "error" => format!("\x1b[31m{status}\x1b[0m"),
        _ => status.to_string(),
    }
}
