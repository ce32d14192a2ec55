//! Console implementations of the transfer collaborators.

use std::future::Future;
use std::io::Write as _;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

use blobferry_transfer::{InstallPrompt, LogSink, NotificationSink};

/// Appends progress lines to stdout.
pub struct ConsoleLog;

impl LogSink for ConsoleLog {
    fn append_line(&self, line: &str) {
        println!("{line}");
    }
}

/// Asks on stderr and reads a y/N answer from stdin.
pub struct ConsolePrompt;

impl InstallPrompt for ConsolePrompt {
    fn confirm_install(&self, message: &str) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        let message = message.to_string();
        Box::pin(async move {
            let answer = tokio::task::spawn_blocking(move || {
                eprint!("{message} [y/N] ");
                let _ = std::io::stderr().flush();
                let mut line = String::new();
                if std::io::stdin().read_line(&mut line).is_err() {
                    return false;
                }
                matches!(line.trim(), "y" | "Y" | "yes")
            })
            .await;
            answer.unwrap_or(false)
        })
    }

    fn open_download_page(&self, url: &str) {
        eprintln!("Download the engine from {url}");
    }
}

/// Accumulates incremental unit reports and mirrors them to stderr.
pub struct ConsoleNotifications {
    total: u64,
    unit_label: &'static str,
    received: AtomicU64,
}

impl ConsoleNotifications {
    pub fn new(total: u64, unit_label: &'static str) -> Self {
        Self {
            total,
            unit_label,
            received: AtomicU64::new(0),
        }
    }

    pub fn received(&self) -> u64 {
        self.received.load(Ordering::SeqCst)
    }
}

impl NotificationSink for ConsoleNotifications {
    fn report(&self, units: u64) {
        let received = self.received.fetch_add(units, Ordering::SeqCst) + units;
        eprintln!("{received}/{} {}", self.total, self.unit_label);
    }
}
