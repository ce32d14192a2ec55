//! Rate-decoupled progress reporting.
//!
//! The poller observes raw engine counters sub-second; humans should not.
//! [`TransferProgress`] sits between the two rates: the log surface is
//! throttled to whole-percent steps and the notification surface receives
//! only deltas, each tracked against its own last-reported value.

/// Append-only log surface for formatted progress lines.
pub trait LogSink: Send + Sync {
    fn append_line(&self, line: &str);
}

/// Incremental UI surface.
///
/// Receives "report additional N units" deltas; the total was fixed when
/// the sink was created.
pub trait NotificationSink: Send + Sync {
    fn report(&self, units: u64);
}

/// Converts a cumulative completed-unit counter into two independently
/// paced reporting surfaces.
///
/// The total unit count is established before the transfer starts by a
/// separate inspection step: total files for a directory upload, total
/// bytes for a single file.
pub struct TransferProgress {
    total: u64,
    unit_label: String,
    last_logged: Option<u64>,
    notified: u64,
}

impl TransferProgress {
    /// Creates a tracker for `total` units, labelled for log lines
    /// (e.g. `"files"` or `"bytes"`).
    pub fn new(total: u64, unit_label: impl Into<String>) -> Self {
        Self {
            total,
            unit_label: unit_label.into(),
            last_logged: None,
            notified: 0,
        }
    }

    /// Reports the latest cumulative count to the log surface.
    ///
    /// Emits only when the whole-percent value has advanced since the last
    /// emission (or on the first report), so sub-second polls do not flood
    /// the log. A count lower than the last reported one is ignored — the
    /// engine's counters can be momentarily stale and the log must never
    /// regress.
    pub fn report_to_log(&mut self, completed: u64, log: &dyn LogSink) {
        if self.last_logged.is_some_and(|last| completed < last) {
            return;
        }

        let emit = match self.last_logged {
            None => true,
            Some(last) => self.percent(completed) > self.percent(last),
        };
        if !emit {
            return;
        }

        self.last_logged = Some(completed);
        log.append_line(&format!(
            "Transferred {completed} of {} {} ({}%)",
            self.total,
            self.unit_label,
            self.percent(completed)
        ));
    }

    /// Reports the latest cumulative count to an incremental notification
    /// sink.
    ///
    /// Pushes only the delta since the last value handed to this sink,
    /// tracked independently of the log surface. A missing sink is valid
    /// input (log-only operation).
    pub fn report_to_notification(&mut self, completed: u64, sink: Option<&dyn NotificationSink>) {
        let Some(sink) = sink else {
            return;
        };
        if completed <= self.notified {
            return;
        }
        let delta = completed - self.notified;
        self.notified = completed;
        sink.report(delta);
    }

    fn percent(&self, completed: u64) -> u64 {
        if self.total == 0 {
            return 100;
        }
        (completed.saturating_mul(100) / self.total).min(100)
    }
}
