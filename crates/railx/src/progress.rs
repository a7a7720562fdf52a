//! 📊 Progress: counting incidents so the operator at 3am knows something is happening.
//!
//! 🎬 The feed is quiet for twenty minutes, then twelve incidents arrive at once
//! because a points failure at Clapham took out half of South Western. You want to
//! know how many got through, how many got dropped, and how many texts went out.
//!
//! [`PipelineStats`] holds lock-free counters shared between the workers.
//! [`PipelineProgress`] is the indicatif spinner that ticks per message, and
//! [`StatsSnapshot::summary_table`] is the comfy-table report logged at shutdown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use indicatif::{ProgressBar, ProgressStyle};

/// 🔢 1234567 → "1,234,567". Because humans read numbers in chunks of three.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// 📊 Shared counters. `Relaxed` everywhere: nobody synchronises on these, they're for humans.
#[derive(Debug, Default)]
pub(crate) struct PipelineStats {
    messages_received: AtomicU64,
    messages_processed: AtomicU64,
    messages_dropped: AtomicU64,
    zero_row_incidents: AtomicU64,
    rows_written: AtomicU64,
    notifications_sent: AtomicU64,
}

impl PipelineStats {
    pub(crate) fn record_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_processed(&self, rows: usize) {
        self.messages_processed.fetch_add(1, Ordering::Relaxed);
        self.rows_written.fetch_add(rows as u64, Ordering::Relaxed);
        if rows == 0 {
            self.zero_row_incidents.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_notifications(&self, sent: usize) {
        self.notifications_sent.fetch_add(sent as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_processed: self.messages_processed.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            zero_row_incidents: self.zero_row_incidents.load(Ordering::Relaxed),
            rows_written: self.rows_written.load(Ordering::Relaxed),
            notifications_sent: self.notifications_sent.load(Ordering::Relaxed),
        }
    }
}

/// 📸 A frozen copy of the counters. What `railx::run` hands back when it's done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub messages_received: u64,
    pub messages_processed: u64,
    pub messages_dropped: u64,
    pub zero_row_incidents: u64,
    pub rows_written: u64,
    pub notifications_sent: u64,
}

impl StatsSnapshot {
    /// 📋 The end-of-run report card.
    pub fn summary_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["📊 metric", "count"]);
        for (label, value) in [
            ("📨 messages received", self.messages_received),
            ("✅ messages processed", self.messages_processed),
            ("💀 messages dropped", self.messages_dropped),
            ("🫥 zero-row incidents", self.zero_row_incidents),
            ("🧱 rows written", self.rows_written),
            ("📣 notifications sent", self.notifications_sent),
        ] {
            table.add_row(vec![
                Cell::new(label),
                Cell::new(format_number(value)).set_alignment(CellAlignment::Right),
            ]);
        }
        table
    }
}

/// 🌀 The spinner. Ticks once per message and shows the running totals.
pub(crate) struct PipelineProgress {
    spinner: ProgressBar,
    started: Instant,
}

impl std::fmt::Debug for PipelineProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineProgress")
            .field("started", &self.started)
            .finish()
    }
}

impl PipelineProgress {
    pub(crate) fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        // -- 🎨 hardcoded template; if indicatif ever rejects it we fall back to the plain spinner
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        Self {
            spinner,
            started: Instant::now(),
        }
    }

    pub(crate) fn tick(&self, stats: &StatsSnapshot) {
        self.spinner.set_message(format!(
            "📨 {} received | ✅ {} processed | 💀 {} dropped | 🧱 {} rows",
            format_number(stats.messages_received),
            format_number(stats.messages_processed),
            format_number(stats.messages_dropped),
            format_number(stats.rows_written),
        ));
        self.spinner.tick();
    }

    pub(crate) fn finish(&self) -> String {
        let elapsed = format_duration(self.started.elapsed());
        self.spinner
            .finish_with_message(format!("🏁 pipeline drained after {elapsed}"));
        elapsed
    }
}
