//! # Report Module
//!
//! Renders a [`TickReport`] for the terminal.
//!
//! ## Layout
//!
//! - **Header**: sample time, total pending with its breakdown, failed count
//! - **Rates**: pending delta, drained items and inst/ema/avg rates per hour,
//!   or a baseline note on the first sample
//! - **ETA**: total ETA from the smoothed rate, optionally the critical path
//! - **Queues**: table of the top queues by pending, a focused queue pinned
//!   first

use comfy_table::{
    presets,
    Attribute,
    Cell,
    CellAlignment,
    Color,
    ContentArrangement,
    Table,
};
use queue_eta_estimator::{
    Eta,
    EtaNumerator,
    QueueEstimate,
    QueueSnapshot,
    TickReport,
};
use std::{
    fmt::Write as _,
    time::Duration,
};

pub const DEFAULT_TOP: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Maximum number of queues listed.
    pub top: usize,
    /// Queue pinned to the top of the listing.
    pub focus: Option<String>,
    pub show_critical_path: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top: DEFAULT_TOP,
            focus: None,
            show_critical_path: false,
        }
    }
}

pub fn render(report: &TickReport, options: &ReportOptions) -> String {
    let mut output = String::new();
    let totals = &report.snapshot.totals;
    let global = &report.estimate.global;

    let _ = writeln!(
        output,
        "[{}] total pending={} (waiting={}, active={}, delayed={}, paused={}) failed={}",
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        format_count(totals.pending),
        format_count(totals.waiting),
        format_count(totals.active),
        format_count(totals.delayed),
        format_count(totals.paused),
        format_count(totals.failed),
    );

    match &global.rate {
        Some(rate) => {
            let _ = writeln!(
                output,
                "  Δ total={} pending  drained={} in {:.1}s  inst={}  ema={}  avg={}",
                format_delta(rate.drained.saturating_neg()),
                format_delta(rate.drained),
                rate.elapsed_secs,
                format_rate_per_hour(rate.inst_rate),
                format_rate_per_hour(rate.ema_rate),
                format_rate_per_hour(rate.avg_rate),
            );
            match global.eta {
                Eta::Available(_) => {
                    let label = match global.numerator {
                        EtaNumerator::Override(_) => "override remaining",
                        EtaNumerator::TotalPending => "total pending",
                    };
                    let _ = writeln!(output, "  ETA ({label}, using EMA): ~{}", format_eta(global.eta));
                }
                Eta::Unavailable => {
                    let _ = writeln!(output, "  ETA: n/a (rate <= 0)");
                }
            }
        }
        None => {
            let _ = writeln!(output, "  (collecting baseline sample for rate/ETA...)");
        }
    }

    if options.show_critical_path {
        if let Some(critical) = &report.estimate.critical_path {
            let _ = writeln!(
                output,
                "  ETA (critical path: {}, using EMA): ~{}  (pending={}, rate={})",
                critical.name,
                format_eta(Eta::Available(critical.eta_secs)),
                format_count(critical.pending),
                format_rate_per_hour(critical.ema_rate),
            );
        }
    }

    let queues = ordered_queues(report, options);
    if !queues.is_empty() {
        let _ = writeln!(output, "  Queues (top by pending):");
        let _ = writeln!(output, "{}", queue_table(&queues, options.focus.as_deref()));
    }

    output
}

/// Queues sorted by pending, descending, with the focused queue first and
/// the list cut to `top` entries. Equal pending keeps document order.
pub fn ordered_queues<'a>(
    report: &'a TickReport,
    options: &ReportOptions,
) -> Vec<(&'a QueueSnapshot, &'a QueueEstimate)> {
    let mut queues: Vec<_> = report.queues().collect();
    queues.sort_by(|(a, _), (b, _)| b.pending.cmp(&a.pending));
    if let Some(focus) = options.focus.as_deref() {
        queues.sort_by_key(|(snapshot, _)| snapshot.name != focus);
    }
    queues.truncate(options.top);
    queues
}

fn queue_table(queues: &[(&QueueSnapshot, &QueueEstimate)], focus: Option<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Queue").add_attribute(Attribute::Bold).fg(Color::Cyan),
            Cell::new("Pending").add_attribute(Attribute::Bold).fg(Color::Cyan),
            Cell::new("Drained").add_attribute(Attribute::Bold).fg(Color::Cyan),
            Cell::new("EMA rate").add_attribute(Attribute::Bold).fg(Color::Cyan),
            Cell::new("ETA").add_attribute(Attribute::Bold).fg(Color::Cyan),
        ]);

    for (snapshot, estimate) in queues {
        let mut name = Cell::new(&snapshot.name);
        if focus == Some(snapshot.name.as_str()) {
            name = name.add_attribute(Attribute::Bold);
        }
        let (drained, ema, eta) = match &estimate.rate {
            Some(rate) => (
                format_delta(rate.drained),
                format_rate_per_hour(rate.ema_rate),
                Cell::new(match estimate.eta {
                    Eta::Available(_) => format!("~{}", format_eta(estimate.eta)),
                    Eta::Unavailable => "n/a".to_string(),
                })
                .fg(eta_color(estimate)),
            ),
            None => ("-".to_string(), "-".to_string(), Cell::new("-")),
        };
        table.add_row(vec![
            name,
            Cell::new(format_count(snapshot.pending)).set_alignment(CellAlignment::Right),
            Cell::new(drained).set_alignment(CellAlignment::Right),
            Cell::new(ema).set_alignment(CellAlignment::Right),
            eta,
        ]);
    }

    table
}

fn eta_color(estimate: &QueueEstimate) -> Color {
    match estimate.eta {
        Eta::Available(_) => Color::Green,
        Eta::Unavailable if estimate.pending > 0 => Color::Yellow,
        Eta::Unavailable => Color::Reset,
    }
}

/// Thousands separators, e.g. `-1,234,567`.
pub fn format_count(count: i64) -> String {
    let digits = count.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if count < 0 {
        grouped.push('-');
    }
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Always signed, e.g. `+12` or `-3`.
pub fn format_delta(delta: i64) -> String {
    if delta >= 0 {
        format!("+{}", format_count(delta))
    } else {
        format_count(delta)
    }
}

pub fn format_rate_per_hour(rate_per_sec: f64) -> String {
    let per_hour = (rate_per_sec * 3600.0).round();
    // `as` saturates, which is fine for display
    format!("{}/hr", format_count(per_hour as i64))
}

/// Whole seconds in humantime notation, `n/a` when unavailable.
pub fn format_eta(eta: Eta) -> String {
    match eta.secs() {
        Some(secs) if secs > 0.0 => humantime::format_duration(Duration::from_secs(secs as u64)).to_string(),
        Some(_) => "0s".to_string(),
        None => "n/a".to_string(),
    }
}
