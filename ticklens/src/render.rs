//! Terminal and JSON presentation of a [`DashboardReport`].
//!
//! Text output draws charts with block characters: the price overlay as two
//! sparklines on a shared scale, the monthly volume split as percentage bars.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use ticklens_core::{Currency, IsoCurrency, LensError, Money};

use crate::report::{
    DashboardReport, Financials, HistoryTail, LatestPrice, NoticeLevel, Overlay, PLACEHOLDER,
    Section, VolumePie,
};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const CHART_WIDTH: usize = 60;
const BAR_WIDTH: usize = 40;

/// Serialize the report as pretty-printed JSON.
///
/// # Errors
/// Returns `LensError::Data` if serialization fails.
pub fn render_json(report: &DashboardReport) -> Result<String, LensError> {
    serde_json::to_string_pretty(report).map_err(|e| LensError::Data(format!("report json: {e}")))
}

/// Render the report as plain text, one block per section in page order.
#[must_use]
pub fn render_text(report: &DashboardReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} | {} | MA window {} | source {}",
        report.symbol, report.range, report.window, report.source
    );

    let intraday = report.range.interval().is_intraday();

    heading(&mut out, Section::PriceHistory.title());
    notices(&mut out, report, Section::PriceHistory);
    if let Some(history) = &report.price_history {
        tail_table(&mut out, &history.table, intraday);
        out.push('\n');
        overlay_chart(&mut out, &history.overlay);
    }

    heading(&mut out, Section::CompanyInfo.title());
    notices(&mut out, report, Section::CompanyInfo);
    for (label, value) in report.company.display_fields() {
        let _ = writeln!(out, "{:<14}{value}", format!("{label}:"));
    }

    match &report.long_run {
        Some(long_run) => heading(
            &mut out,
            &format!(
                "{} (since {})",
                Section::LongRunHistory.title(),
                long_run.since.format("%Y")
            ),
        ),
        None => heading(&mut out, Section::LongRunHistory.title()),
    }
    notices(&mut out, report, Section::LongRunHistory);
    if let Some(long_run) = &report.long_run {
        tail_table(&mut out, &long_run.table, false);
    }

    heading(&mut out, Section::LatestPrice.title());
    notices(&mut out, report, Section::LatestPrice);
    if let Some(latest) = &report.latest_price {
        latest_price(&mut out, latest);
    }

    heading(&mut out, Section::Financials.title());
    notices(&mut out, report, Section::Financials);
    if let Some(financials) = &report.financials {
        financial_tables(&mut out, financials);
    }

    match &report.monthly_volume {
        Some(pie) => heading(&mut out, &format!("{} ({})", pie.title, pie.lookback)),
        None => heading(&mut out, Section::MonthlyVolume.title()),
    }
    notices(&mut out, report, Section::MonthlyVolume);
    if let Some(pie) = &report.monthly_volume {
        volume_bars(&mut out, pie);
    }
    out
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n== {title} ==");
}

fn notices(out: &mut String, report: &DashboardReport, section: Section) {
    for n in report.notices_for(section) {
        let marker = match n.level {
            NoticeLevel::Success => "✅",
            NoticeLevel::Warning => "⚠️",
            NoticeLevel::Error => "🚨",
        };
        let _ = writeln!(out, "{marker} {}", n.message);
    }
}

fn cell<T: ToString>(v: Option<T>) -> String {
    v.map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string())
}

fn timestamp(ts: DateTime<Utc>, intraday: bool) -> String {
    if intraday {
        ts.format("%Y-%m-%d %H:%M").to_string()
    } else {
        ts.format("%Y-%m-%d").to_string()
    }
}

fn tail_table(out: &mut String, table: &HistoryTail, intraday: bool) {
    let currency = table
        .currency
        .as_ref()
        .map_or_else(String::new, |c| format!(", {c}"));
    let _ = writeln!(
        out,
        "{} rows, timestamps UTC, exchange zone {}{currency}",
        table.total_rows, table.zone
    );
    let _ = writeln!(
        out,
        "{:<17} {:>12} {:>12} {:>12} {:>12} {:>16}",
        "Date", "Open", "High", "Low", "Close", "Volume"
    );
    for row in &table.tail {
        let _ = writeln!(
            out,
            "{:<17} {:>12} {:>12} {:>12} {:>12} {:>16}",
            timestamp(row.ts, intraday),
            cell(row.open.map(|d| d.round_dp(2))),
            cell(row.high.map(|d| d.round_dp(2))),
            cell(row.low.map(|d| d.round_dp(2))),
            cell(row.close.map(|d| d.round_dp(2))),
            row.volume.map_or_else(|| PLACEHOLDER.to_string(), |v| grouped(u128::from(v))),
        );
    }
}

/// Map values onto spark levels between `lo` and `hi`; gaps render as spaces.
fn sparkline(values: &[Option<f64>], lo: f64, hi: f64) -> String {
    let span = hi - lo;
    values
        .iter()
        .map(|v| match v {
            None => ' ',
            Some(_) if span <= f64::EPSILON => SPARK_LEVELS[SPARK_LEVELS.len() / 2],
            Some(v) => {
                let top = (SPARK_LEVELS.len() - 1) as f64;
                let idx = (((v - lo) / span) * top).round().clamp(0.0, top);
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let idx = idx as usize;
                SPARK_LEVELS[idx]
            }
        })
        .collect()
}

/// Evenly spaced indices picking at most `width` of `len` points, always
/// keeping the most recent one.
fn sample_indices(len: usize, width: usize) -> Vec<usize> {
    if len <= width || width == 0 {
        return (0..len).collect();
    }
    (0..width).map(|i| (i * (len - 1)) / (width - 1)).collect()
}

fn overlay_chart(out: &mut String, overlay: &Overlay) {
    let picks = sample_indices(overlay.points.len(), CHART_WIDTH);
    let as_f64 = |d: Option<Decimal>| d.and_then(|d| d.to_f64());
    let closes: Vec<Option<f64>> = picks.iter().map(|&i| as_f64(overlay.points[i].close)).collect();
    let averages: Vec<Option<f64>> = picks
        .iter()
        .map(|&i| as_f64(overlay.points[i].average))
        .collect();

    let (lo, hi) = closes
        .iter()
        .chain(&averages)
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    if lo > hi {
        return;
    }
    let _ = writeln!(out, "{:<8}{}", "Close", sparkline(&closes, lo, hi));
    let _ = writeln!(
        out,
        "{:<8}{}",
        format!("MA({})", overlay.window),
        sparkline(&averages, lo, hi)
    );
    let _ = writeln!(out, "{:<8}{lo:.2} .. {hi:.2}", "Scale");
}

fn price_label(close: Decimal, currency: Option<&Currency>) -> String {
    match currency {
        None | Some(Currency::Iso(IsoCurrency::USD)) => format!("${:.2}", close.round_dp(2)),
        Some(c) => Money::new(close.round_dp(2), c.clone())
            .map_or_else(|_| format!("{:.2}", close.round_dp(2)), |m| m.format()),
    }
}

fn latest_price(out: &mut String, latest: &LatestPrice) {
    let _ = writeln!(out, "{}", latest.title);
    let _ = writeln!(
        out,
        "{}  (as of {})",
        price_label(latest.close, latest.currency.as_ref()),
        latest.ts.format("%Y-%m-%d")
    );
}

fn money_cell(m: Option<&Money>) -> String {
    m.map_or_else(|| PLACEHOLDER.to_string(), Money::format)
}

fn financial_tables(out: &mut String, financials: &Financials) {
    let _ = writeln!(out, "Balance Sheet");
    let _ = writeln!(
        out,
        "{:<12} {:>22} {:>22} {:>22} {:>22} {:>22}",
        "Period", "Total Assets", "Total Liabilities", "Total Equity", "Cash", "Long-Term Debt"
    );
    for row in &financials.balance_sheet {
        let _ = writeln!(
            out,
            "{:<12} {:>22} {:>22} {:>22} {:>22} {:>22}",
            row.period.to_string(),
            money_cell(row.total_assets.as_ref()),
            money_cell(row.total_liabilities.as_ref()),
            money_cell(row.total_equity.as_ref()),
            money_cell(row.cash.as_ref()),
            money_cell(row.long_term_debt.as_ref()),
        );
    }

    let _ = writeln!(out, "\nIncome Statement");
    let _ = writeln!(
        out,
        "{:<12} {:>22} {:>22} {:>22} {:>22}",
        "Period", "Total Revenue", "Gross Profit", "Operating Income", "Net Income"
    );
    for row in &financials.income_statement {
        let _ = writeln!(
            out,
            "{:<12} {:>22} {:>22} {:>22} {:>22}",
            row.period.to_string(),
            money_cell(row.total_revenue.as_ref()),
            money_cell(row.gross_profit.as_ref()),
            money_cell(row.operating_income.as_ref()),
            money_cell(row.net_income.as_ref()),
        );
    }
}

fn bar(share: f64) -> String {
    let filled = ((share / 100.0) * BAR_WIDTH as f64).round().clamp(0.0, BAR_WIDTH as f64);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = filled as usize;
    format!("{}{}", "█".repeat(filled), "·".repeat(BAR_WIDTH - filled))
}

fn volume_bars(out: &mut String, pie: &VolumePie) {
    for slice in &pie.slices {
        let _ = writeln!(
            out,
            "{:<9} {} {:>5.1}% {:>16}",
            slice.label,
            bar(slice.share),
            slice.share,
            grouped(slice.total)
        );
    }
    let _ = writeln!(out, "{:<9} {:>width$}", "Total", grouped(pie.total), width = BAR_WIDTH + 24);
}

/// Thousands-separated integer, e.g. `1,234,567`.
fn grouped(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
