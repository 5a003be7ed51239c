//! Snapshot report: tracked tokens ranked by peak gain since detection.

use crate::domain::{shorten_number, TokenRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct RankedToken {
    pub address: String,
    pub url: String,
    /// highest / initial
    pub multiple: f64,
    pub initial_market_cap: f64,
    pub highest_market_cap: f64,
    pub boost_changes: usize,
    pub top10_pct: Option<f64>,
}

/// Top `limit` records by peak multiple, best first. Records without a usable
/// initial value are left out.
pub fn rank_by_peak(records: &[TokenRecord], limit: usize) -> Vec<RankedToken> {
    let mut ranked: Vec<RankedToken> = records
        .iter()
        .filter_map(|r| {
            let multiple = r.peak_multiple().filter(|m| m.is_finite())?;
            Some(RankedToken {
                address: r.address.clone(),
                url: r.url.clone(),
                multiple,
                initial_market_cap: r.initial_market_cap,
                highest_market_cap: r.highest_market_cap.value,
                boost_changes: r.history.len(),
                top10_pct: r.holder_concentration.top10_pct(),
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.multiple
            .total_cmp(&a.multiple)
            .then_with(|| a.address.cmp(&b.address))
    });
    ranked.truncate(limit);
    ranked
}

/// Plain-text table for the terminal
pub fn format_report(ranked: &[RankedToken]) -> String {
    let mut out = format!(
        "{:>3}  {:<44}  {:>8}  {:>8}  {:>8}  {:>6}  {:>6}\n",
        "#", "address", "peak", "init mc", "high mc", "boosts", "top10"
    );
    for (i, t) in ranked.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}  {:<44}  {:>7.2}x  {:>8}  {:>8}  {:>6}  {:>6}\n",
            i + 1,
            t.address,
            t.multiple,
            shorten_number(t.initial_market_cap),
            shorten_number(t.highest_market_cap),
            t.boost_changes,
            t.top10_pct
                .map(|p| format!("{:.1}%", p))
                .unwrap_or_else(|| "n/a".to_string()),
        ));
    }
    out
}
