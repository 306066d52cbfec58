//! Weighted multi-constraint resolver (spec.md §4.F).
//!
//! [`score`] computes a single entry's composite score against a [`Query`],
//! or `None` if a hard constraint rejects it outright. [`resolve`] scores an
//! entire snapshot, drops hard-rejected entries, and returns the top-`k`
//! sorted descending by score with the tie-break chain from spec.md §4.F:
//! lower `load_factor`, then lower `latency_us`, then lexicographic
//! `node_id`.

use std::cmp::Ordering;

use crate::{entry::RouteEntry, query::Query};

/// Weights applied to each sub-score when computing a [`RouteEntry`]'s
/// composite resolver score. Defaults sum to `1.0` (spec.md §4.F).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverWeights {
    /// Weight on the capability sub-score.
    pub w_cap: f64,
    /// Weight on the latency sub-score.
    pub w_lat: f64,
    /// Weight on the cost sub-score.
    pub w_cost: f64,
    /// Weight on the context-window sub-score.
    pub w_ctx: f64,
    /// Weight on the trust sub-score.
    pub w_trust: f64,
}

impl Default for ResolverWeights {
    fn default() -> Self {
        Self { w_cap: 0.30, w_lat: 0.25, w_cost: 0.20, w_ctx: 0.15, w_trust: 0.10 }
    }
}

/// Compute `entry`'s composite score against `query`, or `None` if `entry`
/// fails a hard constraint (insufficient context window, or an excluded
/// region).
///
/// Sub-scores are each in `[0, 1]`; see spec.md §4.F for the exact formula
/// of each dimension.
#[must_use]
pub fn score(weights: &ResolverWeights, query: &Query, entry: &RouteEntry) -> Option<f64> {
    if entry.sad.context_window < query.context_window {
        return None;
    }
    if query.exclude_regions.contains(&entry.region_code) {
        return None;
    }
    if let Some(arch) = &query.model_arch {
        if &entry.sad.model_type != arch {
            return None;
        }
    }
    if let Some(publisher) = &query.publisher_id {
        if entry.publisher_id.as_ref() != Some(publisher) {
            return None;
        }
    }
    if let Some(min_benchmark) = query.min_benchmark {
        match entry.benchmark_score {
            Some(benchmark) if benchmark >= min_benchmark => {}
            _ => return None,
        }
    }

    let cap_score = if query.capabilities.is_empty() {
        1.0
    } else {
        let matched = entry.sad.capabilities.intersection(query.capabilities).popcount();
        f64::from(matched) / f64::from(query.capabilities.popcount())
    };

    let ctx_score = if query.context_window == 0 {
        1.0
    } else {
        (f64::from(entry.sad.context_window) / f64::from(query.context_window)).min(2.0) / 2.0
    };

    let lat_score = if query.latency_sla_ms == 0 {
        1.0
    } else {
        let r = f64::from(entry.sad.latency_sla_ms) / f64::from(query.latency_sla_ms);
        if r <= 1.0 { 1.0 } else { (1.0 - 0.5 * (r - 1.0)).max(0.0) }
    };

    let cost_score = match query.max_cost_milli {
        None => 1.0,
        Some(max_cost) if entry.cost_milli <= max_cost => 1.0,
        Some(0) => 0.0,
        Some(max_cost) => (1.0 - (f64::from(entry.cost_milli) / f64::from(max_cost) - 1.0)).max(0.0),
    };

    let trust_score = if entry.trust_level >= query.min_trust { 1.0 } else { 0.0 };

    Some(
        weights.w_cap * cap_score
            + weights.w_lat * lat_score
            + weights.w_cost * cost_score
            + weights.w_ctx * ctx_score
            + weights.w_trust * trust_score,
    )
}

/// Score every entry in `entries` against `query`, drop hard-rejected
/// entries, and return the top `k` sorted descending by score with the
/// spec.md §4.F tie-break chain (lower `load_factor`, then lower
/// `latency_us`, then lexicographic `node_id`).
#[must_use]
pub fn resolve(
    weights: &ResolverWeights,
    entries: &[RouteEntry],
    query: &Query,
    k: usize,
) -> Vec<(RouteEntry, f64)> {
    let mut scored: Vec<(RouteEntry, f64)> = entries
        .iter()
        .filter_map(|entry| score(weights, query, entry).map(|s| (entry.clone(), s)))
        .collect();

    scored.sort_by(|(a, a_score), (b, b_score)| {
        b_score
            .partial_cmp(a_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.load_factor.partial_cmp(&b.load_factor).unwrap_or(Ordering::Equal))
            .then_with(|| a.latency_us.cmp(&b.latency_us))
            .then_with(|| a.node_id.cmp(&b.node_id))
    });
    scored.truncate(k);
    scored
}
