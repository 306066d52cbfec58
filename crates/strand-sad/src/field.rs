/// Extensible field catalogue used to express routing constraints beyond the
/// four scalar fields carried directly on [`crate::Sad`] (`capabilities`,
/// `context_window`, `latency_sla_ms`, and the implicit trust/cost/region
/// constraints a resolver query may also carry).
///
/// This catalogue is open-ended by design (spec.md §3: "Extensible field
/// catalogue"); `Custom` carries an arbitrary key so operators can express
/// constraints this build doesn't have a dedicated variant for yet. Every
/// other variant is applied onto a resolver `Query` by
/// `strand_routing::QueryBuilder::field` (and `From<Vec<SadField>> for
/// Query`, for a whole list at once) — see that crate for how each variant
/// maps onto a concrete hard or soft constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SadField {
    /// Specific model architecture identifier (e.g. a model family name).
    ModelArch(String),
    /// A single named capability, for constraint systems that prefer to
    /// reason about capabilities one at a time rather than via the bitmask.
    Capability(String),
    /// Minimum required context window, in tokens.
    ContextWindow(u32),
    /// Maximum tolerable latency SLA, in milliseconds.
    MaxLatencyMs(u32),
    /// Maximum tolerable cost, in milli-currency-units.
    MaxCostMilli(u32),
    /// Minimum required trust level (0-4).
    TrustLevel(u8),
    /// Preferred region code; entries outside this region are not hard
    /// rejected but may be deprioritized by a resolver.
    PreferRegion(u16),
    /// Excluded region code; entries in this region are hard rejected.
    ExcludeRegion(u16),
    /// Required publisher identifier.
    PublisherId(String),
    /// Minimum required benchmark score (scaled integer).
    MinBenchmark(u32),
    /// Operator-defined constraint not covered by the other variants.
    Custom(String, String),
}

impl SadField {
    /// Stable discriminant name, used for canonical ordering when a field
    /// list must be folded into a signed or hashed payload.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ModelArch(_) => "model_arch",
            Self::Capability(_) => "capability",
            Self::ContextWindow(_) => "context_window",
            Self::MaxLatencyMs(_) => "max_latency_ms",
            Self::MaxCostMilli(_) => "max_cost_milli",
            Self::TrustLevel(_) => "trust_level",
            Self::PreferRegion(_) => "prefer_region",
            Self::ExcludeRegion(_) => "exclude_region",
            Self::PublisherId(_) => "publisher_id",
            Self::MinBenchmark(_) => "min_benchmark",
            Self::Custom(_, _) => "custom",
        }
    }
}

/// Canonicalize a set of `Custom` fields (a `map<string,string>`) into a
/// deterministic order for signing, per spec.md §9 ("for signing,
/// concatenate entries in a documented canonical order, e.g. sorted by
/// key"). Wire encoding of the same map is unaffected — it preserves
/// insertion order.
#[must_use]
pub fn canonicalize_custom_fields(mut entries: Vec<(String, String)>) -> Vec<(String, String)> {
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_is_sorted_by_key() {
        let entries = vec![
            ("zeta".to_string(), "1".to_string()),
            ("alpha".to_string(), "2".to_string()),
            ("mid".to_string(), "3".to_string()),
        ];
        let canon = canonicalize_custom_fields(entries);
        assert_eq!(canon[0].0, "alpha");
        assert_eq!(canon[1].0, "mid");
        assert_eq!(canon[2].0, "zeta");
    }
}
