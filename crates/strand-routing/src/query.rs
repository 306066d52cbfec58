use strand_sad::{CapabilityMask, Sad, SadField};

/// A resolver query: the constraints an inference request places on the
/// node that should serve it (spec.md §4.F).
///
/// The four scalar constraints (`capabilities`, `context_window`,
/// `latency_sla_ms`) mirror the fields carried directly on a
/// [`strand_sad::Sad`]; [`Self::from_sad`] lifts one into a query with no
/// extra constraints. The remaining fields express every
/// [`strand_sad::SadField`] catalogue entry a caller may layer on top;
/// [`QueryBuilder::field`] applies one catalogue entry at a time and
/// `From<Vec<SadField>>` applies a whole list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    /// Required capability bits. `0` means "no capability constraint";
    /// every entry scores 1.0 on this dimension. Also reachable via
    /// `SadField::Capability`, which ORs a named bit into this mask.
    pub capabilities: CapabilityMask,
    /// Minimum required context window, in tokens. `0` means unconstrained
    /// (`SadField::ContextWindow`).
    pub context_window: u32,
    /// Maximum tolerable latency SLA, in milliseconds. `0` means
    /// unconstrained (`SadField::MaxLatencyMs`).
    pub latency_sla_ms: u32,
    /// Maximum tolerable cost, in milli-currency-units. `None` means
    /// unconstrained (`SadField::MaxCostMilli`).
    pub max_cost_milli: Option<u32>,
    /// Minimum required trust level, `0..=4` (`SadField::TrustLevel`).
    /// Defaults to `0`, which every entry satisfies.
    pub min_trust: u8,
    /// Region codes hard-excluded from consideration
    /// (`SadField::ExcludeRegion`).
    pub exclude_regions: Vec<u16>,
    /// Required model architecture / model type, matched exactly against
    /// [`strand_sad::Sad::model_type`] (`SadField::ModelArch`). `None`
    /// means unconstrained.
    pub model_arch: Option<String>,
    /// Required publisher identifier, matched against
    /// [`crate::RouteEntry::publisher_id`] (`SadField::PublisherId`).
    /// `None` means unconstrained.
    pub publisher_id: Option<String>,
    /// Minimum required benchmark score, matched against
    /// [`crate::RouteEntry::benchmark_score`] (`SadField::MinBenchmark`).
    /// `None` means unconstrained.
    pub min_benchmark: Option<u32>,
    /// Region codes a resolver may prefer when choosing among otherwise
    /// equally-scored entries (`SadField::PreferRegion`). Soft: unlike
    /// `exclude_regions`, no entry is rejected for falling outside this
    /// list. Not part of the spec.md §4.F composite score or tie-break
    /// chain — those are fixed, tested invariants (spec.md §8) — so this
    /// build carries the preference on `Query` for callers that want to
    /// post-filter or re-rank [`crate::RoutingTable::lookup`]'s results
    /// themselves via [`Self::prefers`].
    pub prefer_regions: Vec<u16>,
}

impl Query {
    /// Build a [`Query`] from a [`Sad`]'s four core scalar fields, with no
    /// additional constraints.
    #[must_use]
    pub fn from_sad(sad: &Sad) -> Self {
        Self {
            capabilities: sad.capabilities,
            context_window: sad.context_window,
            latency_sla_ms: sad.latency_sla_ms,
            ..Self::default()
        }
    }

    /// Whether `region_code` is among this query's preferred regions
    /// (`SadField::PreferRegion`). Soft signal only — see
    /// [`Self::prefer_regions`].
    #[must_use]
    pub fn prefers(&self, region_code: u16) -> bool {
        self.prefer_regions.contains(&region_code)
    }
}

/// Builder for [`Query`], mirroring [`strand_sad::SadBuilder`]'s fluent
/// construction style.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Start from an unconstrained query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a [`Sad`]'s core scalar fields.
    #[must_use]
    pub fn from_sad(sad: &Sad) -> Self {
        Self { query: Query::from_sad(sad) }
    }

    /// Require these capability bits.
    #[must_use]
    pub fn capabilities(mut self, capabilities: impl Into<CapabilityMask>) -> Self {
        self.query.capabilities = capabilities.into();
        self
    }

    /// Require at least this context window.
    #[must_use]
    pub fn context_window(mut self, context_window: u32) -> Self {
        self.query.context_window = context_window;
        self
    }

    /// Require at most this latency SLA.
    #[must_use]
    pub fn latency_sla_ms(mut self, latency_sla_ms: u32) -> Self {
        self.query.latency_sla_ms = latency_sla_ms;
        self
    }

    /// Require at most this cost.
    #[must_use]
    pub fn max_cost_milli(mut self, max_cost_milli: u32) -> Self {
        self.query.max_cost_milli = Some(max_cost_milli);
        self
    }

    /// Require at least this trust level.
    #[must_use]
    pub fn min_trust(mut self, min_trust: u8) -> Self {
        self.query.min_trust = min_trust;
        self
    }

    /// Hard-exclude a region code.
    #[must_use]
    pub fn exclude_region(mut self, region_code: u16) -> Self {
        self.query.exclude_regions.push(region_code);
        self
    }

    /// Require this exact model architecture / model type.
    #[must_use]
    pub fn model_arch(mut self, model_arch: impl Into<String>) -> Self {
        self.query.model_arch = Some(model_arch.into());
        self
    }

    /// Require this exact publisher identifier.
    #[must_use]
    pub fn publisher_id(mut self, publisher_id: impl Into<String>) -> Self {
        self.query.publisher_id = Some(publisher_id.into());
        self
    }

    /// Require at least this benchmark score.
    #[must_use]
    pub fn min_benchmark(mut self, min_benchmark: u32) -> Self {
        self.query.min_benchmark = Some(min_benchmark);
        self
    }

    /// Prefer this region code when re-ranking among otherwise
    /// equally-scored entries (soft; see [`Query::prefer_regions`]).
    #[must_use]
    pub fn prefer_region(mut self, region_code: u16) -> Self {
        self.query.prefer_regions.push(region_code);
        self
    }

    /// Layer one [`SadField`] catalogue entry onto this query (spec.md §3,
    /// §4.D). `Capability` resolves a named capability via
    /// [`CapabilityMask::from_name`] and ORs it into the capability mask;
    /// an unrecognized name is ignored rather than rejected, the same way
    /// an unrecognized `Custom` field is. `Custom` itself is operator-
    /// defined metadata with no resolver-side meaning and is ignored here.
    #[must_use]
    pub fn field(mut self, field: SadField) -> Self {
        match field {
            SadField::ModelArch(arch) => self.query.model_arch = Some(arch),
            SadField::Capability(name) => {
                if let Some(bit) = CapabilityMask::from_name(&name) {
                    self.query.capabilities = self.query.capabilities.union(bit);
                }
            }
            SadField::ContextWindow(v) => self.query.context_window = v,
            SadField::MaxLatencyMs(v) => self.query.latency_sla_ms = v,
            SadField::MaxCostMilli(v) => self.query.max_cost_milli = Some(v),
            SadField::TrustLevel(v) => self.query.min_trust = v,
            SadField::PreferRegion(v) => self.query.prefer_regions.push(v),
            SadField::ExcludeRegion(v) => self.query.exclude_regions.push(v),
            SadField::PublisherId(id) => self.query.publisher_id = Some(id),
            SadField::MinBenchmark(v) => self.query.min_benchmark = Some(v),
            SadField::Custom(_, _) => {}
        }
        self
    }

    /// Layer a list of [`SadField`] catalogue entries onto this query,
    /// applied in order.
    #[must_use]
    pub fn fields(mut self, fields: impl IntoIterator<Item = SadField>) -> Self {
        for field in fields {
            self = self.field(field);
        }
        self
    }

    /// Produce the finished [`Query`].
    #[must_use]
    pub fn build(self) -> Query {
        self.query
    }
}

impl From<Vec<SadField>> for Query {
    /// Build a [`Query`] from a list of [`SadField`] catalogue entries,
    /// applied in order via [`QueryBuilder::field`].
    fn from(fields: Vec<SadField>) -> Self {
        QueryBuilder::new().fields(fields).build()
    }
}

#[cfg(test)]
mod tests {
    use strand_sad::SadBuilder;

    use super::*;

    #[test]
    fn default_query_is_unconstrained() {
        let q = Query::default();
        assert_eq!(q.capabilities, CapabilityMask::empty());
        assert_eq!(q.context_window, 0);
        assert_eq!(q.min_trust, 0);
    }

    #[test]
    fn from_sad_lifts_core_fields() {
        let sad = SadBuilder::new()
            .version(1)
            .capabilities(CapabilityMask::from_bits(CapabilityMask::TEXT_GEN))
            .context_window(8192)
            .latency_sla_ms(200)
            .model_type("m")
            .build()
            .unwrap();
        let q = Query::from_sad(&sad);
        assert_eq!(q.capabilities.bits(), CapabilityMask::TEXT_GEN);
        assert_eq!(q.context_window, 8192);
        assert_eq!(q.latency_sla_ms, 200);
        assert_eq!(q.max_cost_milli, None);
    }

    #[test]
    fn builder_layers_extra_constraints() {
        let q = QueryBuilder::new().max_cost_milli(500).min_trust(2).exclude_region(7).build();
        assert_eq!(q.max_cost_milli, Some(500));
        assert_eq!(q.min_trust, 2);
        assert_eq!(q.exclude_regions, vec![7]);
    }

    #[test]
    fn field_applies_every_catalogue_variant() {
        let q = QueryBuilder::new()
            .fields(vec![
                SadField::ModelArch("gpt-oracle".to_owned()),
                SadField::Capability("tool_use".to_owned()),
                SadField::ContextWindow(8192),
                SadField::MaxLatencyMs(100),
                SadField::MaxCostMilli(50),
                SadField::TrustLevel(3),
                SadField::PreferRegion(1),
                SadField::ExcludeRegion(2),
                SadField::PublisherId("acme".to_owned()),
                SadField::MinBenchmark(900),
                SadField::Custom("key".to_owned(), "value".to_owned()),
            ])
            .build();

        assert_eq!(q.model_arch.as_deref(), Some("gpt-oracle"));
        assert_eq!(q.capabilities.bits(), CapabilityMask::TOOL_USE);
        assert_eq!(q.context_window, 8192);
        assert_eq!(q.latency_sla_ms, 100);
        assert_eq!(q.max_cost_milli, Some(50));
        assert_eq!(q.min_trust, 3);
        assert_eq!(q.prefer_regions, vec![1]);
        assert_eq!(q.exclude_regions, vec![2]);
        assert_eq!(q.publisher_id.as_deref(), Some("acme"));
        assert_eq!(q.min_benchmark, Some(900));
        assert!(q.prefers(1));
        assert!(!q.prefers(2));
    }

    #[test]
    fn field_ignores_unrecognized_capability_name() {
        let q = QueryBuilder::new().field(SadField::Capability("quantum_leap".to_owned())).build();
        assert_eq!(q.capabilities, CapabilityMask::empty());
    }

    #[test]
    fn from_vec_sad_field_builds_an_equivalent_query() {
        let fields = vec![SadField::MinBenchmark(500), SadField::TrustLevel(1)];
        let q: Query = fields.into();
        assert_eq!(q.min_benchmark, Some(500));
        assert_eq!(q.min_trust, 1);
    }
}
