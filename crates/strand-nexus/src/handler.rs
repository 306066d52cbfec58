use std::sync::Arc;

use async_trait::async_trait;
use strand_proto::{InferenceRequest, InferenceResponse};
use strand_routing::{Query, ResolverWeights, RoutingTable};
use strand_server::{Handler, HandlerError};
use tokio_util::sync::CancellationToken;

/// The operator binary's primary [`Handler`]: resolves the request's
/// [`strand_sad::Sad`] against the routing table and reports which node
/// would serve it (spec.md §4.F, §4.G "a handler which may consult the
/// resolver over the routing table").
///
/// Actual model inference is out of scope (spec.md §1): this handler's
/// `text` field carries the resolved node id rather than a generated
/// completion, so the wiring between dispatch, resolver, and routing table
/// is exercised end to end without fabricating a model.
pub struct ResolvingHandler {
    table: Arc<RoutingTable>,
    weights: ResolverWeights,
}

impl ResolvingHandler {
    /// A handler resolving against `table` with the default resolver
    /// weights (spec.md §4.F).
    #[must_use]
    pub fn new(table: Arc<RoutingTable>) -> Self {
        Self { table, weights: ResolverWeights::default() }
    }
}

#[async_trait]
impl Handler for ResolvingHandler {
    async fn handle_inference(
        &self,
        _ctx: &CancellationToken,
        req: InferenceRequest,
    ) -> Result<InferenceResponse, HandlerError> {
        let query = Query::from_sad(&req.sad);
        let matches = self.table.lookup(&query, &self.weights, 1);
        let Some(entry) = matches.into_iter().next() else {
            return Err(HandlerError::new("no route satisfies the requested SAD"));
        };

        Ok(InferenceResponse {
            request_id: req.request_id,
            text: hex_node_id(&entry.node_id),
            finish_reason: "stop".to_owned(),
            prompt_tokens: word_count(&req.prompt),
            completion_tokens: 0,
        })
    }
}

fn hex_node_id(node_id: &[u8; 16]) -> String {
    node_id.iter().map(|byte| format!("{byte:02x}")).collect()
}

fn word_count(prompt: &str) -> u32 {
    u32::try_from(prompt.split_whitespace().count()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use strand_proto::RequestId;
    use strand_routing::RouteEntry;
    use strand_sad::SadBuilder;

    use super::*;

    fn sad() -> strand_sad::Sad {
        SadBuilder::new().version(1).model_type("gpt-oracle").build().unwrap()
    }

    #[tokio::test]
    async fn resolves_to_the_only_matching_node() {
        let table = Arc::new(RoutingTable::new());
        table
            .insert(RouteEntry {
                node_id: [7; 16],
                sad: sad(),
                latency_us: 100,
                load_factor: 0.1,
                cost_milli: 0,
                trust_level: 2,
                region_code: 0,
                publisher_id: None,
                benchmark_score: None,
                last_updated_ns: 0,
                ttl_ns: 0,
            })
            .unwrap();
        let handler = ResolvingHandler::new(table);

        let req = InferenceRequest {
            request_id: RequestId::nil(),
            prompt: "hello there".to_owned(),
            max_tokens: 10,
            sad: sad(),
        };
        let resp = handler.handle_inference(&CancellationToken::new(), req).await.unwrap();
        assert_eq!(resp.text, hex_node_id(&[7; 16]));
        assert_eq!(resp.prompt_tokens, 2);
    }

    #[tokio::test]
    async fn empty_table_fails_with_no_route() {
        let handler = ResolvingHandler::new(Arc::new(RoutingTable::new()));
        let req = InferenceRequest {
            request_id: RequestId::nil(),
            prompt: "hello".to_owned(),
            max_tokens: 10,
            sad: sad(),
        };
        let err = handler.handle_inference(&CancellationToken::new(), req).await.unwrap_err();
        assert_eq!(err.message, "no route satisfies the requested SAD");
    }
}
