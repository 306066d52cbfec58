//! End-to-end client/server scenarios (spec.md §8 scenarios 1-2).

use std::sync::Arc;

use async_trait::async_trait;
use strand_client::Client;
use strand_proto::{InferenceRequest, InferenceResponse, RequestId};
use strand_sad::SadBuilder;
use strand_server::{Handler, HandlerError, Server, StreamHandler, TokenSender};
use strand_transport::Transport;
use tokio_util::sync::CancellationToken;

fn sample_sad() -> strand_sad::Sad {
    SadBuilder::new().version(1).model_type("gpt-oracle").build().unwrap()
}

struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
    async fn handle_inference(
        &self,
        _ctx: &CancellationToken,
        req: InferenceRequest,
    ) -> Result<InferenceResponse, HandlerError> {
        Ok(InferenceResponse {
            request_id: req.request_id,
            text: req.prompt,
            finish_reason: "stop".to_owned(),
            prompt_tokens: 5,
            completion_tokens: 5,
        })
    }
}

struct RejectHandler;

#[async_trait]
impl Handler for RejectHandler {
    async fn handle_inference(
        &self,
        _ctx: &CancellationToken,
        _req: InferenceRequest,
    ) -> Result<InferenceResponse, HandlerError> {
        Err(HandlerError::new("sync inference not supported by this server"))
    }
}

struct WhitespaceSplitHandler;

#[async_trait]
impl StreamHandler for WhitespaceSplitHandler {
    async fn handle_token_stream(
        &self,
        ctx: &CancellationToken,
        req: InferenceRequest,
        sender: TokenSender,
    ) -> Result<(), HandlerError> {
        let mut first = true;
        for word in req.prompt.split_inclusive(' ') {
            let token = if first { word.trim_end().to_owned() } else { format!(" {}", word.trim()) };
            first = false;
            sender
                .send_chunk(ctx, token, 0.0)
                .await
                .map_err(|err| HandlerError::new(err.to_string()))?;
        }
        Ok(())
    }
}

async fn spawn_server(handler: Arc<dyn Handler>) -> (std::net::SocketAddr, CancellationToken) {
    let transport = Arc::new(Transport::bind("127.0.0.1:0".parse().unwrap()).await.unwrap());
    let addr = transport.local_addr().unwrap();
    let server = Server::new(transport, handler);
    let ctx = CancellationToken::new();
    let run_ctx = ctx.clone();
    tokio::spawn(async move { server.run(run_ctx).await });
    (addr, ctx)
}

async fn spawn_streaming_server() -> (std::net::SocketAddr, CancellationToken) {
    let transport = Arc::new(Transport::bind("127.0.0.1:0".parse().unwrap()).await.unwrap());
    let addr = transport.local_addr().unwrap();
    let server = Server::new(transport, Arc::new(RejectHandler))
        .with_stream_handler(Arc::new(WhitespaceSplitHandler));
    let ctx = CancellationToken::new();
    let run_ctx = ctx.clone();
    tokio::spawn(async move { server.run(run_ctx).await });
    (addr, ctx)
}

#[tokio::test]
async fn scenario_1_echo_inference() {
    let (addr, server_ctx) = spawn_server(Arc::new(EchoHandler)).await;
    let client = Client::dial(addr).await.unwrap();
    let client_ctx = CancellationToken::new();

    let request = InferenceRequest {
        request_id: RequestId::new([0x01; 16]),
        prompt: "hello".to_owned(),
        max_tokens: 100,
        sad: sample_sad(),
    };

    let response = client.infer(&client_ctx, request).await.unwrap();

    assert_eq!(response.request_id, RequestId::new([0x01; 16]));
    assert_eq!(response.text, "hello");
    assert_eq!(response.finish_reason, "stop");
    assert_eq!(response.prompt_tokens, 5);
    assert_eq!(response.completion_tokens, 5);

    client.close();
    server_ctx.cancel();
}

#[tokio::test]
async fn scenario_2_token_stream() {
    let (addr, server_ctx) = spawn_streaming_server().await;
    let client = Client::dial(addr).await.unwrap();
    let client_ctx = CancellationToken::new();

    let request = InferenceRequest {
        request_id: RequestId::new([0x02; 16]),
        prompt: "the quick brown fox".to_owned(),
        max_tokens: 100,
        sad: sample_sad(),
    };

    let mut stream = client.stream_tokens(&client_ctx, request).await.unwrap();

    let mut chunks = Vec::new();
    while let Some(result) = stream.next(&client_ctx).await {
        chunks.push(result.unwrap());
    }

    let texts: Vec<&str> = chunks.iter().map(|c| c.token.as_str()).collect();
    assert_eq!(texts, vec!["the", " quick", " brown", " fox"]);
    assert_eq!(chunks.iter().map(|c| c.seq_num).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    assert!(stream.is_closed());

    client.close();
    server_ctx.cancel();
}
