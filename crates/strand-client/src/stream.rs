use std::collections::BTreeMap;

use strand_proto::{ErrorMessage, RequestId, TokenStreamChunk};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;

/// Bounded capacity of a [`TokenStream`]'s underlying channel (spec.md §5
/// backpressure: "recommended 64").
pub const STREAM_CHANNEL_CAPACITY: usize = 64;

/// Internal event forwarded from the client's reader task to a
/// [`TokenStream`]'s channel.
pub(crate) enum StreamEvent {
    Chunk(TokenStreamChunk),
    End,
    Error(ErrorMessage),
}

/// Reorders chunks that arrive out of sequence on the unordered overlay
/// substrate (spec.md §4.B, §6) so that [`TokenStream`] always surfaces
/// them in strictly increasing `seq_num` order (spec.md §5).
pub(crate) struct ReorderBuffer {
    expected_seq: u32,
    pending: BTreeMap<u32, TokenStreamChunk>,
}

impl ReorderBuffer {
    pub(crate) fn new() -> Self {
        Self { expected_seq: 0, pending: BTreeMap::new() }
    }

    /// Accept a newly arrived chunk, returning every chunk now ready for
    /// release in order (possibly more than one, if this chunk fills a
    /// gap). Stale duplicates (`seq_num < expected`) are dropped silently.
    pub(crate) fn accept(&mut self, chunk: TokenStreamChunk) -> Vec<TokenStreamChunk> {
        if chunk.seq_num < self.expected_seq {
            return Vec::new();
        }
        self.pending.insert(chunk.seq_num, chunk);
        let mut ready = Vec::new();
        while let Some(next) = self.pending.remove(&self.expected_seq) {
            self.expected_seq += 1;
            ready.push(next);
        }
        ready
    }
}

/// A lazy, ordered sequence of `TokenStreamChunk`s for one inference
/// request (spec.md §4.H `stream_tokens`).
///
/// Yields chunks in `seq_num` order until `TokenStreamEnd`, an `OpError`
/// frame for this request, or cancellation — whichever comes first — and
/// is closed exactly once: every call after the terminal event returns
/// `None` without touching the channel again.
pub struct TokenStream {
    request_id: RequestId,
    rx: mpsc::Receiver<StreamEvent>,
    closed: bool,
}

impl TokenStream {
    pub(crate) fn new(request_id: RequestId, rx: mpsc::Receiver<StreamEvent>) -> Self {
        Self { request_id, rx, closed: false }
    }

    /// The request this stream correlates to.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Await the next chunk, or `None` once the stream has closed
    /// (successfully or otherwise).
    pub async fn next(&mut self, ctx: &CancellationToken) -> Option<Result<TokenStreamChunk, ClientError>> {
        if self.closed {
            return None;
        }
        tokio::select! {
            biased;
            () = ctx.cancelled() => {
                self.closed = true;
                None
            }
            event = self.rx.recv() => match event {
                None => {
                    self.closed = true;
                    None
                }
                Some(StreamEvent::Chunk(chunk)) => Some(Ok(chunk)),
                Some(StreamEvent::End) => {
                    self.closed = true;
                    None
                }
                Some(StreamEvent::Error(err)) => {
                    self.closed = true;
                    Some(Err(ClientError::Server { code: err.code, message: err.message }))
                }
            },
        }
    }

    /// Whether this stream has already reached a terminal state.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(seq_num: u32) -> TokenStreamChunk {
        TokenStreamChunk { request_id: RequestId::nil(), seq_num, token: seq_num.to_string(), logprob: 0.0 }
    }

    #[test]
    fn in_order_chunks_release_immediately() {
        let mut buf = ReorderBuffer::new();
        assert_eq!(buf.accept(chunk(0)).len(), 1);
        assert_eq!(buf.accept(chunk(1)).len(), 1);
    }

    #[test]
    fn out_of_order_chunk_buffers_until_gap_fills() {
        let mut buf = ReorderBuffer::new();
        assert!(buf.accept(chunk(1)).is_empty());
        let ready = buf.accept(chunk(0));
        assert_eq!(ready.iter().map(|c| c.seq_num).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn stale_duplicate_is_dropped() {
        let mut buf = ReorderBuffer::new();
        buf.accept(chunk(0));
        assert!(buf.accept(chunk(0)).is_empty());
    }

    #[test]
    fn fills_multi_chunk_gap_in_one_shot() {
        let mut buf = ReorderBuffer::new();
        assert!(buf.accept(chunk(2)).is_empty());
        assert!(buf.accept(chunk(1)).is_empty());
        let ready = buf.accept(chunk(0));
        assert_eq!(ready.iter().map(|c| c.seq_num).collect::<Vec<_>>(), vec![0, 1, 2]);
    }
}
