use strand_codec::{Reader, Writer};
use strand_sad::Sad;

use crate::{ProtocolError, bounds::LONG_STRING_MAX, request_id::RequestId};

/// `InferenceRequest` (opcode `0x01`). The client's synchronous or
/// streamed-inference ask, carrying the [`Sad`] query the server's
/// resolver should route against.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    /// Correlation id for the matching response or stream.
    pub request_id: RequestId,
    /// Prompt text.
    pub prompt: String,
    /// Requested maximum number of completion tokens.
    pub max_tokens: u32,
    /// Routing query: capabilities/context/latency this request needs.
    pub sad: Sad,
}

impl InferenceRequest {
    pub(crate) fn encode(&self, w: &mut Writer) {
        self.request_id.encode(w);
        w.write_string(&self.prompt);
        w.write_u32(self.max_tokens);
        self.sad.encode(w);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        let request_id = RequestId::decode(r)?;
        let prompt = r.read_string(LONG_STRING_MAX)?;
        let max_tokens = r.read_u32()?;
        let sad = Sad::decode(r)?;
        Ok(Self { request_id, prompt, max_tokens, sad })
    }
}

/// `InferenceResponse` (opcode `0x02`). The server's single, non-streaming
/// reply to an `InferenceRequest`.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceResponse {
    /// Correlation id matching the originating request.
    pub request_id: RequestId,
    /// Completion text.
    pub text: String,
    /// Why generation stopped (e.g. `"stop"`, `"length"`).
    pub finish_reason: String,
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u32,
    /// Tokens produced in the completion.
    pub completion_tokens: u32,
}

impl InferenceResponse {
    pub(crate) fn encode(&self, w: &mut Writer) {
        self.request_id.encode(w);
        w.write_string(&self.text);
        w.write_string(&self.finish_reason);
        w.write_u32(self.prompt_tokens);
        w.write_u32(self.completion_tokens);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        let request_id = RequestId::decode(r)?;
        let text = r.read_string(LONG_STRING_MAX)?;
        let finish_reason = r.read_string(crate::bounds::SHORT_STRING_MAX)?;
        let prompt_tokens = r.read_u32()?;
        let completion_tokens = r.read_u32()?;
        Ok(Self { request_id, text, finish_reason, prompt_tokens, completion_tokens })
    }
}
