//! Per-message size bounds (spec.md §4.C "Salient bounds").
//!
//! Enforced at decode time, before the bounded field's storage is
//! allocated — see each message's `decode` implementation.

/// Maximum size of `ContextShare.context_data`.
pub const CONTEXT_DATA_MAX: usize = 4 * 1024 * 1024;

/// Maximum size of a `TensorTransfer` payload.
pub const TENSOR_PAYLOAD_MAX: usize = 16 * 1024 * 1024;

/// Maximum number of entries in an agent capability list.
pub const AGENT_CAPABILITY_LIST_MAX: usize = 256;

/// Maximum size of `ToolInvoke.arguments` / `ToolResult.result_payload`.
pub const TOOL_ARGUMENTS_MAX: usize = 256 * 1024;

/// Generic cap applied to otherwise-unbounded short strings (tool names,
/// finish reasons, status strings). Not specified numerically by the
/// protocol; chosen to bound allocation without constraining legitimate
/// use.
pub const SHORT_STRING_MAX: usize = 4 * 1024;

/// Cap applied to long free-text fields (prompts, response text, delegated
/// task descriptions) that are smaller than the hard tensor/context caps
/// but still need a decode-time bound.
pub const LONG_STRING_MAX: usize = 1024 * 1024;

/// Cap applied to opaque context/task blob fields that aren't the
/// dedicated `ContextShare.context_data` field but still carry caller
/// payloads (e.g. `AgentDelegate.context`).
pub const BLOB_MAX: usize = 4 * 1024 * 1024;
