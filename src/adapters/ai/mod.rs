//! Model transport adapters.
//!
//! - `OpenAiTransport` - OpenAI-compatible `/chat/completions` (also Ollama)
//! - `RetryingTransport` - per-attempt timeout and backoff on transient errors
//! - `MockTransport` - queued replies for tests and offline runs

mod mock_transport;
mod openai_transport;
mod retrying_transport;

pub use mock_transport::{MockReply, MockTransport};
pub use openai_transport::{OpenAiTransport, OpenAiTransportConfig};
pub use retrying_transport::{RetryPolicy, RetryingTransport};
