//! External model providers: text/image embeddings and vision analysis.
//!
//! Each concern is a trait so the workflow and the gateway can be built against real
//! HTTP clients in production and deterministic doubles elsewhere:
//!
//! - [`HttpEmbeddingProvider`], [`HttpVisionAnalyzer`] talk to an OpenAI-compatible API.
//! - [`OfflineEmbeddingProvider`], [`OfflineVisionAnalyzer`] need no network and back the
//!   server's mock-provider mode.
//! - `MockEmbeddingProvider`, `MockVisionAnalyzer` (behind `mock`) record calls and inject
//!   failures for tests.
//!
//! Timeouts and retries belong to the HTTP clients here, never to callers.

pub mod embedding;
pub mod error;
mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod offline;
pub mod vision;


pub use embedding::{EmbeddingKind, EmbeddingProvider, HttpEmbeddingProvider};
pub use error::{ProviderError, ProviderResult};
pub use http::ProviderEndpoint;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockEmbeddingProvider, MockVisionAnalyzer};
pub use offline::{OFFLINE_EMBEDDING_DIM, OfflineEmbeddingProvider, OfflineVisionAnalyzer};
pub use vision::{HttpVisionAnalyzer, VisionAnalyzer, parse_analysis};
