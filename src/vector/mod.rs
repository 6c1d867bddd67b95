//! Vector primitives: L2 normalization, cosine similarity, and brute-force ranking.
//!
//! Every comparison checks dimensionality at the boundary. Callers that rank many
//! candidates treat a mismatch as "no signal" for that one candidate rather than
//! failing the whole request.

pub mod error;
pub mod math;
pub mod search;


pub use error::{VectorError, VectorResult};
pub use math::{clamped_similarity, cosine_similarity, l2_norm, normalize};
pub use search::{SimilarityHit, rank_by_similarity, similarity_map};
