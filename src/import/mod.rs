//! The import pipeline: normalization, classification, account resolution,
//! payload construction, and orchestration.

pub mod builder;
pub mod classify;
pub mod normalize;
pub mod pipeline;
pub mod resolve;

pub use builder::{build_payload, TransactionPayload, TransactionSplit};
pub use classify::{classify, Classification};
pub use normalize::normalize_row;
pub use pipeline::Importer;
pub use resolve::AccountResolver;
