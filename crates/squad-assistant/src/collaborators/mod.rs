//! Remote collaborators behind trait seams so the pipeline can be
//! exercised against in-process fakes in tests.

pub mod embedding;
pub mod generation;
pub mod moderation;
pub mod vector_index;

pub use embedding::{EmbeddingService, OpenAiEmbeddings};
pub use generation::{GenerationRequest, GenerationService, OpenAiGeneration, SnippetMeta};
pub use moderation::{ModerationService, ModerationVerdict, OpenAiModeration};
pub use vector_index::{RawMatch, UpstashVectorIndex, VectorIndex};
