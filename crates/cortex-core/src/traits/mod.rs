mod embedding;
mod llm;
mod sessions;
mod storage;
mod vector;

pub use embedding::{EmbedResult, EmbeddingProvider};
pub use llm::{LlmProvider, LlmResponse};
pub use sessions::SessionsClient;
pub use storage::{MemoryFilter, RelationalStore};
pub use vector::{VectorPoint, VectorSearchFilter, VectorSearchHit, VectorStore};
