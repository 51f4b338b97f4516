pub mod chunker;
pub mod document;
pub mod embedding;

pub use chunker::{ChunkConfig, Chunker};
pub use document::{read_document, write_document, ExtractionError, WriteError};
pub use embedding::{create_embedder, Embedder, EmbeddingClient, EmbeddingError};
