pub mod candidate;
pub mod category;
pub mod confidence;
pub mod memory;
pub mod revision;

pub use candidate::{ExtractionCandidate, MergeCandidate};
pub use category::Category;
pub use confidence::{Confidence, Importance};
pub use memory::{Memory, SourceType};
pub use revision::{MemoryRevision, RevisionAction};
