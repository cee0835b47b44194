pub mod media_reference;
pub mod page_metadata;
pub mod quality;
pub mod resolved_streams;

pub use media_reference::MediaReference;
pub use page_metadata::PageMetadata;
pub use quality::Quality;
pub use resolved_streams::{ResolveMethod, ResolvedStreams};
