pub mod manifest;
pub mod page;
pub mod utils;

pub use manifest::ManifestResolver;
pub use page::{PageResolver, PageScan};
