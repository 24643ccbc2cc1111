//! File version entities.

pub mod location;
pub mod metadata;
pub mod model;

pub use location::LocationDescriptor;
pub use metadata::VersionMetadata;
pub use model::Version;
