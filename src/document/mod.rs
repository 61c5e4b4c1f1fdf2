//! Config document identity and record model.

pub mod key;
pub mod model;

pub use key::{ConfigResource, ConfigResourceContext, DocumentKey};
pub use model::{COLLECTION_NAME, ConfigDocument};
