pub mod errors;
pub mod models;

pub use errors::BridgeError;
pub use models::{
    Anchor,
    NoteDraft,
    SyncAction,
    SyncReport,
};
