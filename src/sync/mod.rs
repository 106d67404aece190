pub mod builder;
pub mod correlator;
pub mod engine;
pub mod reconciler;

pub use builder::{
    AnchorSlot,
    BatchOperation,
    OperationKind,
};
pub use correlator::{
    CallId,
    Correlator,
};
pub use engine::SyncEngine;
