//! Composition layer between the settlement engine core and the surrounding
//! application. Storage, authentication, and rendering stay outside; this
//! crate only wires snapshots into the pure pipeline and shapes the output
//! for display.

#![warn(clippy::uninlined_format_args)]

pub mod engine;
pub mod error;
pub mod ports;
pub mod presenter;

pub use engine::{EngineReport, ExpenseDraft, SettlementEngine};
pub use error::{EngineError, FailureKind};
pub use ports::{MemberDirectory, SnapshotSource};
pub use presenter::{SettlementPresenter, SettlementView};
