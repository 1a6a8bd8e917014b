//! Photo filter session
//!
//! Holds the picked photo, the active filter with its three slider values and
//! the last rendered output, and re-renders explicitly after every change.
//!
//! # Collaborators
//! - `ImageSource`: async fetch of the bytes of a picked photo
//! - `FilterEngine`: renders a filter over the photo
//! - `ShareSink`: exports the rendered picture
//! - `ReviewPrompt`: asks for feedback once the filter has been changed often enough
//! - `UsageStore`: persists the filter change counter

pub mod collaborator;
pub mod kind;
pub mod params;
pub mod session;

pub use collaborator::{
    FilterEngine, ImageSource, LogReviewPrompt, MemoryUsageStore, ReviewPrompt, ShareHandle,
    SharePreview, ShareSink, UsageStore,
};
pub use kind::{FilterKind, Slot};
pub use params::{FilterInputs, FilterParameters};
pub use session::{FilterSession, LoadOutcome, LoadTicket, Placeholder};

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("Nothing rendered to share")]
    NothingToShare,
    #[error("No share target configured")]
    NoShareSink,
    #[error("Share failed: {0}")]
    Share(String),
    #[error("Storage error: {0}")]
    Storage(String),
}
