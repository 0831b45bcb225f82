//! Session Interface - The In-Process Surface of the Back Office
//!
//! The UI layer (forms, modals, printing, all external to this workspace)
//! talks to exactly one [`BusinessSession`] at a time. The session owns the
//! in-memory state of the active business, serializes mutations, awaits
//! persistence before reporting success, and rolls back on store failures.
//! No method here produces HTML; formatting is strictly the caller's
//! concern.

pub mod error;
pub mod session;

pub use error::SessionError;
pub use session::{BusinessSession, PostingOutcome};
