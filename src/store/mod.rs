//! Per-identity session storage
//!
//! Bundles are keyed by [`Identity`], expire after a period without writes,
//! and are bounded in number.

mod bundle;
mod clock;
mod identity;
mod sessions;

pub use bundle::{BundleUpdate, ProcessingState, SessionBundle};
pub use clock::{Clock, ManualClock, SystemClock};
pub use identity::Identity;
pub use sessions::{SessionStore, DEFAULT_CAPACITY, DEFAULT_TTL};
