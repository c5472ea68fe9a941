//! Persistence of answers and session bookkeeping.
//!
//! Everything is stored as JSON-encoded strings behind string keys, the same
//! layout a browser's local storage would hold. [`KeyValueStore`] is the
//! capability; [`MemoryStore`] and [`FileStore`] implement it. On top of it
//! [`FeedbackStore`] scopes every value by the experiment [`Lambda`].
//!
//! Unreadable or corrupted data never aborts a session: it is logged and
//! treated as absent. Only failed writes are reported as [`StoreError`].

pub use self::{feedback::*, file::*, kv::*, lambda::*};

mod feedback;
mod file;
pub mod keys;
mod kv;
mod lambda;
