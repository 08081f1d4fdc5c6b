// src/services/mod.rs

//! Services shared by the page controllers: the remote API, the user cache,
//! input validation and timers.

pub mod api;
pub mod cache;
pub mod debounce;
pub mod poll;
pub mod validation;

// Re-exports for convenience
pub use api::{ForumApi, HttpForumApi, ThreadFilter};
pub use cache::UserCache;
pub use debounce::Debouncer;
pub use poll::{PollHandle, PollStatus, spawn_poller};
pub use validation::{Field, Validator};
