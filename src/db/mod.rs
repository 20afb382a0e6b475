//! Database layer (Firestore + in-memory).

pub mod firestore;
pub mod memory;
pub mod store;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;
pub use store::{DocumentStore, Subscription};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Per-user tracking records (subcollection of `users/{uid}`)
    pub const TRACKING: &str = "tracking";
    /// Public leaderboard entries (keyed by uid)
    pub const RANKING: &str = "public-ranking";
}
