//! Database layer (Firestore, with an in-memory backend for tests and local runs).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    /// Profile documents, keyed by email
    pub const USERS: &str = "users";
}
