//! Database access layer
//!
//! SQLite persistence for the corpus read model, user economy, law
//! selections and per-article progress.

pub mod content;
pub mod corpus;
pub mod init;
pub mod progress;
pub mod selection;
pub mod users;

pub use init::init_database;
pub use users::User;
