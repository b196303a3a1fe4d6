//! Concurrent user store persisted as a single JSON snapshot.
//!
//! Reads are served from an in-memory index; every create, update or delete
//! rewrites the whole snapshot before it returns, and is undone in memory if
//! that write fails. Email addresses are unique across live users.
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use user_store::{User, UserStore};
//!
//! let store = UserStore::open("data/users.json").unwrap();
//! store.create(User::new("u1", "Ada", "ada@x.com", Utc::now())).unwrap();
//! assert_eq!(store.get("u1").unwrap().name, "Ada");
//! ```
//!
//! [`UserService`] sits on top for callers that have a name and an email and
//! want the id and timestamps filled in.
//!
//! **Single-process only.** If multiple processes open the same file they will
//! clobber each other.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod error;
pub mod metrics;
pub mod persist;
pub mod serializer;
pub mod service;
pub mod store;
pub mod user;

pub use backend::IndexBackend;
pub use config::Config;
pub use error::{Error, Result};
pub use metrics::{Operation, UserMetrics};
pub use persist::WriteMode;
pub use service::UserService;
pub use store::{DefaultBackend, UserStore, UserStoreBuilder};
pub use user::{User, UserInput};
