//! Core store type and builder.

use crate::backend::IndexBackend;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::persist::{ensure_parent_dir, load, write_snapshot, WriteMode};
use crate::serializer::{JsonSerializer, Serializer};
use crate::user::User;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Default index backend: `HashMap` keyed by user id.
pub type DefaultBackend = HashMap<String, User>;

/// Persistent, JSON-snapshot-backed user store.
///
/// The whole live set sits in an in-memory index guarded by one `RwLock`.
/// Reads take it shared and never touch the disk. Create, update and delete
/// take it exclusively for the whole operation, disk write included, so the
/// index and the snapshot file always agree once a call returns. If the write
/// fails the index mutation is undone before the lock is released.
///
/// Use [`open`](Self::open) for a quick start or [`builder`](Self::builder)
/// to pick the backend, write mode and formatting. Share it between threads
/// with an `Arc`.
pub struct UserStore<B = DefaultBackend> {
    index: RwLock<B>,
    path: PathBuf,
    serializer: JsonSerializer,
    write_mode: WriteMode,
}

impl UserStore<DefaultBackend> {
    /// Open (or create) a store at `path` with the default backend, atomic
    /// writes and pretty JSON.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder(path).build()
    }

    /// Open a store as described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::builder(&config.data_path)
            .pretty(config.pretty)
            .write_mode(config.write_mode)
            .build()
    }
}

impl<B: IndexBackend> UserStore<B> {
    /// Start configuring a new store. Call [`.build()`](UserStoreBuilder::build)
    /// when ready.
    pub fn builder(path: impl AsRef<Path>) -> UserStoreBuilder<B> {
        UserStoreBuilder::new(path)
    }

    // ---- reads ----

    /// Every live user, in backend order.
    #[must_use]
    pub fn list(&self) -> Vec<User> {
        self.index.read().values().cloned().collect()
    }

    /// The user with this id.
    pub fn get(&self, id: &str) -> Result<User> {
        self.index
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// `true` if a user with this id is live.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.read().contains_id(id)
    }

    /// Number of live users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    /// `true` when the store has no users.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path to the backing snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// How snapshots are written.
    #[must_use]
    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    // ---- writes ----

    /// Insert a fully formed user. The caller supplies the id and both
    /// timestamps.
    pub fn create(&self, user: User) -> Result<()> {
        let mut index = self.index.write();
        if index.email_owner(&user.email).is_some() {
            return Err(Error::AlreadyExists { email: user.email });
        }
        if index.contains_id(&user.id) {
            return Err(Error::DuplicateId { id: user.id });
        }

        let id = user.id.clone();
        index.insert(user);
        if let Err(err) = self.persist(&*index) {
            index.remove(&id);
            return Err(err);
        }
        Ok(())
    }

    /// Replace the user with the same id. The caller carries `created_at`
    /// forward; the store writes the record as given.
    ///
    /// Keeping your own email is fine; taking another live user's is not.
    pub fn update(&self, user: User) -> Result<()> {
        let mut index = self.index.write();
        if !index.contains_id(&user.id) {
            return Err(not_found(&user.id));
        }
        if let Some(owner) = index.email_owner(&user.email) {
            if owner != user.id {
                return Err(Error::AlreadyExists { email: user.email });
            }
        }

        let previous = index.insert(user);
        if let Err(err) = self.persist(&*index) {
            if let Some(prev) = previous {
                index.insert(prev);
            }
            return Err(err);
        }
        Ok(())
    }

    /// Remove a user for good.
    pub fn delete(&self, id: &str) -> Result<()> {
        let mut index = self.index.write();
        let removed = index.remove(id).ok_or_else(|| not_found(id))?;
        if let Err(err) = self.persist(&*index) {
            index.insert(removed);
            return Err(err);
        }
        Ok(())
    }

    // ---- internal ----

    // Caller holds the write lock.
    fn persist(&self, index: &B) -> Result<()> {
        let records: Vec<&User> = index.values().collect();
        let bytes = self.serializer.serialize(&records)?;
        write_snapshot(&self.path, &bytes, self.write_mode)
    }
}

impl<B> std::fmt::Debug for UserStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore")
            .field("path", &self.path)
            .field("write_mode", &self.write_mode)
            .field("pretty", &self.serializer.is_pretty())
            .finish_non_exhaustive()
    }
}

fn not_found(id: &str) -> Error {
    Error::NotFound { id: id.to_string() }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures and opens a [`UserStore`].
///
/// Until [`build`](Self::build) succeeds there is no store to call: loading
/// the snapshot is the only way to get one.
///
/// ```rust,no_run
/// use std::collections::BTreeMap;
/// use user_store::{User, UserStore, WriteMode};
///
/// let store = UserStore::<BTreeMap<String, User>>::builder("data/users.json")
///     .pretty(false)
///     .write_mode(WriteMode::InPlace)
///     .build()
///     .unwrap();
/// ```
pub struct UserStoreBuilder<B> {
    path: PathBuf,
    pretty: bool,
    write_mode: WriteMode,
    _marker: PhantomData<B>,
}

impl<B: IndexBackend> UserStoreBuilder<B> {
    fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pretty: true,
            write_mode: WriteMode::default(),
            _marker: PhantomData,
        }
    }

    /// Indent the snapshot with two spaces (default: on).
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// Set how snapshots are written (default: [`WriteMode::Atomic`]).
    pub fn write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    /// Create the parent directory, load the snapshot and return a ready
    /// store. Fails if the snapshot can't be read or parsed, or if it holds
    /// two users with the same id or email.
    pub fn build(self) -> Result<UserStore<B>> {
        let serializer = if self.pretty {
            JsonSerializer::pretty()
        } else {
            JsonSerializer::new()
        };

        ensure_parent_dir(&self.path)?;
        let records = load(&self.path, &serializer)?;

        let mut index = B::default();
        for user in records {
            if index.contains_id(&user.id) {
                return Err(Error::Persistence(format!(
                    "{}: duplicate id {:?} in snapshot",
                    self.path.display(),
                    user.id
                )));
            }
            if index.email_owner(&user.email).is_some() {
                return Err(Error::Persistence(format!(
                    "{}: duplicate email {:?} in snapshot",
                    self.path.display(),
                    user.email
                )));
            }
            index.insert(user);
        }

        Ok(UserStore {
            index: RwLock::new(index),
            path: self.path,
            serializer,
            write_mode: self.write_mode,
        })
    }
}

impl<B> std::fmt::Debug for UserStoreBuilder<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStoreBuilder")
            .field("path", &self.path)
            .field("pretty", &self.pretty)
            .field("write_mode", &self.write_mode)
            .finish()
    }
}
