//! Request-level operations on top of the store.
//!
//! The store takes fully formed records and never logs. This layer is what a
//! transport calls: it validates input, mints ids and timestamps, carries
//! `created_at` forward on update, counts every operation in [`UserMetrics`],
//! and runs each call inside a `tracing` span tagged with the user it touches.

use crate::backend::IndexBackend;
use crate::error::{Error, Result};
use crate::metrics::{Operation, UserMetrics};
use crate::store::{DefaultBackend, UserStore};
use crate::user::{User, UserInput};
use chrono::Utc;
use std::sync::Arc;
use tracing::field::Empty;
use tracing::{error, info, instrument, warn, Span};
use uuid::Uuid;

/// CRUD entry point for callers that speak in requests, not records.
pub struct UserService<B = DefaultBackend> {
    store: Arc<UserStore<B>>,
    metrics: Arc<UserMetrics>,
}

impl<B> Clone for UserService<B> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<B: IndexBackend> UserService<B> {
    /// Wrap a shared store. The live-user gauge starts at the store's
    /// current size.
    pub fn new(store: Arc<UserStore<B>>) -> Result<Self> {
        let metrics = UserMetrics::new()?;
        metrics.set_users(store.len());
        Ok(Self {
            store,
            metrics: Arc::new(metrics),
        })
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<UserStore<B>> {
        &self.store
    }

    /// Counters for this service and its clones.
    pub fn metrics(&self) -> &UserMetrics {
        &self.metrics
    }

    /// All users.
    #[instrument(skip(self), fields(user_count = Empty))]
    pub fn list_users(&self) -> Vec<User> {
        self.metrics.record_operation(Operation::GetAll);
        info!("fetching all users");
        let users = self.store.list();
        Span::current().record("user_count", users.len());
        info!(count = users.len(), "fetched all users");
        users
    }

    /// One user by id.
    #[instrument(skip(self, id), fields(user.id = %id))]
    pub fn get_user(&self, id: &str) -> Result<User> {
        self.metrics.record_operation(Operation::GetById);
        let user = self.store.get(id).map_err(|err| report(err, "fetch user"))?;
        info!(user_id = %id, "fetched user");
        Ok(user)
    }

    /// Validate `input`, assign a fresh id and timestamps, and store it.
    #[instrument(skip(self, input), fields(user.id = Empty, user.email = %input.email))]
    pub fn create_user(&self, input: UserInput) -> Result<User> {
        self.metrics.record_operation(Operation::Create);
        input.validate().map_err(|err| report(err, "create user"))?;
        info!(name = %input.name, email = %input.email, "creating user");

        let user = User::new(Uuid::new_v4().to_string(), input.name, input.email, Utc::now());
        Span::current().record("user.id", user.id.as_str());
        self.store
            .create(user.clone())
            .map_err(|err| report(err, "create user"))?;

        self.metrics.user_created();
        info!(user_id = %user.id, "created user");
        Ok(user)
    }

    /// Replace name and email of an existing user, keeping its `created_at`.
    #[instrument(skip(self, id, input), fields(user.id = %id, user.email = %input.email))]
    pub fn update_user(&self, id: &str, input: UserInput) -> Result<User> {
        self.metrics.record_operation(Operation::Update);
        input.validate().map_err(|err| report(err, "update user"))?;
        info!(user_id = %id, name = %input.name, email = %input.email, "updating user");

        let existing = self.store.get(id).map_err(|err| report(err, "update user"))?;
        let user = existing.replaced_with(input, Utc::now());
        self.store
            .update(user.clone())
            .map_err(|err| report(err, "update user"))?;

        info!(user_id = %id, "updated user");
        Ok(user)
    }

    /// Remove a user.
    #[instrument(skip(self, id), fields(user.id = %id))]
    pub fn delete_user(&self, id: &str) -> Result<()> {
        self.metrics.record_operation(Operation::Delete);
        info!(user_id = %id, "deleting user");
        self.store
            .delete(id)
            .map_err(|err| report(err, "delete user"))?;

        self.metrics.user_deleted();
        info!(user_id = %id, "deleted user");
        Ok(())
    }
}

impl<B> std::fmt::Debug for UserService<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService")
            .field("store", &*self.store)
            .field("metrics", &*self.metrics)
            .finish()
    }
}

// Client mistakes are warnings, storage trouble is an error.
fn report(err: Error, action: &str) -> Error {
    match &err {
        Error::NotFound { id } => warn!(user_id = %id, "{action}: user not found"),
        Error::AlreadyExists { email } => warn!(email = %email, "{action}: email already in use"),
        Error::DuplicateId { id } => warn!(user_id = %id, "{action}: id already taken"),
        Error::Invalid(reason) => warn!(reason = %reason, "{action}: invalid request"),
        Error::Persistence(reason) | Error::Telemetry(reason) => {
            error!(error = %reason, "{action}: failed")
        }
    }
    err
}
