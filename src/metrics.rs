//! Prometheus counters for the service layer.
//!
//! Each [`UserMetrics`] owns its own [`Registry`] so several services (or
//! tests) in one process never share counts.

use crate::error::Result;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Service operation, used as the `operation` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// List every user.
    GetAll,
    /// Fetch one user.
    GetById,
    /// Add a user.
    Create,
    /// Replace a user.
    Update,
    /// Remove a user.
    Delete,
}

impl Operation {
    /// Label value.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::GetAll => "get_all",
            Operation::GetById => "get_by_id",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// Live user gauge plus created/deleted/operation counters.
pub struct UserMetrics {
    registry: Registry,
    users: IntGauge,
    created: IntCounter,
    deleted: IntCounter,
    operations: IntCounterVec,
}

impl UserMetrics {
    /// Build and register every metric in a fresh registry.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let users = IntGauge::new(
            "user_api_users_total",
            "Current number of users in the system",
        )?;
        let created = IntCounter::new(
            "user_api_users_created_total",
            "Total number of users created",
        )?;
        let deleted = IntCounter::new(
            "user_api_users_deleted_total",
            "Total number of users deleted",
        )?;
        let operations = IntCounterVec::new(
            Opts::new("user_api_operations_total", "Total number of user operations"),
            &["operation"],
        )?;

        registry.register(Box::new(users.clone()))?;
        registry.register(Box::new(created.clone()))?;
        registry.register(Box::new(deleted.clone()))?;
        registry.register(Box::new(operations.clone()))?;

        Ok(Self {
            registry,
            users,
            created,
            deleted,
            operations,
        })
    }

    /// Count one attempted operation, successful or not.
    pub fn record_operation(&self, op: Operation) {
        self.operations.with_label_values(&[op.as_str()]).inc();
    }

    /// A user was stored.
    pub fn user_created(&self) {
        self.created.inc();
        self.users.inc();
    }

    /// A user was removed.
    pub fn user_deleted(&self) {
        self.deleted.inc();
        self.users.dec();
    }

    /// Reset the live gauge, e.g. from the loaded snapshot.
    pub fn set_users(&self, count: usize) {
        self.users.set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Current live gauge value.
    pub fn users(&self) -> i64 {
        self.users.get()
    }

    /// Users created so far.
    pub fn created(&self) -> u64 {
        self.created.get()
    }

    /// Users deleted so far.
    pub fn deleted(&self) -> u64 {
        self.deleted.get()
    }

    /// Attempts of `op` so far.
    pub fn operations(&self, op: Operation) -> u64 {
        self.operations.with_label_values(&[op.as_str()]).get()
    }

    /// The registry holding every metric above.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Prometheus text exposition of the registry.
    pub fn encode(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl std::fmt::Debug for UserMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserMetrics")
            .field("users", &self.users())
            .field("created", &self.created())
            .field("deleted", &self.deleted())
            .finish_non_exhaustive()
    }
}
