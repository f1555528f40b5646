//! Core library surface for the book catalog.
//!
//! The catalog keeps a score-ordered [`catalog::RankTree`] and a
//! [`catalog::TitleIndex`] in step behind [`Catalog`]; [`UserDirectory`]
//! registers readers against it. The `bin` target wraps both in a Ratatui
//! front-end, but nothing in the core depends on a terminal.
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod ui;
pub mod users;

/// The composition root and the outcome of removing a title.
pub use catalog::{Catalog, RemoveOutcome};

pub use config::{CatalogConfig, FieldLimits};
pub use error::CatalogError;

/// The domain types other layers pass around.
pub use models::{Book, ScoreKey, UserRecord};

/// Registration flow types.
pub use users::{
    Recovery, RecoveryAction, RecoveryStep, RegisterOutcome, Registration, UserDirectory,
};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
