//! Registered readers and the favorite-book registration flow.
//!
//! Registration never blocks on input. When the requested favorite is not in
//! the catalog, [`UserDirectory::register_user`] hands back a [`Recovery`]
//! holding the recommendation list; the front-end shows it, collects a
//! [`RecoveryAction`] and feeds it to [`UserDirectory::resolve`]. A bad pick
//! yields [`RecoveryStep::Retry`] with the same recovery so the caller can ask
//! again; cancelling ends the flow without creating a record.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};
use crate::models::{Book, UserRecord};

/// First step of a registration.
#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    Registered(UserRecord),
    NeedsRecovery(Recovery),
}

/// Pending registration whose requested favorite was not found.
#[derive(Debug, Clone, PartialEq)]
pub struct Recovery {
    pub name: String,
    pub requested: String,
    pub recommendations: Vec<Rc<Book>>,
}

/// What the reader chose while recovering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryAction {
    Choose(String),
    Cancel,
}

/// Result of feeding one [`RecoveryAction`] to the directory.
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryStep {
    Registered(UserRecord),
    Cancelled,
    /// The pick was rejected; ask again with the same recovery.
    Retry {
        recovery: Recovery,
        reason: CatalogError,
    },
}

/// Terminal outcome of a full registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered(UserRecord),
    Cancelled,
}

#[derive(Debug, Default)]
pub struct UserDirectory {
    users: HashMap<String, UserRecord>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start registering `name` with `favorite_title`.
    ///
    /// Both fields are trimmed before validation, as picks in [`Self::resolve`]
    /// are. Errors only on invalid input; a missing favorite is not an error but
    /// a [`Registration::NeedsRecovery`].
    pub fn register_user(
        &mut self,
        name: &str,
        favorite_title: &str,
        catalog: &Catalog,
    ) -> Result<Registration> {
        let name = name.trim();
        let favorite_title = favorite_title.trim();
        let limits = &catalog.config().limits;
        limits.check_user_name(name)?;
        limits.check_favorite_title(favorite_title)?;

        if catalog.lookup(favorite_title).is_some() {
            return Ok(Registration::Registered(self.store(name, favorite_title)));
        }

        warn!(name, favorite_title, "favorite book not in catalog");
        Ok(Registration::NeedsRecovery(Recovery {
            name: name.to_string(),
            requested: favorite_title.to_string(),
            recommendations: catalog.top_recommended(catalog.config().recommended),
        }))
    }

    /// Apply the reader's choice to a pending registration.
    pub fn resolve(
        &mut self,
        recovery: Recovery,
        action: RecoveryAction,
        catalog: &Catalog,
    ) -> RecoveryStep {
        let title = match action {
            RecoveryAction::Cancel => {
                info!(name = %recovery.name, "registration cancelled");
                return RecoveryStep::Cancelled;
            }
            RecoveryAction::Choose(title) => title,
        };

        let title = title.trim();
        let rejection = if let Err(err) = catalog.config().limits.check_favorite_title(title) {
            Some(err)
        } else if catalog.lookup(title).is_none() {
            Some(CatalogError::book_not_found(title))
        } else {
            None
        };

        match rejection {
            Some(reason) => {
                warn!(name = %recovery.name, title, %reason, "recovery pick rejected");
                RecoveryStep::Retry { recovery, reason }
            }
            None => RecoveryStep::Registered(self.store(&recovery.name, title)),
        }
    }

    /// Run a whole registration, asking `choose` for an action each time the
    /// recovery flow needs one, until the reader registers or cancels.
    ///
    /// `choose` also receives the reason the previous pick was rejected.
    pub fn register_with<F>(
        &mut self,
        name: &str,
        favorite_title: &str,
        catalog: &Catalog,
        mut choose: F,
    ) -> Result<RegisterOutcome>
    where
        F: FnMut(&Recovery, Option<&CatalogError>) -> RecoveryAction,
    {
        let mut recovery = match self.register_user(name, favorite_title, catalog)? {
            Registration::Registered(user) => return Ok(RegisterOutcome::Registered(user)),
            Registration::NeedsRecovery(recovery) => recovery,
        };

        let mut last_error = None;
        loop {
            let action = choose(&recovery, last_error.as_ref());
            match self.resolve(recovery, action, catalog) {
                RecoveryStep::Registered(user) => return Ok(RegisterOutcome::Registered(user)),
                RecoveryStep::Cancelled => return Ok(RegisterOutcome::Cancelled),
                RecoveryStep::Retry {
                    recovery: again,
                    reason,
                } => {
                    recovery = again;
                    last_error = Some(reason);
                }
            }
        }
    }

    pub fn find_user(&self, name: &str) -> Option<&UserRecord> {
        self.users.get(name)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Registering a name twice replaces the earlier record.
    fn store(&mut self, name: &str, favorite_title: &str) -> UserRecord {
        let record = UserRecord {
            name: name.to_string(),
            favorite_title: favorite_title.to_string(),
        };
        self.users.insert(record.name.clone(), record.clone());
        info!(name, favorite_title, "user registered");
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.add_book("Dune", "Frank Herbert", 4.9, 6000).unwrap();
        catalog.add_book("Emma", "Jane Austen", 3.9, 800).unwrap();
        catalog
    }

    #[test]
    fn known_favorite_registers_immediately() {
        let catalog = catalog();
        let mut users = UserDirectory::new();
        let registration = users.register_user("Ann", "Dune", &catalog).unwrap();
        assert!(matches!(registration, Registration::Registered(_)));
        assert_eq!(users.find_user("Ann").unwrap().favorite_title, "Dune");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed_before_lookup() {
        let catalog = catalog();
        let mut users = UserDirectory::new();
        let registration = users.register_user(" Ann ", " Dune ", &catalog).unwrap();
        let Registration::Registered(user) = registration else {
            panic!("padded favorite should match Dune");
        };
        assert_eq!(user.name, "Ann");
        assert_eq!(user.favorite_title, "Dune");
        assert_eq!(users.find_user("Ann"), Some(&user));
    }

    #[test]
    fn unknown_favorite_offers_recommendations() {
        let catalog = catalog();
        let mut users = UserDirectory::new();
        let Registration::NeedsRecovery(recovery) =
            users.register_user("Ann", "Dun", &catalog).unwrap()
        else {
            panic!("expected recovery");
        };
        assert_eq!(recovery.requested, "Dun");
        assert_eq!(recovery.recommendations[0].title, "Dune");
        assert!(users.is_empty());
    }

    #[test]
    fn retry_keeps_the_recovery_until_a_valid_pick() {
        let catalog = catalog();
        let mut users = UserDirectory::new();
        let Registration::NeedsRecovery(recovery) =
            users.register_user("Ann", "Dun", &catalog).unwrap()
        else {
            panic!("expected recovery");
        };

        let step = users.resolve(recovery, RecoveryAction::Choose("  ".into()), &catalog);
        let RecoveryStep::Retry { recovery, reason } = step else {
            panic!("expected retry");
        };
        assert!(matches!(reason, CatalogError::InvalidInput { .. }));

        let step = users.resolve(recovery, RecoveryAction::Choose("Nope".into()), &catalog);
        let RecoveryStep::Retry { recovery, reason } = step else {
            panic!("expected retry");
        };
        assert!(matches!(reason, CatalogError::NotFound { .. }));
        assert!(users.find_user("Ann").is_none());

        let step = users.resolve(recovery, RecoveryAction::Choose("Emma".into()), &catalog);
        assert!(matches!(step, RecoveryStep::Registered(_)));
        assert_eq!(users.find_user("Ann").unwrap().favorite_title, "Emma");
    }

    #[test]
    fn register_with_loops_until_cancel() {
        let catalog = catalog();
        let mut users = UserDirectory::new();
        let mut asked = 0;
        let outcome = users
            .register_with("Ann", "Unknown Title", &catalog, |_, _| {
                asked += 1;
                if asked < 3 {
                    RecoveryAction::Choose("Still Unknown".into())
                } else {
                    RecoveryAction::Cancel
                }
            })
            .unwrap();
        assert_eq!(outcome, RegisterOutcome::Cancelled);
        assert_eq!(asked, 3);
        assert!(users.find_user("Ann").is_none());
    }

    #[test]
    fn invalid_name_is_rejected_before_lookup() {
        let catalog = catalog();
        let mut users = UserDirectory::new();
        let long_name = "n".repeat(50);
        assert!(matches!(
            users.register_user(&long_name, "Dune", &catalog),
            Err(CatalogError::InvalidInput { .. })
        ));
        assert!(users.register_user("", "Dune", &catalog).is_err());
    }

    #[test]
    fn re_registering_replaces_the_record() {
        let catalog = catalog();
        let mut users = UserDirectory::new();
        users.register_user("Ann", "Dune", &catalog).unwrap();
        users.register_user("Ann", "Emma", &catalog).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users.find_user("Ann").unwrap().favorite_title, "Emma");
    }
}
