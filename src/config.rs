//! Tunables for the catalog core and the location of the application log.
//!
//! The field limits used to be implicit in fixed-size text buffers; they are
//! now explicit and enforced, so oversized input is rejected with
//! [`CatalogError::InvalidInput`] instead of overflowing.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

use crate::error::{self, CatalogError};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".book-catalog";
/// Log file written inside the application data directory.
const LOG_FILE_NAME: &str = "book-catalog.log";

/// Number of books shown in the recommendation panel unless overridden.
pub const DEFAULT_RECOMMENDED: usize = 5;

/// Maximum character counts accepted for each text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLimits {
    pub title: usize,
    pub author: usize,
    pub user_name: usize,
    pub favorite_title: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            title: 49,
            author: 49,
            user_name: 49,
            favorite_title: 99,
        }
    }
}

impl FieldLimits {
    pub fn check_title(&self, value: &str) -> error::Result<()> {
        check_text("title", value, self.title)
    }

    pub fn check_author(&self, value: &str) -> error::Result<()> {
        check_text("author", value, self.author)
    }

    pub fn check_user_name(&self, value: &str) -> error::Result<()> {
        check_text("user name", value, self.user_name)
    }

    pub fn check_favorite_title(&self, value: &str) -> error::Result<()> {
        check_text("favorite title", value, self.favorite_title)
    }
}

/// Reject blank values and values longer than `max` characters.
fn check_text(field: &'static str, value: &str, max: usize) -> error::Result<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::invalid(field, "must not be empty"));
    }
    let len = value.chars().count();
    if len > max {
        return Err(CatalogError::invalid(
            field,
            format!("{len} characters exceeds the limit of {max}"),
        ));
    }
    Ok(())
}

/// Settings a [`Catalog`](crate::Catalog) and the front-end are built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogConfig {
    pub limits: FieldLimits,
    /// How many books the recommendation list and the recovery flow offer.
    pub recommended: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            limits: FieldLimits::default(),
            recommended: DEFAULT_RECOMMENDED,
        }
    }
}

/// Resolve the absolute path to the log file inside the user's home.
pub fn log_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(LOG_FILE_NAME))
}
