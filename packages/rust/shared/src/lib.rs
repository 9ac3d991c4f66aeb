//! Shared types, error model, and configuration for taxsync.
//!
//! This crate is the foundation depended on by all other taxsync crates.
//! It provides:
//! - [`TaxSyncError`], the unified error type
//! - Domain types ([`Course`], [`Instructor`], [`AcademicUnit`])
//! - The read-only department → faculty-group table ([`groups`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod groups;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, StoreConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, resolve_token,
};
pub use error::{Result, TaxSyncError};
pub use groups::{DeptGroup, dept_for_group, dept_group};
pub use types::{
    AcademicUnit, Course, EXCLUDED_DEPTS, Instructor, PORTAL_STATUSES, TBD_INSTRUCTORS,
    decode_entities, strip_prefix,
};
