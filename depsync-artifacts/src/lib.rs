//! Post-build processing of the staged binary archives.
//!
//! Runs after the build interpreter has populated the staging libs dir:
//! - [`rewrite`]: in-place platform rewrite of `.aar`/`.jar` files
//! - [`inspect`]: `.info` metadata sidecars and embedded license harvesting
//!
//! Everything here mutates staging only. The tracked tree is untouched.

mod discover;
pub mod inspect;
pub mod rewrite;

pub use discover::{ArchiveSet, find_archives};
pub use inspect::{harvest_license, harvest_licenses, info_path_for, write_archive_infos};
pub use rewrite::{RewriteConfig, classify, rewrite_all};
