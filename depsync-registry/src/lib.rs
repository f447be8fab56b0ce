//! Package registry parsing.
//!
//! A registry is built by walking a package tree for `cipd.yaml` descriptors.
//! Unlike a tolerant loader, this parser is strict: a descriptor without a
//! package name or tag aborts the scan, since the tree can no longer be
//! trusted as a source of record.

mod parse;
mod scan;

pub use parse::{DescriptorError, ParsedDescriptor, parse_descriptor, read_descriptor};
pub use scan::{RegistryError, scan_registry};
