//! Packaging manifest (`imsmanifest.xml`): XML tree, typed document model,
//! minimal-manifest builder and lookup helpers.

pub mod builder;
pub mod locate;
pub mod model;
pub mod xml;

pub use builder::ManifestBuilder;
pub use locate::{find_manifest_entry, find_manifest_in_tree, MANIFEST_FILE_NAME};
pub use model::{ManifestDocument, Resource};

#[cfg(test)]
#[path = "tests/manifest_tests.rs"]
mod tests;
