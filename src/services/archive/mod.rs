//! Zip archive I/O for course packages: listing, in-memory reads,
//! extraction into a working tree and repacking a tree into a new archive.

mod extract;
mod inspect;
mod pack;
mod types;

pub use extract::extract_zip;
pub(crate) use extract::safe_relative_path;
pub use inspect::{list_entries, read_entry_to_string};
pub use pack::pack_directory;
pub use types::ArchiveEntry;

#[cfg(test)]
#[path = "tests/archive_tests.rs"]
mod tests;
