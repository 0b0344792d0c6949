//! Shared page fragments (header and footer) fetched at runtime and
//! spliced into mount elements of a document.
//!
//! - `FragmentSource`: where markup comes from (`HttpFragmentSource`)
//! - `Document`: where it goes (`MemoryDocument`)
//! - `FragmentLoader`: one independent fetch-and-render task per fragment

pub mod document;
pub mod loader;
pub mod source;

pub use document::{Document, MemoryDocument};
pub use loader::{
    Fragment, FragmentLoader, FragmentOutcome, FragmentReport, LoadHandle, FOOTER_FRAGMENT_PATH,
    FOOTER_MOUNT_ID, HEADER_FRAGMENT_PATH, HEADER_MOUNT_ID,
};
pub use source::{FragmentSource, HttpFragmentSource};
