//! Read-only access to TI-99/4A floppy disk images.
//!
//! The volume is loaded once into memory; the header, directory and file
//! descriptors are decoded as borrowed views into that buffer, and file
//! contents are rebuilt on request according to their record organization.

pub mod error;
pub mod fs;
