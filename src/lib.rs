//! Keeps the license installed on a remote configuration API in line with a
//! local license document.
//!
//! A run authenticates against the host, fetches the installed license,
//! compares it with the local document over [`COMPARED_FIELDS`] and uploads
//! the local document when they differ.

pub mod licensing;

pub use licensing::*;
