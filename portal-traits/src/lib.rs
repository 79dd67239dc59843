//! # Portal Collaborator Traits
//!
//! Contracts between the sync engine and the e-learning portal it talks to.
//!
//! ## Overview
//!
//! The engine never speaks HTTP or parses HTML itself. Everything that
//! touches the portal is expressed as an async trait implemented elsewhere:
//!
//! - [`Authenticator`](auth::Authenticator) - Credential exchange for a portal session
//! - [`CatalogSource`](catalog::CatalogSource) - Year/course discovery and per-category listings
//! - [`FileTransfer`](transfer::FileTransfer) - Local resolution and byte transfer of one file
//!
//! ## Error Handling
//!
//! All traits use the [`PortalError`](error::PortalError) taxonomy. Credential
//! rejection (`Auth`) is fatal to a run until re-authenticated; fetch, parse
//! and transfer failures are recoverable and scoped to one course, category
//! or file respectively.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` so implementations can be shared across
//! concurrent pipeline workers behind `Arc<dyn Trait>`.

pub mod auth;
pub mod catalog;
pub mod error;
pub mod transfer;

pub use error::{PortalError, Result};

// Re-export commonly used types
pub use auth::{Authenticator, Credentials, Session};
pub use catalog::{CatalogIndex, CatalogSource, CategoryCounts, Course, RemoteFileEntry};
pub use transfer::{DownloadReceipt, FileDescriptor, FileTransfer};
