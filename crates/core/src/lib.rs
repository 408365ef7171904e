//! Order Desk Core - Shared types library.
//!
//! This crate provides common types used across all Order Desk components:
//! - `admin` - Back-office API server
//! - `client` - Client-side session manager / API client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, order numbers
//!   and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
