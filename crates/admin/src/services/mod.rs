//! Business services for the back office.

pub mod auth;
