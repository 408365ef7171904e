//! Core types for Order Desk.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod order_number;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use order_number::{OrderNumber, OrderNumberError};
pub use status::{OrderStatus, OrderStatusError};
