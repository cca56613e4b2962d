//! Core types shared by every git-depend module.
//!
//! Currently this is the error layer: [`DependError`] for typed failures and
//! [`ErrorContext`] / [`user_friendly_error`] for presenting them on the
//! command line.

pub mod error;

pub use error::{DependError, ErrorContext, user_friendly_error};
