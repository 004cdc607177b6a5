//! Core library for Taskpad
//!
//! This crate contains the core business logic, including:
//! - Task entity and lifecycle rules
//! - Task persistence (repository trait + file-backed store)
//! - Task service enforcing ownership and soft-delete semantics

pub mod error;
pub mod task;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
