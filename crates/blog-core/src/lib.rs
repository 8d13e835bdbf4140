//! # Blog Core
//!
//! The domain layer of the blog API.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, ports, and the authorization policy applied to mutating requests.

pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;

pub use error::DomainError;
