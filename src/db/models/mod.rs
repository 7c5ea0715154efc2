//! Database models split into domain-specific modules.

pub mod common;
pub mod donation;
pub mod person;
pub mod user;

pub use common::*;
pub use donation::*;
pub use person::*;
pub use user::*;
