//! Models shared by every resource
//!
//! Container resources, datatypes and errors.

pub mod bundle;
pub mod datatypes;
pub mod error;
pub mod operation_outcome;

// Re-export commonly used types
pub use bundle::*;
pub use datatypes::*;
pub use error::{Error, Result};
pub use operation_outcome::*;
