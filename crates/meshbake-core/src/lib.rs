//! meshbake core library
//!
//! This crate provides the data model shared by every meshbake component:
//! quantized vertices, pieces, joints, the immutable [`Scene`], and the
//! unified error type.

pub mod error;
pub mod quantize;
pub mod types;

pub use error::{Error, Result, ResultExt};
pub use quantize::{format_fixed, quantize, FIXED_DECIMALS, SIGNIFICANT_DIGITS};
pub use types::*;

/// Re-export commonly used items
pub mod prelude {
    pub use crate::error::{Error, Result, ResultExt};
    pub use crate::quantize::{format_fixed, quantize};
    pub use crate::types::*;
}
