//! Reader for FCV keyframed motion-curve files.

pub mod binary;
pub mod error;
pub mod fcv;

pub use binary::Endian;
pub use error::{FcvError, Result};
pub use fcv::{FcvFile, FcvParser, ParseOptions};
