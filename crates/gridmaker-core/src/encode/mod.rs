//! Export encoding.
//!
//! The composited canvas is downloaded as a lossless PNG so grid lines stay
//! sharp. Encoding is synchronous and single-threaded, like every other stage.

mod png;

pub use png::{encode_png, EncodeError};
