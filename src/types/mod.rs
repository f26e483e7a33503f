//! Wire-level types and helpers shared by the NVP, IPN and Button Manager clients.

mod common;
mod encoding;
mod indexed;

pub use common::*;
pub use encoding::*;
pub use indexed::*;
