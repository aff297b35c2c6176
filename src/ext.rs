//! Extension traits that attach cached credentials to outbound requests.

pub mod bearer;

pub use bearer::*;
