//! Token secrets, cached credential records, and JWT claim helpers.

pub mod claims;
pub mod record;
pub mod secret;
