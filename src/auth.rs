//! Bearer credential resolution: credential sets, redacted secrets, and the token manager.

pub mod credentials;
pub mod manager;
pub mod secret;

pub use credentials::*;
pub use manager::*;
pub use secret::*;
