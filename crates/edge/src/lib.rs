// crates/edge/src/lib.rs

pub mod auth;
pub mod cli;
pub mod fs;
pub mod graphql;
pub mod home;
pub mod prerender;
pub mod queries;
pub mod router;

mod error;

pub use error::{Error, Result};
