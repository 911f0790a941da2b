// crates/domain/src/security.rs

pub mod password;
