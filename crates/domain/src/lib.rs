pub mod content;
pub mod error;
pub mod section;
pub mod security;
pub mod seo;
pub mod setting;
pub mod view;
