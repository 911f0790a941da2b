pub mod cache;
pub mod ingest;
pub mod mapper;
pub mod resolver;
pub mod select;
pub mod seo;
pub mod source;
pub mod text;
