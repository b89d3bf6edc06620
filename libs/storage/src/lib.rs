pub mod config;
pub mod key;
pub mod operator;
pub mod upload;

#[cfg(test)]
mod tests;

pub use config::{StorageConfig, REDACTED};
pub use key::{object_key, public_url, validate_key};
pub use operator::{create_operator, init_operator};
pub use upload::{upload_file, Uploader};
