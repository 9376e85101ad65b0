//! Object store adapter for request archives.

pub mod s3;
pub mod signing;

pub use s3::S3ObjectStore;
