pub mod analyzer;
pub mod archive;
pub mod batch;
pub mod config;
pub mod instrument;
pub mod manifest;
pub mod pipeline;
pub mod repair;
pub mod session;
pub mod storage;
