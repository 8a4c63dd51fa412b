//! Core library for quill: configuration, logging, attachments, file listing.

pub mod attachment;
pub mod config;
pub mod files;
pub mod logging;
