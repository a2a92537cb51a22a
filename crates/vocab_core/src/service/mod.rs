//! Core use-case services.
//!
//! # Responsibility
//! - Validate user input before it reaches storage.
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep UI/FFI layers decoupled from SQL details.

pub mod export_service;
pub mod vocabulary_service;
pub mod word_service;
