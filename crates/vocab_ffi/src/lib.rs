//! Flutter bridge for the vocabulary core.

pub mod api;
