//! HTTP API: request validation, authentication extractors, handlers.

pub mod call_events;
pub mod extractors;
pub mod validation;
