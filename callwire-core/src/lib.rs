#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod broker;
pub mod call_event;
pub mod entities;
pub mod framework;
pub mod ingest;
pub mod store;
