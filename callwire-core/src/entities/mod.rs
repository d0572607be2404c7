//! Database records and their SQL operations.
//!
//! Each SQL operation is a message struct with a
//! `kanau::processor::Processor` impl on
//! [`DatabaseProcessor`](crate::framework::DatabaseProcessor).

pub mod call_event_logs;
