use sqlx::PgPool;

/// Executes database query/command messages via `kanau::processor::Processor`.
///
/// Each SQL operation is a message type with a `Processor` impl in
/// `entities`; handlers and repositories construct a `DatabaseProcessor`
/// around the shared pool and dispatch messages through it.
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
