// PostgreSQL module - the tokio-postgres backed connection
//
// - connection: connecting, closing and running statements
// - query: turning simple-query messages into a `QueryResult`

pub mod connection;
pub mod query;

pub use connection::PgConnection;
