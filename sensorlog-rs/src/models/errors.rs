//! Module errors

/// Represents the different types of errors that can occur in the logger.
#[derive(Debug)]
pub enum LoggerError {
    /// Error indicating that the transport client could not be built.
    ClientBuild(String),

    /// Error indicating that peripheral discovery failed.
    Discover(String),

    /// Error indicating that a connection could not be opened or was lost.
    Connect(String),

    /// Error indicating that a configuration write failed.
    Write(String),

    /// Error indicating that a channel subscription failed.
    Subscribe(String),

    /// Error indicating that a notification payload could not be decoded.
    Decode(String),

    /// Error indicating that the sample sink rejected a row.
    Sink(String),

    Other(String),
}
