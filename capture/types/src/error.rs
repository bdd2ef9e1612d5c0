/*!
    Error taxonomy for the capture pipeline.
*/

/**
    Errors produced by the capture pipeline.

    Each variant corresponds to one stage of the pipeline, so a caller can
    tell from the error alone which stage gave up. Per-packet decode hiccups
    ("need more input", a rejected packet) are not represented here — they are
    absorbed inside the session's read loop and never surface as errors.
*/
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The transport could not be opened (missing device, missing backend,
    /// nonexistent path).
    #[error("failed to open transport: {0}")]
    Open(String),

    /// The container could not be identified or yielded too little data.
    #[error("failed to probe container: {0}")]
    Probe(String),

    /// No stream of the required kind exists in the container.
    #[error("stream selection failed: {0}")]
    Selection(String),

    /// The decoder hit a fault it cannot resynchronize from.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The converter endpoints are incompatible, or scaling failed.
    #[error("conversion failed: {0}")]
    Conversion(String),

    /// API misuse, e.g. reading from a session that already failed.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// An I/O error from the underlying byte source.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /**
        Create an `Open` error.
    */
    pub fn open(message: impl Into<String>) -> Self {
        Self::Open(message.into())
    }

    /**
        Create a `Probe` error.
    */
    pub fn probe(message: impl Into<String>) -> Self {
        Self::Probe(message.into())
    }

    /**
        Create a `Selection` error.
    */
    pub fn selection(message: impl Into<String>) -> Self {
        Self::Selection(message.into())
    }

    /**
        Create a `Decode` error.
    */
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /**
        Create a `Conversion` error.
    */
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion(message.into())
    }

    /**
        Create a `Precondition` error.
    */
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }
}

/**
    Result alias used throughout the pipeline.
*/
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_stage() {
        assert!(Error::open("no such device").to_string().contains("open"));
        assert!(Error::probe("truncated").to_string().contains("probe"));
        assert!(
            Error::precondition("read after failure")
                .to_string()
                .contains("precondition")
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
