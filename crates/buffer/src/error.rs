use thiserror::Error;

/// Errors a [`crate::pool::Buffer`] can report. Every variant except
/// [`BufferError::FileIdSpaceExhausted`] leaves the pool in a usable
/// state; that one is the sole fatal condition in the whole analysis
/// core (§4.G, §7) and is returned eagerly rather than folded into a
/// diagnostics list, since there is no reasonable "resolved" meaning
/// for a file the pool had no id left to name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("file id space exhausted: at most 65535 files may be registered at once")]
    FileIdSpaceExhausted,

    #[error("requested lock conflicts with an existing user of the frame")]
    FrameAlreadyLocked,

    #[error("file reference does not belong to this pool")]
    UnknownFile,

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for BufferError {
    fn from(err: std::io::Error) -> Self {
        BufferError::Io(err.to_string())
    }
}
