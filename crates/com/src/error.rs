use {serving::LoadError, std::fmt, tokio::task::JoinError};

#[derive(Debug)]
pub enum ComError {
    Io(std::io::Error),
    Load(LoadError),
    /// A blocking startup task panicked or was cancelled.
    Join(JoinError),
}

impl fmt::Display for ComError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComError::Io(err) => write!(f, "io error: {err}"),
            ComError::Load(err) => write!(f, "model load failed: {err}"),
            ComError::Join(err) => write!(f, "startup task failed: {err}"),
        }
    }
}

impl std::error::Error for ComError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ComError::Io(err) => Some(err),
            ComError::Load(err) => Some(err),
            ComError::Join(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ComError {
    fn from(err: std::io::Error) -> Self {
        ComError::Io(err)
    }
}

impl From<LoadError> for ComError {
    fn from(err: LoadError) -> Self {
        ComError::Load(err)
    }
}

impl From<JoinError> for ComError {
    fn from(err: JoinError) -> Self {
        ComError::Join(err)
    }
}
