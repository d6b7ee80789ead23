use thiserror::Error;

/// Everything that can go wrong between the menu and Microsoft Graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Graph has not been initialized for user auth")]
    Uninitialized,

    #[error("invalid menu input: {0:?}")]
    Parse(String),

    #[error("{code}: {message} (HTTP {status})")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Input(String),
}

impl GraphError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::Service { status: 404, .. })
    }
}

impl From<yup_oauth2::Error> for GraphError {
    fn from(err: yup_oauth2::Error) -> Self {
        GraphError::Auth(err.to_string())
    }
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
