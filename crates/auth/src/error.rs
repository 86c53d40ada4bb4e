use strato_files::FilesError;

/// Authentication failures, each with an actionable remedy.
///
/// `Display` gives the short description; [`AuthError::directive`] tells the
/// user what to do about it.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("credentials file not found")]
    CredentialsNotFound,

    #[error("credentials file could not be parsed")]
    CredentialsInvalid,

    #[error("invalid refresh token reported by the identity provider")]
    InvalidRefreshToken,

    #[error("internal error reported by the identity provider")]
    ProviderInternalError,

    #[error("authorization was denied in the browser ({reason})")]
    AuthorizationDenied { reason: String },

    #[error("timed out waiting for the browser redirect")]
    RedirectTimeout,

    #[error("login was interrupted")]
    LoginCancelled,

    #[error("token exchange failed with status {status}")]
    ExchangeFailed { status: u16 },

    #[error("malformed redirect from the identity provider: {0}")]
    MalformedRedirect(String),

    #[error("malformed response from the identity provider")]
    MalformedResponse(#[source] reqwest::Error),

    #[error("could not bind the local redirect listener on port {port}")]
    ListenerBind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("credential store error")]
    Storage(#[source] FilesError),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl AuthError {
    /// Remedy shown to the user underneath the error description.
    pub fn directive(&self) -> &'static str {
        match self {
            Self::CredentialsNotFound | Self::CredentialsInvalid | Self::InvalidRefreshToken => {
                "Run `strato login` to authenticate."
            },
            Self::ProviderInternalError => {
                "The identity provider reported an internal error. Wait a moment, then retry."
            },
            Self::AuthorizationDenied { .. } => {
                "Authorization was not granted. Re-run `strato login` to try again."
            },
            Self::RedirectTimeout => {
                "No browser redirect arrived in time. Re-run `strato login` and finish the flow \
                 in the browser."
            },
            Self::LoginCancelled => "Re-run `strato login` to try again.",
            Self::ExchangeFailed { .. }
            | Self::MalformedRedirect(_)
            | Self::MalformedResponse(_) => {
                "The login attempt could not be completed. Re-run `strato login`."
            },
            Self::ListenerBind { .. } => {
                "Another process is using the login port. Stop it (or set STRATO_CALLBACK_PORT) \
                 and retry."
            },
            Self::Config(_) => "Check the STRATO_* environment configuration.",
            Self::Storage(_) => "Check permissions on the ~/.strato directory and retry.",
            Self::Transport(_) => "Check your network connection and retry.",
        }
    }
}
