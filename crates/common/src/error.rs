use thiserror::Error;

/// Failure of one external call. Missing fields in an otherwise valid payload
/// are not errors; the normalizer fills those in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection refused, DNS, TLS, timeout: the request never produced a response.
    #[error("network failure calling {endpoint}: {message}")]
    Network {
        endpoint: &'static str,
        message: String,
    },
    /// The service answered, but with a non-2xx status, a body that does not
    /// decode, or an application-level error status.
    #[error("{endpoint} failed{}: {message}", .status.map(|s| format!(" with status {s}")).unwrap_or_default())]
    Upstream {
        endpoint: &'static str,
        status: Option<u16>,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Network,
    Status,
    Body,
}

impl FetchErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Status => "status",
            Self::Body => "body",
        }
    }
}

impl FetchError {
    pub fn network(endpoint: &'static str, message: impl Into<String>) -> Self {
        Self::Network {
            endpoint,
            message: message.into(),
        }
    }

    pub fn upstream(endpoint: &'static str, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            endpoint,
            status,
            message: message.into(),
        }
    }

    /// Map a transport error onto the taxonomy. Decode failures are upstream
    /// failures: the service answered with something we can't read.
    pub fn from_reqwest(endpoint: &'static str, err: &reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::upstream(endpoint, None, format!("malformed JSON: {err}"));
        }
        if let Some(status) = err.status() {
            return Self::upstream(endpoint, Some(status.as_u16()), err.to_string());
        }
        Self::network(endpoint, err.to_string())
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Network { endpoint, .. } | Self::Upstream { endpoint, .. } => endpoint,
        }
    }

    /// The human-readable part only, suitable for showing on the page.
    pub fn message(&self) -> &str {
        match self {
            Self::Network { message, .. } | Self::Upstream { message, .. } => message,
        }
    }

    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Network { .. } => FetchErrorKind::Network,
            Self::Upstream {
                status: Some(_), ..
            } => FetchErrorKind::Status,
            Self::Upstream { status: None, .. } => FetchErrorKind::Body,
        }
    }
}
