#[derive(Debug)]
pub enum Error {
    IO(std::io::Error),
    ConfigDirNotFound,
    TomlSerialize(toml::ser::Error),
    TomlDeserialize(toml::de::Error),
    Json(serde_json::Error),
    Url(url::ParseError),
    UnsupportedScheme(String),
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),
    Protocol(String),
    Iced(iced::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::IO(value)
    }
}

impl From<toml::ser::Error> for Error {
    fn from(value: toml::ser::Error) -> Self {
        Error::TomlSerialize(value)
    }
}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Error::TomlDeserialize(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Json(value)
    }
}

impl From<url::ParseError> for Error {
    fn from(value: url::ParseError) -> Self {
        Error::Url(value)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(value: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(Box::new(value))
    }
}

impl From<iced::Error> for Error {
    fn from(value: iced::Error) -> Self {
        Error::Iced(value)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IO(e) => write!(f, "IO error: {e}"),
            Self::ConfigDirNotFound => write!(f, "config directory not found"),
            Self::TomlSerialize(e) => write!(f, "TOML serialization error: {e}"),
            Self::TomlDeserialize(e) => write!(f, "TOML deserialization error: {e}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::Url(e) => write!(f, "invalid URL: {e}"),
            Self::UnsupportedScheme(scheme) => write!(f, "unsupported URL scheme: {scheme}"),
            Self::WebSocket(e) => write!(f, "WebSocket error: {e}"),
            Self::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Self::Iced(e) => write!(f, "iced error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IO(e) => e.source(),
            Self::ConfigDirNotFound => None,
            Self::TomlSerialize(e) => e.source(),
            Self::TomlDeserialize(e) => e.source(),
            Self::Json(e) => e.source(),
            Self::Url(e) => e.source(),
            Self::UnsupportedScheme(_) => None,
            Self::WebSocket(e) => e.source(),
            Self::Protocol(_) => None,
            Self::Iced(e) => e.source(),
        }
    }
}
