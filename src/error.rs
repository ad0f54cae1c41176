use std::path::PathBuf;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library.
///
/// Everything except `IoError` is a configuration error: it aborts document
/// construction and no partial document is produced.
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    ParseError { file: PathBuf, message: String },
    /// A field annotation could not be parsed.
    MalformedTag { field: String, message: String },
    /// An inline enum annotation without a `values` entry.
    MissingEnumValues { field: String },
    /// A route or manifest references a model that cannot be resolved.
    UnknownModel(String),
    /// A manifest route references an undeclared security scheme.
    UnknownSecurity(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::ParseError { file, message } => {
                write!(f, "parse error in {}: {}", file.display(), message)
            }
            Error::MalformedTag { field, message } => {
                write!(f, "malformed tag on field `{}`: {}", field, message)
            }
            Error::MissingEnumValues { field } => {
                write!(f, "enum tag on field `{}` must have values", field)
            }
            Error::UnknownModel(name) => write!(f, "unknown model type: {}", name),
            Error::UnknownSecurity(name) => write!(f, "unknown security scheme: {}", name),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl Error {
    /// Whether this error comes from invalid model or route configuration.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Error::IoError(_))
    }
}
