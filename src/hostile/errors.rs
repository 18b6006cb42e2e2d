//! Errors raised while loading or saving hostile definitions.
use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed definitions document: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialise definitions: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_name_the_path() {
        let error = StoreError::io(
            "data/hostile_definitions.toml",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = error.to_string();
        assert!(message.contains("data/hostile_definitions.toml"));
        assert!(message.contains("denied"));
    }

    #[test]
    fn parse_errors_convert() {
        let parse = toml::from_str::<toml::Table>("definitions = [").unwrap_err();
        let error = StoreError::from(parse);
        assert!(matches!(error, StoreError::Parse(_)));
        assert!(error.to_string().starts_with("malformed definitions document"));
    }
}
