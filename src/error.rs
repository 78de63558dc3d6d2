#![warn(missing_docs)]
//! Uniplot specific error structures
use std::{error::Error, fmt::Display};

/// Uniplot application specific Result type
pub type UniResult<T> = std::result::Result<T, UniplotError>;

/// Errors that can be returned by the various uniplot functions.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum UniplotError {
    /// an option name is not registered on the target scene object
    UnknownOption(String),
    /// an option value failed its type or constraint check (includes
    /// array-shape mismatches of plot-item data)
    BadValue(String),
    /// the selected backend lacks a requested feature (a colormap, a plot-item
    /// variant, an export format)
    NotImplemented(String),
    /// the selected backend or an external tool cannot be loaded; fatal at
    /// session construction
    BackendUnavailable(String),
    /// a backend failed while re-rendering or exporting a figure
    Render(String),
    /// an external movie encoder failed; carries the attempted command line
    Encoder(String),
    /// errors not falling in one of the categories above
    Other(String),
}

impl Display for UniplotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownOption(m) => {
                write!(f, "UnknownOption:{m}")
            }
            Self::BadValue(m) => {
                write!(f, "BadValue:{m}")
            }
            Self::NotImplemented(m) => {
                write!(f, "NotImplemented:{m}")
            }
            Self::BackendUnavailable(m) => {
                write!(f, "BackendUnavailable:{m}")
            }
            Self::Render(m) => {
                write!(f, "Render:{m}")
            }
            Self::Encoder(m) => {
                write!(f, "Encoder:{m}")
            }
            Self::Other(m) => write!(f, "Uniplot Error:Other:{m}"),
        }
    }
}
impl Error for UniplotError {}

impl std::convert::From<String> for UniplotError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}
#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn from() {
        let error = UniplotError::from("test".to_string());
        assert_eq!(error, UniplotError::Other("test".to_string()));
    }
    #[test]
    fn display() {
        assert_eq!(
            format!("{}", UniplotError::UnknownOption("test".to_string())),
            "UnknownOption:test"
        );
        assert_eq!(
            format!("{}", UniplotError::BadValue("test".to_string())),
            "BadValue:test"
        );
        assert_eq!(
            format!("{}", UniplotError::NotImplemented("test".to_string())),
            "NotImplemented:test"
        );
        assert_eq!(
            format!("{}", UniplotError::BackendUnavailable("test".to_string())),
            "BackendUnavailable:test"
        );
        assert_eq!(
            format!("{}", UniplotError::Render("test".to_string())),
            "Render:test"
        );
        assert_eq!(
            format!("{}", UniplotError::Encoder("test".to_string())),
            "Encoder:test"
        );
        assert_eq!(
            format!("{}", UniplotError::Other("test".to_string())),
            "Uniplot Error:Other:test"
        );
    }
    #[test]
    fn debug() {
        assert_eq!(
            format!("{:?}", UniplotError::BadValue("test".to_string())),
            "BadValue(\"test\")"
        );
    }
}
