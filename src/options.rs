#![warn(missing_docs)]
//! String-keyed option boundary of the scene model.
//!
//! Scene objects store their configuration in typed fields; this module
//! provides the user-facing surface where options are addressed by name, as in
//! `set("linewidth", 2.0)`. Unknown names are rejected with `UnknownOption`,
//! failed constraint checks with `BadValue`, and a failed `set` never alters
//! the previous value.

use crate::error::{UniResult, UniplotError};

/// A dynamically typed option value crossing the name-keyed boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    /// boolean flag
    Bool(bool),
    /// integer value
    Int(i64),
    /// floating point value
    Float(f64),
    /// string value
    Str(String),
    /// list of floats (axis limits, contour levels, aspect ratios, ...)
    Floats(Vec<f64>),
    /// pair of floats (caxis range, figure size, ...)
    Pair(f64, f64),
}

impl PropValue {
    /// Interpret as a bool.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] if the value is not a bool.
    pub fn as_bool(&self, name: &str) -> UniResult<bool> {
        if let Self::Bool(value) = self {
            Ok(*value)
        } else {
            Err(UniplotError::BadValue(format!(
                "option {name} expects a bool, got {self:?}"
            )))
        }
    }
    /// Interpret as a float; integers are widened.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] if the value is neither float nor int.
    pub fn as_float(&self, name: &str) -> UniResult<f64> {
        match self {
            Self::Float(value) => Ok(*value),
            #[allow(clippy::cast_precision_loss)]
            Self::Int(value) => Ok(*value as f64),
            _ => Err(UniplotError::BadValue(format!(
                "option {name} expects a number, got {self:?}"
            ))),
        }
    }
    /// Interpret as an integer.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] if the value is not an int.
    pub fn as_int(&self, name: &str) -> UniResult<i64> {
        if let Self::Int(value) = self {
            Ok(*value)
        } else {
            Err(UniplotError::BadValue(format!(
                "option {name} expects an integer, got {self:?}"
            )))
        }
    }
    /// Interpret as a string slice.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] if the value is not a string.
    pub fn as_str(&self, name: &str) -> UniResult<&str> {
        if let Self::Str(value) = self {
            Ok(value)
        } else {
            Err(UniplotError::BadValue(format!(
                "option {name} expects a string, got {self:?}"
            )))
        }
    }
    /// Interpret as a float list.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] if the value is not a float list.
    pub fn as_floats(&self, name: &str) -> UniResult<&[f64]> {
        if let Self::Floats(value) = self {
            Ok(value)
        } else {
            Err(UniplotError::BadValue(format!(
                "option {name} expects a list of numbers, got {self:?}"
            )))
        }
    }
    /// Interpret as a float pair.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] if the value is not a pair.
    pub fn as_pair(&self, name: &str) -> UniResult<(f64, f64)> {
        if let Self::Pair(a, b) = self {
            Ok((*a, *b))
        } else {
            Err(UniplotError::BadValue(format!(
                "option {name} expects a pair of numbers, got {self:?}"
            )))
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}
impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}
impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}
impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}
impl From<Vec<f64>> for PropValue {
    fn from(value: Vec<f64>) -> Self {
        Self::Floats(value)
    }
}
impl From<(f64, f64)> for PropValue {
    fn from(value: (f64, f64)) -> Self {
        Self::Pair(value.0, value.1)
    }
}

/// The name-keyed set/get surface of a scene object.
pub trait Configurable {
    /// Set the option with the given name.
    ///
    /// # Errors
    /// [`UniplotError::UnknownOption`] if the name is not registered on this
    /// object, [`UniplotError::BadValue`] if the value fails the per-name
    /// check. On failure the prior value is left untouched.
    fn set_named(&mut self, name: &str, value: PropValue) -> UniResult<()>;

    /// Return the current value of the option with the given name.
    ///
    /// # Errors
    /// [`UniplotError::UnknownOption`] if the name is not registered.
    fn get_named(&self, name: &str) -> UniResult<PropValue>;

    /// Bulk assignment; stops at the first failing name.
    ///
    /// # Errors
    /// Propagates the first error of the underlying `set_named` calls.
    fn set_many(&mut self, options: &[(&str, PropValue)]) -> UniResult<()> {
        for (name, value) in options {
            self.set_named(name, value.clone())?;
        }
        Ok(())
    }
}

/// Shorthand for the unknown-option failure used by `Configurable` impls.
pub(crate) fn unknown_option(object: &str, name: &str) -> UniplotError {
    UniplotError::UnknownOption(format!("{object} has no option named {name}"))
}
