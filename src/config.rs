#![warn(missing_docs)]
//! Layered INI-style configuration (`uniplot.cfg`).
//!
//! A config file holds `[section]` headers and `key = value` lines. A value
//! may be prefixed by `r` to mark the key read-only and by a type tag
//! `<bool|int|float|str>`; untagged values are strings. Values may reference
//! other keys of the same section via `%(name)s` interpolation. `;` and `#`
//! start comments.
//!
//! Files are merged in layers: built-in defaults, then `uniplot.cfg` in each
//! extra directory, the working directory and `$HOME`, in that order. Later
//! layers override earlier ones except for keys marked read-only. The `eval`
//! type tag of the original file format is accepted but treated as a string.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::{UniResult, UniplotError};

/// File name looked up in every layer directory.
pub const CONFIG_FILE_NAME: &str = "uniplot.cfg";

const DEFAULT_CFG: &str = "\
[modes]
backend = <str> plotters
show = <bool> true
interactive = <bool> false

[movie]
encoder = <str>
fps = <int> 25
overwrite_output = <bool> false
";

/// A typed configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// boolean flag
    Bool(bool),
    /// integer value
    Int(i64),
    /// floating point value
    Float(f64),
    /// string value
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    value: ConfigValue,
    readonly: bool,
}

/// Merged view over all configuration layers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    sections: BTreeMap<String, BTreeMap<String, Entry>>,
}

fn strip_comment(line: &str) -> &str {
    let end = line
        .find(|c| c == ';' || c == '#')
        .unwrap_or(line.len());
    line[..end].trim()
}

fn parse_value(raw: &str) -> (ConfigValue, bool) {
    let mut rest = raw.trim();
    let mut readonly = false;
    if let Some(stripped) = rest.strip_prefix("r ") {
        readonly = true;
        rest = stripped.trim();
    }
    let mut tag = "str";
    if let Some(stripped) = rest.strip_prefix('<') {
        if let Some((name, tail)) = stripped.split_once('>') {
            tag = name.trim();
            rest = tail.trim();
        }
    }
    let value = match tag {
        "bool" => ConfigValue::Bool(matches!(
            rest.to_ascii_lowercase().as_str(),
            "true" | "yes" | "on" | "1"
        )),
        "int" => rest
            .parse()
            .map_or_else(|_| ConfigValue::Str(rest.to_owned()), ConfigValue::Int),
        "float" => rest
            .parse()
            .map_or_else(|_| ConfigValue::Str(rest.to_owned()), ConfigValue::Float),
        "eval" => {
            warn!("config type tag <eval> is not supported, value kept as string");
            ConfigValue::Str(rest.to_owned())
        }
        _ => ConfigValue::Str(rest.to_owned()),
    };
    (value, readonly)
}

fn interpolate(section: &BTreeMap<String, Entry>, value: &str) -> String {
    let mut result = value.to_owned();
    // same-section %(name)s references, resolved once
    for (key, entry) in section {
        let pattern = format!("%({key})s");
        if result.contains(&pattern) {
            if let ConfigValue::Str(replacement) = &entry.value {
                result = result.replace(&pattern, replacement);
            }
        }
    }
    result
}

impl Config {
    /// The built-in defaults without any file layer.
    #[must_use]
    pub fn defaults() -> Self {
        let mut config = Self::default();
        config.merge_str(DEFAULT_CFG);
        config
    }

    /// Load the layered configuration: defaults, then `uniplot.cfg` from each
    /// of `extra_dirs`, the working directory and `$HOME`.
    #[must_use]
    pub fn load(extra_dirs: &[PathBuf]) -> Self {
        let mut config = Self::defaults();
        let mut dirs: Vec<PathBuf> = extra_dirs.to_vec();
        dirs.push(PathBuf::from("."));
        if let Some(home) = std::env::var_os("HOME") {
            dirs.push(PathBuf::from(home));
        }
        for dir in dirs {
            config.merge_file(&dir.join(CONFIG_FILE_NAME));
        }
        config
    }

    /// Merge one config file into this view; a missing or unreadable file is
    /// skipped silently.
    pub fn merge_file(&mut self, path: &Path) {
        if let Ok(content) = std::fs::read_to_string(path) {
            self.merge_str(&content);
        }
    }

    /// Merge config text into this view. Later entries override earlier ones
    /// unless the existing key is read-only.
    pub fn merge_str(&mut self, content: &str) {
        let mut section = String::new();
        for line in content.lines() {
            let line = strip_comment(line);
            if line.is_empty() {
                continue;
            }
            if let Some(header) = line.strip_prefix('[') {
                if let Some(name) = header.strip_suffix(']') {
                    section = name.trim().to_owned();
                }
                continue;
            }
            let Some((key, raw)) = line.split_once('=') else {
                warn!("ignoring malformed config line: {line}");
                continue;
            };
            let key = key.trim().to_owned();
            let (value, readonly) = parse_value(raw);
            let entries = self.sections.entry(section.clone()).or_default();
            if entries.get(&key).is_some_and(|e| e.readonly) {
                warn!("config key {section}.{key} is read-only, keeping prior value");
                continue;
            }
            entries.insert(key, Entry { value, readonly });
        }
    }

    fn entry(&self, section: &str, key: &str) -> UniResult<&Entry> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(key))
            .ok_or_else(|| {
                UniplotError::UnknownOption(format!("no config entry {section}.{key}"))
            })
    }

    /// Look up a string value, with `%(name)s` interpolation applied.
    ///
    /// # Errors
    /// [`UniplotError::UnknownOption`] for a missing key,
    /// [`UniplotError::BadValue`] for a non-string entry.
    pub fn get_str(&self, section: &str, key: &str) -> UniResult<String> {
        match &self.entry(section, key)?.value {
            ConfigValue::Str(value) => Ok(interpolate(
                self.sections.get(section).unwrap_or(&BTreeMap::new()),
                value,
            )),
            other => Err(UniplotError::BadValue(format!(
                "config entry {section}.{key} is not a string: {other:?}"
            ))),
        }
    }

    /// Look up a boolean value.
    ///
    /// # Errors
    /// Same failure modes as [`Config::get_str`].
    pub fn get_bool(&self, section: &str, key: &str) -> UniResult<bool> {
        match self.entry(section, key)?.value {
            ConfigValue::Bool(value) => Ok(value),
            ref other => Err(UniplotError::BadValue(format!(
                "config entry {section}.{key} is not a bool: {other:?}"
            ))),
        }
    }

    /// Look up an integer value.
    ///
    /// # Errors
    /// Same failure modes as [`Config::get_str`].
    pub fn get_int(&self, section: &str, key: &str) -> UniResult<i64> {
        match self.entry(section, key)?.value {
            ConfigValue::Int(value) => Ok(value),
            ref other => Err(UniplotError::BadValue(format!(
                "config entry {section}.{key} is not an int: {other:?}"
            ))),
        }
    }

    /// Look up a float value; integers widen.
    ///
    /// # Errors
    /// Same failure modes as [`Config::get_str`].
    pub fn get_float(&self, section: &str, key: &str) -> UniResult<f64> {
        match self.entry(section, key)?.value {
            ConfigValue::Float(value) => Ok(value),
            #[allow(clippy::cast_precision_loss)]
            ConfigValue::Int(value) => Ok(value as f64),
            ref other => Err(UniplotError::BadValue(format!(
                "config entry {section}.{key} is not a number: {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn defaults_name_the_worked_backend() {
        let config = Config::defaults();
        assert_eq!(config.get_str("modes", "backend").unwrap(), "plotters");
        assert!(config.get_bool("modes", "show").unwrap());
        assert_eq!(config.get_int("movie", "fps").unwrap(), 25);
    }
    #[test]
    fn later_layers_override() {
        let mut config = Config::defaults();
        config.merge_str("[modes]\nbackend = <str> template\n");
        assert_eq!(config.get_str("modes", "backend").unwrap(), "template");
    }
    #[test]
    fn readonly_keys_stick() {
        testing_logger::setup();
        let mut config = Config::default();
        config.merge_str("[modes]\nbackend = r <str> template\n");
        config.merge_str("[modes]\nbackend = <str> plotters\n");
        assert_eq!(config.get_str("modes", "backend").unwrap(), "template");
    }
    #[test]
    fn type_tags_and_comments() {
        let mut config = Config::default();
        config.merge_str(
            "; a comment\n[numbers]\nanswer = <int> 42 ; inline\nratio = <float> 1.5\nflag = <bool> yes\n",
        );
        assert_eq!(config.get_int("numbers", "answer").unwrap(), 42);
        assert_eq!(config.get_float("numbers", "ratio").unwrap(), 1.5);
        assert!(config.get_bool("numbers", "flag").unwrap());
        assert_matches!(
            config.get_int("numbers", "ratio"),
            Err(UniplotError::BadValue(_))
        );
        assert_matches!(
            config.get_int("numbers", "missing"),
            Err(UniplotError::UnknownOption(_))
        );
    }
    #[test]
    fn interpolation_within_section() {
        let mut config = Config::default();
        config.merge_str("[paths]\nbase = /tmp/frames\npattern = %(base)s/frame_%04d.png\n");
        assert_eq!(
            config.get_str("paths", "pattern").unwrap(),
            "/tmp/frames/frame_%04d.png"
        );
    }
    #[test]
    fn eval_tag_degrades_to_string() {
        testing_logger::setup();
        let mut config = Config::default();
        config.merge_str("[modes]\nexpr = <eval> 1 + 1\n");
        assert_eq!(config.get_str("modes", "expr").unwrap(), "1 + 1");
        crate::utils::test_helper::test_helper::check_warnings(vec![
            "config type tag <eval> is not supported, value kept as string",
        ]);
    }
}
