//! Configuration loading.
//!
//! Router and error-code settings are plain `serde` structs; this module
//! turns YAML, TOML or JSON files into them.
//!
//! - Format is detected from the file extension
//! - `${VAR}` and `$VAR` references are replaced with environment values
//!   before parsing; unknown variables are left untouched
//! - Several sources can be layered, later ones overriding earlier ones

use config::{Config as Cfg, File, FileFormat};
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use std::path::Path;

pub use config::FileFormat as Format;

/// Why a configuration source could not be turned into settings.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("cannot read config source: {0}")]
    Read(#[from] std::io::Error),

    /// The source is not valid YAML/TOML/JSON.
    #[error("malformed config source: {0}")]
    Parse(String),

    #[error("unsupported config format '{0}'")]
    UnsupportedFormat(String),

    /// The source parsed but does not fit the target settings struct.
    #[error("config does not match the expected settings: {0}")]
    Shape(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Detect the format of `path` from its extension (`yaml`/`yml`, `toml`,
/// `json`).
pub fn detect_format(path: impl AsRef<Path>) -> ConfigResult<FileFormat> {
    let path = path.as_ref();
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return Err(ConfigError::UnsupportedFormat(path.display().to_string()));
    };

    if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") {
        Ok(FileFormat::Yaml)
    } else if ext.eq_ignore_ascii_case("toml") {
        Ok(FileFormat::Toml)
    } else if ext.eq_ignore_ascii_case("json") {
        Ok(FileFormat::Json)
    } else {
        Err(ConfigError::UnsupportedFormat(ext.to_owned()))
    }
}

/// Replace `${VAR}` and `$VAR` with environment values.
pub fn substitute_env_vars(content: &str) -> ConfigResult<String> {
    let invalid = |e: regex::Error| ConfigError::Parse(e.to_string());
    let braced = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(invalid)?;
    let bare = Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)\b").map_err(invalid)?;

    let lookup = |caps: &Captures| std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string());

    let once = braced.replace_all(content, lookup);
    Ok(bare.replace_all(&once, lookup).into_owned())
}

/// Parse `content` in `format` into `T`.
pub fn from_str<T>(content: &str, format: FileFormat) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    merge_sources(&[(content, format)])
}

/// Load `T` from a single file.
pub fn load_config<T>(path: impl AsRef<Path>) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    load_merged(&[path])
}

/// Layer several in-memory sources; later ones override earlier ones.
pub fn merge_sources<T>(sources: &[(&str, FileFormat)]) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let layered = sources
        .iter()
        .try_fold(Cfg::builder(), |builder, (content, format)| -> ConfigResult<_> {
            let expanded = substitute_env_vars(content)?;
            Ok(builder.add_source(File::from_str(&expanded, *format)))
        })?
        .build()
        .map_err(|e| ConfigError::Parse(e.to_string()))?;

    layered
        .try_deserialize()
        .map_err(|e| ConfigError::Shape(e.to_string()))
}

/// Layer several files; later ones override earlier ones.
pub fn load_merged<T, P>(paths: &[P]) -> ConfigResult<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let contents = paths
        .iter()
        .map(|p| -> ConfigResult<(String, FileFormat)> {
            Ok((std::fs::read_to_string(p)?, detect_format(p)?))
        })
        .collect::<ConfigResult<Vec<_>>>()?;
    let sources: Vec<(&str, FileFormat)> = contents
        .iter()
        .map(|(text, format)| (text.as_str(), *format))
        .collect();
    merge_sources(&sources)
}
