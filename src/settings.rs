use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::constants::DEFAULT_MATCH_THRESHOLD;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to open {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("settings file is empty or corrupt")]
    Empty,
    #[error("line {line}: {key} value must be enclosed in double quotes")]
    MalformedLine { key: &'static str, line: usize },
    #[error("{0} is missing or empty")]
    Missing(&'static str),
    #[error("line {line}: {key} is not a number: {value:?}")]
    InvalidNumber {
        key: &'static str,
        line: usize,
        value: String,
    },
}

/// Keys recognised in the settings file, in the order they are tested
/// against each line. A line that contains several keys sets only the first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Key {
    CascadeMain,
    CascadeEyes,
    ImageDir,
    MatchThreshold,
}

impl Key {
    const ALL: [Key; 4] = [
        Key::CascadeMain,
        Key::CascadeEyes,
        Key::ImageDir,
        Key::MatchThreshold,
    ];

    fn name(self) -> &'static str {
        match self {
            Key::CascadeMain => "CASCADE_FILE_MAIN",
            Key::CascadeEyes => "CASCADE_FILE_EYES",
            Key::ImageDir => "IMAGE_DIR",
            Key::MatchThreshold => "MATCH_THRESHOLD",
        }
    }

    fn find_in(line: &str) -> Option<Key> {
        Self::ALL.into_iter().find(|key| line.contains(key.name()))
    }
}

/// Startup configuration read from a `KEY="value"` settings file.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Haar cascade used to find faces.
    pub cascade_main: PathBuf,
    /// Secondary cascade; only checked for loadability.
    pub cascade_eyes: PathBuf,
    /// Directory of reference images.
    pub image_dir: PathBuf,
    pub match_threshold: f64,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, SettingsError> {
        if text.is_empty() {
            return Err(SettingsError::Empty);
        }

        let mut cascade_main = String::new();
        let mut cascade_eyes = String::new();
        let mut image_dir = String::new();
        let mut match_threshold = DEFAULT_MATCH_THRESHOLD;

        for (index, line) in text.lines().enumerate() {
            let Some(key) = Key::find_in(line) else {
                continue;
            };
            let line_no = index + 1;
            let value = quoted_value(line).ok_or(SettingsError::MalformedLine {
                key: key.name(),
                line: line_no,
            })?;

            match key {
                Key::CascadeMain => cascade_main = value.to_string(),
                Key::CascadeEyes => cascade_eyes = value.to_string(),
                Key::ImageDir => image_dir = value.to_string(),
                Key::MatchThreshold => {
                    match_threshold =
                        parse_threshold(value).ok_or_else(|| SettingsError::InvalidNumber {
                            key: key.name(),
                            line: line_no,
                            value: value.to_string(),
                        })?
                }
            }
        }

        Ok(Self {
            cascade_main: required(Key::CascadeMain, cascade_main)?,
            cascade_eyes: required(Key::CascadeEyes, cascade_eyes)?,
            image_dir: required(Key::ImageDir, image_dir)?,
            match_threshold,
        })
    }
}

/// A finite match threshold; NaN and infinities would disable matching.
pub fn parse_threshold(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|t| t.is_finite())
}

/// Text strictly between the first and the last double quote of `line`.
fn quoted_value(line: &str) -> Option<&str> {
    let first = line.find('"')?;
    let last = line.rfind('"')?;
    (last > first).then(|| &line[first + 1..last])
}

fn required(key: Key, value: String) -> Result<PathBuf, SettingsError> {
    if value.is_empty() {
        return Err(SettingsError::Missing(key.name()));
    }
    Ok(PathBuf::from(value))
}
