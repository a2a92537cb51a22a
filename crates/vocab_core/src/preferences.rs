//! Persisted user preferences: first-run flag and font size.
//!
//! # Invariants
//! - A missing preferences file reads as defaults (`first_run = true`, size 3).
//! - Saves replace the file atomically; readers never see a partial write.
//! - Out-of-range font levels read as the default level.

use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Font size selector shown in settings, levels 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum FontSize {
    Smallest,
    Small,
    #[default]
    Medium,
    Large,
    Largest,
}

impl FontSize {
    pub const ALL: [FontSize; 5] = [
        Self::Smallest,
        Self::Small,
        Self::Medium,
        Self::Large,
        Self::Largest,
    ];

    /// Maps a level to a size; anything outside 1..=5 becomes the default.
    pub fn from_level(level: u8) -> Self {
        match level {
            1 => Self::Smallest,
            2 => Self::Small,
            3 => Self::Medium,
            4 => Self::Large,
            5 => Self::Largest,
            _ => Self::default(),
        }
    }

    pub fn level(self) -> u8 {
        match self {
            Self::Smallest => 1,
            Self::Small => 2,
            Self::Medium => 3,
            Self::Large => 4,
            Self::Largest => 5,
        }
    }

    /// Text size in points.
    pub fn points(self) -> u8 {
        match self {
            Self::Smallest => 12,
            Self::Small => 15,
            Self::Medium => 18,
            Self::Large => 20,
            Self::Largest => 23,
        }
    }
}

impl From<u8> for FontSize {
    fn from(value: u8) -> Self {
        Self::from_level(value)
    }
}

impl From<FontSize> for u8 {
    fn from(value: FontSize) -> Self {
        value.level()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub first_run: bool,
    pub font_size: FontSize,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            first_run: true,
            font_size: FontSize::default(),
        }
    }
}

#[derive(Debug)]
pub enum PreferencesError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for PreferencesError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "preferences I/O failed at `{}`: {source}", path.display())
            }
            Self::Malformed { path, source } => {
                write!(f, "preferences at `{}` are malformed: {source}", path.display())
            }
        }
    }
}

impl Error for PreferencesError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Malformed { source, .. } => Some(source),
        }
    }
}

pub type PreferencesResult<T> = Result<T, PreferencesError>;

/// JSON-file backed preferences.
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> PreferencesResult<Preferences> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Preferences::default())
            }
            Err(source) => return Err(self.io_error(source)),
        };
        serde_json::from_str(&text).map_err(|source| PreferencesError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, preferences: &Preferences) -> PreferencesResult<()> {
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(|source| self.io_error(source))?;

        let json = serde_json::to_vec_pretty(preferences).map_err(|source| {
            PreferencesError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;
        let mut temp_file = NamedTempFile::new_in(dir).map_err(|source| self.io_error(source))?;
        temp_file
            .write_all(&json)
            .map_err(|source| self.io_error(source))?;
        temp_file
            .persist(&self.path)
            .map_err(|err| self.io_error(err.error))?;
        Ok(())
    }

    pub fn font_size(&self) -> PreferencesResult<FontSize> {
        Ok(self.load()?.font_size)
    }

    /// Stores the size for `level`; out-of-range levels store the default.
    pub fn set_font_size(&self, level: u8) -> PreferencesResult<FontSize> {
        let mut preferences = self.load()?;
        preferences.font_size = FontSize::from_level(level);
        self.save(&preferences)?;
        info!(
            "event=font_size_set module=preferences status=ok level={}",
            preferences.font_size.level()
        );
        Ok(preferences.font_size)
    }

    /// Resets the font size; the first-run flag is left untouched.
    pub fn restore_defaults(&self) -> PreferencesResult<Preferences> {
        let mut preferences = self.load()?;
        preferences.font_size = FontSize::default();
        self.save(&preferences)?;
        info!("event=preferences_restore module=preferences status=ok");
        Ok(preferences)
    }

    fn io_error(&self, source: std::io::Error) -> PreferencesError {
        PreferencesError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FontSize, Preferences, PreferencesError, PreferencesStore};

    #[test]
    fn levels_map_to_points() {
        let points: Vec<u8> = FontSize::ALL.iter().map(|size| size.points()).collect();
        assert_eq!(points, vec![12, 15, 18, 20, 23]);
    }

    #[test]
    fn out_of_range_level_is_default() {
        assert_eq!(FontSize::from_level(0), FontSize::Medium);
        assert_eq!(FontSize::from_level(9), FontSize::Medium);
        assert_eq!(FontSize::default().level(), 3);
    }

    #[test]
    fn missing_file_reads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferencesStore::new(dir.path().join("preferences.json"));
        assert_eq!(store.load().unwrap(), Preferences::default());
        assert!(store.load().unwrap().first_run);
    }

    #[test]
    fn set_and_restore_font_size() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferencesStore::new(dir.path().join("nested/preferences.json"));

        assert_eq!(store.set_font_size(5).unwrap(), FontSize::Largest);
        assert_eq!(store.font_size().unwrap().points(), 23);

        let restored = store.restore_defaults().unwrap();
        assert_eq!(restored.font_size, FontSize::Medium);
        assert_eq!(store.font_size().unwrap(), FontSize::Medium);
    }

    #[test]
    fn stored_out_of_range_level_reads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, r#"{"first_run":false,"font_size":42}"#).unwrap();

        let preferences = PreferencesStore::new(&path).load().unwrap();
        assert!(!preferences.first_run);
        assert_eq!(preferences.font_size, FontSize::Medium);
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "not json").unwrap();

        let err = PreferencesStore::new(&path).load().unwrap_err();
        assert!(matches!(err, PreferencesError::Malformed { .. }));
    }
}
