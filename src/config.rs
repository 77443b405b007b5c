use crate::ranking::{DateParser, DEFAULT_DATE_FORMAT};
use crate::snapshot::SnapshotTarget;
use crate::stopwords::StopwordSet;
use crate::tokenizer::{Preprocessor, TokenizerKind};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where stopwords come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopwordSource {
    None,
    English,
    File(PathBuf),
}

impl StopwordSource {
    pub fn load(&self) -> StopwordSet {
        match self {
            StopwordSource::None => StopwordSet::empty(),
            StopwordSource::English => StopwordSet::english(),
            StopwordSource::File(path) => StopwordSet::load(path),
        }
    }
}

/// Engine configuration. Every field has a default, so a config file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    pub stopwords: StopwordSource,
    pub tokenizer: TokenizerKind,
    /// `None` disables the snapshot
    pub snapshot: Option<SnapshotTarget>,
    pub date_format: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            stopwords: StopwordSource::File(PathBuf::from("vietnamese-stopwords-dash.txt")),
            tokenizer: TokenizerKind::Simple,
            snapshot: Some(SnapshotTarget::json("index.json")),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Config for a corpus directory with no stopwords and no snapshot.
    pub fn bare<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
            stopwords: StopwordSource::None,
            snapshot: None,
            ..Self::default()
        }
    }

    /// Point the snapshot at `path`, keeping a configured format.
    pub fn set_snapshot_path<P: Into<PathBuf>>(&mut self, path: P) {
        let path = path.into();
        match &mut self.snapshot {
            Some(target) => target.path = path,
            None => self.snapshot = Some(SnapshotTarget::json(path)),
        }
    }

    pub fn preprocessor(&self) -> Preprocessor {
        Preprocessor::with_kind(self.tokenizer, self.stopwords.load())
    }

    pub fn date_parser(&self) -> DateParser {
        DateParser::new(self.date_format.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotFormat;

    #[test]
    fn test_partial_config_uses_defaults() -> Result<()> {
        let config: EngineConfig = serde_json::from_str(
            r#"{"data_dir": "corpus", "tokenizer": "segmenting", "stopwords": "english"}"#,
        )?;
        assert_eq!(config.data_dir, PathBuf::from("corpus"));
        assert_eq!(config.tokenizer, TokenizerKind::Segmenting);
        assert_eq!(config.stopwords, StopwordSource::English);
        assert_eq!(config.date_format, DEFAULT_DATE_FORMAT);
        Ok(())
    }

    #[test]
    fn test_snapshot_and_stopword_file() -> Result<()> {
        let config: EngineConfig = serde_json::from_str(
            r#"{
                "stopwords": {"file": "stop.txt"},
                "snapshot": {"path": "out.bin", "format": "bincode"}
            }"#,
        )?;
        assert_eq!(config.stopwords, StopwordSource::File(PathBuf::from("stop.txt")));
        let snapshot = config.snapshot.expect("snapshot configured");
        assert_eq!(snapshot.format, SnapshotFormat::Bincode);
        Ok(())
    }

    #[test]
    fn test_snapshot_path_override_keeps_format() -> Result<()> {
        let mut config: EngineConfig = serde_json::from_str(
            r#"{"snapshot": {"path": "out.bin", "format": "bincode"}}"#,
        )?;
        config.set_snapshot_path("elsewhere.bin");
        let snapshot = config.snapshot.expect("snapshot configured");
        assert_eq!(snapshot.path, PathBuf::from("elsewhere.bin"));
        assert_eq!(snapshot.format, SnapshotFormat::Bincode);

        let mut config = EngineConfig::bare("corpus");
        config.set_snapshot_path("index.json");
        let snapshot = config.snapshot.expect("snapshot enabled");
        assert_eq!(snapshot.format, SnapshotFormat::Json);
        Ok(())
    }

    #[test]
    fn test_snapshot_disabled() -> Result<()> {
        let config: EngineConfig = serde_json::from_str(r#"{"snapshot": null}"#)?;
        assert!(config.snapshot.is_none());
        Ok(())
    }

    #[test]
    fn test_from_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"date_format": "%Y-%m-%d"}"#)?;
        let config = EngineConfig::from_file(&path)?;
        assert_eq!(config.date_format, "%Y-%m-%d");
        assert!(EngineConfig::from_file(dir.path().join("missing.json")).is_err());
        Ok(())
    }
}
