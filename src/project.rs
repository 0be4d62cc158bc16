//! Typed paths and persistence for a project directory.
//!
//! Centralizing path construction keeps file access consistent across the
//! commands and prevents drift when the layout evolves. The orchestrator owns
//! none of this state; the CLI loads a snapshot, runs an operation, and
//! persists the result collection it gets back.
use crate::constraints::ConstraintSet;
use crate::lexicon::{LexiconEntry, SoundChangeRule};
use crate::phonology::PhonologyConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Current schema version for `config.json`.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Pack-owned project configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub schema_version: u32,

    /// Endpoint of the generative service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_endpoint: Option<String>,

    /// Optional model selector forwarded to the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Convenience wrapper for locating project artifacts.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn lexicon_path(&self) -> PathBuf {
        self.root.join("lexicon.json")
    }

    pub fn constraints_path(&self) -> PathBuf {
        self.root.join("constraints.json")
    }

    pub fn rules_path(&self) -> PathBuf {
        self.root.join("rules.json")
    }

    pub fn phonology_path(&self) -> PathBuf {
        self.root.join("phonology.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn oplog_path(&self) -> PathBuf {
        self.root.join("oplog.jsonl")
    }

    /// Load the authoritative lexicon collection.
    pub fn load_lexicon(&self) -> Result<Vec<LexiconEntry>> {
        let path = self.lexicon_path();
        let text = fs::read_to_string(&path).with_context(|| {
            format!(
                "read {} (run `lexforge init --project <dir>` first?)",
                path.display()
            )
        })?;
        serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))
    }

    /// Persist the result collection, pretty-printed for diffability.
    pub fn save_lexicon(&self, lexicon: &[LexiconEntry]) -> Result<()> {
        let path = self.lexicon_path();
        let text = serde_json::to_string_pretty(lexicon).context("serialize lexicon")?;
        fs::write(&path, text).with_context(|| format!("write {}", path.display()))
    }

    /// Load constraints; a missing file means an unconstrained project.
    pub fn load_constraints(&self) -> Result<ConstraintSet> {
        let path = self.constraints_path();
        if !path.is_file() {
            return Ok(ConstraintSet::default());
        }
        let text =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))
    }

    /// Load sound change rules; a missing file means no rules.
    pub fn load_rules(&self) -> Result<Vec<SoundChangeRule>> {
        let path = self.rules_path();
        if !path.is_file() {
            return Ok(Vec::new());
        }
        let text =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))
    }

    /// Load the phonology inventory; None when it has not been generated.
    pub fn load_phonology(&self) -> Result<Option<PhonologyConfig>> {
        let path = self.phonology_path();
        if !path.is_file() {
            return Ok(None);
        }
        let text =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&text)
            .map(Some)
            .with_context(|| format!("parse {}", path.display()))
    }

    pub fn save_phonology(&self, phonology: &PhonologyConfig) -> Result<()> {
        let path = self.phonology_path();
        let text = serde_json::to_string_pretty(phonology).context("serialize phonology")?;
        fs::write(&path, text).with_context(|| format!("write {}", path.display()))
    }

    pub fn load_config(&self) -> Result<ProjectConfig> {
        let path = self.config_path();
        if !path.is_file() {
            return Ok(ProjectConfig::default());
        }
        let text =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))
    }

    /// Bootstrap a project directory with empty stubs.
    ///
    /// Refuses to overwrite an existing lexicon unless forced.
    pub fn init(&self, force: bool) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("create {}", self.root.display()))?;

        if self.lexicon_path().is_file() && !force {
            return Err(anyhow!(
                "{} already exists (use --force to overwrite)",
                self.lexicon_path().display()
            ));
        }

        self.save_lexicon(&[])?;
        let constraints = serde_json::to_string_pretty(&ConstraintSet::default())
            .context("serialize constraints stub")?;
        fs::write(self.constraints_path(), constraints)
            .with_context(|| format!("write {}", self.constraints_path().display()))?;
        fs::write(self.rules_path(), "[]")
            .with_context(|| format!("write {}", self.rules_path().display()))?;
        let config = serde_json::to_string_pretty(&ProjectConfig {
            schema_version: CONFIG_SCHEMA_VERSION,
            service_endpoint: None,
            model: None,
        })
        .context("serialize config stub")?;
        fs::write(self.config_path(), config)
            .with_context(|| format!("write {}", self.config_path().display()))?;
        Ok(())
    }
}

/// Resolve the service endpoint and model.
///
/// Priority order: CLI flag, then project `config.json`, then the
/// `LEXFORGE_ENDPOINT` / `LEXFORGE_MODEL` environment variables.
pub fn resolve_service_config(
    paths: &ProjectPaths,
    endpoint_flag: Option<&str>,
    model_flag: Option<&str>,
) -> Result<(String, Option<String>)> {
    let config = paths.load_config()?;

    let endpoint = endpoint_flag
        .map(|s| s.to_string())
        .or(config.service_endpoint)
        .or_else(|| std::env::var("LEXFORGE_ENDPOINT").ok())
        .ok_or_else(|| {
            anyhow!(
                "no service endpoint configured; pass --endpoint, set service_endpoint in {}, \
                 or export LEXFORGE_ENDPOINT",
                paths.config_path().display()
            )
        })?;

    let model = model_flag
        .map(|s| s.to_string())
        .or(config.model)
        .or_else(|| std::env::var("LEXFORGE_MODEL").ok());

    Ok((endpoint, model))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_stubs_and_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProjectPaths::new(dir.path().join("proj"));

        paths.init(false).unwrap();
        assert!(paths.lexicon_path().is_file());
        assert!(paths.constraints_path().is_file());
        assert!(paths.rules_path().is_file());
        assert!(paths.config_path().is_file());

        assert!(paths.init(false).is_err());
        assert!(paths.init(true).is_ok());
    }

    #[test]
    fn lexicon_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProjectPaths::new(dir.path().to_path_buf());
        let lexicon = vec![LexiconEntry::new_generated(
            "kava".to_string(),
            "ˈka.va".to_string(),
        )];

        paths.save_lexicon(&lexicon).unwrap();
        assert_eq!(paths.load_lexicon().unwrap(), lexicon);
    }

    #[test]
    fn missing_optional_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProjectPaths::new(dir.path().to_path_buf());
        assert_eq!(paths.load_constraints().unwrap(), ConstraintSet::default());
        assert!(paths.load_rules().unwrap().is_empty());
        assert!(paths.load_phonology().unwrap().is_none());
    }

    #[test]
    fn phonology_round_trips_through_the_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProjectPaths::new(dir.path().to_path_buf());
        let phonology = PhonologyConfig {
            name: "Thalassic".to_string(),
            description: "a flowing coastal language".to_string(),
            ..Default::default()
        };

        paths.save_phonology(&phonology).unwrap();
        assert_eq!(paths.load_phonology().unwrap(), Some(phonology));
    }

    #[test]
    fn endpoint_flag_wins_over_config() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProjectPaths::new(dir.path().to_path_buf());
        let config = ProjectConfig {
            schema_version: CONFIG_SCHEMA_VERSION,
            service_endpoint: Some("http://config.example/generate".to_string()),
            model: Some("small".to_string()),
        };
        fs::write(
            paths.config_path(),
            serde_json::to_string(&config).unwrap(),
        )
        .unwrap();

        let (endpoint, model) =
            resolve_service_config(&paths, Some("http://flag.example/generate"), None).unwrap();
        assert_eq!(endpoint, "http://flag.example/generate");
        assert_eq!(model.as_deref(), Some("small"));

        let (endpoint, _) = resolve_service_config(&paths, None, None).unwrap();
        assert_eq!(endpoint, "http://config.example/generate");
    }
}
