//! Parameter profiles.
//!
//! A profile is a partial set of build parameters. The effective parameters
//! are built by layering, lowest first: built-in defaults, the user
//! defaults file, a project profile, then command line flags. Each layer
//! only overrides the fields it sets.
//!
//! Profiles ending in `.json` are read and written as JSON, anything else
//! as TOML.

use crate::bundler::{
    SettingsBuilder,
    settings::{
        DEFAULT_COPY_EXCLUDE_PATTERNS, DEFAULT_HOST_INTERPRETER, DEFAULT_PACKAGING_EXCLUDE_PATTERNS,
        DEFAULT_SHEBANG, DEFAULT_TARGET_NAME,
    },
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory under the user config dir holding the defaults file.
pub const CONFIG_DIR_NAME: &str = "zipapp_bundler";

/// User defaults file name.
pub const DEFAULTS_FILE_NAME: &str = "defaults.toml";

/// A partial parameter set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shebang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_from_copy: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_from_packaging: Option<Vec<String>>,
    /// Interpreter that runs the package manager.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_py: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pip_index_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup_dependencies: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_extract: Option<bool>,
    /// Whether to write the `.vbs` launcher.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_script: Option<bool>,
    /// Interpreter command written into the launcher.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_script_py: Option<String>,
}

impl Profile {
    /// The built-in defaults, every field set except the source, entry,
    /// manifest and index URL.
    pub fn defaults() -> Self {
        Self {
            source: None,
            entry: None,
            target: Some(DEFAULT_TARGET_NAME.to_string()),
            shebang: Some(DEFAULT_SHEBANG.to_string()),
            compressed: Some(true),
            exclude_from_copy: Some(to_strings(DEFAULT_COPY_EXCLUDE_PATTERNS)),
            exclude_from_packaging: Some(to_strings(DEFAULT_PACKAGING_EXCLUDE_PATTERNS)),
            host_py: Some(DEFAULT_HOST_INTERPRETER.to_string()),
            requirements: None,
            pip_index_url: None,
            cleanup_dependencies: Some(true),
            self_extract: Some(false),
            start_script: Some(false),
            start_script_py: Some(DEFAULT_HOST_INTERPRETER.to_string()),
        }
    }

    /// Layers `over` on top of `self`; fields set in `over` win.
    pub fn merge(self, over: Profile) -> Profile {
        Profile {
            source: over.source.or(self.source),
            entry: over.entry.or(self.entry),
            target: over.target.or(self.target),
            shebang: over.shebang.or(self.shebang),
            compressed: over.compressed.or(self.compressed),
            exclude_from_copy: over.exclude_from_copy.or(self.exclude_from_copy),
            exclude_from_packaging: over.exclude_from_packaging.or(self.exclude_from_packaging),
            host_py: over.host_py.or(self.host_py),
            requirements: over.requirements.or(self.requirements),
            pip_index_url: over.pip_index_url.or(self.pip_index_url),
            cleanup_dependencies: over.cleanup_dependencies.or(self.cleanup_dependencies),
            self_extract: over.self_extract.or(self.self_extract),
            start_script: over.start_script.or(self.start_script),
            start_script_py: over.start_script_py.or(self.start_script_py),
        }
    }

    /// Reads a profile, choosing the format by extension.
    pub fn load(path: &Path) -> Result<Profile> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;

        let profile = if is_json(path) {
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse JSON profile {}", path.display()))?
        } else {
            toml::from_str(&text)
                .with_context(|| format!("Failed to parse TOML profile {}", path.display()))?
        };

        log::debug!("Loaded profile {}", path.display());
        Ok(profile)
    }

    /// Writes the profile, choosing the format by extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = if is_json(path) {
            serde_json::to_string_pretty(self).context("Failed to serialize profile to JSON")?
        } else {
            self.to_toml()?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write profile {}", path.display()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize profile to TOML")
    }

    /// Turns the profile into a settings builder; unset fields keep the
    /// builder's defaults.
    pub fn to_builder(&self) -> SettingsBuilder {
        let mut builder = SettingsBuilder::new();

        if let Some(source) = &self.source {
            builder = builder.source(source);
        }
        if let Some(entry) = &self.entry {
            builder = builder.entry(entry.as_str());
        }
        if let Some(target) = &self.target {
            builder = builder.target(target.as_str());
        }
        if let Some(shebang) = &self.shebang {
            builder = builder.shebang(shebang.as_str());
        }
        if let Some(compressed) = self.compressed {
            builder = builder.compressed(compressed);
        }
        if let Some(patterns) = &self.exclude_from_copy {
            builder = builder.exclude_from_copy(patterns.iter().cloned());
        }
        if let Some(patterns) = &self.exclude_from_packaging {
            builder = builder.exclude_from_packaging(patterns.iter().cloned());
        }
        if let Some(python) = &self.host_py {
            builder = builder.python(python.as_str());
        }
        if let Some(requirements) = &self.requirements {
            builder = builder.requirements(requirements);
        }
        if let Some(url) = &self.pip_index_url {
            builder = builder.index_url(url.as_str());
        }
        if let Some(cleanup) = self.cleanup_dependencies {
            builder = builder.cleanup_dependencies(cleanup);
        }
        if let Some(self_extract) = self.self_extract {
            builder = builder.self_extract(self_extract);
        }
        if let Some(launcher) = self.start_script {
            builder = builder.launcher(launcher);
        }
        if let Some(python) = &self.start_script_py {
            builder = builder.launcher_python(python.as_str());
        }

        builder
    }
}

/// `<config dir>/zipapp_bundler/defaults.toml`, if the platform has a config dir.
pub fn user_defaults_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(DEFAULTS_FILE_NAME))
}

/// Loads the user defaults file.
///
/// An explicitly named file must exist; the implicit one is optional.
pub fn load_user_defaults(explicit: Option<&Path>) -> Result<Option<Profile>> {
    match explicit {
        Some(path) => Profile::load(path).map(Some),
        None => match user_defaults_path() {
            Some(path) if path.is_file() => Profile::load(&path).map(Some),
            _ => Ok(None),
        },
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_layer_overrides_only_what_it_sets() {
        let project = Profile {
            entry: Some("app:main".into()),
            compressed: Some(false),
            ..Default::default()
        };
        let merged = Profile::defaults().merge(project);

        assert_eq!(merged.entry.as_deref(), Some("app:main"));
        assert_eq!(merged.compressed, Some(false));
        assert_eq!(merged.target.as_deref(), Some(DEFAULT_TARGET_NAME));
        assert_eq!(merged.cleanup_dependencies, Some(true));
    }

    #[test]
    fn toml_and_json_profiles_load_the_same_fields() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("p.toml");
        std::fs::write(
            &toml_path,
            "entry = \"app:main\"\nstart_script = true\nexclude_from_copy = [\"*.log\"]\n",
        )
        .unwrap();

        let json_path = dir.path().join("p.json");
        std::fs::write(
            &json_path,
            r#"{"entry": "app:main", "start_script": true, "exclude_from_copy": ["*.log"]}"#,
        )
        .unwrap();

        let from_toml = Profile::load(&toml_path).unwrap();
        let from_json = Profile::load(&json_path).unwrap();
        assert_eq!(from_toml, from_json);
        assert_eq!(from_toml.start_script, Some(true));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.toml");
        std::fs::write(&path, "entyr = \"typo\"\n").unwrap();
        assert!(Profile::load(&path).is_err());
    }

    #[test]
    fn saved_profile_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/saved.json");
        let profile = Profile::defaults().merge(Profile {
            pip_index_url: Some("https://mirror.example/simple".into()),
            ..Default::default()
        });

        profile.save(&path).unwrap();
        assert_eq!(Profile::load(&path).unwrap(), profile);
    }

    #[test]
    fn missing_explicit_defaults_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_user_defaults(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
