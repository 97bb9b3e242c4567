use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment override for the ownership file location.
pub const CONFIG_PATH_ENV: &str = "BLAME_CONFIG_PATH";

/// Default ownership file, looked up next to the executable.
pub const DEFAULT_CONFIG_FILE: &str = "owners-example.yaml";

// File-format shapes. Field names are capitalized as they appear in the YAML
// document; the Package/Packages split exists only at this boundary.
#[derive(Debug, Deserialize)]
struct OwnersFile {
    #[serde(rename = "Owners", default)]
    owners: Option<Vec<OwnerEntry>>,
}

#[derive(Debug, Deserialize)]
struct OwnerEntry {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Package", default)]
    package: Option<String>,
    #[serde(rename = "Packages", default)]
    packages: Option<Vec<String>>,
}

/// An owning entity and the projects it claims, flattened at load time.
#[derive(Debug, Clone)]
pub struct Owner {
    pub name: String,
    pub projects: Vec<String>,
}

impl Owner {
    fn from_entry(entry: OwnerEntry) -> Self {
        let mut projects = Vec::new();
        if let Some(package) = entry.package {
            projects.push(package);
        }
        if let Some(packages) = entry.packages {
            projects.extend(packages);
        }
        Owner {
            name: entry.name,
            projects,
        }
    }

    pub fn owns(&self, project: &str) -> bool {
        self.projects.iter().any(|p| p == project)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read ownership file {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse ownership file {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("could not find owners in config")]
    NoOwners,
}

/// Outcome of the one-time startup load. Constructed once, never mutated;
/// a `Failed` state is terminal for the process lifetime.
#[derive(Debug)]
pub enum ConfigState {
    Loaded {
        owners: Vec<Owner>,
        projects: Vec<String>,
    },
    Failed(ConfigError),
}

impl ConfigState {
    /// Every project identifier declared in the ownership file, in file
    /// order. Empty when the load failed.
    pub fn projects(&self) -> &[String] {
        match self {
            ConfigState::Loaded { projects, .. } => projects,
            ConfigState::Failed(_) => &[],
        }
    }
}

/// Resolve the ownership file path: `BLAME_CONFIG_PATH` if set, otherwise
/// the bundled default next to the executable.
pub fn resolve_path() -> PathBuf {
    match env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => default_path(),
    }
}

fn default_path() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_CONFIG_FILE)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load and validate the ownership file. Never fails outright: read, parse,
/// and validation errors are all captured in the returned state so lookups
/// can degrade instead of the process dying.
pub fn load(path: &Path) -> ConfigState {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(source) => {
            return ConfigState::Failed(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let file: OwnersFile = match serde_yaml::from_str(&contents) {
        Ok(file) => file,
        Err(source) => {
            return ConfigState::Failed(ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let entries = file.owners.unwrap_or_default();
    if entries.is_empty() {
        return ConfigState::Failed(ConfigError::NoOwners);
    }

    let owners: Vec<Owner> = entries.into_iter().map(Owner::from_entry).collect();
    let projects: Vec<String> = owners
        .iter()
        .flat_map(|owner| owner.projects.iter().cloned())
        .collect();

    ConfigState::Loaded { owners, projects }
}
