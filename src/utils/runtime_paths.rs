//! Locates user-provided files (`.env`, `preshow.toml`, default configs) next to the
//! executable, in its parent directories, or in the working directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const THEATRE_CONFIG_FILE: &str = "theatre_config.yaml";
pub const SHOW_INFO_FILE: &str = "show_info.json";
pub const SETTINGS_FILE: &str = "preshow.toml";

#[derive(Debug, Clone)]
pub struct RuntimePaths {
    roots: Vec<PathBuf>,
}

impl RuntimePaths {
    /// Executable directory and its ancestors first, then the working directory.
    pub fn discover() -> Self {
        let mut roots = Vec::new();
        if let Ok(exe) = std::env::current_exe() {
            let exe = exe.canonicalize().unwrap_or(exe);
            roots.extend(exe.ancestors().skip(1).map(Path::to_path_buf));
        }
        if let Ok(cwd) = std::env::current_dir() {
            roots.push(cwd);
        }
        Self::from_roots(roots)
    }

    pub fn from_roots<I: IntoIterator<Item = PathBuf>>(roots: I) -> Self {
        let mut seen = HashSet::new();
        let roots = roots
            .into_iter()
            .filter(|root| seen.insert(root.clone()))
            .collect();
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn find_nearby(&self, target: &str, is_dir: bool) -> Option<PathBuf> {
        self.roots.iter().map(|root| root.join(target)).find(|candidate| {
            if is_dir {
                candidate.is_dir()
            } else {
                candidate.is_file()
            }
        })
    }

    pub fn env_file(&self) -> Option<PathBuf> {
        self.find_nearby(".env", false)
    }

    pub fn settings_file(&self) -> Option<PathBuf> {
        self.find_nearby(SETTINGS_FILE, false)
    }

    /// A top-level `config/` directory wins over the bundled `data/examples/`.
    pub fn default_config_dir(&self) -> PathBuf {
        if let Some(dir) = self.find_nearby("config", true) {
            return dir;
        }
        self.find_nearby("data/examples", true)
            .unwrap_or_else(|| PathBuf::from("data").join("examples"))
    }

    pub fn default_config_paths(&self) -> (PathBuf, PathBuf) {
        let dir = self.default_config_dir();
        (dir.join(THEATRE_CONFIG_FILE), dir.join(SHOW_INFO_FILE))
    }

    /// Loads the nearest `.env` into the process environment. Existing variables win.
    pub fn load_env(&self) -> Option<PathBuf> {
        let path = self.env_file()?;
        match dotenvy::from_path(&path) {
            Ok(()) => {
                tracing::debug!("Loaded environment from {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::warn!("⚠️ Could not load {}: {}", path.display(), e);
                None
            }
        }
    }
}
