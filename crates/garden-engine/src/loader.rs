//! Plant definition loading.
//!
//! Reads every `*.json` file in a directory into a [`DefinitionRegistry`].
//! A bad file is logged and counted; it never stops the others loading.

use std::fs;
use std::path::{Path, PathBuf};

use garden_sim::{DefinitionError, DefinitionRegistry, PlantDefinition};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while loading a definition file.
#[derive(Debug, Error)]
pub enum DefinitionLoadError {
    /// Failed to read a file or the directory.
    #[error("Failed to read definition file: {0}")]
    Io(#[from] std::io::Error),

    /// The file parsed but was rejected, or its species was taken.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// Result type for definition loading operations.
pub type DefinitionLoadResult<T> = Result<T, DefinitionLoadError>;

/// Statistics for the definition loader.
#[derive(Debug, Default, Clone)]
pub struct LoaderStats {
    /// Number of files that produced a species.
    pub files_loaded: u32,
    /// Number of files rejected.
    pub files_rejected: u32,
}

/// Loads plant definitions from a directory.
#[derive(Debug)]
pub struct DefinitionLoader {
    base_path: PathBuf,
    registry: DefinitionRegistry,
    stats: LoaderStats,
}

impl DefinitionLoader {
    /// Creates a new loader for a directory.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            registry: DefinitionRegistry::new(),
            stats: LoaderStats::default(),
        }
    }

    /// Returns the base path.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the loaded registry.
    #[must_use]
    pub fn registry(&self) -> &DefinitionRegistry {
        &self.registry
    }

    /// Returns loader statistics.
    #[must_use]
    pub fn stats(&self) -> &LoaderStats {
        &self.stats
    }

    /// Consumes the loader, returning its registry.
    #[must_use]
    pub fn into_registry(self) -> DefinitionRegistry {
        self.registry
    }

    /// Loads all definitions from the base path.
    ///
    /// A missing directory is not an error; it just loads nothing.
    pub fn load_all(&mut self) -> DefinitionLoadResult<()> {
        if !self.base_path.exists() {
            warn!(
                "Definition directory {} does not exist",
                self.base_path.display()
            );
            return Ok(());
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.base_path)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        // read_dir order is platform-defined; duplicates resolve by file name.
        paths.sort();

        for path in paths {
            match self.load_file(&path) {
                Ok(species) => {
                    info!("Loaded plant {species} from {}", path.display());
                    self.stats.files_loaded += 1;
                },
                Err(e) => {
                    warn!("Failed to load definition file {}: {e}", path.display());
                    self.stats.files_rejected += 1;
                },
            }
        }

        info!(
            "Loaded {} plant definitions ({} rejected) from {}",
            self.stats.files_loaded,
            self.stats.files_rejected,
            self.base_path.display()
        );

        Ok(())
    }

    /// Loads and registers a single definition file, returning its species.
    pub fn load_file(&mut self, path: &Path) -> DefinitionLoadResult<String> {
        debug!("Loading definition file: {}", path.display());

        let content = fs::read_to_string(path)?;
        let definition = PlantDefinition::from_json_str(&content)?;
        let species = definition.species.clone();
        self.registry.register(definition)?;
        Ok(species)
    }
}
