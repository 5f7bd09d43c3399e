//! Layered application settings.
//!
//! Sources, lowest priority first:
//!
//! 1. built-in defaults
//! 2. `config.toml` in the platform config directory, or the file given
//!    with `--config`
//! 3. `DUPESWEEP_*` environment variables (`DUPESWEEP_IO_THREADS=8`)
//! 4. command-line flags
//!
//! Size keys accept either a byte count or a string with a unit
//! (`min_size = "1MiB"`).
//!
//! ```toml
//! io_threads = 2
//! block_size = "128KiB"
//! skip_hidden = true
//! min_size = "1KB"
//! protect_last_copy = true
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Deserializer, Serialize};

use crate::actions::DeleteConfig;
use crate::cli::{parse_size, Cli};
use crate::duplicates::FinderConfig;
use crate::resolver::ResolverConfig;
use crate::scanner::{WalkerConfig, DEFAULT_BLOCK_SIZE};

/// Prefix of the environment variables read as settings.
pub const ENV_PREFIX: &str = "DUPESWEEP_";

/// Errors while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    /// A source could not be parsed or a value has the wrong type.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// Values that parse but contradict each other.
    #[error("invalid configuration: {0}")]
    Inconsistent(String),
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hash worker threads
    pub io_threads: usize,
    /// Hash read block size in bytes
    #[serde(deserialize_with = "de_size")]
    pub block_size: u64,
    /// Skip dot-files and dot-directories
    pub skip_hidden: bool,
    /// Ignore zero-byte files
    pub skip_empty: bool,
    /// Smallest file size considered
    #[serde(deserialize_with = "de_opt_size")]
    pub min_size: Option<u64>,
    /// Largest file size considered
    #[serde(deserialize_with = "de_opt_size")]
    pub max_size: Option<u64>,
    /// Only hash files whose size is shared with another file
    pub size_prefilter: bool,
    /// Simulate deletions
    pub dry_run: bool,
    /// Reject delete commands selecting every member
    pub protect_last_copy: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            io_threads: 4,
            block_size: DEFAULT_BLOCK_SIZE as u64,
            skip_hidden: false,
            skip_empty: false,
            min_size: None,
            max_size: None,
            size_prefilter: true,
            dry_run: false,
            protect_last_copy: false,
        }
    }
}

impl Settings {
    /// Load defaults, config file and environment.
    ///
    /// With `explicit` set, that file must exist. Otherwise the platform
    /// default file is used when present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a missing explicit file, unparsable
    /// sources, or contradicting values.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match explicit {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::FileNotFound(path.to_path_buf()))
            }
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path().filter(|p| p.is_file()),
        };

        if let Some(ref path) = file {
            log::debug!("Reading configuration from {}", path.display());
        }

        Self::from_figment(layered(file.as_deref(), Env::prefixed(ENV_PREFIX)))
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let settings: Self = figment.extract().map_err(Box::new)?;
        settings.normalized()
    }

    /// Apply command-line flags on top of the loaded settings.
    ///
    /// Boolean flags can only switch a behavior on (or, for
    /// `--no-size-prefilter`, off); leaving them out keeps the lower layer.
    #[must_use]
    pub fn with_cli_overrides(mut self, cli: &Cli) -> Self {
        if let Some(threads) = cli.io_threads {
            self.io_threads = threads;
        }
        if let Some(block_size) = cli.block_size {
            self.block_size = block_size;
        }
        if cli.min_size.is_some() {
            self.min_size = cli.min_size;
        }
        if cli.max_size.is_some() {
            self.max_size = cli.max_size;
        }
        self.skip_hidden |= cli.skip_hidden;
        self.skip_empty |= cli.skip_empty;
        self.dry_run |= cli.dry_run;
        self.protect_last_copy |= cli.protect_last_copy;
        if cli.no_size_prefilter {
            self.size_prefilter = false;
        }
        self
    }

    /// Clamp values and check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Inconsistent`] when `min_size > max_size`.
    pub fn normalized(mut self) -> Result<Self, ConfigError> {
        self.io_threads = self.io_threads.max(1);
        self.block_size = self
            .block_size
            .max(crate::scanner::hasher::MIN_BLOCK_SIZE as u64);

        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min > max {
                return Err(ConfigError::Inconsistent(format!(
                    "min_size ({}) is larger than max_size ({})",
                    min, max
                )));
            }
        }
        Ok(self)
    }

    /// Walker settings.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(
            self.skip_hidden,
            self.skip_empty,
            self.min_size,
            self.max_size,
        )
    }

    /// Finder settings (without shutdown flag or progress reporting).
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_io_threads(self.io_threads)
            .with_block_size(usize::try_from(self.block_size).unwrap_or(usize::MAX))
            .with_size_prefilter(self.size_prefilter)
            .with_walker_config(self.walker_config())
    }

    /// Resolver settings.
    #[must_use]
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::default()
            .with_delete_config(DeleteConfig::default().with_dry_run(self.dry_run))
            .with_protect_last_copy(self.protect_last_copy)
    }
}

/// Platform default location of `config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dupesweep").map(|dirs| dirs.config_dir().join("config.toml"))
}

fn layered(file: Option<&Path>, env: Env) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Settings::default()));
    if let Some(path) = file {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSize {
    Bytes(u64),
    Text(String),
}

impl RawSize {
    fn into_bytes<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            Self::Bytes(n) => Ok(n),
            Self::Text(s) => parse_size(&s).map_err(E::custom),
        }
    }
}

fn de_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    RawSize::deserialize(deserializer)?.into_bytes()
}

fn de_opt_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Option::<RawSize>::deserialize(deserializer)?
        .map(RawSize::into_bytes)
        .transpose()
}
