use markdown_layout_engine::layout::{DEFAULT_CACHE_CAPACITY, LayoutCache, LayoutSolver, Theme};
use markdown_layout_engine::parsing::{DEFAULT_MAX_DEPTH, MarkdownParser};
use markdown_layout_engine::plugins::{
    AstPlugin, DetailsExtractionPlugin, DiagramExtractionPlugin, MathExtractionPlugin,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Rewrite plugins that can be named in the `[parser]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    Details,
    Diagram,
    Math,
}

impl PluginKind {
    pub fn plugin(self) -> Box<dyn AstPlugin> {
        match self {
            PluginKind::Details => Box::new(DetailsExtractionPlugin),
            PluginKind::Diagram => Box::new(DiagramExtractionPlugin),
            PluginKind::Math => Box::new(MathExtractionPlugin),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub max_depth: usize,
    /// Applied in listed order.
    pub plugins: Vec<PluginKind>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            plugins: vec![PluginKind::Details, PluginKind::Diagram, PluginKind::Math],
        }
    }
}

/// Everything a host needs to stand up a parser and a layout solver.
///
/// Every table and key is optional; anything missing falls back to the
/// built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parser: ParserConfig,
    pub cache: CacheConfig,
    pub theme: Theme,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            log::debug!("No config at {}", config_path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        log::debug!(
            "Loaded config from {} ({} plugins, cache capacity {})",
            config_path.display(),
            config.parser.plugins.len(),
            config.cache.capacity
        );
        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Loads the user config, or the defaults when there is none.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Ok(Self::load()?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markdown-layout");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn plugins(&self) -> Vec<Box<dyn AstPlugin>> {
        self.parser.plugins.iter().map(|kind| kind.plugin()).collect()
    }

    pub fn parser(&self) -> MarkdownParser {
        MarkdownParser::new(self.plugins()).with_max_depth(self.parser.max_depth)
    }

    pub fn cache(&self) -> Arc<LayoutCache> {
        Arc::new(LayoutCache::new(self.cache.capacity))
    }

    /// A solver over a fresh cache sized from `[cache]`.
    pub fn solver(&self) -> LayoutSolver {
        LayoutSolver::new(self.theme.clone()).with_cache(self.cache())
    }
}
