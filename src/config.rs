use serde::Deserialize;

use crate::module::layout::LayoutConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_state_file")]
    pub state_file: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default = "default_readme_file")]
    pub readme_file: String,

    #[serde(default)]
    pub github: GithubConfig,

    #[serde(default)]
    pub curseforge: CurseforgeConfig,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub badges: BadgeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_github_api_base")]
    pub api_base: String,

    /// PRs are searched by this author across all tracked repos
    #[serde(default = "default_author")]
    pub author: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Minimum spacing between PR search calls
    #[serde(default = "default_github_delay_ms")]
    pub request_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurseforgeConfig {
    #[serde(default = "default_curseforge_api_base")]
    pub api_base: String,

    /// Base of the public mod pages, used for card and badge links
    #[serde(default = "default_curseforge_site_base")]
    pub site_base: String,

    #[serde(default = "default_browser_user_agent")]
    pub user_agent: String,

    /// Minimum spacing between files-listing calls
    #[serde(default = "default_curseforge_delay_ms")]
    pub request_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// Theme names to render a board for ("dark", "light")
    #[serde(default = "default_themes")]
    pub themes: Vec<String>,

    /// Also render the top-N compact board per theme
    #[serde(default)]
    pub compact: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BadgeConfig {
    #[serde(default = "default_begin_marker")]
    pub begin_marker: String,

    #[serde(default = "default_end_marker")]
    pub end_marker: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_state_file() -> String {
    "data/mods.json".to_string()
}

fn default_output_dir() -> String {
    "assets".to_string()
}

fn default_readme_file() -> String {
    "README.md".to_string()
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_author() -> String {
    "crabsatellite".to_string()
}

fn default_user_agent() -> String {
    "modboard-status-updater".to_string()
}

fn default_github_delay_ms() -> u64 {
    1000
}

fn default_curseforge_api_base() -> String {
    "https://www.curseforge.com/api".to_string()
}

fn default_curseforge_site_base() -> String {
    "https://www.curseforge.com/minecraft/mc-mods".to_string()
}

fn default_browser_user_agent() -> String {
    // The internal files endpoint only answers browser-looking clients
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_curseforge_delay_ms() -> u64 {
    1500
}

fn default_themes() -> Vec<String> {
    vec!["dark".to_string()]
}

fn default_begin_marker() -> String {
    "<!-- mods-status:begin -->".to_string()
}

fn default_end_marker() -> String {
    "<!-- mods-status:end -->".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str("").expect("empty config must deserialize via defaults")
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: default_github_api_base(),
            author: default_author(),
            user_agent: default_user_agent(),
            request_delay_ms: default_github_delay_ms(),
        }
    }
}

impl Default for CurseforgeConfig {
    fn default() -> Self {
        Self {
            api_base: default_curseforge_api_base(),
            site_base: default_curseforge_site_base(),
            user_agent: default_browser_user_agent(),
            request_delay_ms: default_curseforge_delay_ms(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            themes: default_themes(),
            compact: false,
        }
    }
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            begin_marker: default_begin_marker(),
            end_marker: default_end_marker(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::from_file(path)
        } else {
            // Runs before logging is initialized
            eprintln!("No config file at {}, using defaults", path);
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.github.request_delay_ms, 1000);
        assert_eq!(config.curseforge.request_delay_ms, 1500);
        assert_eq!(config.layout.cards_per_row, 3);
        assert_eq!(config.render.themes, vec!["dark"]);
    }

    #[test]
    fn test_partial_override() {
        let config: AppConfig = toml::from_str(
            r#"
            state_file = "custom/mods.json"

            [github]
            author = "someone-else"

            [layout]
            total_width = 600

            [render]
            themes = ["dark", "light"]
            compact = true
            "#,
        )
        .unwrap();

        assert_eq!(config.state_file, "custom/mods.json");
        assert_eq!(config.github.author, "someone-else");
        // Untouched github fields keep their defaults
        assert_eq!(config.github.api_base, "https://api.github.com");
        assert_eq!(config.layout.total_width, 600);
        assert_eq!(config.layout.cards_per_row, 3);
        assert!(config.render.compact);
    }
}
