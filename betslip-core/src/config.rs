use crate::error::SlipError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_max_pages() -> usize {
    2
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn rules(names: &[&str]) -> Vec<RuleConfig> {
    names
        .iter()
        .map(|name| RuleConfig {
            name: name.to_string(),
            enabled: true,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingConfig {
    #[serde(default)]
    pub scanner: ScannerConfig,
    /// Glyphs and currency codes shared by block collection and field resolution
    #[serde(default)]
    pub markers: MarkerConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub blocks: BlockConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Stop scanning pages once both teams and both houses are known
    #[serde(default = "default_true")]
    pub early_exit: bool,
}

/// One named strategy in an ordered fallback chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Name of the strategy
    pub name: String,
    /// Whether this strategy is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Only the first pages carry the slip; the rest is filler
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    /// Rewrite `1,85` as `1.85` and drop thousands separators from `1,234.50`
    #[serde(default = "default_true")]
    pub normalize_decimal_separators: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            normalize_decimal_separators: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub currency_markers: Vec<String>,
    pub bullet_glyphs: Vec<String>,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            currency_markers: strings(&["USD", "BRL"]),
            bullet_glyphs: strings(&["●", "○"]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Literal that marks the event date row
    pub event_markers: Vec<String>,
    /// Characters separating the two team names
    pub team_separators: Vec<String>,
    /// Rows containing any of these are never the teams row
    pub team_excluded_markers: Vec<String>,
    /// Lowercase keywords identifying the sport / league row
    pub sport_keywords: Vec<String>,
    pub date_strategies: Vec<RuleConfig>,
    pub teams_strategies: Vec<RuleConfig>,
    pub sport_strategies: Vec<RuleConfig>,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            event_markers: strings(&["Evento"]),
            team_separators: strings(&["–", "—"]),
            team_excluded_markers: strings(&["ROI", "Evento"]),
            sport_keywords: strings(&[
                "futebol",
                "football",
                "soccer",
                "basquete",
                "basketball",
                "tênis",
                "tennis",
                "hóquei",
                "hockey",
            ]),
            date_strategies: rules(&["EventoIsoTimestamp", "EventoDayFirst"]),
            teams_strategies: rules(&["DashSeparator", "HyphenSeparator", "VersusSeparator"]),
            sport_strategies: rules(&["SlashSeparatedSport"]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockConfig {
    /// Hard cap on lines absorbed into one bet block, first line included
    pub max_block_lines: usize,
    /// Slots in the output record; extra legs are discarded
    pub max_bets: usize,
    /// Rows that end a block and never start one
    pub section_keywords: Vec<String>,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            max_block_lines: 4,
            max_bets: 2,
            section_keywords: strings(&[
                "Aposta total",
                "Mostrar",
                "Use sua",
                "Arredondar",
                "Total stake",
                "Show",
                "Use your",
                "Round to",
            ]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Decimal odds convention range
    pub odd_min: f64,
    pub odd_max: f64,
    /// Profit candidates must stay below this value
    pub profit_ceiling: f64,
    /// Bare decimals above this in the description are truncated stakes
    pub stake_artifact_threshold: f64,
    /// Discard a block that yields no odd
    pub require_odd: bool,
    pub regional_suffixes: Vec<String>,
    /// Glyphs removed from the bet description
    pub decorative_glyphs: Vec<String>,
    pub odd_strategies: Vec<RuleConfig>,
    pub stake_strategies: Vec<RuleConfig>,
    pub profit_strategies: Vec<RuleConfig>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            odd_min: 1.0,
            odd_max: 50.0,
            profit_ceiling: 100.0,
            stake_artifact_threshold: 100.0,
            require_odd: true,
            regional_suffixes: strings(&["(BR)"]),
            decorative_glyphs: strings(&["●", "○", "〉", "\u{f35d}"]),
            odd_strategies: rules(&["RangedRightmost", "Rightmost"]),
            stake_strategies: rules(&["AmountBeforeCurrency", "CurrencyBeforeAmount"]),
            profit_strategies: rules(&["SmallestDistinctTrailing", "AfterStake"]),
        }
    }
}

/// Equivalence class of house spellings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasGroupConfig {
    pub canonical: String,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Houses appended to the built-in catalog
    #[serde(default)]
    pub extra_houses: Vec<String>,
    /// Alias groups appended to the built-in table
    #[serde(default)]
    pub extra_aliases: Vec<AliasGroupConfig>,
    /// Accept capitalized runs followed by a descriptor and an odd as houses
    #[serde(default = "default_true")]
    pub heuristic_detection: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            extra_houses: Vec::new(),
            extra_aliases: Vec::new(),
            heuristic_detection: true,
        }
    }
}

impl ParsingConfig {
    /// Load config from file path (functional approach)
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ParsingConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                tracing::warn!("⚠️  Failed to load config from {p} ({e}), using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<(), SlipError> {
        if self.scanner.max_pages == 0 {
            return Err(SlipError::Config("scanner.max_pages must be at least 1".into()));
        }
        if self.blocks.max_block_lines == 0 {
            return Err(SlipError::Config("blocks.max_block_lines must be at least 1".into()));
        }
        if self.resolver.odd_min > self.resolver.odd_max {
            return Err(SlipError::Config(format!(
                "resolver.odd_min ({}) exceeds resolver.odd_max ({})",
                self.resolver.odd_min, self.resolver.odd_max
            )));
        }
        if self.markers.currency_markers.iter().any(|m| m.trim().is_empty())
            || self.markers.bullet_glyphs.iter().any(|g| g.is_empty())
        {
            return Err(SlipError::Config("markers must not contain empty entries".into()));
        }
        if let Some(group) = self
            .catalog
            .extra_aliases
            .iter()
            .find(|g| g.canonical.trim().is_empty() || g.aliases.is_empty())
        {
            return Err(SlipError::Config(format!(
                "alias group '{}' needs a canonical name and at least one alias",
                group.canonical
            )));
        }
        Ok(())
    }
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            scanner: ScannerConfig::default(),
            markers: MarkerConfig::default(),
            metadata: MetadataConfig::default(),
            blocks: BlockConfig::default(),
            resolver: ResolverConfig::default(),
            catalog: CatalogConfig::default(),
            early_exit: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let config = ParsingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scanner.max_pages, 2);
        assert_eq!(config.blocks.max_block_lines, 4);
        assert_eq!(config.blocks.max_bets, 2);
    }

    #[test]
    fn partial_yaml_keeps_defaults_for_missing_sections() {
        let yaml = "scanner:\n  max_pages: 3\nresolver:\n  odd_max: 30.0\n";
        let config: ParsingConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.scanner.max_pages, 3);
        assert!(config.scanner.normalize_decimal_separators);
        assert_eq!(config.resolver.odd_max, 30.0);
        assert_eq!(config.resolver.odd_min, 1.0);
        assert_eq!(config.markers.currency_markers, vec!["USD", "BRL"]);
        assert!(config.early_exit);
    }

    #[test]
    fn strategy_lists_can_disable_entries() {
        let yaml = "metadata:\n  date_strategies:\n    - name: EventoIsoTimestamp\n    - name: EventoDayFirst\n      enabled: false\n";
        let config: ParsingConfig = serde_yaml::from_str(yaml).unwrap();
        let chain = &config.metadata.date_strategies;

        assert_eq!(chain.len(), 2);
        assert!(chain[0].enabled);
        assert!(!chain[1].enabled);
    }

    #[test]
    fn inverted_odd_range_is_rejected() {
        let mut config = ParsingConfig::default();
        config.resolver.odd_min = 10.0;
        config.resolver.odd_max = 2.0;
        assert!(matches!(config.validate(), Err(SlipError::Config(_))));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = ParsingConfig::load_with_fallback(Some("/nonexistent/betslip.yaml"));
        assert_eq!(config.scanner.max_pages, 2);
    }

    #[test]
    fn yaml_dump_round_trips() {
        let yaml = ParsingConfig::default().to_yaml().unwrap();
        let parsed: ParsingConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.blocks.section_keywords.len(), 8);
    }
}
