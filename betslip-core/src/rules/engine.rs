use crate::catalog::HouseCatalog;
use crate::config::{ParsingConfig, RuleConfig};
use crate::scanner::LineScanner;
use anyhow::Result;

use super::blocks::BetBlockCollector;
use super::metadata::MetadataExtractor;
use super::resolver::FieldResolver;

/// One named way of deriving a field from some input
pub trait Strategy<I: ?Sized, O> {
    fn name(&self) -> &'static str;
    fn apply(&self, input: &I) -> Option<O>;
}

/// Ordered fallback chain: the first strategy producing a value wins
pub struct StrategyChain<I: ?Sized, O> {
    field: &'static str,
    strategies: Vec<Box<dyn Strategy<I, O>>>,
}

impl<I: ?Sized, O> StrategyChain<I, O> {
    pub fn new(field: &'static str, strategies: Vec<Box<dyn Strategy<I, O>>>) -> Self {
        Self { field, strategies }
    }

    pub fn resolve(&self, input: &I) -> Option<O> {
        for strategy in &self.strategies {
            if let Some(value) = strategy.apply(input) {
                tracing::debug!("   ✅ {} resolved by {}", self.field, strategy.name());
                return Some(value);
            }
        }
        tracing::debug!("   ⏭️  {} unresolved after {} strategies", self.field, self.strategies.len());
        None
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Active strategy names in evaluation order
    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// Build a chain from configured rule names. Disabled entries are skipped and
/// unknown names are reported and ignored.
pub fn build_chain<I: ?Sized, O, F>(
    field: &'static str,
    rules: &[RuleConfig],
    factory: F,
) -> StrategyChain<I, O>
where
    F: Fn(&str) -> Option<Box<dyn Strategy<I, O>>>,
{
    let mut strategies = Vec::new();

    for rule_config in rules {
        if !rule_config.enabled {
            tracing::debug!("   ⏭️  Skipping disabled {field} strategy: {}", rule_config.name);
            continue;
        }

        match factory(&rule_config.name) {
            Some(strategy) => strategies.push(strategy),
            None => {
                tracing::warn!("⚠️  Unknown {field} strategy: {}. Skipping...", rule_config.name)
            }
        }
    }

    if strategies.is_empty() {
        tracing::warn!("⚠️  No active {field} strategies, the field will stay null");
    }

    StrategyChain::new(field, strategies)
}

/// Every compiled component the pipeline needs, built once per configuration
pub struct RuleEngine {
    pub catalog: HouseCatalog,
    pub scanner: LineScanner,
    pub metadata: MetadataExtractor,
    pub collector: BetBlockCollector,
    pub resolver: FieldResolver,
}

impl RuleEngine {
    pub fn new(config: &ParsingConfig) -> Result<Self> {
        let catalog = HouseCatalog::from_config(&config.catalog)?;

        let engine = Self {
            scanner: LineScanner::new(&config.scanner),
            metadata: MetadataExtractor::new(&config.metadata),
            collector: BetBlockCollector::new(&config.blocks, &config.markers),
            resolver: FieldResolver::new(&config.resolver, &config.markers, catalog.aliases().clone())?,
            catalog,
        };

        tracing::debug!(
            "🔗 Strategy chains: date={:?} teams={:?} sport={:?}",
            engine.metadata.date_chain().names(),
            engine.metadata.teams_chain().names(),
            engine.metadata.sport_chain().names()
        );
        tracing::debug!(
            "🔗 Strategy chains: odd={:?} stake={:?} profit={:?}",
            engine.resolver.odd_chain().names(),
            engine.resolver.stake_chain().names(),
            engine.resolver.profit_chain().names()
        );

        Ok(engine)
    }
}
