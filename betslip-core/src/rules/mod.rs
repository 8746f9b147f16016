// Extraction rules, one semantic sub-module each:
// - engine.rs: strategy chains and the RuleEngine bundle
// - tokens.rs: numeric token helpers
// - metadata.rs: date, teams and sport rows
// - blocks.rs: bet block collection
// - resolver.rs: odd / stake / profit disambiguation
// - bet_type.rs: bet description cleanup

pub mod bet_type;
pub mod blocks;
pub mod engine;
pub mod metadata;
pub mod resolver;
pub mod tokens;

pub use bet_type::BetTypeCleaner;
pub use blocks::BetBlockCollector;
pub use engine::*;
pub use metadata::{MetadataExtractor, SportRow, TeamsRow};
pub use resolver::{BlockContext, FieldResolver};
