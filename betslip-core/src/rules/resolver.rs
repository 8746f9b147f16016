//! Field resolution inside one bet block.
//!
//! A block reads `<house> <descriptor> <odd> <bullet> <stake> <currency> <profit>`
//! in the current layout. The first bullet (or, without one, the first currency
//! marker) splits it: the odd and the descriptor sit before the split, stake
//! and profit after it. Numbers are told apart by range, by currency tagging
//! and by exclusion of values already assigned to another field.

use super::bet_type::BetTypeCleaner;
use super::engine::{build_chain, Strategy, StrategyChain};
use super::tokens::{decimal_tokens, matches_any, parse_decimal, DecimalToken};
use crate::catalog::AliasTable;
use crate::config::{MarkerConfig, ResolverConfig};
use crate::types::{BetBlock, BetRecord};
use anyhow::Result;
use regex::Regex;

/// Everything the numeric strategies need to know about one block
#[derive(Debug, Clone)]
pub struct BlockContext {
    pub text: String,
    /// Byte offset where the odd segment ends
    pub split_at: usize,
    pub decimals: Vec<DecimalToken>,
    /// `51.28 USD`
    pub amounts_before_currency: Vec<DecimalToken>,
    /// `USD 51.28`
    pub amounts_after_currency: Vec<DecimalToken>,
    pub odd: Option<DecimalToken>,
    pub stake: Option<DecimalToken>,
}

impl BlockContext {
    pub fn odd_segment(&self) -> &str {
        &self.text[..self.split_at]
    }

    /// Decimals of the odd segment, minus amounts tagged with a currency
    pub fn odd_candidates(&self) -> impl DoubleEndedIterator<Item = &DecimalToken> {
        self.decimals.iter().filter(move |token| {
            token.end <= self.split_at
                && !self
                    .amounts_before_currency
                    .iter()
                    .any(|amount| amount.overlaps(token.start, token.end))
        })
    }

    fn assigned(&self) -> [Option<f64>; 2] {
        [self.odd.map(|t| t.value), self.stake.map(|t| t.value)]
    }

    fn is_odd_token(&self, token: &DecimalToken) -> bool {
        self.odd.is_some_and(|odd| odd.overlaps(token.start, token.end))
    }
}

pub struct FieldResolver {
    bullet_glyphs: Vec<String>,
    currency_markers: Vec<String>,
    amount_before_currency: Regex,
    amount_after_currency: Regex,
    odd: StrategyChain<BlockContext, DecimalToken>,
    stake: StrategyChain<BlockContext, DecimalToken>,
    profit: StrategyChain<BlockContext, DecimalToken>,
    types: BetTypeCleaner,
}

impl FieldResolver {
    pub fn new(config: &ResolverConfig, markers: &MarkerConfig, aliases: AliasTable) -> Result<Self> {
        let currencies = markers
            .currency_markers
            .iter()
            .map(|m| regex::escape(m.trim()))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            bullet_glyphs: markers.bullet_glyphs.clone(),
            currency_markers: markers.currency_markers.clone(),
            amount_before_currency: Regex::new(&format!(r"(\d+(?:\.\d*)?)\s*(?:{currencies})"))?,
            amount_after_currency: Regex::new(&format!(r"(?:{currencies})\s*(\d+(?:\.\d+)?)"))?,
            odd: build_chain("odd", &config.odd_strategies, |name| odd_strategy(name, config)),
            stake: build_chain("stake", &config.stake_strategies, stake_strategy),
            profit: build_chain("profit", &config.profit_strategies, |name| profit_strategy(name, config)),
            types: BetTypeCleaner::new(config, aliases),
        })
    }

    /// Resolve every field of one block. Unresolvable fields stay `None`.
    pub fn resolve(&self, block: &BetBlock) -> BetRecord {
        let mut context = self.context(&block.text());

        context.odd = self.odd.resolve(&context);
        context.stake = self.stake.resolve(&context);
        let profit = self.profit.resolve(&context);

        let odd = context.odd.map(|t| t.value);
        let stake = context.stake.map(|t| t.value);
        let profit = profit.map(|t| t.value);

        let bet_type = self
            .types
            .derive(context.odd_segment(), &block.house, &[odd, stake, profit]);

        tracing::debug!(
            "🎯 {}: odd={odd:?} stake={stake:?} profit={profit:?} type={bet_type:?}",
            block.house.name
        );

        BetRecord {
            house: Some(block.house.name.clone()),
            odd,
            bet_type,
            stake,
            profit,
        }
    }

    pub fn context(&self, text: &str) -> BlockContext {
        let first_of = |markers: &[String]| {
            markers
                .iter()
                .filter(|m| !m.is_empty())
                .filter_map(|m| text.find(m.as_str()))
                .min()
        };
        let split_at = first_of(self.bullet_glyphs.as_slice())
            .or_else(|| first_of(self.currency_markers.as_slice()))
            .unwrap_or(text.len());

        BlockContext {
            text: text.to_string(),
            split_at,
            decimals: decimal_tokens(text),
            amounts_before_currency: captured_amounts(&self.amount_before_currency, text),
            amounts_after_currency: captured_amounts(&self.amount_after_currency, text),
            odd: None,
            stake: None,
        }
    }

    pub fn odd_chain(&self) -> &StrategyChain<BlockContext, DecimalToken> {
        &self.odd
    }

    pub fn stake_chain(&self) -> &StrategyChain<BlockContext, DecimalToken> {
        &self.stake
    }

    pub fn profit_chain(&self) -> &StrategyChain<BlockContext, DecimalToken> {
        &self.profit
    }
}

fn captured_amounts(regex: &Regex, text: &str) -> Vec<DecimalToken> {
    regex
        .captures_iter(text)
        .filter_map(|captures| {
            let amount = captures.get(1)?;
            parse_decimal(amount.as_str()).map(|value| DecimalToken {
                value,
                start: amount.start(),
                end: amount.end(),
            })
        })
        .collect()
}

type Numeric = dyn Strategy<BlockContext, DecimalToken>;

fn odd_strategy(name: &str, config: &ResolverConfig) -> Option<Box<Numeric>> {
    match name {
        "RangedRightmost" => Some(Box::new(RangedRightmost {
            min: config.odd_min,
            max: config.odd_max,
        })),
        "Rightmost" => Some(Box::new(Rightmost)),
        _ => None,
    }
}

fn stake_strategy(name: &str) -> Option<Box<Numeric>> {
    match name {
        "AmountBeforeCurrency" => Some(Box::new(AmountBeforeCurrency)),
        "CurrencyBeforeAmount" => Some(Box::new(CurrencyBeforeAmount)),
        _ => None,
    }
}

fn profit_strategy(name: &str, config: &ResolverConfig) -> Option<Box<Numeric>> {
    match name {
        "SmallestDistinctTrailing" => Some(Box::new(SmallestDistinctTrailing {
            ceiling: config.profit_ceiling,
        })),
        "AfterStake" => Some(Box::new(AfterStake)),
        _ => None,
    }
}

/// Rightmost odd candidate inside the decimal-odds range
struct RangedRightmost {
    min: f64,
    max: f64,
}

impl Strategy<BlockContext, DecimalToken> for RangedRightmost {
    fn name(&self) -> &'static str {
        "RangedRightmost"
    }

    fn apply(&self, context: &BlockContext) -> Option<DecimalToken> {
        context
            .odd_candidates()
            .rev()
            .find(|token| (self.min..=self.max).contains(&token.value))
            .copied()
    }
}

/// Last resort: rightmost odd candidate whatever its value
struct Rightmost;

impl Strategy<BlockContext, DecimalToken> for Rightmost {
    fn name(&self) -> &'static str {
        "Rightmost"
    }

    fn apply(&self, context: &BlockContext) -> Option<DecimalToken> {
        context.odd_candidates().next_back().copied()
    }
}

struct AmountBeforeCurrency;

impl Strategy<BlockContext, DecimalToken> for AmountBeforeCurrency {
    fn name(&self) -> &'static str {
        "AmountBeforeCurrency"
    }

    fn apply(&self, context: &BlockContext) -> Option<DecimalToken> {
        context
            .amounts_before_currency
            .iter()
            .find(|token| !context.is_odd_token(token))
            .copied()
    }
}

/// Older layout printing the currency code first
struct CurrencyBeforeAmount;

impl Strategy<BlockContext, DecimalToken> for CurrencyBeforeAmount {
    fn name(&self) -> &'static str {
        "CurrencyBeforeAmount"
    }

    fn apply(&self, context: &BlockContext) -> Option<DecimalToken> {
        context
            .amounts_after_currency
            .iter()
            .find(|token| !context.is_odd_token(token))
            .copied()
    }
}

/// Profit is the trailing small figure that is neither the odd nor the stake
struct SmallestDistinctTrailing {
    ceiling: f64,
}

impl Strategy<BlockContext, DecimalToken> for SmallestDistinctTrailing {
    fn name(&self) -> &'static str {
        "SmallestDistinctTrailing"
    }

    fn apply(&self, context: &BlockContext) -> Option<DecimalToken> {
        let assigned = context.assigned();
        context
            .decimals
            .iter()
            .rev()
            .find(|token| token.value < self.ceiling && !matches_any(token.value, &assigned))
            .copied()
    }
}

struct AfterStake;

impl Strategy<BlockContext, DecimalToken> for AfterStake {
    fn name(&self) -> &'static str {
        "AfterStake"
    }

    fn apply(&self, context: &BlockContext) -> Option<DecimalToken> {
        let stake = context.stake?;
        let assigned = context.assigned();
        context
            .decimals
            .iter()
            .rev()
            .take_while(|token| token.start >= stake.end)
            .find(|token| !matches_any(token.value, &assigned))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;
    use crate::rules::tokens::normalize_decimal_separators;
    use crate::types::{HouseMatch, HouseSource};

    fn resolver() -> FieldResolver {
        resolver_with(ResolverConfig::default())
    }

    fn resolver_with(config: ResolverConfig) -> FieldResolver {
        FieldResolver::new(&config, &MarkerConfig::default(), AliasTable::builtin()).unwrap()
    }

    fn block(house: &str, matched: &str, text: &str) -> BetBlock {
        BetBlock {
            house: HouseMatch {
                name: house.to_string(),
                identity: AliasTable::builtin().identity_of(house),
                matched: matched.to_string(),
                source: HouseSource::Catalog,
            },
            lines: vec![text.to_string()],
            page: 1,
            first_line: 0,
        }
    }

    #[test]
    fn bullet_layout_resolves_every_field() {
        let bet = resolver().resolve(&block(
            "Bet365 (BR)",
            "Bet365 (BR)",
            "Bet365 (BR) Acima 2.5 1.95 ● 51.28 USD 3.33",
        ));

        assert_eq!(bet.house.as_deref(), Some("Bet365 (BR)"));
        assert_eq!(bet.odd, Some(1.95));
        assert_eq!(bet.stake, Some(51.28));
        assert_eq!(bet.profit, Some(3.33));
        assert_eq!(bet.bet_type.as_deref(), Some("Acima 2.5"));
    }

    #[test]
    fn stake_is_never_taken_as_odd_without_bullet() {
        let bet = resolver().resolve(&block(
            "Zebrabet",
            "Zebrabet",
            "Zebrabet Vencedor1 2.10 47.20 USD 2.18",
        ));

        assert_eq!(bet.odd, Some(2.10));
        assert_eq!(bet.stake, Some(47.20));
        assert_eq!(bet.profit, Some(2.18));
        assert_eq!(bet.bet_type.as_deref(), Some("Vencedor1"));
    }

    #[test]
    fn out_of_range_odd_is_a_last_resort() {
        let bet = resolver().resolve(&block("Pinnacle", "Pinnacle", "Pinnacle Longshot 75.00 ● 1.00 USD 74.00"));
        assert_eq!(bet.odd, Some(75.0));
        assert_eq!(bet.stake, Some(1.0));
        assert_eq!(bet.profit, Some(74.0));
    }

    #[test]
    fn odd_resolution_is_idempotent_on_clean_block() {
        let resolver = resolver();
        let context = resolver.context("1.95");
        let odd = resolver.odd_chain().resolve(&context).map(|t| t.value);
        assert_eq!(odd, Some(1.95));

        let again = resolver.context(&format!("{}", odd.unwrap()));
        assert_eq!(resolver.odd_chain().resolve(&again).map(|t| t.value), odd);
    }

    #[test]
    fn odd_stake_and_profit_never_share_a_value() {
        let bet = resolver().resolve(&block("Pinnacle", "Pinnacle", "Pinnacle Over 2.00 ● 2.00 USD 2.00"));
        assert_eq!(bet.odd, Some(2.0));
        assert_eq!(bet.stake, Some(2.0));
        assert_eq!(bet.profit, None);
    }

    #[test]
    fn brazilian_grouped_stake_after_normalization() {
        let text = normalize_decimal_separators("KTO (BR) Acima 2,5 1,83 ● 1.234,56 BRL 4,07");
        let bet = resolver().resolve(&block("KTO (BR)", "KTO (BR)", &text));

        assert_eq!(bet.odd, Some(1.83));
        assert_eq!(bet.stake, Some(1234.56));
        assert_eq!(bet.profit, Some(4.07));
        assert_eq!(bet.bet_type.as_deref(), Some("Acima 2.5"));
    }

    #[test]
    fn currency_first_layout_is_a_fallback() {
        let bet = resolver().resolve(&block("Pinnacle", "Pinnacle", "Pinnacle Abaixo 2.5 2.12 ○ USD 48.72 3.28"));
        assert_eq!(bet.odd, Some(2.12));
        assert_eq!(bet.stake, Some(48.72));
        assert_eq!(bet.profit, Some(3.28));
    }

    #[test]
    fn profit_after_stake_when_trailing_values_are_large() {
        let mut config = ResolverConfig::default();
        config.profit_ceiling = 1.0;
        let bet = resolver_with(config).resolve(&block("Pinnacle", "Pinnacle", "Pinnacle Over 2.12 ● 48.72 USD 3.28"));
        assert_eq!(bet.profit, Some(3.28));
    }

    #[test]
    fn block_without_numbers_keeps_house_only() {
        let bet = resolver().resolve(&block("Pinnacle", "Pinnacle", "Pinnacle"));
        assert_eq!(bet.house.as_deref(), Some("Pinnacle"));
        assert_eq!(bet.odd, None);
        assert_eq!(bet.stake, None);
        assert_eq!(bet.profit, None);
        assert_eq!(bet.bet_type, None);
    }

    #[test]
    fn disabled_odd_chain_leaves_odd_unset() {
        let mut config = ResolverConfig::default();
        config.odd_strategies = vec![RuleConfig {
            name: "RangedRightmost".to_string(),
            enabled: false,
        }];
        let bet = resolver_with(config).resolve(&block("Pinnacle", "Pinnacle", "Pinnacle Over 2.5 2.12 ● 48.72 USD 3.28"));
        assert_eq!(bet.odd, None);
        assert_eq!(bet.stake, Some(48.72));
    }
}
