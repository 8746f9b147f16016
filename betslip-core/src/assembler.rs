use crate::config::{BlockConfig, ResolverConfig};
use crate::types::{BetRecord, EventMetadata, MatchRecord};

/// Accumulates metadata and bets across pages into one `MatchRecord`.
///
/// Metadata is first-found-wins per field; bets fill `bet1` then `bet2` in
/// discovery order and anything after that is dropped.
pub struct RecordAssembler {
    record: MatchRecord,
    bets: Vec<BetRecord>,
    max_bets: usize,
    require_odd: bool,
}

impl RecordAssembler {
    pub fn new(blocks: &BlockConfig, resolver: &ResolverConfig) -> Self {
        Self {
            record: MatchRecord::empty(),
            bets: Vec::new(),
            max_bets: blocks.max_bets.min(2),
            require_odd: resolver.require_odd,
        }
    }

    /// Fill fields that are still unknown; known ones are never overwritten
    pub fn absorb_metadata(&mut self, metadata: EventMetadata) {
        let record = &mut self.record;
        fill(&mut record.date, metadata.date);
        fill(&mut record.sport, metadata.sport);
        fill(&mut record.league, metadata.league);
        fill(&mut record.team_a, metadata.team_a);
        fill(&mut record.team_b, metadata.team_b);
        fill(&mut record.profit_percentage, metadata.profit_percentage);
    }

    /// Returns whether the bet was kept
    pub fn push_bet(&mut self, bet: BetRecord) -> bool {
        if bet.house.is_none() {
            return false;
        }
        if self.require_odd && bet.odd.is_none() {
            tracing::debug!("⏭️  Dropping {:?}: no odd", bet.house);
            return false;
        }
        if self.bets.len() >= self.max_bets {
            tracing::debug!("⏭️  Dropping {:?}: both bet slots taken", bet.house);
            return false;
        }

        self.bets.push(bet);
        true
    }

    pub fn bet_count(&self) -> usize {
        self.bets.len()
    }

    /// Both teams and both houses known: later pages cannot add anything
    pub fn is_complete(&self) -> bool {
        self.record.team_a.is_some()
            && self.record.team_b.is_some()
            && self.bets.len() >= 2
            && self.bets.iter().all(|bet| bet.house.is_some())
    }

    pub fn finish(self) -> MatchRecord {
        let mut record = self.record;
        let mut bets = self.bets.into_iter();
        record.bet1 = bets.next().unwrap_or_default();
        record.bet2 = bets.next().unwrap_or_default();
        record
    }
}

fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}
