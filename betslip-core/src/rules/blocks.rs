use super::tokens::contains_decimal;
use crate::catalog::HouseCatalog;
use crate::config::{BlockConfig, MarkerConfig};
use crate::types::BetBlock;

enum CollectorState {
    Searching,
    Collecting(BetBlock),
}

/// Carves bet blocks out of a page: a house line followed by the
/// continuation lines that carry its odd, stake and profit
pub struct BetBlockCollector {
    max_block_lines: usize,
    section_keywords: Vec<String>,
    currency_markers: Vec<String>,
    bullet_glyphs: Vec<String>,
}

impl BetBlockCollector {
    pub fn new(blocks: &BlockConfig, markers: &MarkerConfig) -> Self {
        Self {
            max_block_lines: blocks.max_block_lines.max(1),
            section_keywords: blocks.section_keywords.clone(),
            currency_markers: markers.currency_markers.clone(),
            bullet_glyphs: markers.bullet_glyphs.clone(),
        }
    }

    pub fn collect(&self, catalog: &HouseCatalog, lines: &[String], page: u32) -> Vec<BetBlock> {
        let mut blocks = Vec::new();
        let mut state = CollectorState::Searching;
        let mut index = 0;

        while index < lines.len() {
            let line = &lines[index];

            state = match state {
                CollectorState::Searching => {
                    index += 1;
                    let house = if self.is_section_line(line) {
                        None
                    } else {
                        catalog.find(line)
                    };
                    match house {
                        Some(house) => {
                            tracing::debug!("🏠 House '{}' on page {page} line {}", house.name, index - 1);
                            CollectorState::Collecting(BetBlock {
                                house,
                                lines: vec![line.clone()],
                                page,
                                first_line: index - 1,
                            })
                        }
                        None => CollectorState::Searching,
                    }
                }
                CollectorState::Collecting(mut block) => {
                    if self.ends_block(&block, catalog, line) {
                        // The stopping line is examined again while searching
                        blocks.push(block);
                        CollectorState::Searching
                    } else {
                        block.lines.push(line.clone());
                        index += 1;
                        CollectorState::Collecting(block)
                    }
                }
            };
        }

        if let CollectorState::Collecting(block) = state {
            blocks.push(block);
        }

        tracing::debug!("📦 {} bet blocks on page {page}", blocks.len());
        blocks
    }

    fn ends_block(&self, block: &BetBlock, catalog: &HouseCatalog, line: &str) -> bool {
        block.lines.len() >= self.max_block_lines
            || catalog.find(line).is_some()
            || self.is_section_line(line)
            || !self.is_continuation(line)
    }

    fn is_section_line(&self, line: &str) -> bool {
        self.section_keywords.iter().any(|k| line.contains(k.as_str()))
    }

    fn is_continuation(&self, line: &str) -> bool {
        self.currency_markers.iter().any(|m| line.contains(m.as_str()))
            || self.bullet_glyphs.iter().any(|g| line.contains(g.as_str()))
            || contains_decimal(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector() -> BetBlockCollector {
        BetBlockCollector::new(&BlockConfig::default(), &MarkerConfig::default())
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn single_line_bets_become_separate_blocks() {
        let catalog = HouseCatalog::builtin().unwrap();
        let page = lines(&[
            "Real Madrid–Barcelona 3.25%",
            "Bet365 (BR) Acima 2.5 1.95 ● 51.28 USD 3.33",
            "Pinnacle Abaixo 2.5 2.12 ○ 48.72 USD 3.28",
            "Aposta total 100.00 USD",
        ]);

        let blocks = collector().collect(&catalog, &page, 1);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].house.name, "Bet365 (BR)");
        assert_eq!(blocks[0].lines.len(), 1);
        assert_eq!(blocks[0].first_line, 1);
        assert_eq!(blocks[1].house.name, "Pinnacle");
        assert_eq!(blocks[1].lines.len(), 1);
    }

    #[test]
    fn continuation_lines_are_joined() {
        let catalog = HouseCatalog::builtin().unwrap();
        let page = lines(&[
            "KTO (BR) Handicap Asiático",
            "H1(+1.5) 1.83",
            "● 54.10 BRL 4.07",
            "Aposta total 100.00 BRL",
        ]);

        let blocks = collector().collect(&catalog, &page, 1);
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            blocks[0].text(),
            "KTO (BR) Handicap Asiático H1(+1.5) 1.83 ● 54.10 BRL 4.07"
        );
    }

    #[test]
    fn line_without_markers_ends_the_block() {
        let catalog = HouseCatalog::builtin().unwrap();
        let page = lines(&["Pinnacle Abaixo 2.5 2.12", "Surebet calculator", "○ 48.72 USD 3.28"]);

        let blocks = collector().collect(&catalog, &page, 1);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines, vec!["Pinnacle Abaixo 2.5 2.12"]);
    }

    #[test]
    fn block_is_capped_at_four_lines() {
        let catalog = HouseCatalog::builtin().unwrap();
        let page = lines(&[
            "Pinnacle Over",
            "1.10",
            "2.20",
            "3.30",
            "4.40",
            "5.50",
        ]);

        let blocks = collector().collect(&catalog, &page, 1);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines.len(), 4);
    }

    #[test]
    fn section_rows_never_start_a_block() {
        let catalog = HouseCatalog::builtin().unwrap();
        let page = lines(&[
            "Total stake 100.00 USD",
            "Round to 1.00",
            "Show ROI 1205.4%",
        ]);

        assert!(collector().collect(&catalog, &page, 1).is_empty());
    }

    #[test]
    fn new_house_line_starts_the_next_block() {
        let catalog = HouseCatalog::builtin().unwrap();
        let page = lines(&[
            "KTO (BR) Handicap Asiático",
            "Super Bet Total Over 60.5 2.25",
            "○ 45.90 BRL 3.28",
        ]);

        let blocks = collector().collect(&catalog, &page, 2);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].lines.len(), 1);
        assert_eq!(blocks[1].house.name, "SuperBet");
        assert_eq!(blocks[1].lines.len(), 2);
        assert_eq!(blocks[1].page, 2);
    }
}
