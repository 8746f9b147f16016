use crate::assembler::RecordAssembler;
use crate::config::ParsingConfig;
use crate::error::SlipError;
use crate::preprocessors::{preprocessor_for_path, Preprocessor};
use crate::rules::RuleEngine;
use crate::scanner::ScannedPage;
use crate::types::*;
use anyhow::Result;
use std::path::Path;
use std::time::{Duration, Instant};

/// Captured intermediate outputs from each pipeline stage
/// Used for testing and diagnostics to inspect and compare each boundary
#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineStages {
    pub pages: Vec<PageText>,
    pub lines: Vec<ScannedPage>,
    pub blocks: Vec<BetBlock>,
    /// Every resolved bet, including those dropped by the assembler
    pub bets: Vec<BetRecord>,
    pub record: MatchRecord,
}

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings.push((step_name.to_string(), elapsed));
        tracing::info!("⏱️  {}: {:.3}ms", step_name, elapsed.as_secs_f64() * 1000.0);

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn log_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        tracing::info!("📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();

        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            tracing::info!(
                "   {:.<35} {:.3}ms ({:.1}%)",
                step,
                duration.as_secs_f64() * 1000.0,
                percentage
            );
        }
        tracing::info!("   {:.<35} {:.3}ms", "Total", total.as_secs_f64() * 1000.0);
    }
}

/// Everything one pass over the pages produced
#[derive(Default)]
struct Extraction {
    lines: Vec<ScannedPage>,
    blocks: Vec<BetBlock>,
    bets: Vec<BetRecord>,
    record: MatchRecord,
}

pub struct DocumentProcessor {
    preprocessor: Box<dyn Preprocessor>,
    rule_engine: RuleEngine,
    config: ParsingConfig,
}

impl DocumentProcessor {
    /// Create DocumentProcessor with full dependency injection
    pub fn new_with_dependencies(
        preprocessor: Box<dyn Preprocessor>,
        config: &ParsingConfig,
    ) -> Result<Self> {
        Ok(Self {
            preprocessor,
            rule_engine: RuleEngine::new(config)?,
            config: config.clone(),
        })
    }

    /// Processor whose preprocessor matches the file extension
    pub fn for_path(input_path: &Path, config: &ParsingConfig) -> Result<Self> {
        let preprocessor = preprocessor_for_path(input_path, config.scanner.max_pages)?;
        Self::new_with_dependencies(preprocessor, config)
    }

    pub fn preprocessor_name(&self) -> &str {
        self.preprocessor.name()
    }

    /// Document path → MatchRecord. Only document-level failures are errors;
    /// missing fields come back as `None`.
    pub fn process_file(&self, input_path: &Path) -> Result<MatchRecord> {
        self.process_file_with_profiling(input_path, false)
    }

    pub fn process_file_with_profiling(
        &self,
        input_path: &Path,
        enable_profiling: bool,
    ) -> Result<MatchRecord> {
        let start_time = Instant::now();
        let mut profiler = StepProfiler::new(enable_profiling);
        tracing::info!("📄 Processing slip: {}", input_path.display());

        let output = self.preprocess(input_path, &mut profiler)?;
        let extraction = self.extract(&output, &mut profiler);

        profiler.log_summary();
        tracing::info!(
            "⏱️  Total processing time: {:.3}s",
            start_time.elapsed().as_secs_f64()
        );
        Ok(extraction.record)
    }

    /// Run the extraction rules over already-preprocessed pages
    pub fn process_output(&self, output: &PreprocessorOutput) -> MatchRecord {
        self.extract(output, &mut StepProfiler::new(false)).record
    }

    /// Process document and capture all intermediate stage outputs
    /// Used for pipeline diagnostics and testing stage boundaries
    pub fn capture_stages(&self, input_path: &Path) -> Result<PipelineStages> {
        let mut profiler = StepProfiler::new(false);
        let output = self.preprocess(input_path, &mut profiler)?;
        tracing::info!("📋 Stage 1: {} pages captured", output.pages.len());

        let extraction = self.extract(&output, &mut profiler);
        tracing::info!(
            "📋 Stage 2: {} line sets, {} blocks, {} bets captured",
            extraction.lines.len(),
            extraction.blocks.len(),
            extraction.bets.len()
        );

        Ok(PipelineStages {
            pages: output.pages,
            lines: extraction.lines,
            blocks: extraction.blocks,
            bets: extraction.bets,
            record: extraction.record,
        })
    }

    fn preprocess(&self, input_path: &Path, profiler: &mut StepProfiler) -> Result<PreprocessorOutput> {
        let bytes = profiler
            .time_step("0. Read document", || std::fs::read(input_path))
            .map_err(|source| SlipError::Io {
                path: input_path.to_path_buf(),
                source,
            })?;

        let pages = profiler.time_step("1. Document → Page text", || {
            self.preprocessor.extract_page_texts(&bytes)
        })?;

        profiler.time_step("2. Page text → PreprocessorOutput", || {
            self.preprocessor.pages_to_preprocessor_output(pages)
        })
    }

    fn extract(&self, output: &PreprocessorOutput, profiler: &mut StepProfiler) -> Extraction {
        let engine = &self.rule_engine;
        let mut assembler = RecordAssembler::new(&self.config.blocks, &self.config.resolver);
        let mut extraction = Extraction::default();

        if !output.has_text() {
            tracing::warn!("⚠️  Document has no text layer, every field will be null");
        }

        for page in engine.scanner.scan_pages(&output.pages) {
            tracing::debug!("📃 Page {}: {} lines", page.number, page.lines.len());

            let metadata = profiler.time_step(&format!("3. Page {} metadata", page.number), || {
                engine.metadata.extract(&page.lines)
            });
            assembler.absorb_metadata(metadata);

            let blocks = profiler.time_step(&format!("4. Page {} bet blocks", page.number), || {
                engine.collector.collect(&engine.catalog, &page.lines, page.number)
            });

            let bets: Vec<BetRecord> = profiler.time_step(&format!("5. Page {} fields", page.number), || {
                blocks.iter().map(|block| engine.resolver.resolve(block)).collect()
            });
            for bet in &bets {
                assembler.push_bet(bet.clone());
            }

            extraction.blocks.extend(blocks);
            extraction.bets.extend(bets);
            extraction.lines.push(page);

            if self.config.early_exit && assembler.is_complete() {
                tracing::info!("✅ Teams and both bets found, skipping remaining pages");
                break;
            }
        }

        extraction.record = assembler.finish();
        tracing::info!(
            "🎯 Extracted {} vs {} with {} bets",
            extraction.record.team_a.as_deref().unwrap_or("?"),
            extraction.record.team_b.as_deref().unwrap_or("?"),
            extraction.record.bets().iter().filter(|bet| !bet.is_empty()).count()
        );
        extraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessors::TextPreprocessor;

    fn processor(config: &ParsingConfig) -> DocumentProcessor {
        DocumentProcessor::new_with_dependencies(Box::new(TextPreprocessor::new(config.scanner.max_pages)), config)
            .unwrap()
    }

    fn output(pages: &[&str]) -> PreprocessorOutput {
        PreprocessorOutput::from_page_texts(
            pages.iter().map(|p| p.to_string()).collect(),
            pages.len(),
            "TextPreprocessor",
        )
    }

    const PAGE: &str = "Real Madrid–Barcelona 3.25%\n\
        Bet365 (BR) Acima 2.5 1.95 ● 51.28 USD 3.33\n\
        Pinnacle Abaixo 2.5 2.12 ○ 48.72 USD 3.28\n";

    #[test]
    fn empty_text_layer_gives_null_record() {
        let record = processor(&ParsingConfig::default()).process_output(&output(&["", "  \n"]));
        assert_eq!(record, MatchRecord::empty());
    }

    #[test]
    fn early_exit_skips_later_pages() {
        let late = "Futebol / Espanha / La Liga";
        let record = processor(&ParsingConfig::default()).process_output(&output(&[PAGE, late]));
        assert_eq!(record.sport, None);

        let config = ParsingConfig {
            early_exit: false,
            ..ParsingConfig::default()
        };
        let record = processor(&config).process_output(&output(&[PAGE, late]));
        assert_eq!(record.sport.as_deref(), Some("Futebol"));
    }

    #[test]
    fn brazilian_amounts_over_a_thousand() {
        let page = "Flamengo–Palmeiras 1,95%\n\
            KTO (BR) Acima 2,5 1,83 ● 1.234,56 BRL 4,07\n\
            Betano Abaixo 2,5 2,25 ○ 1.004,30 BRL 4,12\n";
        let record = processor(&ParsingConfig::default()).process_output(&output(&[page]));

        assert_eq!(record.profit_percentage, Some(1.95));
        assert_eq!(record.bet1.stake, Some(1234.56));
        assert_eq!(record.bet1.profit, Some(4.07));
        assert_eq!(record.bet2.stake, Some(1004.30));
        assert_eq!(record.bet2.odd, Some(2.25));
    }

    #[test]
    fn pages_past_the_cap_are_ignored() {
        let config = ParsingConfig {
            early_exit: false,
            ..ParsingConfig::default()
        };
        let record = processor(&config).process_output(&output(&["", "", "Futebol / Espanha / La Liga"]));
        assert_eq!(record.sport, None);
    }

    #[test]
    fn profiler_records_only_when_enabled() {
        let mut profiler = StepProfiler::new(true);
        assert_eq!(profiler.time_step("step", || 7), 7);
        assert_eq!(profiler.timings().len(), 1);

        let mut disabled = StepProfiler::new(false);
        disabled.time_step("step", || ());
        assert!(disabled.timings().is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = processor(&ParsingConfig::default())
            .process_file(Path::new("/nonexistent/slip.txt"))
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<SlipError>(), Some(SlipError::Io { .. })));
    }
}
