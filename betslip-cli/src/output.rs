//! JSON emission for the record and for stage dumps.

use anyhow::Result;
use betslip_core::{MatchRecord, PipelineStages};
use std::fs;
use std::path::{Path, PathBuf};

/// Written when even serializing the empty record fails
const NULL_RECORD: &str = r#"{"date":null,"sport":null,"league":null,"teamA":null,"teamB":null,"bet1":{"house":null,"odd":null,"type":null,"stake":null,"profit":null},"bet2":{"house":null,"odd":null,"type":null,"stake":null,"profit":null},"profitPercentage":null}"#;

pub fn render_record(record: &MatchRecord, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(record)?
    } else {
        serde_json::to_string(record)?
    };
    Ok(json)
}

/// The fully-null record printed on any failure
pub fn render_null_record(pretty: bool) -> String {
    render_record(&MatchRecord::empty(), pretty).unwrap_or_else(|_| NULL_RECORD.to_string())
}

/// Write every captured boundary as its own JSON file, plus a summary.
/// Returns the written paths in stage order.
pub fn save_stages(stages: &PipelineStages, input: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();

    let mut write = |file_name: &str, json: String| -> Result<()> {
        let path = output_dir.join(file_name);
        fs::write(&path, json)?;
        tracing::info!("  💾 {}", path.display());
        written.push(path);
        Ok(())
    };

    write("stage1_pages.json", serde_json::to_string_pretty(&stages.pages)?)?;
    write("stage2_lines.json", serde_json::to_string_pretty(&stages.lines)?)?;
    write("stage3_blocks.json", serde_json::to_string_pretty(&stages.blocks)?)?;
    write("stage4_bets.json", serde_json::to_string_pretty(&stages.bets)?)?;
    write("stage5_record.json", render_record(&stages.record, true)?)?;

    // Summary file: quick reference for comparing layout variants
    let summary = serde_json::json!({
        "input": input.display().to_string(),
        "captured_at": chrono::Utc::now().to_rfc3339(),
        "stage_counts": {
            "pages": stages.pages.len(),
            "lines": stages.lines.iter().map(|page| page.lines.len()).sum::<usize>(),
            "blocks": stages.blocks.len(),
            "bets": stages.bets.len(),
            "filled_bets": stages.record.bets().iter().filter(|bet| !bet.is_empty()).count(),
        }
    });
    write("summary.json", serde_json::to_string_pretty(&summary)?)?;

    Ok(written)
}
