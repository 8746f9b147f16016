use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ===== OUTPUT RECORD =====
// The shape below is a contract with downstream consumers: every key is always
// serialized, unknown values become `null`, never omitted.

/// One arbitrage opportunity extracted from a slip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// Event kickoff in local time, serialized as `YYYY-MM-DDTHH:MM`
    #[serde(with = "event_date_format", default)]
    pub date: Option<NaiveDateTime>,
    pub sport: Option<String>,
    pub league: Option<String>,
    pub team_a: Option<String>,
    pub team_b: Option<String>,
    pub bet1: BetRecord,
    pub bet2: BetRecord,
    pub profit_percentage: Option<f64>,
}

impl MatchRecord {
    /// The fully-null record emitted when a document cannot be read at all
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bets(&self) -> [&BetRecord; 2] {
        [&self.bet1, &self.bet2]
    }
}

/// One leg of the arbitrage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BetRecord {
    pub house: Option<String>,
    pub odd: Option<f64>,
    #[serde(rename = "type")]
    pub bet_type: Option<String>,
    pub stake: Option<f64>,
    pub profit: Option<f64>,
}

impl BetRecord {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

mod event_date_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M";

    pub fn serialize<S>(date: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom))
            .transpose()
    }
}

// ===== PREPROCESSOR OUTPUT =====

/// Raw text of one document page as produced by a preprocessor backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    /// Page number (1-indexed)
    pub number: u32,
    pub text: String,
}

/// Information about the source document itself, not about the slip
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Page count reported by the document, which can exceed `pages.len()`
    /// when extraction was capped
    pub page_count: usize,
    pub preprocessor: String,
}

/// Unified preprocessor output: per-page plain text in document order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreprocessorOutput {
    pub pages: Vec<PageText>,
    pub metadata: DocumentMetadata,
}

impl PreprocessorOutput {
    pub fn from_page_texts(texts: Vec<String>, page_count: usize, preprocessor: &str) -> Self {
        let pages = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| PageText {
                number: index as u32 + 1,
                text,
            })
            .collect();

        Self {
            pages,
            metadata: DocumentMetadata {
                page_count,
                preprocessor: preprocessor.to_string(),
            },
        }
    }

    pub fn has_text(&self) -> bool {
        self.pages.iter().any(|page| !page.text.trim().is_empty())
    }
}

// ===== INTERMEDIATE PIPELINE TYPES =====

/// Where a house name came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HouseSource {
    /// Exact entry of the house catalog
    Catalog,
    /// Alias key of an equivalence group
    Alias,
    /// Capitalized-run heuristic for houses missing from the catalog
    Heuristic,
}

/// A house recognized inside a line of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseMatch {
    /// Display name reported in the output record
    pub name: String,
    /// Canonical identity shared by every spelling of the same house
    pub identity: String,
    /// The literal text of the line that matched
    pub matched: String,
    pub source: HouseSource,
}

/// Text of one bet entry, possibly spanning several physical lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetBlock {
    pub house: HouseMatch,
    pub lines: Vec<String>,
    /// Page the block was found on (1-indexed)
    pub page: u32,
    /// Index of the block's first line within its page
    pub first_line: usize,
}

impl BetBlock {
    /// Block lines joined with single spaces, the form the resolver works on
    pub fn text(&self) -> String {
        self.lines.join(" ")
    }
}

/// Event-level fields found on one page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub date: Option<NaiveDateTime>,
    pub sport: Option<String>,
    pub league: Option<String>,
    pub team_a: Option<String>,
    pub team_b: Option<String>,
    pub profit_percentage: Option<f64>,
}
