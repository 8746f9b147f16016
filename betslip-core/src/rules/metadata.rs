//! Event-level metadata: kickoff date, team names with the arbitrage margin,
//! and the sport / league row. Each field is an ordered strategy chain that
//! looks at the whole page; a strategy commits to the first line it qualifies
//! and never searches further down the page.

use super::engine::{build_chain, Strategy, StrategyChain};
use super::tokens::parse_decimal;
use crate::config::MetadataConfig;
use crate::types::EventMetadata;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

static ISO_EVENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{4}-\d{2}-\d{2})\s+(\d{2}:\d{2})").unwrap());

// (27/09/2025 19:00, (27-09-25 19:00
static DAY_FIRST_EVENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((\d{2})[/\-](\d{2})[/\-](\d{4}|\d{2})\s+(\d{2}:\d{2})").unwrap()
});

static TRAILING_PERCENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)%\s*$").unwrap());

static HYPHEN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s-\s").unwrap());

static VERSUS_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s+vs\.?\s+").unwrap());

const SPORT_SEPARATOR: &str = " / ";

#[derive(Debug, Clone, PartialEq)]
pub struct TeamsRow {
    pub team_a: Option<String>,
    pub team_b: Option<String>,
    pub profit_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SportRow {
    pub sport: Option<String>,
    pub league: Option<String>,
}

type Lines = [String];

pub struct MetadataExtractor {
    date: StrategyChain<Lines, NaiveDateTime>,
    teams: StrategyChain<Lines, TeamsRow>,
    sport: StrategyChain<Lines, SportRow>,
}

impl MetadataExtractor {
    pub fn new(config: &MetadataConfig) -> Self {
        Self {
            date: build_chain("date", &config.date_strategies, |name| date_strategy(name, config)),
            teams: build_chain("teams", &config.teams_strategies, |name| teams_strategy(name, config)),
            sport: build_chain("sport", &config.sport_strategies, |name| sport_strategy(name, config)),
        }
    }

    /// Metadata found on one page's lines
    pub fn extract(&self, lines: &[String]) -> EventMetadata {
        let mut metadata = EventMetadata {
            date: self.date.resolve(lines),
            ..EventMetadata::default()
        };

        if let Some(teams) = self.teams.resolve(lines) {
            metadata.team_a = teams.team_a;
            metadata.team_b = teams.team_b;
            metadata.profit_percentage = teams.profit_percentage;
        }

        if let Some(sport) = self.sport.resolve(lines) {
            metadata.sport = sport.sport;
            metadata.league = sport.league;
        }

        metadata
    }

    pub fn date_chain(&self) -> &StrategyChain<Lines, NaiveDateTime> {
        &self.date
    }

    pub fn teams_chain(&self) -> &StrategyChain<Lines, TeamsRow> {
        &self.teams
    }

    pub fn sport_chain(&self) -> &StrategyChain<Lines, SportRow> {
        &self.sport
    }
}

fn date_strategy(name: &str, config: &MetadataConfig) -> Option<Box<dyn Strategy<Lines, NaiveDateTime>>> {
    let markers = config.event_markers.clone();
    match name {
        "EventoIsoTimestamp" => Some(Box::new(EventoIsoTimestamp { markers })),
        "EventoDayFirst" => Some(Box::new(EventoDayFirst { markers })),
        _ => None,
    }
}

fn teams_strategy(name: &str, config: &MetadataConfig) -> Option<Box<dyn Strategy<Lines, TeamsRow>>> {
    let excluded = config.team_excluded_markers.clone();
    let strategy = match name {
        "DashSeparator" => {
            let alternation = config
                .team_separators
                .iter()
                .filter(|s| !s.is_empty())
                .map(|s| regex::escape(s))
                .collect::<Vec<_>>()
                .join("|");
            if alternation.is_empty() {
                tracing::warn!("⚠️  DashSeparator needs at least one team separator");
                return None;
            }
            SeparatedTeams {
                name: "DashSeparator",
                separator: Regex::new(&alternation).ok()?,
                excluded,
                require_trailing_percentage: false,
            }
        }
        "HyphenSeparator" => SeparatedTeams {
            name: "HyphenSeparator",
            separator: HYPHEN_REGEX.clone(),
            excluded,
            require_trailing_percentage: true,
        },
        "VersusSeparator" => SeparatedTeams {
            name: "VersusSeparator",
            separator: VERSUS_REGEX.clone(),
            excluded,
            require_trailing_percentage: true,
        },
        _ => return None,
    };
    Some(Box::new(strategy))
}

fn sport_strategy(name: &str, config: &MetadataConfig) -> Option<Box<dyn Strategy<Lines, SportRow>>> {
    match name {
        "SlashSeparatedSport" => Some(Box::new(SlashSeparatedSport {
            keywords: config.sport_keywords.iter().map(|k| k.to_lowercase()).collect(),
        })),
        _ => None,
    }
}

/// First line carrying an event marker and an opening parenthesis
fn event_line<'a>(lines: &'a [String], markers: &[String]) -> Option<&'a String> {
    lines
        .iter()
        .find(|line| line.contains('(') && markers.iter().any(|m| line.contains(m.as_str())))
}

/// `Evento em 2 horas (2025-09-27 19:00 -03:00)`; the offset is ignored
struct EventoIsoTimestamp {
    markers: Vec<String>,
}

impl Strategy<Lines, NaiveDateTime> for EventoIsoTimestamp {
    fn name(&self) -> &'static str {
        "EventoIsoTimestamp"
    }

    fn apply(&self, lines: &Lines) -> Option<NaiveDateTime> {
        let line = event_line(lines, &self.markers)?;
        let captures = ISO_EVENT_REGEX.captures(line)?;
        let stamp = format!("{} {}", &captures[1], &captures[2]);

        match NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%d %H:%M") {
            Ok(date) => Some(date),
            Err(e) => {
                tracing::debug!("   ⚠️  Unparseable event timestamp '{stamp}': {e}");
                None
            }
        }
    }
}

/// Older layout: `Evento (27/09/2025 19:00)` or with dashes and two-digit years
struct EventoDayFirst {
    markers: Vec<String>,
}

impl Strategy<Lines, NaiveDateTime> for EventoDayFirst {
    fn name(&self) -> &'static str {
        "EventoDayFirst"
    }

    fn apply(&self, lines: &Lines) -> Option<NaiveDateTime> {
        let line = event_line(lines, &self.markers)?;
        let captures = DAY_FIRST_EVENT_REGEX.captures(line)?;

        let day: u32 = captures[1].parse().ok()?;
        let month: u32 = captures[2].parse().ok()?;
        let year: i32 = match &captures[3] {
            short if short.len() == 2 => 2000 + short.parse::<i32>().ok()?,
            full => full.parse().ok()?,
        };
        let time = NaiveTime::parse_from_str(&captures[4], "%H:%M").ok()?;

        NaiveDate::from_ymd_opt(year, month, day).map(|date| date.and_time(time))
    }
}

/// `Team A <separator> Team B 3.25%`
struct SeparatedTeams {
    name: &'static str,
    separator: Regex,
    excluded: Vec<String>,
    require_trailing_percentage: bool,
}

impl SeparatedTeams {
    fn qualifies(&self, line: &str) -> bool {
        line.contains('%')
            && self.separator.is_match(line)
            && !self.excluded.iter().any(|marker| line.contains(marker.as_str()))
            && (!self.require_trailing_percentage || TRAILING_PERCENT_REGEX.is_match(line))
    }
}

impl Strategy<Lines, TeamsRow> for SeparatedTeams {
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, lines: &Lines) -> Option<TeamsRow> {
        let line = lines.iter().find(|line| self.qualifies(line))?;

        let (names, profit_percentage) = match TRAILING_PERCENT_REGEX.captures(line) {
            Some(captures) => {
                let start = captures.get(0).map_or(line.len(), |m| m.start());
                (&line[..start], parse_decimal(&captures[1]))
            }
            None => (line.as_str(), None),
        };

        let mut sides = self.separator.split(names).map(str::trim);
        let team_a = sides.next().filter(|s| !s.is_empty()).map(str::to_string);
        let team_b = sides.next().filter(|s| !s.is_empty()).map(str::to_string);

        if team_a.is_none() && team_b.is_none() && profit_percentage.is_none() {
            return None;
        }

        Some(TeamsRow {
            team_a,
            team_b,
            profit_percentage,
        })
    }
}

/// `Futebol / Espanha / La Liga`
struct SlashSeparatedSport {
    keywords: Vec<String>,
}

impl Strategy<Lines, SportRow> for SlashSeparatedSport {
    fn name(&self) -> &'static str {
        "SlashSeparatedSport"
    }

    fn apply(&self, lines: &Lines) -> Option<SportRow> {
        let line = lines.iter().find(|line| {
            let lower = line.to_lowercase();
            line.contains(SPORT_SEPARATOR) && self.keywords.iter().any(|k| lower.contains(k.as_str()))
        })?;

        let parts: Vec<&str> = line.split(SPORT_SEPARATOR).collect();
        let sport = parts[0].trim();
        let league = parts[1..].join(SPORT_SEPARATOR).trim().to_string();

        Some(SportRow {
            sport: (!sport.is_empty()).then(|| sport.to_string()),
            league: (!league.is_empty()).then_some(league),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|l| l.to_string()).collect()
    }

    fn extractor() -> MetadataExtractor {
        MetadataExtractor::new(&MetadataConfig::default())
    }

    fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(hh, mm, 0))
            .unwrap()
    }

    #[test]
    fn iso_event_timestamp_drops_offset() {
        let page = lines(&["Evento em 2 horas (2025-09-27 19:00 -03:00)"]);
        assert_eq!(extractor().extract(&page).date, Some(at(2025, 9, 27, 19, 0)));
    }

    #[test]
    fn only_first_event_line_is_considered() {
        let page = lines(&[
            "Evento ao vivo (sem horário)",
            "Evento em 2 horas (2025-09-27 19:00 -03:00)",
        ]);
        assert_eq!(extractor().extract(&page).date, None);
    }

    #[test]
    fn impossible_calendar_date_is_null() {
        let page = lines(&["Evento (2025-02-30 19:00)"]);
        assert_eq!(extractor().extract(&page).date, None);
    }

    #[test]
    fn day_first_layout_is_a_fallback() {
        let page = lines(&["Evento em 3 horas (27/09/2025 21:45)"]);
        assert_eq!(extractor().extract(&page).date, Some(at(2025, 9, 27, 21, 45)));

        let short_year = lines(&["Evento (03-10-25 08:05)"]);
        assert_eq!(extractor().extract(&short_year).date, Some(at(2025, 10, 3, 8, 5)));
    }

    #[test]
    fn fallback_can_be_disabled() {
        let mut config = MetadataConfig::default();
        config.date_strategies = vec![RuleConfig {
            name: "EventoIsoTimestamp".to_string(),
            enabled: true,
        }];
        let extractor = MetadataExtractor::new(&config);
        let page = lines(&["Evento (27/09/2025 21:45)"]);
        assert_eq!(extractor.extract(&page).date, None);
    }

    #[test]
    fn teams_and_margin_from_dash_row() {
        let page = lines(&["Surebet", "Real Madrid–Barcelona 3.25%"]);
        let metadata = extractor().extract(&page);
        assert_eq!(metadata.team_a.as_deref(), Some("Real Madrid"));
        assert_eq!(metadata.team_b.as_deref(), Some("Barcelona"));
        assert_eq!(metadata.profit_percentage, Some(3.25));
    }

    #[test]
    fn em_dash_with_spaces_is_accepted() {
        let page = lines(&["Lakers — Celtics 2.10%"]);
        let metadata = extractor().extract(&page);
        assert_eq!(metadata.team_a.as_deref(), Some("Lakers"));
        assert_eq!(metadata.team_b.as_deref(), Some("Celtics"));
        assert_eq!(metadata.profit_percentage, Some(2.1));
    }

    #[test]
    fn roi_and_event_rows_are_not_teams() {
        let page = lines(&[
            "Mostrar ROI – 1205.4%",
            "Evento – em 2 horas 5%",
            "Porto–Benfica 1.5% extra",
        ]);
        let metadata = extractor().extract(&page);
        assert_eq!(metadata.team_a.as_deref(), Some("Porto"));
        assert_eq!(metadata.team_b.as_deref(), Some("Benfica 1.5% extra"));
        assert_eq!(metadata.profit_percentage, None);
    }

    #[test]
    fn hyphen_and_versus_rows_are_fallbacks() {
        let hyphen = lines(&["Flamengo - Palmeiras 4.10%"]);
        let metadata = extractor().extract(&hyphen);
        assert_eq!(metadata.team_a.as_deref(), Some("Flamengo"));
        assert_eq!(metadata.team_b.as_deref(), Some("Palmeiras"));

        let versus = lines(&["Sinner J. vs Medvedev D. 2.4%"]);
        let metadata = extractor().extract(&versus);
        assert_eq!(metadata.team_a.as_deref(), Some("Sinner J."));
        assert_eq!(metadata.team_b.as_deref(), Some("Medvedev D."));
        assert_eq!(metadata.profit_percentage, Some(2.4));
    }

    #[test]
    fn sport_and_league_from_slash_row() {
        let page = lines(&["Futebol / Espanha / La Liga"]);
        let metadata = extractor().extract(&page);
        assert_eq!(metadata.sport.as_deref(), Some("Futebol"));
        assert_eq!(metadata.league.as_deref(), Some("Espanha / La Liga"));
    }

    #[test]
    fn slash_row_without_sport_keyword_is_ignored() {
        let page = lines(&["Dinheiro / Conta / Saldo"]);
        assert_eq!(extractor().extract(&page).sport, None);
    }

    #[test]
    fn empty_page_yields_empty_metadata() {
        assert_eq!(extractor().extract(&[]), EventMetadata::default());
    }
}
