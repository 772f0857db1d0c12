//! Per-system score history: latest pillar cards plus one row per datacall.

use crate::format::{format_score, to_fixed};
use crate::maturity::{Maturity, maturity};
use crate::model::{Datacall, SystemScore};
use crate::trend::{Trend, trend};

pub const NO_PREVIOUS_TEXT: &str = "No previous data";
pub const NO_PERIOD_DATA_TEXT: &str = "No score data available for this period";

/// Datacall name for `datacallid`, or a generic label when it is unknown.
pub fn quarter_name(datacalls: &[Datacall], datacallid: i64) -> String {
    datacalls
        .iter()
        .find(|d| d.datacallid == datacallid)
        .map_or_else(|| format!("Datacall {datacallid}"), |d| d.datacall.clone())
}

/// One pillar's latest score.
#[derive(Debug, Clone, PartialEq)]
pub struct PillarCard {
    pub pillarid: i64,
    pub pillar: String,
    pub score: f64,
    pub score_text: String,
    pub maturity: Maturity,
    pub previous: Option<f64>,
    pub trend: Trend,
}

impl PillarCard {
    /// Trend and caption are only meaningful for a scored pillar.
    pub fn is_scored(&self) -> bool {
        self.score > 0.0
    }

    pub fn caption(&self) -> Option<String> {
        if !self.is_scored() {
            return None;
        }
        Some(match self.previous {
            Some(p) => format!("Previous: {}", to_fixed(p, 2)),
            None => NO_PREVIOUS_TEXT.to_owned(),
        })
    }

    pub fn trend_text(&self) -> Option<String> {
        let text = self.trend.compact_text();
        (self.is_scored() && !text.is_empty()).then_some(text)
    }
}

/// Overall score for one datacall, compared with the period before it.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub datacallid: i64,
    pub quarter: String,
    pub score: f64,
    pub score_text: String,
    pub trend: Trend,
}

impl HistoryRow {
    /// Text under the row: the trend sentence, or a notice for unscored
    /// periods.
    pub fn detail(&self) -> Option<String> {
        if self.score.abs() < f64::EPSILON {
            return Some(NO_PERIOD_DATA_TEXT.to_owned());
        }
        let text = self.trend.text();
        (self.score > 0.0 && !text.is_empty()).then_some(text)
    }
}

/// Everything the score history view shows for one system.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreHistory {
    pub latest_datacall: i64,
    pub latest_quarter: String,
    pub overall: f64,
    pub overall_text: String,
    pub overall_maturity: Maturity,
    pub pillars: Vec<PillarCard>,
    pub rows: Vec<HistoryRow>,
}

impl ScoreHistory {
    /// Build the view. Returns `None` when there is no pillar data for the
    /// latest datacall.
    pub fn build(scores: &[SystemScore], datacalls: &[Datacall]) -> Option<Self> {
        let latest = scores.iter().max_by_key(|s| s.datacallid)?;
        if latest.pillarscores.is_empty() {
            return None;
        }

        let previous = scores
            .iter()
            .filter(|s| s.datacallid != latest.datacallid)
            .max_by_key(|s| s.datacallid);

        let pillars = latest
            .pillarscores
            .iter()
            .map(|p| {
                let prev = previous
                    .and_then(|s| s.pillarscores.iter().find(|q| q.pillarid == p.pillarid))
                    .map(|q| q.score)
                    .filter(|score| score.abs() >= f64::EPSILON);
                PillarCard {
                    pillarid: p.pillarid,
                    pillar: p.pillar.clone(),
                    score: p.score,
                    score_text: format_score(p.score),
                    maturity: maturity(p.score),
                    previous: prev,
                    trend: trend(p.score, prev),
                }
            })
            .collect();

        Some(Self {
            latest_datacall: latest.datacallid,
            latest_quarter: quarter_name(datacalls, latest.datacallid),
            overall: latest.systemscore,
            overall_text: format_score(latest.systemscore),
            overall_maturity: maturity(latest.systemscore),
            pillars,
            rows: history_rows(scores, datacalls),
        })
    }
}

/// Rows newest first. A single score has no history to show.
pub fn history_rows(scores: &[SystemScore], datacalls: &[Datacall]) -> Vec<HistoryRow> {
    if scores.len() <= 1 {
        return Vec::new();
    }
    let mut sorted: Vec<&SystemScore> = scores.iter().collect();
    sorted.sort_by(|a, b| b.datacallid.cmp(&a.datacallid));

    sorted
        .iter()
        .enumerate()
        .map(|(i, score)| {
            let older = sorted.get(i + 1).map(|s| s.systemscore);
            HistoryRow {
                datacallid: score.datacallid,
                quarter: quarter_name(datacalls, score.datacallid),
                score: score.systemscore,
                score_text: format_score(score.systemscore),
                trend: trend(score.systemscore, older),
            }
        })
        .collect()
}
