use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MAX_RECOMMENDATIONS: usize = 3;

/// One generated analyst note, linked by value to the trading date it was
/// computed from. The store is append-only: a rerun for the same date adds a
/// second row rather than replacing the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInsight {
    pub analysis_date: NaiveDate,
    pub summary: String,
    /// Zero to three actionable recommendations, in the order the model
    /// produced them. Empty when the model output could not be parsed into
    /// the structured shape (the raw text becomes the summary instead).
    pub recommendations: Vec<String>,
}

impl StockInsight {
    pub fn new(analysis_date: NaiveDate, summary: String, recommendations: Vec<String>) -> Self {
        let mut recommendations = recommendations;
        recommendations.truncate(MAX_RECOMMENDATIONS);
        Self {
            analysis_date,
            summary,
            recommendations,
        }
    }

    pub fn recommendation(&self, slot: usize) -> Option<&str> {
        self.recommendations.get(slot).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn extra_recommendations_are_dropped() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let insight = StockInsight::new(
            date,
            "flat day".into(),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
        );
        assert_eq!(insight.recommendations.len(), 3);
        assert_eq!(insight.recommendation(2), Some("c"));
        assert_eq!(insight.recommendation(3), None);
    }
}
