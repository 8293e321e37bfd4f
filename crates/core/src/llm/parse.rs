use crate::domain::insight::MAX_RECOMMENDATIONS;

/// Model output reduced to the structured shape we asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInsight {
    pub summary: String,
    pub recommendations: Vec<String>,
}

/// Line-based extraction of `Summary:` / `Recommendation N:` from the model
/// output. Intentionally infallible: if no `Summary:` line exists, the whole
/// raw text becomes the summary and the recommendations stay empty. The
/// stock data is already durable by the time this runs, so a degraded
/// insight always beats a failed run.
pub fn parse_insight(text: &str) -> ParsedInsight {
    let mut summary = String::new();
    let mut slots: [Option<String>; MAX_RECOMMENDATIONS] = std::array::from_fn(|_| None);

    for line in text.lines() {
        let line = line.trim().trim_start_matches(['-', '*', ' ']);
        if let Some(rest) = strip_label(line, "Summary:") {
            if summary.is_empty() {
                summary = rest.to_string();
            }
            continue;
        }
        for (idx, slot) in slots.iter_mut().enumerate() {
            let label = format!("Recommendation {}:", idx + 1);
            if let Some(rest) = strip_label(line, &label) {
                if slot.is_none() && !rest.is_empty() {
                    *slot = Some(rest.to_string());
                }
            }
        }
    }

    if summary.is_empty() {
        return ParsedInsight {
            summary: text.trim().to_string(),
            recommendations: Vec::new(),
        };
    }

    ParsedInsight {
        summary,
        recommendations: slots.into_iter().flatten().collect(),
    }
}

fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    // Tolerates markdown emphasis around the label ("**Summary:**").
    let line = line.trim_start_matches("**");
    let rest = line.strip_prefix(label)?;
    Some(rest.trim_start_matches("**").trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_expected_line_format() {
        let text = "Summary: The stock closed slightly up on strong volume.\n\
                    Recommendation 1: Hold through earnings.\n\
                    Recommendation 2: Watch the 120 support level.\n\
                    Recommendation 3: Reassess if volume fades.";
        let parsed = parse_insight(text);
        assert_eq!(
            parsed.summary,
            "The stock closed slightly up on strong volume."
        );
        assert_eq!(parsed.recommendations.len(), 3);
        assert_eq!(parsed.recommendations[1], "Watch the 120 support level.");
    }

    #[test]
    fn unstructured_text_falls_back_to_raw_summary() {
        let text = "The model decided to write a free-form essay instead.\nNo labels at all.";
        let parsed = parse_insight(text);
        assert_eq!(parsed.summary, text);
        assert!(parsed.recommendations.is_empty());
    }

    #[test]
    fn fewer_than_three_recommendations_is_fine() {
        let text = "Summary: Quiet day.\nRecommendation 1: Do nothing.";
        let parsed = parse_insight(text);
        assert_eq!(parsed.summary, "Quiet day.");
        assert_eq!(parsed.recommendations, vec!["Do nothing.".to_string()]);
    }

    #[test]
    fn markdown_decorated_labels_still_parse() {
        let text = "**Summary:** Up day.\n- **Recommendation 1:** Trim the position.";
        let parsed = parse_insight(text);
        assert_eq!(parsed.summary, "Up day.");
        assert_eq!(parsed.recommendations, vec!["Trim the position.".to_string()]);
    }

    #[test]
    fn duplicate_labels_keep_the_first_occurrence() {
        let text = "Summary: first\nSummary: second\nRecommendation 1: a\nRecommendation 1: b";
        let parsed = parse_insight(text);
        assert_eq!(parsed.summary, "first");
        assert_eq!(parsed.recommendations, vec!["a".to_string()]);
    }
}
