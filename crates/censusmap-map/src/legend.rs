//! "Demographics" legend card and value formatting.

use censusmap_client::SchoolScores;
use censusmap_core::CensusRecord;
use serde::Serialize;

pub const LEGEND_TITLE: &str = "Demographics";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
    pub rows: Vec<LegendRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Legend {
    /// Card for the current search: a placeholder without a zip, a note when
    /// the zip has no record, otherwise the record's figures.
    #[must_use]
    pub fn for_context(zip_code: Option<&str>, record: Option<&CensusRecord>) -> Self {
        let Some(zip) = zip_code else {
            return Self {
                title: LEGEND_TITLE.to_owned(),
                rows: Vec::new(),
                note: Some("Search a zip code to see demographics.".to_owned()),
            };
        };
        let mut rows = vec![row("Zip Code", zip)];
        let Some(r) = record else {
            return Self {
                title: LEGEND_TITLE.to_owned(),
                rows,
                note: Some("No census data in database for this zip.".to_owned()),
            };
        };

        rows.push(row("Population", &format_count(r.population)));
        rows.push(row(
            "Median Age",
            &r.median_age
                .map_or_else(|| "N/A".to_owned(), |a| format!("{a:.1} years")),
        ));
        rows.push(row(
            "Median HHI",
            &format_currency(r.average_household_income),
        ));
        Self {
            title: LEGEND_TITLE.to_owned(),
            rows,
            note: None,
        }
    }
}

fn row(label: &str, value: &str) -> LegendRow {
    LegendRow {
        label: label.to_owned(),
        value: value.to_owned(),
    }
}

/// `12,345`; zero and missing read `N/A`.
#[must_use]
pub fn format_count(value: Option<i64>) -> String {
    match value {
        Some(v) if v != 0 => group_thousands(v),
        _ => "N/A".to_owned(),
    }
}

/// `$12,345`, rounded to whole dollars; zero and missing read `N/A`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_currency(value: Option<f64>) -> String {
    match value {
        Some(v) if v != 0.0 && v.is_finite() => format!("${}", group_thousands(v.round() as i64)),
        _ => "N/A".to_owned(),
    }
}

fn group_thousands(v: i64) -> String {
    let digits = v.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if v < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchoolScoreRow {
    pub score: String,
    pub name: String,
}

/// School-quality panel shown after an address search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchoolScorePanel {
    pub elementary: SchoolScoreRow,
    pub middle: SchoolScoreRow,
    pub high: SchoolScoreRow,
    pub blended: String,
}

impl SchoolScorePanel {
    #[must_use]
    pub fn loading() -> Self {
        Self::filled("Loading...", "")
    }

    #[must_use]
    pub fn error() -> Self {
        Self::filled("Error", "")
    }

    fn filled(text: &str, name: &str) -> Self {
        let r = SchoolScoreRow {
            score: text.to_owned(),
            name: name.to_owned(),
        };
        Self {
            elementary: r.clone(),
            middle: r.clone(),
            high: r,
            blended: text.to_owned(),
        }
    }

    /// Ratings to one decimal. A school name is only shown beside a rating.
    #[must_use]
    pub fn from_scores(scores: &SchoolScores) -> Self {
        Self {
            elementary: score_row(
                scores.elementary_school_rating,
                scores.elementary_school_name.as_deref(),
            ),
            middle: score_row(
                scores.middle_school_rating,
                scores.middle_school_name.as_deref(),
            ),
            high: score_row(scores.high_school_rating, scores.high_school_name.as_deref()),
            blended: scores
                .blended_school_score
                .map_or_else(|| "N/A".to_owned(), |s| format!("{s:.1}")),
        }
    }
}

fn score_row(rating: Option<f64>, name: Option<&str>) -> SchoolScoreRow {
    match rating {
        Some(r) => SchoolScoreRow {
            score: format!("{r:.1}"),
            name: name.unwrap_or_default().to_owned(),
        },
        None => SchoolScoreRow {
            score: "N/A".to_owned(),
            name: "No data available".to_owned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_grouping() {
        assert_eq!(format_count(Some(12_000)), "12,000");
        assert_eq!(format_count(Some(999)), "999");
        assert_eq!(format_count(Some(1_234_567)), "1,234,567");
        assert_eq!(format_count(Some(0)), "N/A");
        assert_eq!(format_count(None), "N/A");
    }

    #[test]
    fn currency_rounds_to_dollars() {
        assert_eq!(format_currency(Some(54_321.5)), "$54,322");
        assert_eq!(format_currency(Some(12_345.0)), "$12,345");
        assert_eq!(format_currency(None), "N/A");
    }

    #[test]
    fn legend_without_zip_is_placeholder() {
        let legend = Legend::for_context(None, None);
        assert_eq!(legend.title, "Demographics");
        assert!(legend.rows.is_empty());
        assert!(legend.note.is_some());
    }

    #[test]
    fn legend_for_zip_without_record() {
        let legend = Legend::for_context(Some("29201"), None);
        assert_eq!(legend.rows, vec![row("Zip Code", "29201")]);
        assert_eq!(
            legend.note.as_deref(),
            Some("No census data in database for this zip.")
        );
    }

    #[test]
    fn legend_with_record() {
        let record = CensusRecord {
            zip_code: "29201".to_owned(),
            population: Some(20_000),
            average_household_income: Some(45_000.4),
            median_age: Some(29.46),
            county: None,
            data_year: None,
        };
        let legend = Legend::for_context(Some("29201"), Some(&record));
        let values: Vec<&str> = legend.rows.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, vec!["29201", "20,000", "29.5 years", "$45,000"]);
        assert!(legend.note.is_none());
    }

    #[test]
    fn school_panel_formats_ratings() {
        let scores = SchoolScores {
            elementary_school_name: Some("A C Moore".to_owned()),
            elementary_school_rating: Some(7.0),
            high_school_name: Some("Dreher".to_owned()),
            high_school_rating: Some(8.26),
            blended_school_score: None,
            ..SchoolScores::default()
        };
        let panel = SchoolScorePanel::from_scores(&scores);
        assert_eq!(panel.elementary.score, "7.0");
        assert_eq!(panel.elementary.name, "A C Moore");
        assert_eq!(panel.middle.score, "N/A");
        assert_eq!(panel.middle.name, "No data available");
        assert_eq!(panel.high.score, "8.3");
        assert_eq!(panel.blended, "N/A");
        assert_eq!(SchoolScorePanel::error().blended, "Error");
    }
}
