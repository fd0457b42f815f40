use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::channel::{AD_EQUIV_COLUMN, CHANNEL_COLUMN, COUNT_COLUMN, REACH_COLUMN, TOTAL_LABEL};

/// Aggregated metrics for one channel group.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub group: String,
    pub count: u64,
    /// Present iff the merged dataset carried the reach column.
    pub reach: Option<f64>,
    /// Present iff the merged dataset carried the ad-equivalency column.
    pub ad_equiv: Option<f64>,
}

/// Ordered per-group summary plus which metric columns existed in the
/// source data. Metric presence is tracked separately from the rows so an
/// all-zero column can be told apart from an absent one.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub rows: Vec<SummaryRow>,
    pub has_reach: bool,
    pub has_ad_equiv: bool,
}

impl ReportSummary {
    /// Totals row over all summary rows, labelled with the literal
    /// totals marker. Only the exported workbook shows it.
    pub fn totals(&self) -> SummaryRow {
        SummaryRow {
            group: TOTAL_LABEL.to_string(),
            count: self.rows.iter().map(|r| r.count).sum(),
            reach: self
                .has_reach
                .then(|| self.rows.iter().filter_map(|r| r.reach).sum()),
            ad_equiv: self
                .has_ad_equiv
                .then(|| self.rows.iter().filter_map(|r| r.ad_equiv).sum()),
        }
    }

    /// Column headers of the summary sheet, in display order.
    pub fn column_headers(&self) -> Vec<&'static str> {
        let mut headers = vec![CHANNEL_COLUMN, COUNT_COLUMN];
        if self.has_reach {
            headers.push(REACH_COLUMN);
        }
        if self.has_ad_equiv {
            headers.push(AD_EQUIV_COLUMN);
        }
        headers
    }
}

/// Parallel arrays feeding the UI pie charts. Absent metrics serialize as
/// empty arrays, never as zero-filled ones.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub haber_adedi: Vec<u64>,
    pub erisim: Vec<f64>,
    pub reklam: Vec<f64>,
}

/// UI-ready preview of the report, without the totals row in the table
/// portion shown as chart input.
#[derive(Debug, Clone, Serialize)]
pub struct ReportPreview {
    pub summary_table: Vec<Value>,
    pub totals: Value,
    pub chart_data: ChartData,
}

pub fn summary_row_json(row: &SummaryRow, summary: &ReportSummary) -> Value {
    let mut map = Map::new();
    map.insert(CHANNEL_COLUMN.to_string(), json!(row.group));
    map.insert(COUNT_COLUMN.to_string(), json!(row.count));
    if summary.has_reach {
        map.insert(REACH_COLUMN.to_string(), json!(row.reach.unwrap_or(0.0)));
    }
    if summary.has_ad_equiv {
        map.insert(
            AD_EQUIV_COLUMN.to_string(),
            json!(row.ad_equiv.unwrap_or(0.0)),
        );
    }
    Value::Object(map)
}

/// Caller-selectable styling of the exported summary sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleVariant {
    Standard,
    Modern,
}

impl StyleVariant {
    /// Unrecognized selectors fall back to the standard preset.
    pub fn from_param(value: &str) -> Self {
        match value {
            "modern" => StyleVariant::Modern,
            _ => StyleVariant::Standard,
        }
    }
}

/// Colors of one header style preset (0xRRGGBB).
#[derive(Debug, Clone, Copy)]
pub struct StylePreset {
    pub variant: StyleVariant,
    pub header_fill: u32,
    pub header_font: u32,
}

/// Immutable preset table; never mutated at runtime.
static STYLE_PRESETS: Lazy<Vec<StylePreset>> = Lazy::new(|| {
    vec![
        StylePreset {
            variant: StyleVariant::Standard,
            header_fill: 0xD9E1F2,
            header_font: 0x000000,
        },
        StylePreset {
            variant: StyleVariant::Modern,
            header_fill: 0x4472C4,
            header_font: 0xFFFFFF,
        },
    ]
});

pub fn preset_for(variant: StyleVariant) -> &'static StylePreset {
    STYLE_PRESETS
        .iter()
        .find(|p| p.variant == variant)
        .unwrap_or(&STYLE_PRESETS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> ReportSummary {
        ReportSummary {
            rows: vec![
                SummaryRow {
                    group: "Yazılı Basın".into(),
                    count: 2,
                    reach: Some(100.0),
                    ad_equiv: None,
                },
                SummaryRow {
                    group: "TV".into(),
                    count: 1,
                    reach: Some(50.0),
                    ad_equiv: None,
                },
            ],
            has_reach: true,
            has_ad_equiv: false,
        }
    }

    #[test]
    fn test_totals_sum_all_rows() {
        let totals = summary().totals();
        assert_eq!(totals.group, TOTAL_LABEL);
        assert_eq!(totals.count, 3);
        assert_eq!(totals.reach, Some(150.0));
        assert_eq!(totals.ad_equiv, None);
    }

    #[test]
    fn test_column_headers_follow_metric_presence() {
        assert_eq!(
            summary().column_headers(),
            vec![CHANNEL_COLUMN, COUNT_COLUMN, REACH_COLUMN]
        );
    }

    #[test]
    fn test_summary_row_json_omits_absent_metrics() {
        let s = summary();
        let value = summary_row_json(&s.rows[0], &s);
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key(REACH_COLUMN));
        assert!(!obj.contains_key(AD_EQUIV_COLUMN));
    }

    #[test]
    fn test_style_variant_fallback() {
        assert_eq!(StyleVariant::from_param("modern"), StyleVariant::Modern);
        assert_eq!(StyleVariant::from_param("standard"), StyleVariant::Standard);
        assert_eq!(StyleVariant::from_param("neon"), StyleVariant::Standard);
    }

    #[test]
    fn test_presets_cover_both_variants() {
        assert_eq!(
            preset_for(StyleVariant::Modern).header_font,
            0xFFFFFF,
            "modern preset uses light text"
        );
        assert_eq!(preset_for(StyleVariant::Standard).header_font, 0x000000);
    }
}
