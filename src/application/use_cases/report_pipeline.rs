use std::collections::HashMap;

use tracing::{debug, warn};

use crate::domain::channel::{
    self, AD_EQUIV_COLUMN, CHANNEL_COLUMN, GROUP_COLUMN, REACH_COLUMN,
};
use crate::domain::error::{AppError, Result};
use crate::domain::report::{
    summary_row_json, ChartData, ReportPreview, ReportSummary, SummaryRow,
};
use crate::domain::table::{Cell, DataTable, SourceFile};
use crate::infrastructure::spreadsheet;

/// Report pipeline: merge the uploaded exports into one dataset, derive
/// the channel group per article, coerce the metric columns and aggregate
/// per group.
///
/// Purely functional per call; nothing is cached between requests.
pub struct ReportUseCase;

impl ReportUseCase {
    pub fn new() -> Self {
        Self
    }

    /// Parse and merge all uploaded files into the unified dataset.
    ///
    /// Individual unreadable files are logged and skipped; the batch only
    /// fails when nothing was supplied or nothing could be read. Rows whose
    /// channel cell is missing are dropped before the group column is
    /// derived, then the metric columns are coerced to numbers.
    pub fn build_dataset(&self, files: &[SourceFile]) -> Result<DataTable> {
        if files.is_empty() {
            return Err(AppError::InvalidInput("no file supplied".to_string()));
        }

        let mut merged = DataTable::default();
        let mut parsed = 0usize;
        for file in files {
            match spreadsheet::read_table(&file.data) {
                Ok(table) => {
                    debug!(file = %file.name, rows = table.rows.len(), "Parsed spreadsheet");
                    merged.append_outer(table);
                    parsed += 1;
                }
                Err(e) => {
                    warn!(file = %file.name, error = %e, "Skipping unreadable spreadsheet");
                }
            }
        }
        if parsed == 0 {
            return Err(AppError::InvalidInput(
                "no valid spreadsheet could be read".to_string(),
            ));
        }
        if parsed < files.len() {
            warn!(
                skipped = files.len() - parsed,
                total = files.len(),
                "Some uploaded files were excluded from the report"
            );
        }

        let channel_idx = merged.column_index(CHANNEL_COLUMN).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "column '{}' missing from every uploaded file",
                CHANNEL_COLUMN
            ))
        })?;

        // Two distinct steps: rows with a literally missing channel are
        // dropped; everything that remains gets a group label, even when
        // the label is blank text.
        merged.retain_rows(|row| !row[channel_idx].is_missing());

        let groups: Vec<Cell> = merged
            .rows
            .iter()
            .map(|row| Cell::Text(channel::normalize(&row[channel_idx].display())))
            .collect();
        merged.add_column(GROUP_COLUMN, groups);

        for metric in [REACH_COLUMN, AD_EQUIV_COLUMN] {
            if let Some(idx) = merged.column_index(metric) {
                merged.map_column(idx, |cell| Cell::Number(cell.as_number().unwrap_or(0.0)));
            }
        }

        Ok(merged)
    }

    /// Aggregate the unified dataset per channel group and order the rows
    /// for display.
    ///
    /// # Panics
    ///
    /// Expects a dataset produced by [`Self::build_dataset`], which always
    /// carries the group column; panics when handed a table without it.
    pub fn summarize(&self, dataset: &DataTable) -> ReportSummary {
        let group_idx = dataset
            .column_index(GROUP_COLUMN)
            .expect("dataset built by this pipeline always carries the group column");
        let reach_idx = dataset.column_index(REACH_COLUMN);
        let ad_equiv_idx = dataset.column_index(AD_EQUIV_COLUMN);

        let mut rows: Vec<SummaryRow> = Vec::new();
        let mut index_of: HashMap<String, usize> = HashMap::new();

        for row in &dataset.rows {
            let group = row[group_idx].display();
            let entry = match index_of.get(&group) {
                Some(&i) => &mut rows[i],
                None => {
                    index_of.insert(group.clone(), rows.len());
                    rows.push(SummaryRow {
                        group,
                        count: 0,
                        reach: reach_idx.map(|_| 0.0),
                        ad_equiv: ad_equiv_idx.map(|_| 0.0),
                    });
                    rows.last_mut().unwrap()
                }
            };

            entry.count += 1;
            if let (Some(idx), Some(sum)) = (reach_idx, entry.reach.as_mut()) {
                *sum += row[idx].as_number().unwrap_or(0.0);
            }
            if let (Some(idx), Some(sum)) = (ad_equiv_idx, entry.ad_equiv.as_mut()) {
                *sum += row[idx].as_number().unwrap_or(0.0);
            }
        }

        // Stable, so equal-priority groups keep first-seen order.
        rows.sort_by_key(|row| channel::display_priority(&row.group));

        ReportSummary {
            rows,
            has_reach: reach_idx.is_some(),
            has_ad_equiv: ad_equiv_idx.is_some(),
        }
    }

    /// Full preview path: dataset, summary and the UI structures in one go.
    pub fn preview(&self, files: &[SourceFile]) -> Result<ReportPreview> {
        let dataset = self.build_dataset(files)?;
        let summary = self.summarize(&dataset);
        Ok(self.serialize_preview(&summary))
    }

    fn serialize_preview(&self, summary: &ReportSummary) -> ReportPreview {
        let chart_data = ChartData {
            labels: summary.rows.iter().map(|r| r.group.clone()).collect(),
            haber_adedi: summary.rows.iter().map(|r| r.count).collect(),
            erisim: if summary.has_reach {
                summary
                    .rows
                    .iter()
                    .map(|r| r.reach.unwrap_or(0.0))
                    .collect()
            } else {
                Vec::new()
            },
            reklam: if summary.has_ad_equiv {
                summary
                    .rows
                    .iter()
                    .map(|r| r.ad_equiv.unwrap_or(0.0))
                    .collect()
            } else {
                Vec::new()
            },
        };

        ReportPreview {
            summary_table: summary
                .rows
                .iter()
                .map(|row| summary_row_json(row, summary))
                .collect(),
            totals: summary_row_json(&summary.totals(), summary),
            chart_data,
        }
    }
}

impl Default for ReportUseCase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::channel::{INTERNET, TOTAL_LABEL, TV, WRITTEN_PRESS};
    use rust_xlsxwriter::Workbook;

    /// Build an in-memory xlsx with the given header and string/number rows.
    fn xlsx(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                // Headers stay text even when numeric-looking.
                if r > 0 {
                    if let Ok(number) = value.parse::<f64>() {
                        worksheet.write_number(r as u32, c as u16, number).unwrap();
                        continue;
                    }
                }
                worksheet.write_string(r as u32, c as u16, *value).unwrap();
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    fn file(name: &str, data: Vec<u8>) -> SourceFile {
        SourceFile {
            name: name.to_string(),
            data,
        }
    }

    #[test]
    fn test_scenario_a_two_files_ordered_summary() {
        let pipeline = ReportUseCase::new();
        let files = vec![
            file(
                "b.xlsx",
                xlsx(&[&["Mecra", "Erişim"], &["Elektronik Basın", "50"]]),
            ),
            file(
                "a.xlsx",
                xlsx(&[&["Mecra", "Erişim"], &["Yazılı Basın Günlük", "100"]]),
            ),
        ];

        let dataset = pipeline.build_dataset(&files).unwrap();
        let summary = pipeline.summarize(&dataset);

        assert_eq!(summary.rows.len(), 2);
        assert_eq!(summary.rows[0].group, WRITTEN_PRESS);
        assert_eq!(summary.rows[0].count, 1);
        assert_eq!(summary.rows[0].reach, Some(100.0));
        assert_eq!(summary.rows[1].group, INTERNET);
        assert_eq!(summary.rows[1].reach, Some(50.0));

        let totals = summary.totals();
        assert_eq!(totals.group, TOTAL_LABEL);
        assert_eq!(totals.reach, Some(150.0));
    }

    #[test]
    fn test_scenario_b_missing_channel_row_is_dropped() {
        let pipeline = ReportUseCase::new();
        let files = vec![file(
            "a.xlsx",
            xlsx(&[
                &["Mecra", "Erişim"],
                &["Yazılı Basın", "100"],
                &["", "999"],
            ]),
        )];

        let dataset = pipeline.build_dataset(&files).unwrap();
        assert_eq!(dataset.rows.len(), 1);

        let summary = pipeline.summarize(&dataset);
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.totals().reach, Some(100.0));
    }

    #[test]
    fn test_scenario_c_corrupt_file_is_skipped() {
        let pipeline = ReportUseCase::new();
        let files = vec![
            file("broken.xlsx", b"garbage".to_vec()),
            file(
                "ok.xlsx",
                xlsx(&[&["Mecra"], &["Görsel Basın"]]),
            ),
        ];

        let preview = pipeline.preview(&files).unwrap();
        assert_eq!(preview.chart_data.labels, vec![TV.to_string()]);
        assert_eq!(preview.chart_data.haber_adedi, vec![1]);
    }

    #[test]
    fn test_scenario_d_no_valid_files() {
        let pipeline = ReportUseCase::new();

        let err = pipeline.build_dataset(&[]).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let files = vec![file("x.xlsx", b"junk".to_vec())];
        let err = pipeline.build_dataset(&files).unwrap_err();
        match err {
            AppError::InvalidInput(msg) => assert!(msg.contains("no valid spreadsheet")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_scenario_e_absent_metric_stays_absent() {
        let pipeline = ReportUseCase::new();
        let files = vec![file(
            "a.xlsx",
            xlsx(&[&["Mecra", "Erişim"], &["TV Ana Haber", "10"]]),
        )];

        let dataset = pipeline.build_dataset(&files).unwrap();
        assert!(!dataset.has_column(AD_EQUIV_COLUMN));

        let summary = pipeline.summarize(&dataset);
        assert!(!summary.has_ad_equiv);
        assert_eq!(summary.rows[0].ad_equiv, None);

        let preview = pipeline.preview(&files).unwrap();
        assert!(preview.chart_data.reklam.is_empty());
        assert_eq!(preview.chart_data.erisim, vec![10.0]);
        assert!(preview.summary_table[0].get(AD_EQUIV_COLUMN).is_none());
    }

    #[test]
    fn test_merged_row_count_is_sum_of_inputs() {
        let pipeline = ReportUseCase::new();
        let files = vec![
            file(
                "a.xlsx",
                xlsx(&[&["Mecra"], &["Yazılı Basın"], &["Radyo"]]),
            ),
            file("b.xlsx", xlsx(&[&["Mecra"], &["TV"]])),
        ];
        let dataset = pipeline.build_dataset(&files).unwrap();
        assert_eq!(dataset.rows.len(), 3);
    }

    #[test]
    fn test_heterogeneous_columns_outer_join() {
        let pipeline = ReportUseCase::new();
        let files = vec![
            file(
                "a.xlsx",
                xlsx(&[&["Mecra", "Erişim"], &["Yazılı Basın", "100"]]),
            ),
            file(
                "b.xlsx",
                xlsx(&[
                    &["Mecra", "Reklam Eşdeğeri (TL)"],
                    &["Elektronik Basın", "2500"],
                ]),
            ),
        ];

        let dataset = pipeline.build_dataset(&files).unwrap();
        assert!(dataset.has_column(REACH_COLUMN));
        assert!(dataset.has_column(AD_EQUIV_COLUMN));

        let summary = pipeline.summarize(&dataset);
        // Padded cells coerce to zero, never to an error.
        assert_eq!(summary.rows[0].ad_equiv, Some(0.0));
        assert_eq!(summary.rows[1].reach, Some(0.0));
        assert_eq!(summary.totals().ad_equiv, Some(2500.0));
    }

    #[test]
    fn test_aggregation_is_a_partition() {
        let pipeline = ReportUseCase::new();
        let files = vec![file(
            "a.xlsx",
            xlsx(&[
                &["Mecra"],
                &["Yazılı Basın"],
                &["Yazılı Basın Aylık"],
                &["Elektronik Basın"],
                &["Radyo"],
                &["Radyo"],
            ]),
        )];

        let dataset = pipeline.build_dataset(&files).unwrap();
        let summary = pipeline.summarize(&dataset);

        let total: u64 = summary.rows.iter().map(|r| r.count).sum();
        assert_eq!(total as usize, dataset.rows.len());

        let mut groups: Vec<&str> = summary.rows.iter().map(|r| r.group.as_str()).collect();
        groups.dedup();
        assert_eq!(groups.len(), summary.rows.len(), "each group appears once");
    }

    #[test]
    fn test_orderer_keeps_first_seen_order_for_other_labels() {
        let pipeline = ReportUseCase::new();
        let files = vec![file(
            "a.xlsx",
            xlsx(&[
                &["Mecra"],
                &["Dergi"],
                &["TV Kanalı Görsel Basın"],
                &["Radyo"],
                &["Yazılı Basın"],
            ]),
        )];

        let dataset = pipeline.build_dataset(&files).unwrap();
        let summary = pipeline.summarize(&dataset);
        let order: Vec<&str> = summary.rows.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(order, vec![WRITTEN_PRESS, TV, "Dergi", "Radyo"]);
    }

    #[test]
    fn test_unparseable_metric_cells_become_zero() {
        let pipeline = ReportUseCase::new();
        let files = vec![file(
            "a.xlsx",
            xlsx(&[
                &["Mecra", "Erişim"],
                &["TV Haber", "bilinmiyor"],
                &["TV Haber", "40"],
            ]),
        )];

        let dataset = pipeline.build_dataset(&files).unwrap();
        let summary = pipeline.summarize(&dataset);
        assert_eq!(summary.rows[0].reach, Some(40.0));
    }

    #[test]
    fn test_missing_channel_column_is_invalid_input() {
        let pipeline = ReportUseCase::new();
        let files = vec![file("a.xlsx", xlsx(&[&["Başlık"], &["Haber"]]))];
        let err = pipeline.build_dataset(&files).unwrap_err();
        match err {
            AppError::InvalidInput(msg) => assert!(msg.contains("Mecra")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_totals_match_direct_column_sums() {
        let pipeline = ReportUseCase::new();
        let files = vec![file(
            "a.xlsx",
            xlsx(&[
                &["Mecra", "Erişim", "Reklam Eşdeğeri (TL)"],
                &["Yazılı Basın", "10", "1000"],
                &["Elektronik Basın", "20", "2000"],
                &["Radyo", "30", "3000"],
            ]),
        )];

        let dataset = pipeline.build_dataset(&files).unwrap();
        let summary = pipeline.summarize(&dataset);
        let totals = summary.totals();

        let reach_idx = dataset.column_index(REACH_COLUMN).unwrap();
        let direct: f64 = dataset
            .rows
            .iter()
            .filter_map(|r| r[reach_idx].as_number())
            .sum();
        assert_eq!(totals.reach, Some(direct));
        assert_eq!(totals.ad_equiv, Some(6000.0));
        assert_eq!(totals.count, 3);
    }

    #[test]
    fn test_preview_totals_row_uses_total_marker() {
        let pipeline = ReportUseCase::new();
        let files = vec![file(
            "a.xlsx",
            xlsx(&[&["Mecra", "Erişim"], &["Yazılı Basın", "5"]]),
        )];
        let preview = pipeline.preview(&files).unwrap();
        assert_eq!(preview.totals["Mecra"], TOTAL_LABEL);
        assert_eq!(preview.totals["Haber Adedi"], 1);
    }
}
