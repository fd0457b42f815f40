use rust_xlsxwriter::{Chart, ChartDataLabel, ChartType, Color, Format, Workbook};

use crate::domain::channel::{AD_EQUIV_COLUMN, COUNT_COLUMN, REACH_COLUMN};
use crate::domain::error::Result;
use crate::domain::report::{preset_for, ReportSummary, StyleVariant, SummaryRow};
use crate::domain::table::{Cell, DataTable};

pub const EXPORT_FILE_NAME: &str = "MTM_Yonetici_Ozeti.xlsx";
pub const EXPORT_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const DATA_SHEET: &str = "All Data";
const SUMMARY_SHEET: &str = "Executive Summary";

/// Horizontal spacing between chart anchors, in columns.
const CHART_ANCHOR_STRIDE: u16 = 8;

/// Builds the executive summary workbook: the merged dataset verbatim on
/// one sheet and the styled per-group summary with totals and pie charts
/// on the other. The workbook is materialized fully in memory; on any
/// write error nothing is returned.
pub struct WorkbookExporter;

impl WorkbookExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn export(
        &self,
        dataset: &DataTable,
        summary: &ReportSummary,
        style: StyleVariant,
    ) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();

        self.write_data_sheet(&mut workbook, dataset)?;
        self.write_summary_sheet(&mut workbook, summary, style)?;

        Ok(workbook.save_to_buffer()?)
    }

    fn write_data_sheet(&self, workbook: &mut Workbook, dataset: &DataTable) -> Result<()> {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(DATA_SHEET)?;

        for (c, header) in dataset.columns.iter().enumerate() {
            worksheet.write_string(0, c as u16, header)?;
        }
        for (r, row) in dataset.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Empty => {}
                    Cell::Text(s) => {
                        worksheet.write_string(r as u32 + 1, c as u16, s)?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(r as u32 + 1, c as u16, *n)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn write_summary_sheet(
        &self,
        workbook: &mut Workbook,
        summary: &ReportSummary,
        style: StyleVariant,
    ) -> Result<()> {
        let preset = preset_for(style);
        let header_format = Format::new()
            .set_bold()
            .set_background_color(Color::RGB(preset.header_fill))
            .set_font_color(Color::RGB(preset.header_font));
        let totals_format = Format::new().set_bold();

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SUMMARY_SHEET)?;

        let headers = summary.column_headers();
        for (c, header) in headers.iter().enumerate() {
            worksheet.set_column_width(c as u16, 22)?;
            worksheet.write_string_with_format(0, c as u16, *header, &header_format)?;
        }

        for (r, row) in summary.rows.iter().enumerate() {
            self.write_summary_row(worksheet, r as u32 + 1, row, summary, None)?;
        }

        let totals_row = summary.rows.len() as u32 + 1;
        self.write_summary_row(
            worksheet,
            totals_row,
            &summary.totals(),
            summary,
            Some(&totals_format),
        )?;

        if !summary.rows.is_empty() {
            self.insert_pie_charts(worksheet, summary, &headers)?;
        }

        Ok(())
    }

    fn write_summary_row(
        &self,
        worksheet: &mut rust_xlsxwriter::Worksheet,
        row: u32,
        data: &SummaryRow,
        summary: &ReportSummary,
        format: Option<&Format>,
    ) -> Result<()> {
        let mut cells: Vec<(u16, f64)> = vec![(1, data.count as f64)];
        let mut col = 2u16;
        if summary.has_reach {
            cells.push((col, data.reach.unwrap_or(0.0)));
            col += 1;
        }
        if summary.has_ad_equiv {
            cells.push((col, data.ad_equiv.unwrap_or(0.0)));
        }

        match format {
            Some(f) => {
                worksheet.write_string_with_format(row, 0, &data.group, f)?;
                for (c, value) in cells {
                    worksheet.write_number_with_format(row, c, value, f)?;
                }
            }
            None => {
                worksheet.write_string(row, 0, &data.group)?;
                for (c, value) in cells {
                    worksheet.write_number(row, c, value)?;
                }
            }
        }
        Ok(())
    }

    /// One pie per metric column, anchored left-to-right below the totals
    /// row. Category and value ranges cover the data rows only; the totals
    /// row must not appear as a slice.
    fn insert_pie_charts(
        &self,
        worksheet: &mut rust_xlsxwriter::Worksheet,
        summary: &ReportSummary,
        headers: &[&'static str],
    ) -> Result<()> {
        let last_data_row = summary.rows.len() as u32;
        let anchor_row = last_data_row + 3;

        let metric_columns: Vec<u16> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| [COUNT_COLUMN, REACH_COLUMN, AD_EQUIV_COLUMN].contains(h))
            .map(|(c, _)| c as u16)
            .collect();

        for (slot, metric_col) in metric_columns.into_iter().enumerate() {
            let mut chart = Chart::new(ChartType::Pie);
            chart
                .title()
                .set_name(headers[metric_col as usize]);
            chart
                .add_series()
                .set_categories((SUMMARY_SHEET, 1, 0, last_data_row, 0))
                .set_values((SUMMARY_SHEET, 1, metric_col, last_data_row, metric_col))
                .set_data_label(ChartDataLabel::new().show_percentage());

            worksheet.insert_chart(anchor_row, slot as u16 * CHART_ANCHOR_STRIDE, &chart)?;
        }

        Ok(())
    }
}

impl Default for WorkbookExporter {
    fn default() -> Self {
        Self::new()
    }
}
