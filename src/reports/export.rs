//! Attendance spreadsheet export: records grouped into one worksheet per
//! week plus a summary sheet, packaged as an XLSX (a zip of SpreadsheetML
//! parts with inline strings).

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use chrono::{Datelike, NaiveDate};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::models::attendance::{AttendanceRecord, AttendanceStatus};
use crate::models::user::Role;

/// Week number within the year: ceil(day_of_year / 7). Pure function of the
/// date, so a given date always lands in the same sheet. Jan 1-7 map to
/// week 1; Dec 31 of a leap year lands in week 53.
pub fn week_number(date: NaiveDate) -> u32 {
    (date.ordinal() + 6) / 7
}

/// Per-week totals for the summary sheet.
#[derive(Debug, PartialEq, Eq)]
pub struct WeekSummary {
    pub week: u32,
    pub total: i64,
    pub approved: i64,
    pub pending: i64,
    pub rejected: i64,
}

/// Group records by week number, ascending. Rows with an unparseable date
/// are dropped rather than misfiled.
pub fn group_by_week(records: &[AttendanceRecord]) -> BTreeMap<u32, Vec<&AttendanceRecord>> {
    let mut weeks: BTreeMap<u32, Vec<&AttendanceRecord>> = BTreeMap::new();
    for record in records {
        let Ok(date) = NaiveDate::parse_from_str(&record.date, "%Y-%m-%d") else {
            log::warn!("Skipping export row {} with bad date {:?}", record.id, record.date);
            continue;
        };
        weeks.entry(week_number(date)).or_default().push(record);
    }
    weeks
}

pub fn summarize(weeks: &BTreeMap<u32, Vec<&AttendanceRecord>>) -> Vec<WeekSummary> {
    weeks
        .iter()
        .map(|(&week, rows)| WeekSummary {
            week,
            total: rows.len() as i64,
            approved: count_status(rows, AttendanceStatus::Approved),
            pending: count_status(rows, AttendanceStatus::Pending),
            rejected: count_status(rows, AttendanceStatus::Rejected),
        })
        .collect()
}

fn count_status(rows: &[&AttendanceRecord], status: AttendanceStatus) -> i64 {
    rows.iter().filter(|r| r.status == status).count() as i64
}

/// Download filename: embeds today's date, and the requester's name (spaces
/// collapsed to underscores) unless the super admin exports everything.
pub fn export_filename(role: Role, full_name: &str, today: NaiveDate) -> String {
    let date = today.format("%Y-%m-%d");
    match role {
        Role::SuperAdmin => format!("attendance_all_{date}.xlsx"),
        _ => {
            let name = full_name
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("_");
            format!("attendance_{name}_{date}.xlsx")
        }
    }
}

fn status_label(status: AttendanceStatus) -> &'static str {
    match status {
        AttendanceStatus::Pending => "Pending",
        AttendanceStatus::Approved => "Approved",
        AttendanceStatus::Rejected => "Rejected",
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

enum Cell {
    Text(String),
    Number(i64),
}

fn sheet_xml(rows: &[Vec<Cell>]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\
         <sheetData>",
    );
    for row in rows {
        xml.push_str("<row>");
        for cell in row {
            match cell {
                Cell::Text(s) => {
                    xml.push_str("<c t=\"inlineStr\"><is><t>");
                    xml.push_str(&xml_escape(s));
                    xml.push_str("</t></is></c>");
                }
                Cell::Number(n) => {
                    xml.push_str(&format!("<c><v>{n}</v></c>"));
                }
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn text(s: impl Into<String>) -> Cell {
    Cell::Text(s.into())
}

fn summary_rows(summaries: &[WeekSummary]) -> Vec<Vec<Cell>> {
    let mut rows = vec![vec![
        text("Week"),
        text("Total"),
        text("Approved"),
        text("Pending"),
        text("Rejected"),
    ]];
    for s in summaries {
        rows.push(vec![
            Cell::Number(s.week as i64),
            Cell::Number(s.total),
            Cell::Number(s.approved),
            Cell::Number(s.pending),
            Cell::Number(s.rejected),
        ]);
    }
    rows
}

fn week_rows(week: u32, records: &[&AttendanceRecord]) -> Vec<Vec<Cell>> {
    let mut rows = vec![vec![
        text("Week"),
        text("Date"),
        text("Name"),
        text("Student ID"),
        text("Course"),
        text("Status"),
        text("Submitted At"),
        text("Approved By"),
        text("Approved At"),
    ]];
    for r in records {
        rows.push(vec![
            Cell::Number(week as i64),
            text(r.date.clone()),
            text(r.user_name.clone()),
            text(r.user_student_id.clone()),
            text(r.course.clone()),
            text(status_label(r.status)),
            text(r.created_at.clone()),
            text(r.approver_name.clone().unwrap_or_else(|| "-".to_string())),
            text(r.approved_at.clone().unwrap_or_else(|| "-".to_string())),
        ]);
    }
    rows
}

/// Build the workbook bytes: summary sheet first, then one sheet per week
/// in ascending week order.
pub fn build_workbook(records: &[AttendanceRecord]) -> Result<Vec<u8>, zip::result::ZipError> {
    let weeks = group_by_week(records);
    let summaries = summarize(&weeks);

    // (sheet name, rows), summary first
    let mut sheets: Vec<(String, Vec<Vec<Cell>>)> =
        vec![("Summary".to_string(), summary_rows(&summaries))];
    for (&week, rows) in &weeks {
        sheets.push((format!("Week {week}"), week_rows(week, rows)));
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut content_types = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>",
    );
    let mut workbook_sheets = String::new();
    let mut workbook_rels = String::new();
    for (idx, (name, _)) in sheets.iter().enumerate() {
        let n = idx + 1;
        content_types.push_str(&format!(
            "<Override PartName=\"/xl/worksheets/sheet{n}.xml\" \
             ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>"
        ));
        workbook_sheets.push_str(&format!(
            "<sheet name=\"{}\" sheetId=\"{n}\" r:id=\"rId{n}\"/>",
            xml_escape(name)
        ));
        workbook_rels.push_str(&format!(
            "<Relationship Id=\"rId{n}\" \
             Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" \
             Target=\"worksheets/sheet{n}.xml\"/>"
        ));
    }
    content_types.push_str("</Types>");

    zip.start_file("[Content_Types].xml", opts)?;
    zip.write_all(content_types.as_bytes())?;

    zip.start_file("_rels/.rels", opts)?;
    zip.write_all(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         <Relationship Id=\"rId1\" \
          Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" \
          Target=\"xl/workbook.xml\"/>\
         </Relationships>"
            .as_bytes(),
    )?;

    zip.start_file("xl/workbook.xml", opts)?;
    zip.write_all(
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" \
              xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">\
             <sheets>{workbook_sheets}</sheets></workbook>"
        )
        .as_bytes(),
    )?;

    zip.start_file("xl/_rels/workbook.xml.rels", opts)?;
    zip.write_all(
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
             {workbook_rels}</Relationships>"
        )
        .as_bytes(),
    )?;

    for (idx, (_, rows)) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", idx + 1), opts)?;
        zip.write_all(sheet_xml(rows).as_bytes())?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
