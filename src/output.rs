use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use csv::{QuoteStyle, WriterBuilder};

use crate::input::SearchCriteria;
use crate::parse::SpeechRecord;
use crate::utils::group_thousands;
use crate::{info_time, Result};

pub const CSV_HEADER: [&str; 15] = [
    "発言ID",
    "会議録ID",
    "種別",
    "院名",
    "会議名",
    "号数",
    "日付",
    "発言番号",
    "発言者名",
    "発言者所属会派",
    "発言者肩書き",
    "発言者役割",
    "発言内容",
    "発言URL",
    "会議録URL",
];

const FILE_PREFIX: &str = "kokkai_speech";

/// Everything the conditions report needs. Filled in as the run progresses.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub criteria: SearchCriteria,
    pub executed_at: DateTime<Local>,
    pub total_hits: usize,
    pub results: Option<RunResults>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResults {
    pub record_count: usize,
    pub csv_file_name: String,
    pub folder_name: String,
}

impl RunReport {
    pub fn new(criteria: SearchCriteria, executed_at: DateTime<Local>, total_hits: usize) -> Self {
        Self {
            criteria,
            executed_at,
            total_hits,
            results: None,
        }
    }
}

/// Where one run's files go: `{dataset}/kokkai_speech_{count}_{YYYYMMDD_HHMMSS}/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub folder_name: String,
    pub csv_file_name: String,
    pub dir: PathBuf,
    pub csv: PathBuf,
    pub report: PathBuf,
}

impl OutputPaths {
    pub fn new(dataset_dir: &Path, record_count: usize, now: &DateTime<Local>) -> Self {
        let timestamp = now.format("%Y%m%d_%H%M%S").to_string();
        let folder_name = format!("{FILE_PREFIX}_{record_count}_{timestamp}");
        let csv_file_name = format!("{folder_name}.csv");
        let dir = dataset_dir.join(&folder_name);
        Self {
            csv: dir.join(&csv_file_name),
            report: dir.join(format!("search_conditions_{timestamp}.txt")),
            folder_name,
            csv_file_name,
            dir,
        }
    }
}

/// Writes the CSV and the conditions report for `records`.
/// Returns `Ok(None)` without touching the filesystem when there is nothing to write.
pub fn write_dataset(
    dataset_dir: &Path,
    records: &[SpeechRecord],
    report: &mut RunReport,
    now: DateTime<Local>,
) -> Result<Option<OutputPaths>> {
    if records.is_empty() {
        return Ok(None);
    }

    let paths = OutputPaths::new(dataset_dir, records.len(), &now);

    if !dataset_dir.exists() {
        fs::create_dir_all(dataset_dir)?;
        info_time!("Created dataset directory {}", dataset_dir.display());
    }
    fs::create_dir_all(&paths.dir)?;
    info_time!("Created output directory {}", paths.dir.display());

    write_csv(&paths.csv, records)?;
    info_time!("Wrote CSV file {}", paths.csv.display());

    report.results = Some(RunResults {
        record_count: records.len(),
        csv_file_name: paths.csv_file_name.clone(),
        folder_name: paths.folder_name.clone(),
    });
    fs::write(&paths.report, render_report(report))?;
    info_time!("Wrote search conditions to {}", paths.report.display());

    Ok(Some(paths))
}

/// UTF-8, comma separated, every field quoted.
pub fn write_csv(path: &Path, records: &[SpeechRecord]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_path(path)?;
    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.write_record(record.as_row())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn render_report(report: &RunReport) -> String {
    let mut out = String::from("=== 国会会議録検索システム 検索条件 ===\n\n");
    for (label, value) in report.criteria.conditions() {
        let _ = writeln!(out, "{label}: {value}");
    }
    let _ = writeln!(out, "実行日時: {}", report.executed_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "ヒット件数: {}", report.total_hits);

    if let Some(results) = &report.results {
        out.push_str("\n=== 取得結果 ===\n");
        let _ = writeln!(out, "実際の取得件数: {}件", group_thousands(results.record_count));
        let _ = writeln!(out, "CSVファイル名: {}", results.csv_file_name);
        let _ = writeln!(out, "出力フォルダ: {}", results.folder_name);
    }
    out
}
