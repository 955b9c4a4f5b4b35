use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;

use crate::input::{collect_criteria, confirm_proceed, Prompter, SearchCriteria};
use crate::output::{write_dataset, OutputPaths, RunReport};
use crate::parse::{parse_page, SpeechRecord};
use crate::request::{probe_total, search_params, SpeechApi};
use crate::utils::group_thousands;
use crate::{
    info_time, warn_time, Error, Result, BASE_URL, DATASET_DIR, MAX_RECORDS_PER_REQUEST,
    REQUEST_DELAY_MS, REQUEST_TIMEOUT_SECS,
};

/// Runtime settings. Search criteria are not part of it, those are asked for interactively.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub dataset_dir: PathBuf,
    pub request_delay: Duration,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            dataset_dir: PathBuf::from(DATASET_DIR),
            request_delay: Duration::from_millis(REQUEST_DELAY_MS),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

/// How a run ended without a fatal error. All of these exit with status 0.
#[derive(Debug)]
pub enum RunOutcome {
    /// The probe reported zero matching records.
    NoHits,
    /// The operator declined at the confirmation prompt.
    Cancelled,
    /// The probe reported hits but no page produced a record, so nothing was written.
    NothingFetched { total_hits: usize, stop: FetchStop },
    Saved {
        paths: OutputPaths,
        record_count: usize,
        stop: FetchStop,
    },
}

/// Why the page loop ended.
#[derive(Debug)]
pub enum FetchStop {
    Completed,
    /// The page at this 0-based index came back without records.
    EmptyPage { page: usize },
    /// The request or the response for the page at this 0-based index failed.
    Failed { page: usize, error: Error },
}

impl FetchStop {
    pub fn is_partial(&self) -> bool {
        !matches!(self, FetchStop::Completed)
    }
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub records: Vec<SpeechRecord>,
    pub pages_completed: usize,
    pub stop: FetchStop,
}

#[inline]
pub fn page_count(total_hits: usize) -> usize {
    total_hits.div_ceil(MAX_RECORDS_PER_REQUEST)
}

/// 1-based record offset of a 0-based page.
#[inline]
pub fn start_record(page: usize) -> usize {
    1 + page * MAX_RECORDS_PER_REQUEST
}

/// Requests every page in order. A failed or empty page ends the loop but keeps what was
/// fetched before it, the reason is reported in `FetchOutcome::stop`.
pub async fn fetch_all<A: SpeechApi>(
    api: &A,
    criteria: &SearchCriteria,
    total_hits: usize,
    delay: Duration,
) -> FetchOutcome {
    let total_pages = page_count(total_hits);
    let mut records = Vec::new();
    let mut pages_completed = 0;

    for page in 0..total_pages {
        let params = search_params(criteria, MAX_RECORDS_PER_REQUEST, Some(start_record(page)));
        let fetched = api.get_text(&params).await.and_then(|body| parse_page(&body));

        match fetched {
            Ok(Some(page_records)) => records.extend(page_records),
            Ok(None) => {
                println!();
                warn_time!("Page {} has no records, stopping.", page + 1);
                return FetchOutcome {
                    records,
                    pages_completed,
                    stop: FetchStop::EmptyPage { page },
                };
            }
            Err(error) => {
                println!();
                warn_time!("Fetching page {} failed: {error}", page + 1);
                return FetchOutcome {
                    records,
                    pages_completed,
                    stop: FetchStop::Failed { page, error },
                };
            }
        }

        pages_completed += 1;
        print_progress(pages_completed, total_pages, records.len());
        tokio::time::sleep(delay).await;
    }

    println!();
    FetchOutcome {
        records,
        pages_completed,
        stop: FetchStop::Completed,
    }
}

fn print_progress(done: usize, total_pages: usize, record_count: usize) {
    let pct = done as f64 / total_pages as f64 * 100.0;
    print!(
        "\rProgress: {done}/{total_pages} pages ({pct:.1}%) - fetched: {} records",
        group_thousands(record_count)
    );
    let _ = std::io::stdout().flush();
}

/// One full run: prompt, probe, confirm, fetch, write.
/// Probe and filesystem failures are returned as errors; page failures are not.
pub async fn run<A, R, W>(
    api: &A,
    prompter: &mut Prompter<R, W>,
    config: &Config,
) -> Result<RunOutcome>
where
    A: SpeechApi,
    R: BufRead,
    W: Write,
{
    let criteria = collect_criteria(prompter)?;

    let total_hits = probe_total(api, &criteria).await?;
    let mut report = RunReport::new(criteria, Local::now(), total_hits);

    if total_hits == 0 {
        prompter.say("Search matched 0 records. Nothing matches the search conditions.")?;
        return Ok(RunOutcome::NoHits);
    }
    if !confirm_proceed(prompter, total_hits)? {
        prompter.say("Download cancelled.")?;
        return Ok(RunOutcome::Cancelled);
    }

    let start_time = Local::now();
    info_time!(
        "Starting download of {} records in {} pages",
        group_thousands(total_hits),
        page_count(total_hits)
    );
    let fetch = fetch_all(api, &report.criteria, total_hits, config.request_delay).await;
    info_time!(
        start_time,
        "Download finished: {} records from {} pages",
        group_thousands(fetch.records.len()),
        fetch.pages_completed
    );

    let FetchOutcome { records, stop, .. } = fetch;
    match write_dataset(&config.dataset_dir, &records, &mut report, Local::now())? {
        Some(paths) => {
            info_time!(
                "Saved {} records to {}",
                group_thousands(records.len()),
                paths.dir.display()
            );
            Ok(RunOutcome::Saved {
                paths,
                record_count: records.len(),
                stop,
            })
        }
        None => {
            warn_time!(
                "No records were fetched although the search matched {}.",
                group_thousands(total_hits)
            );
            Ok(RunOutcome::NothingFetched { total_hits, stop })
        }
    }
}
