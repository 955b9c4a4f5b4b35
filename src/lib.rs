//! KOKKAI SPEECH DOWNLOADER
//! Queries the National Diet record search API, pages through every hit and
//! stores the speeches as a CSV dataset next to a record of the search conditions.

mod error;
pub mod input;
#[doc(hidden)]
pub mod macros;
pub mod output;
pub mod parse;
pub mod process;
pub mod request;
pub mod utils;

pub use error::{Error, Result};

pub const BASE_URL: &str = "https://kokkai.ndl.go.jp/api/speech";
/// The API refuses `maximumRecords` above 100 for speech searches.
pub const MAX_RECORDS_PER_REQUEST: usize = 100;
pub const DEFAULT_FROM_DATE: &str = "2020-09-01";
pub const DEFAULT_UNTIL_DATE: &str = "2020-09-30";
pub const REQUEST_DELAY_MS: u64 = 500;
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DATASET_DIR: &str = "dataset";
const USER_AGENT: &str = concat!("kokkai-speech/", env!("CARGO_PKG_VERSION"));
