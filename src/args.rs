use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use kokkai_speech::process::Config;
use kokkai_speech::{BASE_URL, DATASET_DIR, REQUEST_DELAY_MS, REQUEST_TIMEOUT_SECS};

#[derive(Parser, Debug)]
#[command(name = "kokkai-speech")]
#[command(about = "Downloads National Diet speech records matching an interactive search into a CSV dataset")]
#[command(version)]
pub struct Args {
    /// Speech search endpoint
    #[arg(long, default_value = BASE_URL)]
    pub base_url: String,

    /// Directory that receives one sub-directory per run
    #[arg(long, default_value = DATASET_DIR)]
    pub dataset_dir: PathBuf,

    /// Pause after every page, in milliseconds
    #[arg(long, default_value_t = REQUEST_DELAY_MS)]
    pub delay_ms: u64,

    /// Timeout for each request, in seconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl Args {
    pub fn into_config(self) -> Config {
        Config {
            base_url: self.base_url,
            dataset_dir: self.dataset_dir,
            request_delay: Duration::from_millis(self.delay_ms),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}
