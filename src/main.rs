use std::io;
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use kokkai_speech::input::Prompter;
use kokkai_speech::process::{run, Config, RunOutcome};
use kokkai_speech::request::HttpSpeechApi;
use kokkai_speech::{info_time, Result};

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    let start_time = Local::now();
    let config = Args::parse().into_config();

    let code = match download(&config).await {
        Ok(outcome) => {
            report_outcome(&outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("ERROR: {e}");
            ExitCode::FAILURE
        }
    };
    info_time!(start_time, "Full program time:");
    code
}

async fn download(config: &Config) -> Result<RunOutcome> {
    let api = HttpSpeechApi::new(config.base_url.clone(), config.timeout)?;
    let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());
    run(&api, &mut prompter, config).await
}

fn report_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::NoHits | RunOutcome::Cancelled => {}
        RunOutcome::NothingFetched { .. } => info_time!("No data was saved."),
        RunOutcome::Saved {
            paths,
            record_count,
            stop,
        } => {
            if stop.is_partial() {
                info_time!("Download stopped early; the dataset holds {record_count} records.");
            }
            info_time!("Output directory: {}", paths.dir.display());
        }
    }
    info_time!("Finished normally.");
}
