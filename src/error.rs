use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Couldn't parse the API response as JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("The API response has no usable `{field}`.{}", api_message(.message))]
    Protocol {
        field: &'static str,
        message: Option<String>,
    },

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Directory creation and file writing failures.
    pub fn is_filesystem(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Csv(_))
    }
}

fn api_message(message: &Option<String>) -> String {
    match message {
        Some(msg) => format!(" API says: {msg}"),
        None => " Check the search conditions.".to_string(),
    }
}
