use std::time::Duration;

use reqwest::Client;

use crate::input::SearchCriteria;
use crate::parse::parse_total;
use crate::{info_time, Result, USER_AGENT};

/// Anything that can answer a speech search with the raw response body.
/// The binary talks HTTP, the tests hand out canned pages.
#[allow(async_fn_in_trait)]
pub trait SpeechApi {
    async fn get_text(&self, params: &[(&'static str, String)]) -> Result<String>;
}

/// The real search endpoint.
pub struct HttpSpeechApi {
    client: Client,
    base_url: String,
}

impl HttpSpeechApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl SpeechApi for HttpSpeechApi {
    async fn get_text(&self, params: &[(&'static str, String)]) -> Result<String> {
        let res = self
            .client
            .get(&self.base_url)
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        let body = res.text().await?;
        Ok(body)
    }
}

/// Criteria parameters plus the pagination controls. `start_record` is left out for the count probe.
pub fn search_params(
    criteria: &SearchCriteria,
    maximum_records: usize,
    start_record: Option<usize>,
) -> Vec<(&'static str, String)> {
    let mut params = criteria.query_params();
    params.push(("maximumRecords", maximum_records.to_string()));
    params.push(("recordPacking", "json".to_string()));
    if let Some(start) = start_record {
        params.push(("startRecord", start.to_string()));
    }
    params
}

/// Asks for a single record to learn how many records match in total.
pub async fn probe_total<A: SpeechApi>(api: &A, criteria: &SearchCriteria) -> Result<usize> {
    info_time!("Checking the hit count for the search conditions...");
    let body = api.get_text(&search_params(criteria, 1, None)).await?;
    parse_total(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accepts one connection, answers with `response` and hands back the raw request head.
    async fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&head).into_owned()
        });
        (format!("http://{addr}/api/speech"), handle)
    }

    fn local_api(base_url: String) -> HttpSpeechApi {
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        HttpSpeechApi::with_client(client, base_url)
    }

    #[tokio::test]
    async fn server_errors_are_network_errors() {
        let (url, server) = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;

        let err = probe_total(&local_api(url), &criteria()).await.unwrap_err();
        assert!(matches!(err, Error::Network(_)), "got {err:?}");

        let head = server.await.unwrap();
        let request_line = head.lines().next().unwrap();
        assert_eq!(
            request_line,
            "GET /api/speech?any=%E4%BA%88%E7%AE%97&from=2020-09-01&until=2020-09-30\
             &maximumRecords=1&recordPacking=json HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn probe_reads_total_over_http() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 22\r\nconnection: close\r\n\r\n{\"numberOfRecords\": 7}",
        )
        .await;

        let total = probe_total(&local_api(url), &criteria()).await.unwrap();
        assert_eq!(total, 7);
        assert!(server.await.unwrap().contains("maximumRecords=1"));
    }

    fn criteria() -> SearchCriteria {
        SearchCriteria {
            any: Some("予算".into()),
            name_of_house: None,
            speaker: None,
            from: "2020-09-01".into(),
            until: "2020-09-30".into(),
        }
    }

    #[test]
    fn probe_and_page_params_share_the_criteria() {
        let probe = search_params(&criteria(), 1, None);
        let page = search_params(&criteria(), 100, Some(101));

        let strip = |params: &[(&'static str, String)]| -> Vec<(&'static str, String)> {
            params
                .iter()
                .filter(|(k, _)| !matches!(*k, "maximumRecords" | "startRecord" | "recordPacking"))
                .cloned()
                .collect()
        };
        assert_eq!(strip(&probe), strip(&page));
        assert!(probe.contains(&("maximumRecords", "1".to_string())));
        assert!(!probe.iter().any(|(k, _)| *k == "startRecord"));
        assert!(page.contains(&("startRecord", "101".to_string())));
        assert!(page.contains(&("recordPacking", "json".to_string())));
    }
}
