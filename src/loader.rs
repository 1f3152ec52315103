use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, trace};

use crate::domain::SVError;
use crate::parser::parse_csv;
use crate::table::Dataset;

/// Retrieves the body of an export url.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String, SVError>;
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, SVError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, SVError> {
        debug!("GET {url}");
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(SVError::FetchFailure(format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )));
        }
        let body = response.bytes()?;
        // Invalid bytes become U+FFFD instead of failing the whole sheet.
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// A load the model asked for: which request it is and where to fetch from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub generation: u64,
    pub export_url: String,
}

/// Result of one load, tagged with the request it answers.
#[derive(Debug)]
pub struct LoadOutcome {
    pub generation: u64,
    pub result: Result<Dataset, SVError>,
}

/// Fetch and parse one export url.
pub fn fetch_dataset(fetcher: &dyn Fetcher, export_url: &str) -> Result<Dataset, SVError> {
    let start_time = Instant::now();
    let text = fetcher.fetch(export_url)?;
    let dataset = parse_csv(&text);
    info!(
        "Loaded {} rows x {} columns in {}ms",
        dataset.len(),
        dataset.columns().len(),
        start_time.elapsed().as_millis()
    );
    Ok(dataset)
}

/// Runs every load on its own thread and hands the outcomes back to the
/// thread that owns the model.
pub struct Loader {
    fetcher: Arc<dyn Fetcher>,
    sender: Sender<LoadOutcome>,
    receiver: Receiver<LoadOutcome>,
}

impl Loader {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            fetcher,
            sender,
            receiver,
        }
    }

    pub fn spawn(&self, request: LoadRequest) {
        let fetcher = Arc::clone(&self.fetcher);
        let sender = self.sender.clone();
        trace!("Spawning load #{} for {}", request.generation, request.export_url);
        thread::spawn(move || {
            let result = fetch_dataset(fetcher.as_ref(), &request.export_url);
            if let Err(e) = &result {
                error!("Load #{} failed: {e}", request.generation);
            }
            let outcome = LoadOutcome {
                generation: request.generation,
                result,
            };
            if sender.send(outcome).is_err() {
                debug!("Model is gone, dropping load #{}", request.generation);
            }
        });
    }

    /// Next finished load, if any. Never blocks.
    pub fn try_recv(&self) -> Option<LoadOutcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    #[cfg(test)]
    fn recv_timeout(&self, timeout: Duration) -> Option<LoadOutcome> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SVConfig;
    use crate::model::{LoadState, Model};
    use std::io::{Read, Write};
    use std::net::TcpListener;

    struct StubFetcher {
        body: Result<&'static str, u16>,
        delay: Duration,
    }

    impl Fetcher for StubFetcher {
        fn fetch(&self, _url: &str) -> Result<String, SVError> {
            thread::sleep(self.delay);
            match self.body {
                Ok(body) => Ok(body.to_string()),
                Err(code) => Err(SVError::FetchFailure(format!("{code}"))),
            }
        }
    }

    /// Answers with the first stub whose key is part of the url.
    struct RoutedFetcher(Vec<(&'static str, StubFetcher)>);

    impl Fetcher for RoutedFetcher {
        fn fetch(&self, url: &str) -> Result<String, SVError> {
            match self.0.iter().find(|(key, _)| url.contains(key)) {
                Some((_, stub)) => stub.fetch(url),
                None => Err(SVError::FetchFailure(format!("no route for {url}"))),
            }
        }
    }

    fn stub(body: Result<&'static str, u16>) -> Arc<dyn Fetcher> {
        Arc::new(StubFetcher {
            body,
            delay: Duration::ZERO,
        })
    }

    /// Serve one http response on a local port and return its url.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        serve_raw_once(status_line, body.as_bytes())
    }

    fn serve_bytes_once(body: &'static [u8]) -> String {
        serve_raw_once("200 OK", body)
    }

    fn serve_raw_once(status_line: &'static str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let Ok((mut socket, _)) = listener.accept() else {
                return;
            };
            let mut buf = [0u8; 1024];
            let mut request = Vec::new();
            while let Ok(n) = socket.read(&mut buf) {
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let head = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = socket.write_all(head.as_bytes());
            let _ = socket.write_all(body);
        });
        format!("http://{addr}/export?format=csv&gid=0")
    }

    #[test]
    fn fetch_dataset_parses_the_body() {
        let ds = fetch_dataset(stub(Ok("a,b\n1,2\n")).as_ref(), "http://unused").unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].get("b"), Some("2"));
    }

    #[test]
    fn fetch_failure_produces_no_dataset() {
        let result = fetch_dataset(stub(Err(404)).as_ref(), "http://unused");
        assert!(matches!(result, Err(SVError::FetchFailure(_))));
    }

    #[test]
    fn loader_reports_outcome_with_its_generation() {
        let loader = Loader::new(stub(Ok("a\nx")));
        loader.spawn(LoadRequest {
            generation: 7,
            export_url: "http://unused".to_string(),
        });
        let outcome = loader.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.generation, 7);
        assert_eq!(outcome.result.unwrap().len(), 1);
        assert!(loader.try_recv().is_none());
    }

    #[test]
    fn slow_earlier_load_does_not_replace_newer_one() {
        let fetcher = RoutedFetcher(vec![
            (
                "/d/slow/",
                StubFetcher {
                    body: Ok("old\ny"),
                    delay: Duration::from_millis(300),
                },
            ),
            (
                "/d/fast/",
                StubFetcher {
                    body: Ok("new\nx"),
                    delay: Duration::ZERO,
                },
            ),
        ]);
        let loader = Loader::new(Arc::new(fetcher));
        let mut model = Model::init(&SVConfig::default(), 80, 24);

        let slow = model
            .load("https://docs.google.com/spreadsheets/d/slow/edit")
            .unwrap();
        loader.spawn(slow.clone());
        let fast = model
            .load("https://docs.google.com/spreadsheets/d/fast/edit")
            .unwrap();
        loader.spawn(fast.clone());

        let mut arrived = Vec::new();
        for _ in 0..2 {
            let outcome = loader.recv_timeout(Duration::from_secs(5)).unwrap();
            arrived.push(outcome.generation);
            model.finish_load(outcome);
        }

        assert_eq!(arrived, vec![fast.generation, slow.generation]);
        assert_eq!(model.view().columns(), ["new"]);
        assert!(matches!(model.load_state(), LoadState::Ready(ds) if ds.records()[0].get("new") == Some("x")));
    }

    #[test]
    fn http_fetcher_decodes_invalid_utf8_lossily() {
        let url = serve_bytes_once(b"a,b\n1,\xff2\n");
        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let ds = fetch_dataset(&fetcher, &url).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].get("b"), Some("\u{fffd}2"));
    }

    #[test]
    fn http_fetcher_returns_body_on_success() {
        let url = serve_once("200 OK", "a,b\n\"x,y\",z\n");
        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let ds = fetch_dataset(&fetcher, &url).unwrap();
        assert_eq!(ds.records()[0].get("a"), Some("x,y"));
    }

    #[test]
    fn http_fetcher_treats_non_success_status_as_failure() {
        let url = serve_once("404 Not Found", "missing");
        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        match fetcher.fetch(&url) {
            Err(SVError::FetchFailure(msg)) => assert!(msg.starts_with("404"), "{msg}"),
            other => panic!("expected fetch failure, got {other:?}"),
        }
    }

    #[test]
    fn http_fetcher_reports_transport_errors() {
        // Bind and drop to get a port nothing listens on.
        let port = TcpListener::bind(("127.0.0.1", 0))
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let result = fetcher.fetch(&format!("http://127.0.0.1:{port}/"));
        assert!(matches!(result, Err(SVError::FetchFailure(_))));
    }
}
