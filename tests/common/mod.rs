#![allow(dead_code)]

use newkeys::metrics::{
    MetricsError, SearchAnalytics, SearchAnalyticsRequest, SearchAnalyticsResponse,
    SearchAnalyticsRow,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

/// In-memory analytics keyed by (page, startDate).
#[derive(Default)]
pub struct FakeAnalytics {
    rows: HashMap<(String, String), Vec<SearchAnalyticsRow>>,
    failures: Vec<(String, String)>,
    pub calls: RefCell<Vec<(String, String)>>,
}

impl FakeAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queries(mut self, page: &str, start_date: &str, queries: &[(&str, u64)]) -> Self {
        let rows = queries
            .iter()
            .map(|(query, impressions)| SearchAnalyticsRow {
                keys: vec![query.to_string()],
                clicks: 1.0,
                impressions: *impressions as f64,
                position: 7.26,
            })
            .collect();
        self.rows
            .insert((page.to_string(), start_date.to_string()), rows);
        self
    }

    pub fn failing(mut self, page: &str, start_date: &str) -> Self {
        self.failures
            .push((page.to_string(), start_date.to_string()));
        self
    }
}

impl SearchAnalytics for FakeAnalytics {
    fn query(
        &self,
        _site_url: &str,
        request: &SearchAnalyticsRequest,
    ) -> Result<SearchAnalyticsResponse, MetricsError> {
        let page = request.dimension_filter_groups[0].filters[0]
            .expression
            .clone();
        let key = (page, request.start_date.clone());
        self.calls.borrow_mut().push(key.clone());

        if self.failures.contains(&key) {
            return Err(MetricsError::Api {
                status: 403,
                message: "User does not have sufficient permission".to_string(),
            });
        }

        Ok(SearchAnalyticsResponse {
            rows: self.rows.get(&key).cloned().unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Serve each canned `(status, content_type, body)` to one connection, in order.
pub fn serve(responses: Vec<(u16, &'static str, String)>) -> (String, JoinHandle<Vec<RecordedRequest>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let mut recorded = Vec::new();
        for (status, content_type, body) in responses {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();

            let mut headers = Vec::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((k, v)) = line.split_once(':') {
                    headers.push((k.trim().to_string(), v.trim().to_string()));
                }
            }

            let length = headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, v)| v.parse::<usize>().ok())
                .unwrap_or(0);
            let mut request_body = vec![0u8; length];
            reader.read_exact(&mut request_body).unwrap();

            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                content_type,
                body.len(),
                body
            );
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();

            recorded.push(RecordedRequest {
                request_line: request_line.trim_end().to_string(),
                headers,
                body: String::from_utf8_lossy(&request_body).into_owned(),
            });
        }
        recorded
    });

    (base_url, handle)
}
