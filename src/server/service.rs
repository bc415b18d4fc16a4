//! `AppService`: the `may_minihttp::HttpService` adapter around the pure
//! [`crate::handler::AppState`] pipeline.

use super::request::{split_path_and_query, ParsedRequest};
use super::response::write_response;
use crate::handler::{handle, AppState};
use may_minihttp::{HttpService, Request, Response};
use std::io::{self, Read};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppService {
    pub state: Arc<AppState>,
}

impl AppService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

fn parse_request(req: Request) -> io::Result<ParsedRequest> {
    let method = req.method().parse().unwrap_or(http::Method::GET);
    let (path, query) = split_path_and_query(req.path());
    let headers = req
        .headers()
        .iter()
        .map(|h| (h.name.to_ascii_lowercase(), String::from_utf8_lossy(h.value).to_string()))
        .collect();
    let mut body = Vec::new();
    req.body().read_to_end(&mut body)?;
    Ok(ParsedRequest {
        method,
        path,
        query,
        headers,
        body,
    })
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let start = std::time::Instant::now();
        let parsed = parse_request(req)?;
        let method = parsed.method.clone();
        let path = parsed.path.clone();

        let response = handle(&self.state, &parsed);
        let duration_ms = start.elapsed().as_millis();

        if response.status >= 500 {
            warn!(%method, %path, status = response.status, duration_ms, "request failed");
        } else {
            info!(%method, %path, status = response.status, duration_ms, "request handled");
        }

        write_response(res, response);
        Ok(())
    }
}
