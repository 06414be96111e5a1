use std::fmt::{self, Debug};
use std::sync::OnceLock;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Method, RequestBuilder};
use tokio::time::Instant;

use crate::batch_executor::Executable;
use crate::config::RunConfig;
use crate::results::{CompletionResult, RequestOutcome};

static DEFAULT_USER_AGENT: OnceLock<String> = OnceLock::new();

/// What every request of a run sends, validated once up front.
#[derive(Debug, Clone)]
pub(crate) struct Target {
    pub(crate) url: reqwest::Url,
    pub(crate) method: Method,
    pub(crate) headers: HeaderMap,
    pub(crate) body: String,
}

impl TryFrom<&RunConfig> for Target {
    type Error = anyhow::Error;

    fn try_from(config: &RunConfig) -> Result<Self, Self::Error> {
        let url = reqwest::Url::parse(&with_scheme(&config.url))
            .with_context(|| format!("invalid url {:?}", config.url))?;
        let method = Method::from_bytes(config.method.to_ascii_uppercase().as_bytes())
            .with_context(|| format!("invalid method {:?}", config.method))?;

        let mut headers = HeaderMap::new();
        for line in &config.headers {
            let (name, value) = parse_header(line)?;
            headers.append(name, value);
        }
        if !headers.contains_key(USER_AGENT) {
            let user_agent = DEFAULT_USER_AGENT.get_or_init(|| {
                format!("{}_v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
            });
            headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
        }

        Ok(Self {
            url,
            method,
            headers,
            body: config.body.clone(),
        })
    }
}

// The url argument documents the scheme as optional.
fn with_scheme(url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

pub(crate) fn parse_header(line: &str) -> anyhow::Result<(HeaderName, HeaderValue)> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| anyhow!("header {:?} is not in 'name: value' form", line))?;
    let name = HeaderName::from_bytes(name.trim().as_bytes())
        .with_context(|| format!("invalid header name in {:?}", line))?;
    let value = HeaderValue::from_str(value.trim())
        .with_context(|| format!("invalid header value in {:?}", line))?;
    Ok((name, value))
}

pub(crate) struct Request {
    request_builder: RequestBuilder,
    executor: usize,
    task_in_executor: usize,
    request_number: usize,
}

impl Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("executor", &self.executor)
            .field("task_in_executor", &self.task_in_executor)
            .field("request_number", &self.request_number)
            .finish()
    }
}

#[async_trait]
impl Executable for Request {
    type Result = RequestOutcome;

    #[tracing::instrument(
        skip(self),
        fields(
            executor = self.executor,
            task_in_executor = self.task_in_executor,
            request_number = self.request_number
        )
    )]
    async fn execute(self) -> Self::Result {
        let start = Instant::now();
        let (result, bytes_read) = match self.request_builder.send().await {
            Ok(resp) => {
                let status = resp.status().as_u16();
                // the body is part of the measured time
                match resp.bytes().await {
                    Ok(body) => (CompletionResult::Status(status), body.len() as u64),
                    Err(e) => (CompletionResult::from(&e), 0),
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "request failed");
                (CompletionResult::from(&e), 0)
            }
        };
        RequestOutcome {
            executor_id: self.executor,
            request_number: self.request_number,
            elapsed: start.elapsed(),
            bytes_read,
            result,
        }
    }
}

impl Request {
    pub(crate) fn new(
        target: &Target,
        executor: usize,
        task_in_executor: usize,
        workers: usize,
        client: &reqwest::Client,
    ) -> Self {
        // slots are dealt round-robin, see batcher::split
        let request_number = task_in_executor * workers + executor + 1;

        let mut request_builder = client
            .request(target.method.clone(), target.url.clone())
            .headers(target.headers.clone());
        if !target.body.is_empty() {
            request_builder = request_builder.body(target.body.clone());
        }

        Self {
            request_builder,
            executor,
            task_in_executor,
            request_number,
        }
    }
}
