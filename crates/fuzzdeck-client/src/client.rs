use crate::config::ClientConfig;
use async_trait::async_trait;
use fuzzdeck_core::agent::{Agent, AgentCreateRequest};
use fuzzdeck_core::crash::{Crash, CrashStats};
use fuzzdeck_core::ids::{AgentGuid, CrashGuid, JobGuid};
use fuzzdeck_core::job::{FormValue, JobInfo, JobStats, JobSubmission};
use fuzzdeck_core::metrics::{MetricScope, QueryResponse, StatsQuery};
use fuzzdeck_core::ports::FleetApi;
use fuzzdeck_core::{ApiPath, Error, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

pub struct HttpFleetClient {
    client: Client,
    base_url: Url,
}

impl HttpFleetClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url()?,
        })
    }

    /// Append `path` below the base URL, one percent-encoded segment per
    /// route segment.
    pub fn url(&self, path: &ApiPath) -> Result<Url> {
        if let Some(segment) = path.invalid_segment() {
            return Err(Error::InvalidInput(format!(
                "{:?} is not a valid path segment in {}",
                segment, path
            )));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidInput(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(path.segments());
        Ok(url)
    }

    fn request(&self, method: Method, path: &ApiPath) -> Result<RequestBuilder> {
        Ok(self.client.request(method, self.url(path)?))
    }

    async fn send(&self, req: RequestBuilder, path: &ApiPath) -> Result<Response> {
        let res = req
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = res.status();
        debug!(endpoint = %path, status = status.as_u16(), "Backend responded");
        if status.is_success() {
            return Ok(res);
        }

        let body = res.text().await.unwrap_or_default();
        Err(Error::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &ApiPath) -> Result<T> {
        let res = self.send(self.request(Method::GET, path)?, path).await?;
        decode(res, path).await
    }
}

async fn decode<T: DeserializeOwned>(res: Response, path: &ApiPath) -> Result<T> {
    let bytes = res
        .bytes()
        .await
        .map_err(|e| Error::Transport(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| Error::Decode {
        endpoint: path.to_string(),
        message: e.to_string(),
    })
}

fn multipart(submission: JobSubmission) -> Form {
    submission
        .fields
        .into_iter()
        .fold(Form::new(), |form, (name, value)| match value {
            FormValue::Text(text) => form.text(name, text),
            FormValue::File { file_name, content } => {
                form.part(name, Part::bytes(content).file_name(file_name))
            }
        })
}

#[async_trait]
impl FleetApi for HttpFleetClient {
    async fn list_agents(&self) -> Result<Vec<Agent>> {
        self.get_json(&ApiPath::api("agents")).await
    }

    async fn create_agent(&self, request: &AgentCreateRequest) -> Result<()> {
        let path = ApiPath::api("agent");
        let req = self.request(Method::POST, &path)?.json(request);
        self.send(req, &path).await?;
        Ok(())
    }

    async fn delete_agent(&self, guid: &AgentGuid) -> Result<()> {
        let path = ApiPath::api("agent").join(guid);
        self.send(self.request(Method::DELETE, &path)?, &path)
            .await?;
        Ok(())
    }

    async fn job_stats(&self) -> Result<JobStats> {
        self.get_json(&ApiPath::api("job")).await
    }

    async fn get_job(&self, guid: &JobGuid) -> Result<JobInfo> {
        self.get_json(&ApiPath::api("job").join(guid)).await
    }

    async fn create_job(&self, submission: JobSubmission) -> Result<()> {
        let path = ApiPath::api("job");
        debug!(fields = ?submission.names(), "Submitting job");
        let req = self
            .request(Method::POST, &path)?
            .multipart(multipart(submission));
        self.send(req, &path).await?;
        Ok(())
    }

    async fn stop_job(&self, guid: &JobGuid) -> Result<()> {
        let path = ApiPath::api("job").join(guid).join("stop");
        self.send(self.request(Method::GET, &path)?, &path).await?;
        Ok(())
    }

    async fn crash_stats(&self) -> Result<CrashStats> {
        self.get_json(&ApiPath::api("crash")).await
    }

    async fn get_crash(&self, guid: &CrashGuid) -> Result<Crash> {
        self.get_json(&ApiPath::api("crash").join(guid)).await
    }

    async fn crash_content(&self, guid: &CrashGuid) -> Result<Vec<u8>> {
        let path = ApiPath::api("crash").join(guid).join("get");
        let res = self.send(self.request(Method::GET, &path)?, &path).await?;
        let bytes = res
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn query_metrics(
        &self,
        scope: &MetricScope,
        query: &StatsQuery,
    ) -> Result<QueryResponse> {
        let path = scope.path();
        let req = self.request(Method::POST, &path)?.json(query);
        let res = self.send(req, &path).await?;
        decode(res, &path).await
    }

    async fn fetch_rows(&self, source: &ApiPath) -> Result<Vec<serde_json::Value>> {
        self.get_json(source).await
    }
}
