// API client module: a small blocking HTTP client for the ONTAP REST API.
// One client is built per process and borrowed by every call; it carries
// the cluster base URL and the basic-auth credentials.

use crate::error::ApiError;
use log::debug;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const JOB_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const JOB_POLL_ATTEMPTS: u32 = 30;

const USER_AGENT: &str = concat!("qtree-provision/", env!("CARGO_PKG_VERSION"));

/// Reference to another object by name, e.g. `{"name": "vol1"}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NameRef {
    pub name: String,
}

impl NameRef {
    pub fn new(name: impl Into<String>) -> Self {
        NameRef { name: name.into() }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct QosPolicy {
    pub max_throughput_iops: u64,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct HardLimit {
    pub hard_limit: u64,
}

/// Payload for `POST /api/storage/qtrees`. Only the names come from the
/// caller; the remaining attributes are fixed by [`QtreeRequest::new`].
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct QtreeRequest {
    pub name: String,
    pub volume: NameRef,
    pub svm: NameRef,
    security_style: String,
    unix_permissions: u32,
    export_policy: NameRef,
    qos_policy: QosPolicy,
}

impl QtreeRequest {
    pub const SECURITY_STYLE: &'static str = "unix";
    pub const UNIX_PERMISSIONS: u32 = 744;
    pub const EXPORT_POLICY: &'static str = "default";
    pub const MAX_THROUGHPUT_IOPS: u64 = 1000;

    pub fn new(volume_name: &str, vserver_name: &str, qtree_name: &str) -> Self {
        QtreeRequest {
            name: qtree_name.to_string(),
            volume: NameRef::new(volume_name),
            svm: NameRef::new(vserver_name),
            security_style: Self::SECURITY_STYLE.to_string(),
            unix_permissions: Self::UNIX_PERMISSIONS,
            export_policy: NameRef::new(Self::EXPORT_POLICY),
            qos_policy: QosPolicy {
                max_throughput_iops: Self::MAX_THROUGHPUT_IOPS,
            },
        }
    }
}

/// Payload for `POST /api/storage/quota/rules`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct QuotaRuleRequest {
    pub volume: NameRef,
    pub svm: NameRef,
    pub qtree: NameRef,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub space: HardLimit,
    pub files: HardLimit,
}

impl QuotaRuleRequest {
    pub fn new(
        volume_name: &str,
        vserver_name: &str,
        qtree_name: &str,
        rule_type: &str,
        space_hard: u64,
        files_hard: u64,
    ) -> Self {
        QuotaRuleRequest {
            volume: NameRef::new(volume_name),
            svm: NameRef::new(vserver_name),
            qtree: NameRef::new(qtree_name),
            rule_type: rule_type.to_string(),
            space: HardLimit {
                hard_limit: space_hard,
            },
            files: HardLimit {
                hard_limit: files_hard,
            },
        }
    }
}

/// Job reference carried by a `202 Accepted` response.
#[derive(Deserialize, Debug, Clone)]
pub struct JobLink {
    pub uuid: String,
    #[serde(rename = "_links", default)]
    links: Option<Links>,
}

impl JobLink {
    fn href(&self) -> String {
        match &self.links {
            Some(links) => links.self_link.href.clone(),
            None => format!("/api/cluster/jobs/{}", self.uuid),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
struct Links {
    #[serde(rename = "self")]
    self_link: Href,
}

#[derive(Deserialize, Debug, Clone)]
struct Href {
    href: String,
}

#[derive(Deserialize, Debug)]
struct AcceptedResponse {
    job: Option<JobLink>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Running,
    Paused,
    Success,
    Failure,
    #[serde(other)]
    Unknown,
}

/// Job record as returned by `GET /api/cluster/jobs/{uuid}`.
#[derive(Deserialize, Debug, Clone)]
pub struct Job {
    pub state: JobState,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
}

/// Derive the API base URL from the `--cluster` value. A bare `host[:port]`
/// gets `https://`; a value that already names a scheme is used as is.
pub fn base_url_for(cluster: &str) -> Result<Url, ApiError> {
    let cluster = cluster.trim();
    if cluster.is_empty() {
        return Err(ApiError::InvalidCluster("empty address".into()));
    }
    let mut url = if cluster.contains("://") {
        Url::parse(cluster)?
    } else {
        Url::parse(&format!("https://{}", cluster))?
    };
    if url.host_str().is_none() {
        return Err(ApiError::InvalidCluster(cluster.to_string()));
    }
    url.set_path("/api");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

pub struct OntapClientBuilder {
    base_url: Url,
    username: String,
    password: String,
    timeout: Duration,
    wait_for_jobs: bool,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl OntapClientBuilder {
    pub fn new(cluster: &str, username: &str, password: &str) -> Result<Self, ApiError> {
        Ok(OntapClientBuilder {
            base_url: base_url_for(cluster)?,
            username: username.to_string(),
            password: password.to_string(),
            timeout: DEFAULT_TIMEOUT,
            wait_for_jobs: true,
            poll_interval: JOB_POLL_INTERVAL,
            poll_attempts: JOB_POLL_ATTEMPTS,
        })
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether a `202 Accepted` answer is followed until its job finishes.
    pub fn wait_for_jobs(mut self, wait: bool) -> Self {
        self.wait_for_jobs = wait;
        self
    }

    pub fn job_polling(mut self, interval: Duration, attempts: u32) -> Self {
        self.poll_interval = interval;
        self.poll_attempts = attempts.max(1);
        self
    }

    pub fn build(self) -> Result<OntapClient, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        // Cluster management LIFs usually present self-signed certificates.
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(self.timeout)
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(OntapClient {
            client,
            base_url: self.base_url,
            username: self.username,
            password: self.password,
            wait_for_jobs: self.wait_for_jobs,
            poll_interval: self.poll_interval,
            poll_attempts: self.poll_attempts,
        })
    }
}

/// Authenticated session against one cluster.
pub struct OntapClient {
    client: Client,
    base_url: Url,
    username: String,
    password: String,
    wait_for_jobs: bool,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl OntapClient {
    pub fn builder(
        cluster: &str,
        username: &str,
        password: &str,
    ) -> Result<OntapClientBuilder, ApiError> {
        OntapClientBuilder::new(cluster, username, password)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Create a qtree by POSTing to /storage/qtrees.
    pub fn create_qtree(&self, req: &QtreeRequest) -> Result<(), ApiError> {
        self.post(&["storage", "qtrees"], req)
    }

    /// Create a quota policy rule by POSTing to /storage/quota/rules.
    pub fn create_quota_rule(&self, req: &QuotaRuleRequest) -> Result<(), ApiError> {
        self.post(&["storage", "quota", "rules"], req)
    }

    /// Poll a job until it leaves the queued/running states.
    pub fn wait_for_job(&self, job: &JobLink) -> Result<Job, ApiError> {
        let url = self.base_url.join(&job.href())?;
        for attempt in 1..=self.poll_attempts {
            debug!("GET {} (poll {}/{})", url, attempt, self.poll_attempts);
            let res = self
                .client
                .get(url.clone())
                .basic_auth(&self.username, Some(&self.password))
                .send()?;
            let res = expect_success(res)?;
            let current: Job = res.json()?;
            match current.state {
                JobState::Success => return Ok(current),
                JobState::Failure => {
                    let mut message = current.message.unwrap_or_else(|| "no message".into());
                    if let Some(code) = current.code {
                        message = format!("{} (code={})", message, code);
                    }
                    return Err(ApiError::JobFailed {
                        uuid: job.uuid.clone(),
                        message,
                    });
                }
                state => debug!("job {} is {:?}", job.uuid, state),
            }
            if attempt < self.poll_attempts {
                thread::sleep(self.poll_interval);
            }
        }
        Err(ApiError::JobTimeout(job.uuid.clone()))
    }

    fn build_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidCluster(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn post<T: Serialize>(&self, segments: &[&str], body: &T) -> Result<(), ApiError> {
        let url = self.build_url(segments)?;
        debug!("POST {}", url);
        let res = self
            .client
            .post(url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .json(body)
            .send()?;
        debug!("POST {} -> {}", url, res.status());
        let res = expect_success(res)?;
        if res.status() != StatusCode::ACCEPTED || !self.wait_for_jobs {
            return Ok(());
        }
        let txt = res.text().unwrap_or_else(|_| "".into());
        match serde_json::from_str::<AcceptedResponse>(&txt) {
            Ok(AcceptedResponse { job: Some(job) }) => self.wait_for_job(&job).map(|_| ()),
            _ => Ok(()),
        }
    }
}

fn expect_success(res: Response) -> Result<Response, ApiError> {
    if res.status().is_success() {
        return Ok(res);
    }
    let status = res.status();
    let txt = res.text().unwrap_or_else(|_| "".into());
    Err(ApiError::from_body(status, &txt))
}
