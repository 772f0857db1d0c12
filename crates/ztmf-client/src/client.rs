//! `ZtmfClient` implementation.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use ztmf_core::TimedCache;
use ztmf_core::decommission::DecommissionRequest;
use ztmf_core::form::SystemPayload;
use ztmf_core::model::{
    AggregateScore, AnswerPayload, Datacall, FismaQuestion, FismaSystem, NewDatacall,
    QuestionOption, QuestionScore, SystemScore, User,
};

use crate::config::ClientConfig;
use crate::error::ZtmfError;
use crate::{DatacallCache, ZtmfClient};

/// Every response body is wrapped as `{ "data": ... }`.
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: serde_json::Value,
}

/// Shape of a non-2xx body: field messages under `data`, a summary under
/// `error`.
#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

impl ZtmfClient {
    /// Create a client for `base_url`, reading the token from `ZTMF_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns `ZtmfError::Config` if the URL is not http(s).
    pub fn new(base_url: &str) -> Result<Self, ZtmfError> {
        Self::with_config(&ClientConfig::new(base_url))
    }

    /// Create a client with full configuration.
    ///
    /// # Errors
    ///
    /// Returns `ZtmfError::Config` if the URL is not http(s), or
    /// `ZtmfError::Network` if the HTTP client cannot be built.
    pub fn with_config(cfg: &ClientConfig) -> Result<Self, ZtmfError> {
        let resolved = cfg.resolve();
        if !(resolved.base_url.starts_with("http://") || resolved.base_url.starts_with("https://"))
        {
            return Err(ZtmfError::Config(format!(
                "base url '{}' must start with http:// or https://",
                resolved.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(resolved.timeout)
            .user_agent(concat!("ztmf-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ZtmfError::Network)?;

        Ok(Self {
            base_url: resolved.base_url,
            token: resolved.token,
            client,
            datacalls: Arc::new(RwLock::new(TimedCache::new(resolved.datacall_cache_ttl))),
        })
    }

    /// Share a datacall cache with other client handles.
    #[must_use]
    pub fn with_datacall_cache(mut self, cache: DatacallCache) -> Self {
        self.datacalls = cache;
        self
    }

    pub fn datacall_cache(&self) -> DatacallCache {
        Arc::clone(&self.datacalls)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    // --- Identity ---

    /// The raw `Bearer <jwt>` string for the current session.
    ///
    /// The backend answers with the bare string, either JSON-encoded or as
    /// plain text. A `{ "data": ... }` envelope is also accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, or `ZtmfError::Token` if the
    /// body holds no string.
    pub async fn whoami(&self) -> Result<String, ZtmfError> {
        let text = self.fetch(Method::GET, "/whoami", None).await?;
        bearer_from_body(&text)
    }

    /// # Errors
    ///
    /// Returns `ZtmfError::NotFound` if no user has this email.
    pub async fn user_by_email(&self, email: &str) -> Result<User, ZtmfError> {
        self.get(&format!("/users/{}", urlencoding::encode(email))).await
    }

    /// # Errors
    ///
    /// Returns `ZtmfError::NotFound` if no user has this id.
    pub async fn user_by_id(&self, userid: &str) -> Result<User, ZtmfError> {
        self.get(&format!("/users/{}", urlencoding::encode(userid))).await
    }

    // --- Systems ---

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn fisma_systems(&self) -> Result<Vec<FismaSystem>, ZtmfError> {
        self.get("/fismasystems").await
    }

    /// # Errors
    ///
    /// Returns `ZtmfError::NotFound` for an unknown id.
    pub async fn fisma_system(&self, id: i64) -> Result<FismaSystem, ZtmfError> {
        self.get(&format!("/fismasystems/{id}")).await
    }

    /// # Errors
    ///
    /// Returns `ZtmfError::Validation` when the backend rejects fields.
    pub async fn create_fisma_system(
        &self,
        payload: &SystemPayload,
    ) -> Result<FismaSystem, ZtmfError> {
        self.send(Method::POST, "/fismasystems", Some(serde_json::to_value(payload)?))
            .await
    }

    /// # Errors
    ///
    /// Returns `ZtmfError::Validation` when the backend rejects fields.
    pub async fn update_fisma_system(
        &self,
        id: i64,
        payload: &SystemPayload,
    ) -> Result<FismaSystem, ZtmfError> {
        let path = format!("/fismasystems/{id}");
        self.send(Method::PUT, &path, Some(serde_json::to_value(payload)?))
            .await
    }

    /// Mark a system decommissioned. The backend keeps the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn decommission_fisma_system(
        &self,
        id: i64,
        request: &DecommissionRequest,
    ) -> Result<(), ZtmfError> {
        let path = format!("/fismasystems/{id}");
        self.call(Method::DELETE, &path, Some(serde_json::to_value(request)?))
            .await?;
        Ok(())
    }

    // --- Questionnaire ---

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn questions(&self, system_id: i64) -> Result<Vec<FismaQuestion>, ZtmfError> {
        self.get(&format!("/fismasystems/{system_id}/questions")).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn function_options(
        &self,
        function_id: i64,
    ) -> Result<Vec<QuestionOption>, ZtmfError> {
        self.get(&format!("/functions/{function_id}/options")).await
    }

    /// Answers already saved for a system in a datacall.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn question_scores(
        &self,
        datacall_id: i64,
        system_id: i64,
    ) -> Result<Vec<QuestionScore>, ZtmfError> {
        self.get(&format!(
            "/scores?datacallid={datacall_id}&fismasystemid={system_id}"
        ))
        .await
    }

    /// Create an answer, or update it when `scoreid` is known.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn save_answer(
        &self,
        scoreid: Option<i64>,
        payload: &AnswerPayload,
    ) -> Result<QuestionScore, ZtmfError> {
        let body = Some(serde_json::to_value(payload)?);
        match scoreid {
            Some(id) => self.send(Method::PUT, &format!("/scores/{id}"), body).await,
            None => self.send(Method::POST, "/scores", body).await,
        }
    }

    // --- Scores ---

    /// Latest overall score of every system.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn aggregate_scores(&self) -> Result<Vec<AggregateScore>, ZtmfError> {
        self.get("/scores/aggregate").await
    }

    /// Score history of one system, one entry per datacall.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn system_scores(&self, system_id: i64) -> Result<Vec<SystemScore>, ZtmfError> {
        self.get(&format!("/scores/aggregate?fismasystemid={system_id}"))
            .await
    }

    // --- Datacalls ---

    /// All datacalls, newest first. Served from the shared cache while it is
    /// fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache is stale and the request fails.
    pub async fn datacalls(&self) -> Result<Vec<Datacall>, ZtmfError> {
        {
            let cache = self.datacalls.read().await;
            if let Some(list) = cache.get(Instant::now()) {
                debug!(count = list.len(), "datacalls served from cache");
                return Ok(list.clone());
            }
        }

        let list: Vec<Datacall> = self.get("/datacalls").await?;
        self.datacalls.write().await.set(list.clone(), Instant::now());
        Ok(list)
    }

    /// The current datacall, if any exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the datacall list cannot be loaded.
    pub async fn latest_datacall(&self) -> Result<Option<Datacall>, ZtmfError> {
        Ok(self.datacalls().await?.into_iter().next())
    }

    /// # Errors
    ///
    /// Returns `ZtmfError::Validation` when the backend rejects the name.
    pub async fn create_datacall(&self, datacall: &NewDatacall) -> Result<Datacall, ZtmfError> {
        let created = self
            .send(Method::POST, "/datacalls", Some(serde_json::to_value(datacall)?))
            .await?;
        self.datacalls.write().await.clear();
        Ok(created)
    }

    // --- Private ---

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ZtmfError> {
        self.send(Method::GET, path, None).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ZtmfError> {
        let data = self.call(method, path, body).await?;
        serde_json::from_value(data).map_err(ZtmfError::Json)
    }

    /// Issue one request and unwrap the `data` envelope.
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ZtmfError> {
        let text = self.fetch(method, path, body).await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        let envelope: Envelope = serde_json::from_str(&text)?;
        Ok(envelope.data)
    }

    /// Issue one request and return the body of a 2xx response. No retries.
    async fn fetch(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<String, ZtmfError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");

        if !self.token.is_empty() {
            req = req.header(AUTHORIZATION, format!("Bearer {}", self.token));
        }
        if let Some(ref b) = body {
            req = req.json(b);
        }

        let resp = req.send().await.map_err(|e| {
            warn!(%method, path, error = %e, "request failed");
            if e.is_timeout() {
                ZtmfError::Timeout
            } else {
                ZtmfError::Network(e)
            }
        })?;

        let status = resp.status();
        debug!(%method, path, status = status.as_u16(), "ztmf response");
        let text = resp.text().await.map_err(ZtmfError::Network)?;

        if status.is_success() {
            return Ok(text);
        }

        let err = error_for_status(status, path, &text);
        warn!(%method, path, status = status.as_u16(), error = %err, "ztmf request rejected");
        Err(err)
    }
}

fn error_for_status(status: StatusCode, path: &str, text: &str) -> ZtmfError {
    let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();
    let message = body
        .error
        .clone()
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    match status {
        StatusCode::BAD_REQUEST => ZtmfError::Validation {
            fields: field_errors(body.data.as_ref()),
            message: body.error.unwrap_or_else(|| "Invalid request".to_owned()),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ZtmfError::Auth {
            status: status.as_u16(),
            message,
        },
        StatusCode::NOT_FOUND => ZtmfError::NotFound(body.error.unwrap_or_else(|| path.to_owned())),
        _ => ZtmfError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Pull the bearer string out of a `/whoami` body: a JSON string, plain
/// text, or an envelope whose `data` is a string.
fn bearer_from_body(text: &str) -> Result<String, ZtmfError> {
    let text = text.trim();
    let bearer = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(serde_json::Value::Object(mut map)) => match map.remove("data") {
            Some(serde_json::Value::String(s)) => s,
            _ => return Err(ZtmfError::Token("whoami body has no token".to_owned())),
        },
        Ok(_) => return Err(ZtmfError::Token("whoami body has no token".to_owned())),
        Err(_) => text.to_owned(),
    };
    if bearer.trim().is_empty() {
        return Err(ZtmfError::Token("whoami returned an empty token".to_owned()));
    }
    Ok(bearer)
}

fn field_errors(data: Option<&serde_json::Value>) -> BTreeMap<String, String> {
    let Some(serde_json::Value::Object(map)) = data else {
        return BTreeMap::new();
    };
    map.iter()
        .map(|(k, v)| {
            let text = match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), text)
        })
        .collect()
}
