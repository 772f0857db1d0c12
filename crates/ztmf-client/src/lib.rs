//! REST client for the ZTMF backend.
//!
//! Wraps the `/api/v1` endpoints for systems, questionnaires, scores, and
//! datacalls. Responses are unwrapped from their `{ "data": ... }` envelope
//! and failures are classified into [`ZtmfError`] with a [`Recovery`] hint.
//! Requests are never retried. The datacall list is cached for ten minutes
//! in a store that can be shared across client handles.
//!
//! # Example
//!
//! ```rust,no_run
//! use ztmf_client::{ClientConfig, ZtmfClient, load_auth};
//!
//! # async fn example() -> Result<(), ztmf_client::ZtmfError> {
//! let client = ZtmfClient::with_config(&ClientConfig::new("http://localhost:8080/api/v1"))?;
//! let auth = load_auth(&client).await;
//! if auth.ok {
//!     let systems = client.fisma_systems().await?;
//!     tracing::info!(count = systems.len(), user = %auth.user.email, "loaded systems");
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
mod client;
pub mod config;
pub mod error;
mod scope;

pub use auth::{AuthState, Claims, decode_claims, load_auth};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ERROR_MESSAGES, ErrorKind, Recovery, ZtmfError};
pub use scope::RequestScope;

use std::sync::Arc;

use tokio::sync::RwLock;
use ztmf_core::TimedCache;
use ztmf_core::model::Datacall;

/// Datacall list cache shared between client handles.
pub type DatacallCache = Arc<RwLock<TimedCache<Vec<Datacall>>>>;

/// ZTMF API client. Cloning is cheap and clones share the datacall cache.
#[derive(Clone)]
pub struct ZtmfClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
    datacalls: DatacallCache,
}

impl std::fmt::Debug for ZtmfClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZtmfClient")
            .field("base_url", &self.base_url)
            .field("token", &if self.token.is_empty() { "<none>" } else { "<redacted>" })
            .finish_non_exhaustive()
    }
}
