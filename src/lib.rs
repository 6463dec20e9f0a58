//! # Opsgenie Alert API
//!
//! A Rust client library for the [Opsgenie](https://www.atlassian.com/software/opsgenie) alert API.
//!
//! ## Features
//!
//! - Create, fetch, list, count, update, close and delete alerts
//! - One typed action per update endpoint (acknowledge, snooze, assign, tags, attachments, ...)
//! - Local validation of documented limits before anything is sent
//! - Inspectable request descriptors via [`ApiRequest`]
//!
//! Every call is a single request; nothing is cached, queued or retried.
//!
//! ## Example
//!
//! ```rust,no_run
//! use opsgenie_alert_api::{
//!     AlertIdentifier, CreateAlertRequest, ListAlertsQuery, OpsgenieClient, UpdateAction,
//!     UpdateAlertRequest,
//! };
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpsgenieClient::new("my-api-key", Duration::from_secs(10))?;
//!
//!     let alert = CreateAlertRequest::new("High memory usage on web-1")
//!         .with_alias("web-1-memory")
//!         .with_team("platform")
//!         .with_tag("prod")
//!         .with_detail("usage", "93%");
//!     client.create_alert(alert).await?;
//!
//!     let update = UpdateAlertRequest::new(
//!         AlertIdentifier::Alias("web-1-memory".to_string()),
//!         UpdateAction::Acknowledge,
//!     )
//!     .with_user("oncall-bot");
//!     client.update_alert(update).await?;
//!
//!     let prod = ListAlertsQuery::new().with_tag("prod");
//!     let open = client.count_alerts(prod).await?;
//!     println!("{} prod alerts", open.count);
//!     Ok(())
//! }
//! ```

mod client;
mod close;
mod create;
mod errors;
mod get;
mod list;
mod request;
mod types;
mod update;

pub use client::{OpsgenieClient, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
pub use close::{CloseAlertRequest, CloseMode};
pub use create::{CreateAlertRequest, MAX_DESCRIPTION_LEN, MAX_EFFECTIVE_TARGETS, MAX_MESSAGE_LEN};
pub use errors::{OpsgenieError, Result};
pub use get::{AlertView, GetAlertRequest, DEFAULT_PAGE_LIMIT};
pub use list::{ListAlertsQuery, ListMode, DEFAULT_COUNT_LIMIT, DEFAULT_LIST_LIMIT};
pub use request::{ApiRequest, MultipartBody, RequestBody};
pub use types::{
    Alert, AlertCount, AlertCreated, AlertIdentifier, AlertList, AlertStatus, OperationResult,
    SortField, SortOrder, TagsOperator,
};
pub use update::{UpdateAction, UpdateAlertRequest};
