use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use crate::errors::{OpsgenieError, Result};

/// Alert status as reported and filtered by Opsgenie
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Open,
    Acked,
    Unacked,
    Seen,
    Notseen,
    Closed,
}

impl Display for AlertStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertStatus::Open => write!(f, "open"),
            AlertStatus::Acked => write!(f, "acked"),
            AlertStatus::Unacked => write!(f, "unacked"),
            AlertStatus::Seen => write!(f, "seen"),
            AlertStatus::Notseen => write!(f, "notseen"),
            AlertStatus::Closed => write!(f, "closed"),
        }
    }
}

/// Sort direction for paged endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

/// Field alerts are sorted by when listing
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl Display for SortField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SortField::CreatedAt => write!(f, "createdAt"),
            SortField::UpdatedAt => write!(f, "updatedAt"),
        }
    }
}

/// How multiple tag filters are combined
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TagsOperator {
    #[default]
    And,
    Or,
}

impl Display for TagsOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TagsOperator::And => write!(f, "and"),
            TagsOperator::Or => write!(f, "or"),
        }
    }
}

/// Reference to a single alert
///
/// An alias only resolves while the alert is open. A tiny id is short and
/// may be reused over time, so it is not accepted for close or delete.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AlertIdentifier {
    /// Opsgenie-assigned alert id
    Id(String),
    /// User-defined alias given at creation time
    Alias(String),
    /// Short numeric id shown in the Opsgenie UI
    TinyId(String),
}

const MISSING_IDENTIFIER: &str = "one of id, alias or tinyId is required";
const AMBIGUOUS_IDENTIFIER: &str = "only one of id, alias or tinyId may be given";

impl AlertIdentifier {
    /// Build an identifier from optional parts, as a caller holding
    /// nullable `id`/`alias`/`tinyId` values would
    ///
    /// Exactly one part must be present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns a validation error when none or more than one part is given.
    pub fn from_parts(
        id: Option<&str>,
        alias: Option<&str>,
        tiny_id: Option<&str>,
    ) -> Result<Self> {
        match (non_empty(id), non_empty(alias), non_empty(tiny_id)) {
            (Some(id), None, None) => Ok(Self::Id(id)),
            (None, Some(alias), None) => Ok(Self::Alias(alias)),
            (None, None, Some(tiny_id)) => Ok(Self::TinyId(tiny_id)),
            (None, None, None) => Err(OpsgenieError::validation(MISSING_IDENTIFIER)),
            _ => Err(OpsgenieError::validation(AMBIGUOUS_IDENTIFIER)),
        }
    }

    /// Wire parameter name and value
    pub fn as_param(&self) -> (&'static str, &str) {
        match self {
            Self::Id(value) => ("id", value),
            Self::Alias(value) => ("alias", value),
            Self::TinyId(value) => ("tinyId", value),
        }
    }

    pub(crate) fn ensure_not_blank(&self) -> Result<()> {
        let (name, value) = self.as_param();
        if value.trim().is_empty() {
            let message = format!("{name} must not be empty");
            return Err(OpsgenieError::validation(message));
        }
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Alert as returned by the list endpoint
///
/// Timestamps are epoch nanoseconds on the wire; use [`Alert::created_at`]
/// and [`Alert::updated_at`] for `chrono` values. Fields not modelled here
/// are kept in `extra`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Opsgenie-assigned alert id
    #[serde(default)]
    pub id: Option<String>,
    /// User-defined alias
    #[serde(default)]
    pub alias: Option<String>,
    /// Short numeric id
    #[serde(default)]
    pub tiny_id: Option<String>,
    /// Alert text
    #[serde(default)]
    pub message: Option<String>,
    /// Longer free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Current status
    #[serde(default)]
    pub status: Option<AlertStatus>,
    /// Teams the alert is routed to
    #[serde(default)]
    pub teams: Vec<String>,
    /// Users, groups, escalations or schedules notified
    #[serde(default)]
    pub recipients: Vec<String>,
    /// Tags attached to the alert
    #[serde(default)]
    pub tags: Vec<String>,
    /// Custom actions available on the alert
    #[serde(default)]
    pub actions: Vec<String>,
    /// Custom key/value properties
    #[serde(default)]
    pub details: HashMap<String, String>,
    /// Domain the alert relates to, such as a host or service
    #[serde(default)]
    pub entity: Option<String>,
    /// Where the alert came from
    #[serde(default)]
    pub source: Option<String>,
    /// User the alert is assigned to
    #[serde(default)]
    pub owner: Option<String>,
    /// Creation time in epoch nanoseconds
    #[serde(default, rename = "createdAt")]
    pub created_at_nanos: Option<i64>,
    /// Last update time in epoch nanoseconds
    #[serde(default, rename = "updatedAt")]
    pub updated_at_nanos: Option<i64>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Alert {
    /// Creation time
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at_nanos.map(DateTime::from_timestamp_nanos)
    }

    /// Last update time
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at_nanos.map(DateTime::from_timestamp_nanos)
    }
}

/// Response to a successful alert creation
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlertCreated {
    /// Human readable result, e.g. "alert created"
    #[serde(default)]
    pub message: Option<String>,
    /// Id of the new alert
    #[serde(default)]
    pub alert_id: String,
    /// Result status, e.g. "successful"
    #[serde(default)]
    pub status: String,
    /// Result code echoed in the body
    #[serde(default)]
    pub code: u16,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Generic `{status, code}` response of update, close and delete calls
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct OperationResult {
    /// Result status, e.g. "successful"
    #[serde(default)]
    pub status: String,
    /// Result code echoed in the body
    #[serde(default)]
    pub code: u16,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Response of the list endpoint
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AlertList {
    /// Alerts on this page
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

/// Response of the count endpoint
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AlertCount {
    /// Number of matching alerts, capped by the request limit
    pub count: u64,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}
