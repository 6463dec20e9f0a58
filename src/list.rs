use chrono::{DateTime, Utc};
use reqwest::Method;
use std::fmt::{Display, Formatter};

use crate::errors::{OpsgenieError, Result};
use crate::request::{ApiRequest, ApiRequestBuilder};
use crate::types::{AlertStatus, SortField, SortOrder, TagsOperator};

/// Default page size when listing alerts
pub const DEFAULT_LIST_LIMIT: u32 = 20;

/// Default upper bound when counting alerts
pub const DEFAULT_COUNT_LIMIT: u32 = 100_000;

/// Whether alerts are listed or only counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListMode {
    List,
    Count,
}

impl ListMode {
    fn path(self) -> &'static str {
        match self {
            Self::List => "alert",
            Self::Count => "alert/count",
        }
    }

    fn default_limit(self) -> u32 {
        match self {
            Self::List => DEFAULT_LIST_LIMIT,
            Self::Count => DEFAULT_COUNT_LIMIT,
        }
    }
}

impl Display for ListMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ListMode::List => write!(f, "list"),
            ListMode::Count => write!(f, "count"),
        }
    }
}

/// Filters shared by listing and counting alerts
///
/// The same query can be used for both; `teams` is only honoured when
/// listing and is dropped from count requests.
#[derive(Debug, Clone)]
pub struct ListAlertsQuery {
    /// Only alerts created after this time
    pub created_after: Option<DateTime<Utc>>,
    /// Only alerts created before this time
    pub created_before: Option<DateTime<Utc>>,
    /// Only alerts updated after this time
    pub updated_after: Option<DateTime<Utc>>,
    /// Only alerts updated before this time
    pub updated_before: Option<DateTime<Utc>>,
    /// Page size, or upper bound when counting; defaults depend on [`ListMode`]
    pub limit: Option<u32>,
    pub status: Option<AlertStatus>,
    /// Owning teams, ignored when counting
    pub teams: Vec<String>,
    pub tags: Vec<String>,
    pub tags_operator: TagsOperator,
    pub sort_by: SortField,
    pub order: SortOrder,
}

impl Default for ListAlertsQuery {
    fn default() -> Self {
        Self {
            created_after: None,
            created_before: None,
            updated_after: None,
            updated_before: None,
            limit: None,
            status: None,
            teams: Vec::new(),
            tags: Vec::new(),
            tags_operator: TagsOperator::And,
            sort_by: SortField::CreatedAt,
            order: SortOrder::Asc,
        }
    }
}

impl ListAlertsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_created_after(mut self, time: DateTime<Utc>) -> Self {
        self.created_after = Some(time);
        self
    }

    pub fn with_created_before(mut self, time: DateTime<Utc>) -> Self {
        self.created_before = Some(time);
        self
    }

    pub fn with_updated_after(mut self, time: DateTime<Utc>) -> Self {
        self.updated_after = Some(time);
        self
    }

    pub fn with_updated_before(mut self, time: DateTime<Utc>) -> Self {
        self.updated_before = Some(time);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_status(mut self, status: AlertStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Add a team filter
    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.teams.push(team.into());
        self
    }

    /// Add a tag filter
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_tags_operator(mut self, operator: TagsOperator) -> Self {
        self.tags_operator = operator;
        self
    }

    pub fn with_sort_by(mut self, field: SortField) -> Self {
        self.sort_by = field;
        self
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Build the GET request for listing or counting
    ///
    /// # Errors
    ///
    /// Returns a validation error if a time filter cannot be expressed in
    /// epoch nanoseconds.
    pub fn to_request(&self, api_key: &str, mode: ListMode) -> Result<ApiRequest> {
        let created_after = epoch_nanos("createdAfter", self.created_after)?;
        let created_before = epoch_nanos("createdBefore", self.created_before)?;
        let updated_after = epoch_nanos("updatedAfter", self.updated_after)?;
        let updated_before = epoch_nanos("updatedBefore", self.updated_before)?;

        let builder = ApiRequestBuilder::new(Method::GET, mode.path(), api_key)
            .param_opt("createdAfter", created_after)
            .param_opt("createdBefore", created_before)
            .param_opt("updatedAfter", updated_after)
            .param_opt("updatedBefore", updated_before)
            .param("limit", self.limit.unwrap_or_else(|| mode.default_limit()))
            .param_opt("status", self.status);

        let builder = match mode {
            ListMode::List => builder.param_joined("teams", &self.teams),
            ListMode::Count => builder,
        };

        Ok(builder
            .param_joined("tags", &self.tags)
            .param("tagsOperator", self.tags_operator.to_string())
            .param("sortBy", self.sort_by.to_string())
            .param("order", self.order.to_string())
            .build())
    }
}

fn epoch_nanos(name: &str, time: Option<DateTime<Utc>>) -> Result<Option<i64>> {
    let Some(time) = time else {
        return Ok(None);
    };
    let nanos = time.timestamp_nanos_opt().ok_or_else(|| {
        OpsgenieError::validation(format!("{name} is outside the supported time range"))
    })?;
    Ok(Some(nanos))
}
