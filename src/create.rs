use reqwest::Method;
use std::collections::HashMap;
use tracing::warn;

use crate::errors::{OpsgenieError, Result};
use crate::request::{ApiRequest, ApiRequestBuilder};

/// Longest message Opsgenie accepts, in characters
pub const MAX_MESSAGE_LEN: usize = 130;

/// Longest description Opsgenie accepts, in characters
pub const MAX_DESCRIPTION_LEN: usize = 15_000;

/// Opsgenie only honours the first 50 teams and recipients
pub const MAX_EFFECTIVE_TARGETS: usize = 50;

/// Parameters for creating an alert
///
/// Only `message` is required. Unset fields are left out of the request
/// body entirely.
///
/// # Example
///
/// ```rust
/// use opsgenie_alert_api::CreateAlertRequest;
///
/// let request = CreateAlertRequest::new("Database unreachable")
///     .with_alias("db-prod-down")
///     .with_team("dba")
///     .with_tag("prod")
///     .with_detail("region", "eu-west-1")
///     .with_note("Paged from the health checker");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CreateAlertRequest {
    /// Alert text, at most [`MAX_MESSAGE_LEN`] characters
    pub message: String,
    /// Deduplication key, unique among open alerts
    pub alias: Option<String>,
    /// Longer description, at most [`MAX_DESCRIPTION_LEN`] characters
    pub description: Option<String>,
    /// Teams to route the alert to
    pub teams: Vec<String>,
    /// Users, groups, escalations or schedules to notify
    pub recipients: Vec<String>,
    /// Custom actions shown on the alert
    pub actions: Vec<String>,
    /// Where the alert came from; Opsgenie uses the caller's IP when unset
    pub source: Option<String>,
    pub tags: Vec<String>,
    /// Custom key/value properties
    pub details: HashMap<String, String>,
    /// Domain the alert relates to, such as a host or service
    pub entity: Option<String>,
    /// Display name of the request owner
    pub user: Option<String>,
    /// Note added together with the alert
    pub note: Option<String>,
}

impl CreateAlertRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Deduplication key, unique among open alerts
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.teams.push(team.into());
        self
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipients.push(recipient.into());
        self
    }

    /// Custom action shown on the alert
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Display name of the request owner
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Check the request against the API's documented limits
    ///
    /// # Errors
    ///
    /// Returns a validation error if the message is empty or longer than
    /// [`MAX_MESSAGE_LEN`] characters, or the description is longer than
    /// [`MAX_DESCRIPTION_LEN`] characters.
    pub fn validate(&self) -> Result<()> {
        let message_len = self.message.chars().count();
        if self.message.trim().is_empty() {
            return Err(OpsgenieError::validation("message must not be empty"));
        }
        if message_len > MAX_MESSAGE_LEN {
            return Err(OpsgenieError::validation(format!(
                "message is {message_len} characters, limit is {MAX_MESSAGE_LEN}"
            )));
        }

        if let Some(description) = &self.description {
            let description_len = description.chars().count();
            if description_len > MAX_DESCRIPTION_LEN {
                return Err(OpsgenieError::validation(format!(
                    "description is {description_len} characters, limit is {MAX_DESCRIPTION_LEN}"
                )));
            }
        }

        Ok(())
    }

    /// Build the POST request for this alert
    ///
    /// # Errors
    ///
    /// Returns a validation error if [`CreateAlertRequest::validate`] fails.
    pub fn to_request(&self, api_key: &str) -> Result<ApiRequest> {
        self.validate()?;

        if self.teams.len() > MAX_EFFECTIVE_TARGETS {
            warn!(
                teams = self.teams.len(),
                "Only the first {MAX_EFFECTIVE_TARGETS} teams are used by Opsgenie"
            );
        }
        if self.recipients.len() > MAX_EFFECTIVE_TARGETS {
            warn!(
                recipients = self.recipients.len(),
                "Only the first {MAX_EFFECTIVE_TARGETS} recipients are used by Opsgenie"
            );
        }

        let mut builder = ApiRequestBuilder::new(Method::POST, "alert", api_key)
            .param("message", self.message.as_str())
            .param_list("teams", &self.teams)
            .param_opt("alias", self.alias.as_deref())
            .param_opt("description", self.description.as_deref())
            .param_list("recipients", &self.recipients)
            .param_joined("actions", &self.actions)
            .param_opt("source", self.source.as_deref())
            .param_joined("tags", &self.tags);

        if !self.details.is_empty() {
            builder = builder.param("details", details_value(&self.details));
        }

        Ok(builder
            .param_opt("entity", self.entity.as_deref())
            .param_opt("user", self.user.as_deref())
            .param_opt("note", self.note.as_deref())
            .build())
    }
}

pub(crate) fn details_value(details: &HashMap<String, String>) -> serde_json::Value {
    details
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_body() {
        let request = CreateAlertRequest::new("down").to_request("k").unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.path(), "alert");
        assert_eq!(
            request.json_body(),
            Some(&json!({"apiKey": "k", "message": "down"}))
        );
    }

    #[test]
    fn test_body_contains_only_supplied_fields() {
        let request = CreateAlertRequest::new("X")
            .with_team("a")
            .with_team("b")
            .with_tag("p")
            .with_tag("q")
            .to_request("k")
            .unwrap();

        assert_eq!(
            request.json_body(),
            Some(&json!({
                "apiKey": "k",
                "message": "X",
                "teams": ["a", "b"],
                "tags": "p,q"
            }))
        );
    }

    #[test]
    fn test_all_fields() {
        let request = CreateAlertRequest::new("Disk full")
            .with_alias("disk-web-1")
            .with_description("/var is at 99%")
            .with_recipient("oncall")
            .with_action("Restart")
            .with_action("Ping")
            .with_source("monitor")
            .with_detail("host", "web-1")
            .with_entity("web-1")
            .with_user("bot")
            .with_note("auto-created")
            .to_request("k")
            .unwrap();

        assert_eq!(
            request.json_body(),
            Some(&json!({
                "apiKey": "k",
                "message": "Disk full",
                "alias": "disk-web-1",
                "description": "/var is at 99%",
                "recipients": ["oncall"],
                "actions": "Restart,Ping",
                "source": "monitor",
                "details": {"host": "web-1"},
                "entity": "web-1",
                "user": "bot",
                "note": "auto-created"
            }))
        );
    }

    #[test]
    fn test_message_length_limit() {
        let at_limit = "a".repeat(MAX_MESSAGE_LEN);
        assert!(CreateAlertRequest::new(at_limit).validate().is_ok());

        let over_limit = "a".repeat(MAX_MESSAGE_LEN + 1);
        let request = CreateAlertRequest::new(over_limit);
        assert!(request.to_request("k").unwrap_err().is_validation());
    }

    #[test]
    fn test_message_length_counts_characters() {
        // 130 multi-byte characters are within the limit
        let message = "é".repeat(MAX_MESSAGE_LEN);
        assert!(message.len() > MAX_MESSAGE_LEN);
        assert!(CreateAlertRequest::new(message).validate().is_ok());
    }

    #[test]
    fn test_empty_message_rejected() {
        for message in ["", "   "] {
            let err = CreateAlertRequest::new(message).validate().unwrap_err();
            assert!(err.is_validation());
        }
    }

    #[test]
    fn test_description_length_limit() {
        let request = CreateAlertRequest::new("X")
            .with_description("d".repeat(MAX_DESCRIPTION_LEN + 1));
        assert!(request.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_more_than_fifty_teams_still_sent() {
        let request = (0..60).fold(CreateAlertRequest::new("X"), |request, i| {
            request.with_team(format!("team-{i}"))
        });

        let built = request.to_request("k").unwrap();
        let teams = built.json_body().unwrap()["teams"].as_array().unwrap();
        assert_eq!(teams.len(), 60);
    }
}
