use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use std::collections::HashMap;

use crate::create::details_value;
use crate::errors::{OpsgenieError, Result};
use crate::request::{ApiRequest, ApiRequestBuilder};
use crate::types::AlertIdentifier;

/// A single change to apply to an existing alert
///
/// Each variant maps to its own endpoint and carries the parameters that
/// endpoint requires.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateAction {
    Acknowledge,
    TakeOwnership,
    /// Add a note to the alert log
    AddNote { note: String },
    /// Silence notifications until `end_date`
    ///
    /// An unset or empty `timezone` leaves the choice to Opsgenie.
    Snooze {
        end_date: DateTime<Utc>,
        timezone: Option<String>,
    },
    /// Notify again; an empty list notifies the original recipients
    Renotify { recipients: Vec<String> },
    /// Make `owner` the owner of the alert
    Assign { owner: String },
    AddTeam { team: String },
    AddRecipient { recipient: String },
    AddTags { tags: Vec<String> },
    RemoveTags { tags: Vec<String> },
    AddDetails { details: HashMap<String, String> },
    /// Remove the details stored under `keys`
    RemoveDetails { keys: Vec<String> },
    /// Run one of the custom actions defined on the alert
    ExecuteAction { action: String },
    /// Upload a file; `index_file` names the entry page of an archive
    AttachFile {
        file_name: String,
        content: Vec<u8>,
        index_file: Option<String>,
    },
}

impl UpdateAction {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Acknowledge => "acknowledge",
            Self::TakeOwnership => "takeOwnership",
            Self::AddNote { .. } => "addNote",
            Self::Snooze { .. } => "snooze",
            Self::Renotify { .. } => "renotify",
            Self::Assign { .. } => "assign",
            Self::AddTeam { .. } => "addTeam",
            Self::AddRecipient { .. } => "addRecipient",
            Self::AddTags { .. } => "addTags",
            Self::RemoveTags { .. } => "removeTags",
            Self::AddDetails { .. } => "addDetails",
            Self::RemoveDetails { .. } => "removeDetails",
            Self::ExecuteAction { .. } => "executeAction",
            Self::AttachFile { .. } => "attachFile",
        }
    }

    fn method(&self) -> Method {
        match self {
            Self::RemoveTags { .. } | Self::RemoveDetails { .. } => Method::DELETE,
            _ => Method::POST,
        }
    }

    fn path(&self) -> &'static str {
        match self {
            Self::Acknowledge => "alert/acknowledge",
            Self::TakeOwnership => "alert/takeOwnership",
            Self::AddNote { .. } => "alert/note",
            Self::Snooze { .. } => "alert/snooze",
            Self::Renotify { .. } => "alert/renotify",
            Self::Assign { .. } => "alert/assign",
            Self::AddTeam { .. } => "alert/team",
            Self::AddRecipient { .. } => "alert/recipient",
            Self::AddTags { .. } | Self::RemoveTags { .. } => "alert/tags",
            Self::AddDetails { .. } | Self::RemoveDetails { .. } => "alert/details",
            Self::ExecuteAction { .. } => "alert/executeAction",
            Self::AttachFile { .. } => "alert/attach",
        }
    }

    /// Check that the companion parameters of this action are present
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the missing parameter.
    pub fn validate(&self) -> Result<()> {
        fn required(name: &str, value: &str) -> Result<()> {
            if value.trim().is_empty() {
                return Err(OpsgenieError::validation(format!("{name} is required")));
            }
            Ok(())
        }

        fn at_least_one(name: &str, len: usize) -> Result<()> {
            if len == 0 {
                let message = format!("at least one entry in {name} is required");
                return Err(OpsgenieError::validation(message));
            }
            Ok(())
        }

        match self {
            Self::Acknowledge
            | Self::TakeOwnership
            | Self::Snooze { .. }
            | Self::Renotify { .. } => Ok(()),
            Self::AddNote { note } => required("note", note),
            Self::Assign { owner } => required("owner", owner),
            Self::AddTeam { team } => required("team", team),
            Self::AddRecipient { recipient } => required("recipient", recipient),
            Self::AddTags { tags } | Self::RemoveTags { tags } => at_least_one("tags", tags.len()),
            Self::AddDetails { details } => at_least_one("details", details.len()),
            Self::RemoveDetails { keys } => at_least_one("keys", keys.len()),
            Self::ExecuteAction { action } => required("action", action),
            Self::AttachFile { file_name, .. } => required("file name", file_name),
        }
    }
}

/// Parameters for updating an alert
///
/// `user`, `note` and `source` are sent with every action. For
/// [`UpdateAction::AddNote`] the action's own note is used instead.
///
/// # Example
///
/// ```rust
/// use opsgenie_alert_api::{AlertIdentifier, UpdateAction, UpdateAlertRequest};
///
/// let request = UpdateAlertRequest::new(
///     AlertIdentifier::Alias("db-prod-down".to_string()),
///     UpdateAction::Assign { owner: "jane@example.com".to_string() },
/// )
/// .with_user("bot")
/// .with_note("Escalated by runbook");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateAlertRequest {
    pub identifier: AlertIdentifier,
    pub action: UpdateAction,
    /// Display name of the request owner
    pub user: Option<String>,
    /// Note added to the alert log with the action
    pub note: Option<String>,
    pub source: Option<String>,
}

impl UpdateAlertRequest {
    pub fn new(identifier: AlertIdentifier, action: UpdateAction) -> Self {
        Self {
            identifier,
            action,
            user: None,
            note: None,
            source: None,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Build the request for the selected action
    ///
    /// # Errors
    ///
    /// Returns a validation error if the identifier is blank or the action
    /// is missing a required parameter.
    pub fn to_request(&self, api_key: &str) -> Result<ApiRequest> {
        self.identifier.ensure_not_blank()?;
        self.action.validate()?;

        let builder = ApiRequestBuilder::new(self.action.method(), self.action.path(), api_key)
            .identifier(&self.identifier);

        let builder = match &self.action {
            UpdateAction::Acknowledge | UpdateAction::TakeOwnership => builder,
            UpdateAction::AddNote { note } => builder.param("note", note.as_str()),
            UpdateAction::Snooze { end_date, timezone } => {
                let end_date = end_date.to_rfc3339_opts(SecondsFormat::Secs, true);
                builder
                    .param("endDate", end_date)
                    .param_opt("timezone", timezone.as_deref())
            }
            UpdateAction::Renotify { recipients } => builder.param_list("recipients", recipients),
            UpdateAction::Assign { owner } => builder.param("owner", owner.as_str()),
            UpdateAction::AddTeam { team } => builder.param("team", team.as_str()),
            UpdateAction::AddRecipient { recipient } => {
                builder.param("recipient", recipient.as_str())
            }
            UpdateAction::AddTags { tags } | UpdateAction::RemoveTags { tags } => {
                builder.param_joined("tags", tags)
            }
            UpdateAction::AddDetails { details } => {
                builder.param("details", details_value(details))
            }
            UpdateAction::RemoveDetails { keys } => builder.param_joined("keys", keys),
            UpdateAction::ExecuteAction { action } => builder.param("action", action.as_str()),
            UpdateAction::AttachFile { index_file, .. } => {
                builder.param_opt("indexFile", index_file.as_deref())
            }
        };

        let builder = builder
            .param_opt("user", self.user.as_deref())
            .param_opt("source", self.source.as_deref());

        let builder = match self.action {
            UpdateAction::AddNote { .. } => builder,
            _ => builder.param_opt("note", self.note.as_deref()),
        };

        match &self.action {
            UpdateAction::AttachFile {
                file_name,
                content,
                index_file: _,
            } => Ok(builder.build_multipart("attachment", file_name, content)),
            _ => Ok(builder.build()),
        }
    }
}
