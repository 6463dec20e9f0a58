use reqwest::Method;
use std::fmt::{Display, Formatter};
use tracing::debug;

use crate::errors::{OpsgenieError, Result};
use crate::request::{ApiRequest, ApiRequestBuilder};
use crate::types::AlertIdentifier;

/// Whether an alert is closed or removed entirely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseMode {
    Close,
    Delete,
}

impl Display for CloseMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseMode::Close => write!(f, "close"),
            CloseMode::Delete => write!(f, "delete"),
        }
    }
}

/// Parameters for closing or deleting an alert
///
/// The alert must be referenced by id or alias. Unset fields are left out
/// of the request, for both the close body and the delete query.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseAlertRequest {
    /// Id or alias of the alert
    pub identifier: AlertIdentifier,
    /// Display name of the request owner
    pub user: Option<String>,
    /// Only sent when closing
    pub note: Option<String>,
    pub source: Option<String>,
}

impl CloseAlertRequest {
    pub fn new(identifier: AlertIdentifier) -> Self {
        Self {
            identifier,
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

    /// Build the close (POST) or delete (DELETE) request
    ///
    /// # Errors
    ///
    /// Returns a validation error if the alert is referenced by tiny id or
    /// the identifier is blank.
    pub fn to_request(&self, api_key: &str, mode: CloseMode) -> Result<ApiRequest> {
        if let AlertIdentifier::TinyId(_) = self.identifier {
            let message = format!("an id or alias is required to {mode} an alert");
            return Err(OpsgenieError::validation(message));
        }
        self.identifier.ensure_not_blank()?;

        let request = match mode {
            CloseMode::Close => {
                let builder = ApiRequestBuilder::new(Method::POST, "alert/close", api_key);
                builder
                    .identifier(&self.identifier)
                    .param_opt("user", self.user.as_deref())
                    .param_opt("note", self.note.as_deref())
                    .param_opt("source", self.source.as_deref())
                    .build()
            }
            CloseMode::Delete => {
                if self.note.is_some() {
                    debug!("Note is not sent when deleting an alert");
                }
                ApiRequestBuilder::new(Method::DELETE, "alert", api_key)
                    .identifier(&self.identifier)
                    .param_opt("user", self.user.as_deref())
                    .param_opt("source", self.source.as_deref())
                    .build()
            }
        };

        Ok(request)
    }
}
