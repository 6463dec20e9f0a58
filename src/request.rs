//! Request descriptors shared by every alert operation.
//!
//! Operations collect their parameters into an [`ApiRequestBuilder`]; the
//! HTTP method decides where they end up. GET and DELETE put every parameter
//! on the query string, POST turns them into a JSON object, and uploads turn
//! them into multipart text fields. The API key always travels with the
//! parameters, never as a header.

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::{Map, Value};

use crate::types::AlertIdentifier;

/// Body of an outgoing request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// JSON object sent with POST requests
    Json(Value),
    /// Form upload used for attachments
    Multipart(MultipartBody),
}

/// Multipart upload: text fields plus a single file part
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartBody {
    /// Text fields, including the API key and alert identifier
    pub fields: Vec<(String, String)>,
    /// Name of the form part carrying the file
    pub file_field: &'static str,
    /// File name reported to Opsgenie
    pub file_name: String,
    /// Raw file content
    pub content: Vec<u8>,
}

impl MultipartBody {
    /// Value of a text field, if present
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn into_form(self) -> Form {
        let part = Part::bytes(self.content).file_name(self.file_name);
        let mut form = Form::new();
        for (key, value) in self.fields {
            form = form.text(key, value);
        }
        form.part(self.file_field, part)
    }
}

/// A fully built request, ready to be sent by the client
///
/// The path is relative to the client's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: &'static str,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<RequestBody>,
}

impl ApiRequest {
    /// HTTP method chosen by the operation
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Endpoint path, relative to the base URL
    pub fn path(&self) -> &'static str {
        self.path
    }

    /// Query pairs in the order they will be sent
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Value of a query parameter, if present
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Body, absent for GET and DELETE
    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// JSON body, if this request carries one
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            Some(RequestBody::Json(value)) => Some(value),
            _ => None,
        }
    }
}

pub(crate) struct ApiRequestBuilder {
    method: Method,
    path: &'static str,
    params: Vec<(&'static str, Value)>,
}

impl ApiRequestBuilder {
    pub(crate) fn new(method: Method, path: &'static str, api_key: &str) -> Self {
        Self {
            method,
            path,
            params: vec![("apiKey", Value::String(api_key.to_string()))],
        }
    }

    pub(crate) fn param(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    /// Add a parameter only when it is set and non-empty
    pub(crate) fn param_opt(self, key: &'static str, value: Option<impl ToString>) -> Self {
        match value.map(|v| v.to_string()).filter(|v| !v.is_empty()) {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Add a list as a JSON array, skipped when empty
    pub(crate) fn param_list(self, key: &'static str, values: &[String]) -> Self {
        if values.is_empty() {
            return self;
        }
        self.param(key, values.to_vec())
    }

    /// Add a list as one comma-separated string, skipped when empty
    pub(crate) fn param_joined(self, key: &'static str, values: &[String]) -> Self {
        if values.is_empty() {
            return self;
        }
        self.param(key, values.join(","))
    }

    pub(crate) fn identifier(self, identifier: &AlertIdentifier) -> Self {
        let (key, value) = identifier.as_param();
        self.param(key, value)
    }

    pub(crate) fn build(self) -> ApiRequest {
        if self.method == Method::GET || self.method == Method::DELETE {
            let query = self
                .params
                .into_iter()
                .map(|(key, value)| (key.to_string(), query_value(value)))
                .collect();
            ApiRequest {
                method: self.method,
                path: self.path,
                query,
                body: None,
            }
        } else {
            let body: Map<String, Value> = self
                .params
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect();
            ApiRequest {
                method: self.method,
                path: self.path,
                query: Vec::new(),
                body: Some(RequestBody::Json(Value::Object(body))),
            }
        }
    }

    pub(crate) fn build_multipart(
        self,
        file_field: &'static str,
        file_name: &str,
        content: &[u8],
    ) -> ApiRequest {
        let fields = self
            .params
            .into_iter()
            .map(|(key, value)| (key.to_string(), query_value(value)))
            .collect();
        ApiRequest {
            method: Method::POST,
            path: self.path,
            query: Vec::new(),
            body: Some(RequestBody::Multipart(MultipartBody {
                fields,
                file_field,
                file_name: file_name.to_string(),
                content: content.to_vec(),
            })),
        }
    }
}

fn query_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Array(items) => items
            .into_iter()
            .map(query_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
