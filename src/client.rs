use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::close::{CloseAlertRequest, CloseMode};
use crate::create::CreateAlertRequest;
use crate::errors::{OpsgenieError, Result};
use crate::get::GetAlertRequest;
use crate::list::{ListAlertsQuery, ListMode};
use crate::request::{ApiRequest, RequestBody};
use crate::types::{AlertCount, AlertCreated, AlertList, OperationResult};
use crate::update::UpdateAlertRequest;

/// Base URL of the Opsgenie v1 JSON API
pub const DEFAULT_API_URL: &str = "https://api.opsgenie.com/v1/json/";

/// Request timeout used by [`OpsgenieClient::from_env`] when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_API_KEY: &str = "OPSGENIE_API_KEY";
const ENV_API_URL: &str = "OPSGENIE_API_URL";
const ENV_TIMEOUT_SECS: &str = "OPSGENIE_TIMEOUT_SECS";

/// Client for the Opsgenie alert API
///
/// Holds the API key and base URL; every call is otherwise independent.
/// Cloning is cheap and clones share the underlying connection pool.
///
/// # Example
///
/// ```rust,no_run
/// use opsgenie_alert_api::{AlertIdentifier, CloseAlertRequest};
/// use opsgenie_alert_api::{CreateAlertRequest, OpsgenieClient};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = OpsgenieClient::new("my-api-key", Duration::from_secs(10))?;
///
///     let request = CreateAlertRequest::new("Database unreachable").with_alias("db-down");
///     let created = client.create_alert(request).await?;
///     println!("created alert {}", created.alert_id);
///
///     let alias = AlertIdentifier::Alias("db-down".to_string());
///     client.close_alert(CloseAlertRequest::new(alias)).await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct OpsgenieClient {
    client: ClientWithMiddleware,
    api_url: Url,
    api_key: String,
}

impl OpsgenieClient {
    /// Create a client for the public Opsgenie API
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is blank or the HTTP client cannot
    /// be built.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::with_base_url(Url::parse(DEFAULT_API_URL)?, api_key, timeout)
    }

    /// Create a client for a custom base URL
    ///
    /// # Arguments
    ///
    /// * `api_url` - Base URL endpoint paths are resolved against
    ///   (e.g., `https://api.eu.opsgenie.com/v1/json/`)
    /// * `api_key` - Integration API key sent with every request
    /// * `timeout` - Request timeout duration
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is blank or the HTTP client cannot
    /// be built.
    pub fn with_base_url(
        api_url: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(OpsgenieError::BuildHttpClient)?;

        let client = ClientBuilder::new(client).build();

        Self::with_client(client, api_url, api_key)
    }

    /// Create a new client with a custom reqwest middleware client
    ///
    /// This allows you to add custom middleware (retry, logging, etc.)
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the API key is empty or only
    /// whitespace.
    pub fn with_client(
        client: ClientWithMiddleware,
        api_url: Url,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            let message = "API key must not be empty".to_string();
            return Err(OpsgenieError::Config(message));
        }

        Ok(Self {
            client,
            api_url: with_trailing_slash(api_url),
            api_key,
        })
    }

    /// Create a client from the environment
    ///
    /// Reads `OPSGENIE_API_KEY` (required), `OPSGENIE_API_URL` and
    /// `OPSGENIE_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing, a value cannot be parsed
    /// or the HTTP client cannot be built.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let Some(api_key) = lookup(ENV_API_KEY).filter(|key| !key.is_empty()) else {
            return Err(OpsgenieError::Config(format!("{ENV_API_KEY} is not set")));
        };

        let api_url = match lookup(ENV_API_URL) {
            Some(url) => Url::parse(&url)?,
            None => Url::parse(DEFAULT_API_URL)?,
        };

        let timeout = match lookup(ENV_TIMEOUT_SECS) {
            Some(secs) => parse_timeout(&secs)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Self::with_base_url(api_url, api_key, timeout)
    }

    /// Create an alert
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The message is empty or longer than 130 characters (no request is sent)
    /// - The HTTP request fails
    /// - Opsgenie returns a non-success status code
    #[instrument(name = "OpsgenieClient::create_alert", skip_all)]
    pub async fn create_alert(&self, request: CreateAlertRequest) -> Result<AlertCreated> {
        let request = request.to_request(&self.api_key)?;
        self.send(request).await
    }

    /// Fetch an alert, or its notes, logs or recipients
    ///
    /// The response is returned as Opsgenie sent it, since its shape
    /// depends on the selected view.
    #[instrument(
        name = "OpsgenieClient::get_alert",
        skip_all,
        fields(view = %request.view)
    )]
    pub async fn get_alert(&self, request: GetAlertRequest) -> Result<Value> {
        let request = request.to_request(&self.api_key)?;
        self.send(request).await
    }

    /// List alerts matching the query
    #[instrument(name = "OpsgenieClient::list_alerts", skip_all)]
    pub async fn list_alerts(&self, query: ListAlertsQuery) -> Result<AlertList> {
        self.query_alerts(&query, ListMode::List).await
    }

    /// Count alerts matching the query
    ///
    /// Team filters are not supported by the count endpoint and are ignored.
    #[instrument(name = "OpsgenieClient::count_alerts", skip_all)]
    pub async fn count_alerts(&self, query: ListAlertsQuery) -> Result<AlertCount> {
        self.query_alerts(&query, ListMode::Count).await
    }

    async fn query_alerts<T: DeserializeOwned>(
        &self,
        query: &ListAlertsQuery,
        mode: ListMode,
    ) -> Result<T> {
        debug!(%mode, "Querying alerts");
        let request = query.to_request(&self.api_key, mode)?;
        self.send(request).await
    }

    /// Apply a single action to an alert
    ///
    /// # Errors
    ///
    /// Returns a validation error, without sending anything, if the action
    /// is missing a required parameter.
    #[instrument(
        name = "OpsgenieClient::update_alert",
        skip_all,
        fields(action = request.action.name())
    )]
    pub async fn update_alert(&self, request: UpdateAlertRequest) -> Result<OperationResult> {
        let request = request.to_request(&self.api_key)?;
        self.send(request).await
    }

    /// Close an alert
    #[instrument(name = "OpsgenieClient::close_alert", skip_all)]
    pub async fn close_alert(&self, request: CloseAlertRequest) -> Result<OperationResult> {
        self.close_or_delete(&request, CloseMode::Close).await
    }

    /// Delete an alert
    ///
    /// Any note on the request is not sent.
    #[instrument(name = "OpsgenieClient::delete_alert", skip_all)]
    pub async fn delete_alert(&self, request: CloseAlertRequest) -> Result<OperationResult> {
        self.close_or_delete(&request, CloseMode::Delete).await
    }

    async fn close_or_delete(
        &self,
        request: &CloseAlertRequest,
        mode: CloseMode,
    ) -> Result<OperationResult> {
        let request = request.to_request(&self.api_key, mode)?;
        self.send(request).await
    }

    /// Send a prepared request and decode the JSON response
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The HTTP request fails
    /// - Opsgenie returns a non-success status code (the body is kept verbatim)
    /// - The response body does not decode into `T`
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let ApiRequest {
            method,
            path,
            query,
            body,
        } = request;

        let url = self.api_url.join(path)?;

        debug!(method = %method, url = %url, "Sending request to Opsgenie");

        let mut builder = self.client.request(method, url);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        builder = match body {
            Some(RequestBody::Json(json)) => builder.json(&json),
            Some(RequestBody::Multipart(multipart)) => builder.multipart(multipart.into_form()),
            None => builder,
        };

        let response = builder.send().await.map_err(OpsgenieError::Request)?;

        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OpsgenieError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!(status = status.as_u16(), "Request succeeded");
        response.json::<T>().await.map_err(OpsgenieError::Decode)
    }

    /// Get the base API URL
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn parse_timeout(value: &str) -> Result<Duration> {
    let secs = value.parse::<u64>().map_err(|e| {
        let message = format!("{ENV_TIMEOUT_SECS} is not a number of seconds: {e}");
        OpsgenieError::Config(message)
    })?;
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::get::AlertView;
    use crate::types::AlertIdentifier;
    use crate::update::UpdateAction;
    use serde_json::json;
    use std::collections::HashMap;
    use wiremock::matchers::{
        any, body_json, body_string_contains, method, path, query_param, query_param_is_missing,
    };
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn client_for(mock_server: &MockServer) -> OpsgenieClient {
        let url = format!("{}/v1/json/", mock_server.uri());
        let url = Url::parse(&url).unwrap();
        OpsgenieClient::with_base_url(url, "k", TIMEOUT).unwrap()
    }

    async fn expect_no_requests(mock_server: &MockServer) {
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(mock_server)
            .await;
    }

    async fn get_with_switches(
        client: &OpsgenieClient,
        notes: bool,
        logs: bool,
        recipients: bool,
    ) -> Result<Value> {
        let view = AlertView::from_switches(notes, logs, recipients)?;
        let id = AlertIdentifier::Id("abc".to_string());
        let request = GetAlertRequest::new(id).with_view(view);
        client.get_alert(request).await
    }

    async fn close_with_parts(
        client: &OpsgenieClient,
        id: Option<&str>,
        alias: Option<&str>,
        mode: CloseMode,
    ) -> Result<OperationResult> {
        let identifier = AlertIdentifier::from_parts(id, alias, None)?;
        let request = CloseAlertRequest::new(identifier);
        match mode {
            CloseMode::Close => client.close_alert(request).await,
            CloseMode::Delete => client.delete_alert(request).await,
        }
    }

    fn json_response(body: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(body)
    }

    fn success() -> ResponseTemplate {
        json_response(json!({"status": "successful", "code": 200}))
    }

    #[tokio::test]
    async fn test_create_alert_success() {
        let mock_server = MockServer::start().await;

        let created = json!({
            "message": "alert created",
            "alertId": "7b4e7d4e",
            "status": "successful",
            "code": 200
        });
        Mock::given(method("POST"))
            .and(path("/v1/json/alert"))
            .and(body_json(json!({"apiKey": "k", "message": "down"})))
            .respond_with(json_response(created))
            .expect(1)
            .mount(&mock_server)
            .await;

        let created = client_for(&mock_server)
            .create_alert(CreateAlertRequest::new("down"))
            .await
            .unwrap();

        assert_eq!(created.alert_id, "7b4e7d4e");
        assert_eq!(created.status, "successful");
        assert_eq!(created.code, 200);
        assert_eq!(created.message.as_deref(), Some("alert created"));
    }

    #[tokio::test]
    async fn test_create_alert_sends_only_supplied_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/json/alert"))
            .and(body_json(json!({
                "apiKey": "k",
                "message": "X",
                "teams": ["a", "b"],
                "tags": "p,q"
            })))
            .respond_with(json_response(json!({"alertId": "a1", "code": 200})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let request = CreateAlertRequest::new("X")
            .with_team("a")
            .with_team("b")
            .with_tag("p")
            .with_tag("q");

        let result = client_for(&mock_server).create_alert(request).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_alert_oversized_message_sends_nothing() {
        let mock_server = MockServer::start().await;
        expect_no_requests(&mock_server).await;

        let request = CreateAlertRequest::new("x".repeat(131));
        let result = client_for(&mock_server).create_alert(request).await;

        assert!(matches!(result, Err(OpsgenieError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_alert_remote_error_verbatim() {
        let mock_server = MockServer::start().await;

        let body = r#"{"code":40011,"error":"Alias already exists"}"#;
        Mock::given(method("POST"))
            .and(path("/v1/json/alert"))
            .respond_with(ResponseTemplate::new(400).set_body_string(body))
            .mount(&mock_server)
            .await;

        let request = CreateAlertRequest::new("down").with_alias("dup");
        let result = client_for(&mock_server).create_alert(request).await;

        if let Err(OpsgenieError::Api { status, message }) = result {
            assert_eq!(status, 400);
            assert_eq!(message, body);
        } else {
            panic!("Expected Api error");
        }
    }

    #[tokio::test]
    async fn test_empty_api_key_sends_nothing() {
        let mock_server = MockServer::start().await;
        expect_no_requests(&mock_server).await;
        let url = Url::parse(&mock_server.uri()).unwrap();

        for api_key in ["", "   "] {
            let result = OpsgenieClient::with_base_url(url.clone(), api_key, TIMEOUT);
            assert!(matches!(result, Err(OpsgenieError::Config(_))));
        }

        let client = ClientBuilder::new(Client::new()).build();
        let result = OpsgenieClient::with_client(client, url, "");
        assert!(matches!(result, Err(OpsgenieError::Config(_))));

        let result = OpsgenieClient::new("", TIMEOUT);
        assert!(matches!(result, Err(OpsgenieError::Config(_))));
    }

    #[tokio::test]
    async fn test_get_alert_notes() {
        let mock_server = MockServer::start().await;

        let notes = json!({
            "took": 3,
            "lastKey": "n2",
            "notes": [{"note": "restarted", "owner": "jane"}]
        });
        Mock::given(method("GET"))
            .and(path("/v1/json/alert/note"))
            .and(query_param("apiKey", "k"))
            .and(query_param("id", "abc"))
            .and(query_param("limit", "100"))
            .and(query_param("order", "desc"))
            .and(query_param_is_missing("lastKey"))
            .respond_with(json_response(notes.clone()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let id = AlertIdentifier::Id("abc".to_string());
        let request = GetAlertRequest::new(id).with_view(AlertView::Notes);

        let result = client_for(&mock_server).get_alert(request).await;
        assert_eq!(result.unwrap(), notes);
    }

    #[tokio::test]
    async fn test_get_alert_recipients_without_paging() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/json/alert/recipient"))
            .and(query_param("alias", "db-down"))
            .and(query_param_is_missing("limit"))
            .and(query_param_is_missing("order"))
            .respond_with(json_response(json!({"users": []})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let alias = AlertIdentifier::Alias("db-down".to_string());
        let request = GetAlertRequest::new(alias).with_view(AlertView::Recipients);

        let result = client_for(&mock_server).get_alert(request).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_get_alert_multiple_views_sends_nothing() {
        let mock_server = MockServer::start().await;
        expect_no_requests(&mock_server).await;
        let client = client_for(&mock_server);

        let result = get_with_switches(&client, true, false, true).await;

        assert!(matches!(result, Err(OpsgenieError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_alerts_with_team() {
        let mock_server = MockServer::start().await;

        let alerts = json!({
            "alerts": [{
                "id": "a1",
                "message": "down",
                "status": "open",
                "createdAt": 1489056400000000000i64
            }]
        });
        Mock::given(method("GET"))
            .and(path("/v1/json/alert"))
            .and(query_param("teams", "opsA"))
            .and(query_param("limit", "20"))
            .and(query_param("sortBy", "createdAt"))
            .respond_with(json_response(alerts))
            .expect(1)
            .mount(&mock_server)
            .await;

        let query = ListAlertsQuery::new().with_team("opsA");
        let result = client_for(&mock_server).list_alerts(query).await;
        let list = result.unwrap();

        assert_eq!(list.alerts.len(), 1);
        assert_eq!(list.alerts[0].id.as_deref(), Some("a1"));
    }

    #[tokio::test]
    async fn test_count_alerts_drops_team() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/json/alert/count"))
            .and(query_param_is_missing("teams"))
            .and(query_param("limit", "100000"))
            .respond_with(json_response(json!({"count": 3})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let query = ListAlertsQuery::new().with_team("opsA");
        let result = client_for(&mock_server).count_alerts(query).await;

        assert_eq!(result.unwrap().count, 3);
    }

    #[tokio::test]
    async fn test_update_alert_assign() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/json/alert/assign"))
            .and(body_json(json!({
                "apiKey": "k",
                "alias": "db-down",
                "owner": "jane",
                "user": "bot"
            })))
            .respond_with(success())
            .expect(1)
            .mount(&mock_server)
            .await;

        let alias = AlertIdentifier::Alias("db-down".to_string());
        let action = UpdateAction::Assign {
            owner: "jane".to_string(),
        };
        let request = UpdateAlertRequest::new(alias, action).with_user("bot");

        let result = client_for(&mock_server).update_alert(request).await;
        let updated = result.unwrap();
        assert_eq!(updated.status, "successful");
        assert_eq!(updated.code, 200);
    }

    #[tokio::test]
    async fn test_update_alert_remove_details() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/json/alert/details"))
            .and(query_param("id", "abc"))
            .and(query_param("keys", "region,host"))
            .respond_with(success())
            .expect(1)
            .mount(&mock_server)
            .await;

        let id = AlertIdentifier::Id("abc".to_string());
        let action = UpdateAction::RemoveDetails {
            keys: vec!["region".to_string(), "host".to_string()],
        };
        let request = UpdateAlertRequest::new(id, action);

        let result = client_for(&mock_server).update_alert(request).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_alert_attach_file() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/json/alert/attach"))
            .and(body_string_contains("trace.log"))
            .and(body_string_contains("panic at line 3"))
            .respond_with(success())
            .expect(1)
            .mount(&mock_server)
            .await;

        let id = AlertIdentifier::Id("abc".to_string());
        let action = UpdateAction::AttachFile {
            file_name: "trace.log".to_string(),
            content: b"panic at line 3".to_vec(),
            index_file: None,
        };
        let request = UpdateAlertRequest::new(id, action);

        let result = client_for(&mock_server).update_alert(request).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_alert_missing_tags_sends_nothing() {
        let mock_server = MockServer::start().await;
        expect_no_requests(&mock_server).await;

        let id = AlertIdentifier::Id("abc".to_string());
        let action = UpdateAction::AddTags { tags: vec![] };
        let request = UpdateAlertRequest::new(id, action);

        let result = client_for(&mock_server).update_alert(request).await;
        assert!(matches!(result, Err(OpsgenieError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_alert_add_details() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/json/alert/details"))
            .and(body_json(json!({
                "apiKey": "k",
                "id": "abc",
                "details": {"region": "eu"}
            })))
            .respond_with(success())
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut details = HashMap::new();
        details.insert("region".to_string(), "eu".to_string());
        let id = AlertIdentifier::Id("abc".to_string());
        let request = UpdateAlertRequest::new(id, UpdateAction::AddDetails { details });

        let result = client_for(&mock_server).update_alert(request).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_close_alert() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/json/alert/close"))
            .and(body_json(json!({
                "apiKey": "k",
                "id": "abc",
                "note": "fixed"
            })))
            .respond_with(success())
            .expect(1)
            .mount(&mock_server)
            .await;

        let id = AlertIdentifier::Id("abc".to_string());
        let request = CloseAlertRequest::new(id).with_note("fixed");

        let result = client_for(&mock_server).close_alert(request).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_alert_by_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/json/alert"))
            .respond_with(success())
            .expect(1)
            .mount(&mock_server)
            .await;

        let request = CloseAlertRequest::new(AlertIdentifier::Id("abc".to_string()));
        let result = client_for(&mock_server).delete_alert(request).await;
        assert!(result.is_ok());

        let received = mock_server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].url.query(), Some("apiKey=k&id=abc"));
        assert!(received[0].body.is_empty());
    }

    #[tokio::test]
    async fn test_close_alert_invalid_identifier_sends_nothing() {
        let mock_server = MockServer::start().await;
        expect_no_requests(&mock_server).await;
        let client = client_for(&mock_server);

        let (id, alias) = (Some("abc"), Some("db-down"));
        let both = close_with_parts(&client, id, alias, CloseMode::Close).await;
        assert!(matches!(both, Err(OpsgenieError::Validation(_))));

        let neither = close_with_parts(&client, None, None, CloseMode::Delete).await;
        assert!(matches!(neither, Err(OpsgenieError::Validation(_))));

        let tiny_id = AlertIdentifier::TinyId("12".to_string());
        let result = client.delete_alert(CloseAlertRequest::new(tiny_id)).await;
        assert!(matches!(result, Err(OpsgenieError::Validation(_))));
    }

    #[tokio::test]
    async fn test_server_error_is_retryable() {
        let mock_server = MockServer::start().await;

        let unavailable = ResponseTemplate::new(503).set_body_string("Service unavailable");
        Mock::given(method("POST"))
            .and(path("/v1/json/alert/close"))
            .respond_with(unavailable)
            .mount(&mock_server)
            .await;

        let request = CloseAlertRequest::new(AlertIdentifier::Id("abc".to_string()));
        let result = client_for(&mock_server).close_alert(request).await;

        if let Err(err) = result {
            assert!(err.is_retryable());
        } else {
            panic!("Expected error");
        }
    }

    #[tokio::test]
    async fn test_malformed_response_is_decode_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/json/alert/count"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let query = ListAlertsQuery::new();
        let result = client_for(&mock_server).count_alerts(query).await;
        assert!(matches!(result, Err(OpsgenieError::Decode(_))));
    }

    #[test]
    fn test_api_url_gets_trailing_slash() {
        let url = Url::parse("http://localhost:8080/v1/json").unwrap();
        let client = OpsgenieClient::with_base_url(url, "k", TIMEOUT).unwrap();
        let api_url = client.api_url();

        assert_eq!(api_url.as_str(), "http://localhost:8080/v1/json/");
        assert_eq!(
            api_url.join("alert/close").unwrap().as_str(),
            "http://localhost:8080/v1/json/alert/close"
        );
    }

    #[test]
    fn test_default_api_url() {
        let client = OpsgenieClient::new("k", TIMEOUT).unwrap();
        assert_eq!(client.api_url().as_str(), DEFAULT_API_URL);
    }

    #[test]
    fn test_from_lookup() {
        let env = HashMap::from([
            (ENV_API_KEY, "k"),
            (ENV_API_URL, "https://api.eu.opsgenie.com/v1/json/"),
            (ENV_TIMEOUT_SECS, "5"),
        ]);
        let lookup = |name: &str| env.get(name).map(|v| v.to_string());
        let client = OpsgenieClient::from_lookup(lookup).unwrap();
        assert_eq!(
            client.api_url().as_str(),
            "https://api.eu.opsgenie.com/v1/json/"
        );

        let key_only = |name: &str| (name == ENV_API_KEY).then(|| "k".to_string());
        let client = OpsgenieClient::from_lookup(key_only).unwrap();
        assert_eq!(client.api_url().as_str(), DEFAULT_API_URL);
    }

    #[test]
    fn test_from_lookup_errors() {
        let result = OpsgenieClient::from_lookup(|_| None);
        assert!(matches!(result, Err(OpsgenieError::Config(_))));

        let result = OpsgenieClient::from_lookup(|name| match name {
            ENV_API_KEY => Some("k".to_string()),
            ENV_TIMEOUT_SECS => Some("soon".to_string()),
            _ => None,
        });
        assert!(matches!(result, Err(OpsgenieError::Config(_))));

        let result = OpsgenieClient::from_lookup(|name| match name {
            ENV_API_KEY => Some("k".to_string()),
            ENV_API_URL => Some("not a url".to_string()),
            _ => None,
        });
        assert!(matches!(result, Err(OpsgenieError::InvalidUrl(_))));
    }
}
