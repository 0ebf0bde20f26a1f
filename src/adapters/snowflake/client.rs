//! Snowflake sink over the Snowflake REST session API
//!
//! A session is opened with a password login, statements are submitted one at
//! a time, and the session is deleted on close. A statement the service is
//! still running is polled until it finishes. An expired session token is
//! renewed once with the master token and the statement resent.

use super::models::{
    LoginData, LoginRequest, LoginResponse, QueryRequest, QueryResponse, RenewSessionRequest,
    RenewSessionResponse, CLIENT_APP_ID,
};
use crate::adapters::database::SqlSink;
use crate::config::{secret_string, SecretString, SinkCredentials, TargetConfig};
use crate::domain::ids::SqlIdentifier;
use crate::domain::{Result, SheetPipeError, SinkError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use std::time::{Duration, Instant};
use url::Url;
use uuid::Uuid;

const SNOWFLAKE_ACCEPT: &str = "application/snowflake";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_MAX_QUERY_WAIT: Duration = Duration::from_secs(600);

/// Snowflake sink
pub struct SnowflakeSink {
    client: Client,
    endpoint: Url,
    account: String,
    warehouse: String,
    token: Option<SecretString>,
    master_token: Option<SecretString>,
    sequence_id: u64,
    poll_interval: Duration,
    max_query_wait: Duration,
}

impl SnowflakeSink {
    /// Log in and open a session
    ///
    /// The session defaults to the configured warehouse, database and schema.
    ///
    /// # Errors
    ///
    /// Returns `SinkError::ConnectionFailed` if the service is unreachable and
    /// `SinkError::AuthenticationFailed` if the login is refused.
    pub async fn connect(config: &TargetConfig, credentials: SinkCredentials) -> Result<Self> {
        let endpoint = match &config.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}.snowflakecomputing.com", credentials.account),
        };
        let endpoint = Url::parse(&endpoint).map_err(|e| {
            SheetPipeError::Configuration(format!("Invalid Snowflake endpoint '{endpoint}': {e}"))
        })?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| SinkError::ConnectionFailed(format!("Failed to build HTTP client: {e}")))?;

        let mut login_url = join(&endpoint, "session/v1/login-request")?;
        login_url
            .query_pairs_mut()
            .append_pair("warehouse", &config.warehouse)
            .append_pair("databaseName", config.database.as_str())
            .append_pair("schemaName", config.schema.as_str())
            .append_pair("requestId", &Uuid::new_v4().to_string());

        let account_name = credentials
            .account
            .split('.')
            .next()
            .unwrap_or(&credentials.account);

        let body = LoginRequest {
            data: LoginData {
                client_app_id: CLIENT_APP_ID,
                client_app_version: env!("CARGO_PKG_VERSION"),
                account_name,
                login_name: &credentials.user,
                password: credentials.password.expose_secret().as_str(),
            },
        };

        tracing::debug!(endpoint = %endpoint, user = %credentials.user, "Logging in to Snowflake");

        let response = client
            .post(login_url)
            .header(reqwest::header::ACCEPT, SNOWFLAKE_ACCEPT)
            .json(&body)
            .send()
            .await
            .map_err(|e| SinkError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let text = response.text().await.unwrap_or_default();
            return Err(SinkError::AuthenticationFailed(format!("HTTP {status}: {text}")).into());
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SinkError::ConnectionFailed(format!("HTTP {status}: {text}")).into());
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| SinkError::InvalidResponse(format!("login response: {e}")))?;

        let session = match (login.success, login.data) {
            (true, Some(session)) => session,
            (_, _) => {
                let reason = login.message.unwrap_or_else(|| "login refused".to_string());
                let reason = match login.code {
                    Some(code) => format!("{reason} (code {code})"),
                    None => reason,
                };
                return Err(SinkError::AuthenticationFailed(reason).into());
            }
        };

        tracing::info!(
            account = %credentials.account,
            warehouse = %config.warehouse,
            database = %config.database,
            schema = %config.schema,
            "Snowflake session opened"
        );

        Ok(Self {
            client,
            endpoint,
            account: credentials.account.clone(),
            warehouse: config.warehouse.clone(),
            token: Some(secret_string(session.token)),
            master_token: session.master_token.map(secret_string),
            sequence_id: 0,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_query_wait: DEFAULT_MAX_QUERY_WAIT,
        })
    }

    /// Interval between polls of a running statement, and the longest wait
    pub fn with_polling(mut self, interval: Duration, max_wait: Duration) -> Self {
        self.poll_interval = interval;
        self.max_query_wait = max_wait;
        self
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.token.as_ref().ok_or(SinkError::Closed)?;
        Ok(with_token(request, token))
    }

    async fn run_query(&mut self, statement: &str) -> std::result::Result<(), String> {
        self.sequence_id += 1;

        let mut result = self.submit(statement).await?;
        if result.is_session_expired() {
            tracing::info!(account = %self.account, "Snowflake session expired, renewing");
            self.renew_session().await?;
            result = self.submit(statement).await?;
        }

        let result = self.await_completion(result).await?;
        if !result.success {
            return Err(result.failure_reason());
        }
        Ok(())
    }

    async fn submit(&self, statement: &str) -> std::result::Result<QueryResponse, String> {
        let mut url = join(&self.endpoint, "queries/v1/query-request").map_err(|e| e.to_string())?;
        url.query_pairs_mut()
            .append_pair("requestId", &Uuid::new_v4().to_string());

        let body = QueryRequest {
            sql_text: statement,
            async_exec: false,
            sequence_id: self.sequence_id,
            query_submission_time: chrono::Utc::now().timestamp_millis(),
        };

        let request = self
            .authorize(self.client.post(url))
            .map_err(|e| e.to_string())?
            .json(&body);
        let response = request.send().await.map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("HTTP {status}: {text}"));
        }

        response
            .json()
            .await
            .map_err(|e| format!("invalid query response: {e}"))
    }

    /// Poll a running statement until the service reports its outcome
    async fn await_completion(
        &self,
        mut result: QueryResponse,
    ) -> std::result::Result<QueryResponse, String> {
        let started = Instant::now();
        while result.is_in_progress() {
            let query_id = result.query_id().unwrap_or("<unknown>").to_string();
            let path = result
                .result_url()
                .ok_or_else(|| format!("query {query_id} is running but no result URL was given"))?;
            if started.elapsed() >= self.max_query_wait {
                return Err(format!(
                    "query {query_id} still running after {}s",
                    self.max_query_wait.as_secs()
                ));
            }

            tracing::debug!(query_id = %query_id, "Statement still running, polling for result");
            tokio::time::sleep(self.poll_interval).await;

            let url = self
                .endpoint
                .join(path)
                .map_err(|e| format!("invalid result URL '{path}': {e}"))?;
            let response = self
                .authorize(self.client.get(url))
                .map_err(|e| e.to_string())?
                .send()
                .await
                .map_err(|e| e.to_string())?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(format!("HTTP {status}: {text}"));
            }
            result = response
                .json()
                .await
                .map_err(|e| format!("invalid query result: {e}"))?;
        }
        Ok(result)
    }

    /// Exchange the master token for a fresh session token
    async fn renew_session(&mut self) -> std::result::Result<(), String> {
        let (Some(session), Some(master)) = (self.token.as_ref(), self.master_token.as_ref())
        else {
            return Err("session expired and no master token is available to renew it".to_string());
        };

        let mut url = join(&self.endpoint, "session/token-request").map_err(|e| e.to_string())?;
        url.query_pairs_mut()
            .append_pair("requestId", &Uuid::new_v4().to_string());

        let body = RenewSessionRequest {
            old_session_token: session.expose_secret().as_str(),
            request_type: "RENEW",
        };
        let response = with_token(self.client.post(url), master)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("session renewal: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("session renewal: HTTP {status}: {text}"));
        }

        let renewed: RenewSessionResponse = response
            .json()
            .await
            .map_err(|e| format!("invalid session renewal response: {e}"))?;
        let data = match (renewed.success, renewed.data) {
            (true, Some(data)) => data,
            _ => {
                let reason = renewed.message.unwrap_or_else(|| "renewal refused".to_string());
                return Err(match renewed.code {
                    Some(code) => format!("session renewal: {reason} (code {code})"),
                    None => format!("session renewal: {reason}"),
                });
            }
        };

        self.token = Some(secret_string(data.session_token));
        if let Some(master_token) = data.master_token {
            self.master_token = Some(secret_string(master_token));
        }
        tracing::info!(account = %self.account, "Snowflake session renewed");
        Ok(())
    }
}

#[async_trait]
impl SqlSink for SnowflakeSink {
    fn describe(&self) -> String {
        format!("snowflake:{}/{}", self.account, self.warehouse)
    }

    async fn apply_role(&mut self, role: &SqlIdentifier) -> Result<()> {
        if self.token.is_none() {
            return Err(SinkError::Closed.into());
        }
        self.run_query(&format!("USE ROLE {role}"))
            .await
            .map_err(|message| SinkError::RoleRejected {
                role: role.to_string(),
                message,
            })?;
        tracing::info!(role = %role, "Session role applied");
        Ok(())
    }

    async fn execute(&mut self, statement: &str) -> Result<()> {
        if self.token.is_none() {
            return Err(SinkError::Closed.into());
        }
        self.run_query(statement)
            .await
            .map_err(SinkError::ExecutionFailed)?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if self.token.is_none() {
            return Ok(());
        }

        let mut url = join(&self.endpoint, "session")?;
        url.query_pairs_mut().append_pair("delete", "true");

        let request = self.authorize(self.client.post(url))?;
        self.token = None;
        self.master_token = None;

        let response = request
            .send()
            .await
            .map_err(|e| SinkError::ConnectionFailed(format!("closing session: {e}")))?;
        if !response.status().is_success() {
            return Err(SinkError::ConnectionFailed(format!(
                "closing session: HTTP {}",
                response.status()
            ))
            .into());
        }

        tracing::debug!(account = %self.account, "Snowflake session closed");
        Ok(())
    }
}

fn with_token(request: RequestBuilder, token: &SecretString) -> RequestBuilder {
    request
        .header(
            reqwest::header::AUTHORIZATION,
            format!("Snowflake Token=\"{}\"", token.expose_secret().as_str()),
        )
        .header(reqwest::header::ACCEPT, SNOWFLAKE_ACCEPT)
}

fn join(endpoint: &Url, path: &str) -> Result<Url> {
    let mut url = endpoint.clone();
    url.path_segments_mut()
        .map_err(|_| {
            SheetPipeError::Configuration(format!("Snowflake endpoint cannot be a base: {endpoint}"))
        })?
        .pop_if_empty()
        .extend(path.split('/'));
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SinkKind;
    use mockito::{Matcher, Server, ServerGuard};

    fn target_config(endpoint: &str) -> TargetConfig {
        TargetConfig {
            kind: SinkKind::Snowflake,
            warehouse: "LOAD_WH".to_string(),
            database: SqlIdentifier::new("ANALYTICS").unwrap(),
            schema: SqlIdentifier::new("PUBLIC").unwrap(),
            table: SqlIdentifier::new("ORDERS").unwrap(),
            field_names: vec![SqlIdentifier::new("ID").unwrap()],
            role: SqlIdentifier::new("LOADER").unwrap(),
            credentials_path: "snowflake.json".to_string(),
            endpoint: Some(endpoint.to_string()),
            timeout_seconds: 5,
        }
    }

    fn credentials() -> SinkCredentials {
        SinkCredentials {
            user: "loader".to_string(),
            password: secret_string("pw".to_string()),
            account: "xy12345.eu-west-1".to_string(),
        }
    }

    async fn logged_in(server: &mut ServerGuard) -> SnowflakeSink {
        server
            .mock("POST", "/session/v1/login-request")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("warehouse".into(), "LOAD_WH".into()),
                Matcher::UrlEncoded("databaseName".into(), "ANALYTICS".into()),
            ]))
            .match_body(Matcher::PartialJsonString(
                r#"{"data":{"LOGIN_NAME":"loader","ACCOUNT_NAME":"xy12345"}}"#.to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"success":true,"data":{"token":"session-token","masterToken":"m"}}"#)
            .create_async()
            .await;

        SnowflakeSink::connect(&target_config(&server.url()), credentials())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_execute_sends_statement_with_token() {
        let mut server = Server::new_async().await;
        let mut sink = logged_in(&mut server).await;

        let query = server
            .mock("POST", "/queries/v1/query-request")
            .match_query(Matcher::Any)
            .match_header("authorization", "Snowflake Token=\"session-token\"")
            .match_body(Matcher::PartialJsonString(
                r#"{"sqlText":"INSERT INTO ANALYTICS.PUBLIC.ORDERS (ID) VALUES (1)"}"#.to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"success":true,"data":{}}"#)
            .create_async()
            .await;

        sink.execute("INSERT INTO ANALYTICS.PUBLIC.ORDERS (ID) VALUES (1)")
            .await
            .unwrap();
        query.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_statement_carries_reason() {
        let mut server = Server::new_async().await;
        let mut sink = logged_in(&mut server).await;

        server
            .mock("POST", "/queries/v1/query-request")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"success":false,"code":"002003","message":"Table 'ORDERS' does not exist"}"#)
            .create_async()
            .await;

        let err = sink.execute("INSERT ...").await.unwrap_err();
        match err {
            SheetPipeError::Sink(SinkError::ExecutionFailed(reason)) => {
                assert!(reason.contains("does not exist"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_role_rejection() {
        let mut server = Server::new_async().await;
        let mut sink = logged_in(&mut server).await;

        server
            .mock("POST", "/queries/v1/query-request")
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJsonString(
                r#"{"sqlText":"USE ROLE LOADER"}"#.to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"success":false,"message":"Role 'LOADER' specified in the connect string is not granted"}"#)
            .create_async()
            .await;

        let err = sink
            .apply_role(&SqlIdentifier::new("LOADER").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SheetPipeError::Sink(SinkError::RoleRejected { .. })
        ));
    }

    #[tokio::test]
    async fn test_expired_session_is_renewed_and_statement_resent() {
        let mut server = Server::new_async().await;
        let mut sink = logged_in(&mut server).await;

        let expired = server
            .mock("POST", "/queries/v1/query-request")
            .match_query(Matcher::Any)
            .match_header("authorization", "Snowflake Token=\"session-token\"")
            .with_status(200)
            .with_body(r#"{"success":false,"code":"390112","message":"Your session has expired. Please login again."}"#)
            .expect(1)
            .create_async()
            .await;
        let renew = server
            .mock("POST", "/session/token-request")
            .match_query(Matcher::Any)
            .match_header("authorization", "Snowflake Token=\"m\"")
            .match_body(Matcher::PartialJsonString(
                r#"{"oldSessionToken":"session-token","requestType":"RENEW"}"#.to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"success":true,"data":{"sessionToken":"renewed-token","masterToken":"m2"}}"#)
            .expect(1)
            .create_async()
            .await;
        let resent = server
            .mock("POST", "/queries/v1/query-request")
            .match_query(Matcher::Any)
            .match_header("authorization", "Snowflake Token=\"renewed-token\"")
            .match_body(Matcher::PartialJsonString(
                r#"{"sqlText":"INSERT INTO ANALYTICS.PUBLIC.ORDERS (ID) VALUES (1)"}"#.to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"success":true,"data":{}}"#)
            .expect(1)
            .create_async()
            .await;

        sink.execute("INSERT INTO ANALYTICS.PUBLIC.ORDERS (ID) VALUES (1)")
            .await
            .unwrap();

        expired.assert_async().await;
        renew.assert_async().await;
        resent.assert_async().await;
    }

    #[tokio::test]
    async fn test_refused_renewal_fails_statement() {
        let mut server = Server::new_async().await;
        let mut sink = logged_in(&mut server).await;

        server
            .mock("POST", "/queries/v1/query-request")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"success":false,"code":"390112","message":"Your session has expired. Please login again."}"#)
            .expect(1)
            .create_async()
            .await;
        server
            .mock("POST", "/session/token-request")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"success":false,"code":"390114","message":"Authentication token has expired."}"#)
            .create_async()
            .await;

        let err = sink.execute("INSERT ...").await.unwrap_err();
        match err {
            SheetPipeError::Sink(SinkError::ExecutionFailed(reason)) => {
                assert!(reason.contains("session renewal"));
                assert!(reason.contains("390114"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_running_statement_is_polled_until_done() {
        let mut server = Server::new_async().await;
        let mut sink = logged_in(&mut server)
            .await
            .with_polling(Duration::from_millis(10), Duration::from_secs(5));

        server
            .mock("POST", "/queries/v1/query-request")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"success":true,"code":"333334","message":"Asynchronous execution in progress.","data":{"queryId":"01b2","getResultUrl":"/queries/01b2/result"}}"#)
            .create_async()
            .await;
        let result = server
            .mock("GET", "/queries/01b2/result")
            .match_header("authorization", "Snowflake Token=\"session-token\"")
            .with_status(200)
            .with_body(r#"{"success":true,"data":{"queryId":"01b2"}}"#)
            .expect(1)
            .create_async()
            .await;

        sink.execute("INSERT INTO ANALYTICS.PUBLIC.ORDERS (ID) VALUES (1)")
            .await
            .unwrap();
        result.assert_async().await;
    }

    #[tokio::test]
    async fn test_running_statement_failure_is_reported() {
        let mut server = Server::new_async().await;
        let mut sink = logged_in(&mut server)
            .await
            .with_polling(Duration::from_millis(10), Duration::from_secs(5));

        server
            .mock("POST", "/queries/v1/query-request")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"success":true,"code":"333334","data":{"queryId":"01b3","getResultUrl":"/queries/01b3/result"}}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/queries/01b3/result")
            .with_status(200)
            .with_body(r#"{"success":false,"code":"100072","message":"NULL result in a non-nullable column"}"#)
            .create_async()
            .await;

        let err = sink.execute("INSERT ...").await.unwrap_err();
        match err {
            SheetPipeError::Sink(SinkError::ExecutionFailed(reason)) => {
                assert!(reason.contains("non-nullable"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_statement_running_too_long_is_an_error() {
        let mut server = Server::new_async().await;
        let mut sink = logged_in(&mut server)
            .await
            .with_polling(Duration::from_millis(5), Duration::from_millis(30));

        server
            .mock("POST", "/queries/v1/query-request")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"success":true,"code":"333334","data":{"queryId":"01b4","getResultUrl":"/queries/01b4/result"}}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/queries/01b4/result")
            .with_status(200)
            .with_body(r#"{"success":true,"code":"333333","data":{"queryId":"01b4","getResultUrl":"/queries/01b4/result"}}"#)
            .create_async()
            .await;

        let err = sink.execute("INSERT ...").await.unwrap_err();
        assert!(err.to_string().contains("still running"));
    }

    #[tokio::test]
    async fn test_login_refused() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/session/v1/login-request")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"success":false,"code":"390100","message":"Incorrect username or password was specified."}"#)
            .create_async()
            .await;

        let result = SnowflakeSink::connect(&target_config(&server.url()), credentials()).await;
        assert!(matches!(
            result,
            Err(SheetPipeError::Sink(SinkError::AuthenticationFailed(_)))
        ));
    }

    #[tokio::test]
    async fn test_close_deletes_session_once() {
        let mut server = Server::new_async().await;
        let mut sink = logged_in(&mut server).await;

        let delete = server
            .mock("POST", "/session")
            .match_query(Matcher::UrlEncoded("delete".into(), "true".into()))
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .expect(1)
            .create_async()
            .await;

        sink.close().await.unwrap();
        sink.close().await.unwrap();
        delete.assert_async().await;

        let err = sink.execute("SELECT 1").await.unwrap_err();
        assert!(matches!(err, SheetPipeError::Sink(SinkError::Closed)));
    }
}
