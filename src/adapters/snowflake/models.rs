//! Snowflake REST session models

use serde::{Deserialize, Serialize};

/// Client identification sent at login
pub const CLIENT_APP_ID: &str = "sheetpipe";

/// Session token no longer valid; renewable with the master token
pub const SESSION_EXPIRED_CODE: &str = "390112";

/// Query accepted but still executing
const QUERY_IN_PROGRESS_CODES: [&str; 2] = ["333333", "333334"];

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub data: LoginData<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct LoginData<'a> {
    pub client_app_id: &'a str,
    pub client_app_version: &'a str,
    pub account_name: &'a str,
    pub login_name: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub data: Option<SessionData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub token: String,
    #[serde(default)]
    pub master_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest<'a> {
    pub sql_text: &'a str,
    pub async_exec: bool,
    pub sequence_id: u64,
    pub query_submission_time: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewSessionRequest<'a> {
    pub old_session_token: &'a str,
    pub request_type: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RenewSessionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub data: Option<RenewedSession>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewedSession {
    pub session_token: String,
    #[serde(default)]
    pub master_token: Option<String>,
}

/// Query response envelope; the row set itself is ignored
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub data: Option<QueryData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryData {
    #[serde(default)]
    pub query_id: Option<String>,
    #[serde(default)]
    pub get_result_url: Option<String>,
}

impl QueryResponse {
    /// The statement is still running and its outcome must be polled
    pub fn is_in_progress(&self) -> bool {
        self.code
            .as_deref()
            .is_some_and(|code| QUERY_IN_PROGRESS_CODES.contains(&code))
    }

    pub fn is_session_expired(&self) -> bool {
        !self.success && self.code.as_deref() == Some(SESSION_EXPIRED_CODE)
    }

    /// Path to poll for the outcome of a running statement
    pub fn result_url(&self) -> Option<&str> {
        self.data.as_ref()?.get_result_url.as_deref()
    }

    pub fn query_id(&self) -> Option<&str> {
        self.data.as_ref()?.query_id.as_deref()
    }

    /// Failure reason as reported by the service
    pub fn failure_reason(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => format!("{message} (code {code})"),
            (None, Some(message)) => message.clone(),
            (Some(code), None) => format!("code {code}"),
            (None, None) => "no reason given".to_string(),
        }
    }
}
