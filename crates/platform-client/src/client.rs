//! The platform HTTP client.

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::credential::ApiCredential;
use crate::error::{PlatformError, Result};
use crate::types::{
    CreateAgentParams, CreateKnowledgeBaseParams, CreateLlmParams, CreatePhoneNumberParams,
    ImportPhoneNumberParams, RemoteAgent, RemoteCall, RemoteKnowledgeBase, RemoteLlm,
    RemotePhoneNumber,
};

/// Client for the remote voice platform's HTTP API.
///
/// Construct one per request with the tenant's resolved credential. Calls
/// are single-shot: a failure is reported to the caller, never retried.
pub struct PlatformClient {
    client: Client,
    base_url: String,
    credential: ApiCredential,
}

impl PlatformClient {
    /// Create a client against `base_url` with the given credential.
    pub fn new(base_url: impl Into<String>, credential: ApiCredential) -> Result<Self> {
        let client = Client::builder().build().map_err(PlatformError::Network)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            credential,
        })
    }

    /// Masked form of the credential in use, for operator display.
    pub fn credential_preview(&self) -> String {
        self.credential.masked()
    }

    /// Send one request and return the decoded JSON body.
    ///
    /// Non-2xx answers become [`PlatformError::RemoteApi`] with the raw
    /// body text. An empty success body decodes as JSON null.
    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Platform request: {} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .header("Authorization", format!("Bearer {}", self.credential.secret()));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(PlatformError::RemoteApi {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text)
            .map_err(|e| PlatformError::InvalidResponse(format!("body is not JSON: {e}")))
    }

    async fn request_typed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        let value = self.request(method, path, body).await?;
        serde_json::from_value(value).map_err(|e| PlatformError::InvalidResponse(e.to_string()))
    }

    fn to_body<T: serde::Serialize>(params: &T) -> Result<Value> {
        serde_json::to_value(params).map_err(|e| PlatformError::InvalidResponse(e.to_string()))
    }

    // --- agents ---

    /// List every agent visible to the credential, as raw JSON items.
    ///
    /// Items stay untyped so a malformed agent fails on its own during
    /// reconciliation instead of sinking the whole batch.
    pub async fn list_agents(&self) -> Result<Vec<Value>> {
        match self.request(Method::GET, "/list-agents", None).await? {
            Value::Array(items) => Ok(items),
            _ => Err(PlatformError::InvalidResponse(
                "expected an array of agents".to_string(),
            )),
        }
    }

    /// Create an agent.
    pub async fn create_agent(&self, params: &CreateAgentParams) -> Result<RemoteAgent> {
        let body = Self::to_body(params)?;
        self.request_typed(Method::POST, "/create-agent", Some(&body))
            .await
    }

    /// Patch an agent. Only the fields present in `patch` change.
    pub async fn update_agent(&self, agent_id: &str, patch: &Value) -> Result<RemoteAgent> {
        self.request_typed(Method::PATCH, &format!("/update-agent/{agent_id}"), Some(patch))
            .await
    }

    /// Delete an agent.
    pub async fn delete_agent(&self, agent_id: &str) -> Result<()> {
        self.request(Method::DELETE, &format!("/delete-agent/{agent_id}"), None)
            .await?;
        Ok(())
    }

    // --- LLM configs ---

    /// Create an LLM config.
    pub async fn create_llm(&self, params: &CreateLlmParams) -> Result<RemoteLlm> {
        let body = Self::to_body(params)?;
        self.request_typed(Method::POST, "/create-llm", Some(&body))
            .await
    }

    /// Fetch an LLM config.
    pub async fn get_llm(&self, llm_id: &str) -> Result<RemoteLlm> {
        self.request_typed(Method::GET, &format!("/get-llm/{llm_id}"), None)
            .await
    }

    /// Patch an LLM config. Only the fields present in `patch` change.
    pub async fn update_llm(&self, llm_id: &str, patch: &Value) -> Result<RemoteLlm> {
        self.request_typed(Method::PATCH, &format!("/update-llm/{llm_id}"), Some(patch))
            .await
    }

    /// Delete an LLM config.
    pub async fn delete_llm(&self, llm_id: &str) -> Result<()> {
        self.request(Method::DELETE, &format!("/delete-llm/{llm_id}"), None)
            .await?;
        Ok(())
    }

    // --- phone numbers ---

    /// List every number visible to the credential, as raw JSON items.
    pub async fn list_phone_numbers(&self) -> Result<Vec<Value>> {
        match self.request(Method::GET, "/list-phone-numbers", None).await? {
            Value::Array(items) => Ok(items),
            _ => Err(PlatformError::InvalidResponse(
                "expected an array of phone numbers".to_string(),
            )),
        }
    }

    /// Purchase a number from platform inventory.
    pub async fn create_phone_number(
        &self,
        params: &CreatePhoneNumberParams,
    ) -> Result<RemotePhoneNumber> {
        let body = Self::to_body(params)?;
        self.request_typed(Method::POST, "/create-phone-number", Some(&body))
            .await
    }

    /// Import a number the tenant owns at another carrier.
    pub async fn import_phone_number(
        &self,
        params: &ImportPhoneNumberParams,
    ) -> Result<RemotePhoneNumber> {
        let body = Self::to_body(params)?;
        self.request_typed(Method::POST, "/import-phone-number", Some(&body))
            .await
    }

    /// Patch a number's bindings or nickname.
    pub async fn update_phone_number(
        &self,
        phone_number_id: &str,
        patch: &Value,
    ) -> Result<RemotePhoneNumber> {
        self.request_typed(
            Method::PATCH,
            &format!("/update-phone-number/{phone_number_id}"),
            Some(patch),
        )
        .await
    }

    /// Release a number.
    pub async fn delete_phone_number(&self, phone_number_id: &str) -> Result<()> {
        self.request(
            Method::DELETE,
            &format!("/delete-phone-number/{phone_number_id}"),
            None,
        )
        .await?;
        Ok(())
    }

    // --- knowledge bases ---

    /// Create a knowledge base from source texts.
    pub async fn create_knowledge_base(
        &self,
        params: &CreateKnowledgeBaseParams,
    ) -> Result<RemoteKnowledgeBase> {
        let body = Self::to_body(params)?;
        self.request_typed(Method::POST, "/create-knowledge-base", Some(&body))
            .await
    }

    /// Patch a knowledge base.
    pub async fn update_knowledge_base(
        &self,
        knowledge_base_id: &str,
        patch: &Value,
    ) -> Result<RemoteKnowledgeBase> {
        self.request_typed(
            Method::PATCH,
            &format!("/knowledge-base/{knowledge_base_id}"),
            Some(patch),
        )
        .await
    }

    /// Delete a knowledge base.
    pub async fn delete_knowledge_base(&self, knowledge_base_id: &str) -> Result<()> {
        self.request(
            Method::DELETE,
            &format!("/knowledge-base/{knowledge_base_id}"),
            None,
        )
        .await?;
        Ok(())
    }

    // --- calls ---

    /// Fetch one call by platform call id.
    pub async fn get_call(&self, call_id: &str) -> Result<RemoteCall> {
        self.request_typed(Method::GET, &format!("/get-call/{call_id}"), None)
            .await
    }

    /// List recent calls, newest first.
    pub async fn list_calls(&self, limit: u32) -> Result<Vec<Value>> {
        let body = serde_json::json!({ "limit": limit, "sort_order": "descending" });
        match self.request(Method::POST, "/list-calls", Some(&body)).await? {
            Value::Array(items) => Ok(items),
            _ => Err(PlatformError::InvalidResponse(
                "expected an array of calls".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client_for(server: &mockito::ServerGuard) -> PlatformClient {
        PlatformClient::new(server.url(), ApiCredential::new("key_test12345678")).unwrap()
    }

    #[tokio::test]
    async fn test_sends_bearer_auth_and_decodes_list() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/list-agents")
            .match_header("authorization", "Bearer key_test12345678")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"agent_id":"agent_1"},{"agent_id":"agent_2"}]"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let agents = client.list_agents().await.unwrap();
        assert_eq!(agents.len(), 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_surfaces_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/create-agent")
            .with_status(402)
            .with_body("insufficient balance")
            .create_async()
            .await;

        let client = client_for(&server);
        let params = CreateAgentParams {
            agent_name: "Front Desk".to_string(),
            voice_id: "11labs-Adrian".to_string(),
            language: "en-US".to_string(),
            response_engine: crate::types::ResponseEngine::managed_llm("llm_1"),
            webhook_url: None,
        };
        let err = client.create_agent(&params).await.unwrap_err();
        match err {
            PlatformError::RemoteApi { status, body } => {
                assert_eq!(status, 402);
                assert_eq!(body, "insufficient balance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/delete-agent/agent_1")
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server);
        client.delete_agent("agent_1").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_llm_sends_patch_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/update-llm/llm_1")
            .match_body(mockito::Matcher::Json(json!({
                "knowledge_base_ids": [
                    {"knowledge_base_id": "kb_remote_1", "top_k": 3, "filter_score": 0.6}
                ]
            })))
            .with_status(200)
            .with_body(r#"{"llm_id":"llm_1"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let patch = json!({
            "knowledge_base_ids": [
                {"knowledge_base_id": "kb_remote_1", "top_k": 3, "filter_score": 0.6}
            ]
        });
        let llm = client.update_llm("llm_1", &patch).await.unwrap();
        assert_eq!(llm.llm_id.as_deref(), Some("llm_1"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_tolerant_decode_ignores_unknown_fields() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/get-call/rc_1")
            .with_status(200)
            .with_body(
                r#"{"call_id":"rc_1","agent_id":"agent_1","novel_field":{"deep":true}}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let call = client.get_call("rc_1").await.unwrap();
        assert_eq!(call.call_id.as_deref(), Some("rc_1"));
        assert_eq!(call.agent_id.as_deref(), Some("agent_1"));
        assert_eq!(call.call_status, None);
    }
}
