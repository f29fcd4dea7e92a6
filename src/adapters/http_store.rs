use crate::config::import_config::StoreConfig;
use crate::core::member::normalize_email;
use crate::domain::model::{MembershipRecord, NewMembership};
use crate::domain::ports::MembershipStore;
use crate::utils::error::{ImportError, Result, StoreError, StoreResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::collections::HashMap;
use std::time::Duration;

/// 透過協會的 REST API 存取會員資料
///
/// - `GET  {endpoint}/memberships?email=...` 回傳陣列
/// - `POST {endpoint}/memberships` 建立會員，409 代表 email 重複
pub struct HttpMembershipStore {
    client: Client,
    endpoint: String,
    token: Option<String>,
    headers: HashMap<String, String>,
}

impl HttpMembershipStore {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token: None,
            headers: HashMap::new(),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or_else(|| ImportError::MissingConfigError {
                field: "store.endpoint".to_string(),
            })?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let client = builder.build().map_err(|e| ImportError::ConfigError {
            message: format!("Failed to build HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            headers: config.headers.clone().unwrap_or_default(),
        })
    }

    fn memberships_url(&self) -> String {
        format!("{}/memberships", self.endpoint)
    }

    fn prepare(&self, mut request: RequestBuilder) -> RequestBuilder {
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// 取出錯誤回應中的 `message` 欄位，沒有的話用原始內容
    async fn rejection_message(response: Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| value.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.to_string()
                } else {
                    body
                }
            })
    }
}

#[async_trait]
impl MembershipStore for HttpMembershipStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<MembershipRecord>> {
        tracing::debug!("Looking up membership by email via {}", self.memberships_url());
        let response = self
            .prepare(self.client.get(self.memberships_url()))
            .query(&[("email", email)])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message: Self::rejection_message(response).await,
            });
        }

        let records: Vec<MembershipRecord> =
            response.json().await.map_err(|e| StoreError::Decode {
                message: e.to_string(),
            })?;
        // 不假設服務端一定依 email 過濾
        let wanted = normalize_email(email);
        Ok(records
            .into_iter()
            .find(|record| normalize_email(&record.details.email) == wanted))
    }

    async fn insert(&self, membership: NewMembership) -> StoreResult<MembershipRecord> {
        let email = membership.email.clone();
        let response = self
            .prepare(self.client.post(self.memberships_url()))
            .json(&membership)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            tracing::debug!(
                "Store reported duplicate for {}: {}",
                email,
                Self::rejection_message(response).await
            );
            return Err(StoreError::Duplicate { email });
        }
        if !status.is_success() {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message: Self::rejection_message(response).await,
            });
        }

        response.json().await.map_err(|e| StoreError::Decode {
            message: e.to_string(),
        })
    }
}
