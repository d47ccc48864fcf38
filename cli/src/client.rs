//! HTTP client for the portal server

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::messages::{
    Deliverable, ErrorBody, Invitation, InvitationStatus, IssueInvitation, IssuedInvitation,
    RedeemedInvitation, ResendInvitation,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// REST client for the portal API
pub struct PortalClient {
    http: reqwest::Client,
    base: Url,
}

impl PortalClient {
    pub fn new(server: &str) -> Result<Self> {
        let mut base = Url::parse(server)?;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base.join(path.trim_start_matches('/'))?;
        tracing::debug!(%method, %url, "Request");
        Ok(self.http.request(method, url))
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self.request(Method::GET, path)?.query(query).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self.request(Method::POST, path)?.json(body).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let response = self.request(Method::DELETE, path)?.send().await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn list_invitations(
        &self,
        space: Option<&str>,
        status: Option<InvitationStatus>,
    ) -> Result<Vec<Invitation>> {
        let mut query = Vec::new();
        if let Some(space) = space {
            query.push(("space", space.to_string()));
        }
        if let Some(status) = status {
            query.push(("status", status.to_string()));
        }
        self.get("api/invitations", &query).await
    }

    pub async fn issue_invitation(&self, request: &IssueInvitation) -> Result<IssuedInvitation> {
        self.post("api/invitations", request).await
    }

    pub async fn revoke_invitation(&self, id: Uuid) -> Result<Invitation> {
        self.post(&format!("api/invitations/{}/revoke", id), &serde_json::json!({}))
            .await
    }

    pub async fn resend_invitation(
        &self,
        id: Uuid,
        request: &ResendInvitation,
    ) -> Result<IssuedInvitation> {
        self.post(&format!("api/invitations/{}/resend", id), request)
            .await
    }

    pub async fn delete_invitation(&self, id: Uuid) -> Result<()> {
        self.delete(&format!("api/invitations/{}", id)).await
    }

    pub async fn redeem_invitation(
        &self,
        token: &str,
        name: Option<String>,
    ) -> Result<RedeemedInvitation> {
        self.post(
            &format!("api/invite/{}/redeem", token),
            &serde_json::json!({ "name": name }),
        )
        .await
    }

    pub async fn list_deliverables(&self, project_id: Uuid) -> Result<Vec<Deliverable>> {
        self.get(&format!("api/projects/{}/deliverables", project_id), &[])
            .await
    }

    pub async fn approve_deliverable(&self, project_id: Uuid, id: Uuid) -> Result<Deliverable> {
        self.post(
            &format!("api/projects/{}/deliverables/{}/approve", project_id, id),
            &serde_json::json!({}),
        )
        .await
    }

    pub async fn request_revision(
        &self,
        project_id: Uuid,
        id: Uuid,
        comment: &str,
    ) -> Result<Deliverable> {
        self.post(
            &format!(
                "api/projects/{}/deliverables/{}/request-revision",
                project_id, id
            ),
            &serde_json::json!({ "comment": comment }),
        )
        .await
    }
}
