//! # Update Check
//!
//! Fetches the repository's newest commit from the GitHub API so the owners
//! hear about upstream pushes. Fail-soft: no data means no notification.

use crate::infrastructure::http::RetryClient;

#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    pub sha: String,
    pub message: String,
}

pub async fn latest_commit(client: &RetryClient, repo: &str) -> Option<CommitInfo> {
    let url = format!("https://api.github.com/repos/{repo}/commits");
    let payload = match client.request("GET", &url).await {
        Ok(Some(payload)) => payload,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("update check failed: {e}");
            return None;
        }
    };

    let newest = payload.as_json()?.get(0)?;
    let sha = newest.get("sha")?.as_str()?;
    let message = newest
        .get("commit")
        .and_then(|c| c.get("message"))
        .and_then(|m| m.as_str())
        .unwrap_or("(no commit message)");

    Some(CommitInfo {
        sha: sha.to_string(),
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::traits::HttpTransport;
    use crate::domain::types::TransportResponse;

    struct FixedTransport {
        status: u16,
        body: String,
    }

    #[async_trait]
    impl HttpTransport for FixedTransport {
        async fn execute(&self, _method: &str, _url: &str) -> Result<TransportResponse, String> {
            Ok(TransportResponse {
                status: self.status,
                retry_after: None,
                content_type: Some("application/json".to_string()),
                body: self.body.clone(),
            })
        }
    }

    #[tokio::test]
    async fn extracts_sha_and_message() {
        let client = RetryClient::new(Arc::new(FixedTransport {
            status: 200,
            body: r#"[{"sha":"abc123def","commit":{"message":"Fix the feed"}}]"#.to_string(),
        }));
        let info = latest_commit(&client, "example/relay").await;
        assert_eq!(
            info,
            Some(CommitInfo {
                sha: "abc123def".to_string(),
                message: "Fix the feed".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn terminal_status_yields_none() {
        let client = RetryClient::new(Arc::new(FixedTransport {
            status: 404,
            body: String::new(),
        }));
        assert_eq!(latest_commit(&client, "example/relay").await, None);
    }
}
