//! HTTP implementation of [`UserSource`].

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::debug;

use crate::models::User;

use super::{ApiError, FetchError, UserSource};

/// Default users collection endpoint.
pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com/users";

/// Client for the users endpoint.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    url: String,
}

impl ApiClient {
    /// Create a client for `url`. `timeout` bounds the whole request so a
    /// hung server becomes a fetch failure instead of an endless load.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get_users(&self) -> Result<Vec<User>, ApiError> {
        debug!(url = %self.url, "Fetching users");

        let response = self
            .client
            .get(&self.url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let body = response.text().await?;
        parse_users(&body)
    }
}

/// Parse a users collection body.
pub fn parse_users(body: &str) -> Result<Vec<User>, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl UserSource for ApiClient {
    async fn fetch_all(&self) -> Result<Vec<User>, FetchError> {
        let users = self.get_users().await?;
        debug!(count = users.len(), "Users fetched");
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_users_array() {
        let body = r#"[
            {"id": 1, "name": "Leanne Graham", "username": "Bret", "email": "Sincere@april.biz",
             "address": {"street": "Kulas Light", "suite": "Apt. 556", "city": "Gwenborough", "zipcode": "92998-3874"}},
            {"id": 2, "name": "Ervin Howell", "username": "Antonette", "email": "Shanna@melissa.tv",
             "address": {"street": "Victor Plains", "suite": "Suite 879", "city": "Wisokyburgh", "zipcode": "90566-7771"}}
        ]"#;

        let users = parse_users(body).expect("Failed to parse users test JSON");
        assert_eq!(users.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(users[1].address.city, "Wisokyburgh");
    }

    #[test]
    fn test_parse_users_malformed() {
        assert!(matches!(
            parse_users("<html>oops</html>"),
            Err(ApiError::InvalidResponse(_))
        ));
        // An object instead of an array is malformed too
        assert!(parse_users(r#"{"id": 1}"#).is_err());
    }

    /// Serve one canned HTTP response on a local port and return its URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            // Read until the end of the request headers
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}/users", addr)
    }

    #[tokio::test]
    async fn test_fetch_all_success() {
        let url = serve_once(
            "200 OK",
            r#"[{"id": 3, "name": "Clementine Bauch", "username": "Samantha", "email": "Nathan@yesenia.net"}]"#,
        )
        .await;
        let client = ApiClient::new(url, Duration::from_secs(5)).unwrap();

        let users = client.fetch_all().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "Samantha");
    }

    #[tokio::test]
    async fn test_fetch_all_server_error_is_fetch_error() {
        let url = serve_once("503 Service Unavailable", "down").await;
        let client = ApiClient::new(url, Duration::from_secs(5)).unwrap();

        let err = client.fetch_all().await.unwrap_err();
        assert_eq!(err.detail(), "Server error: down");
    }

    #[tokio::test]
    async fn test_fetch_all_html_body_is_fetch_error() {
        let url = serve_once("200 OK", "<html><body>maintenance</body></html>").await;
        let client = ApiClient::new(url, Duration::from_secs(5)).unwrap();

        let err = client.fetch_all().await.unwrap_err();
        assert!(err.detail().starts_with("Invalid response"));
    }

    #[tokio::test]
    async fn test_fetch_all_connection_refused_is_fetch_error() {
        let client = ApiClient::new("http://127.0.0.1:1/users", Duration::from_secs(5)).unwrap();
        let result = client.fetch_all().await;
        assert!(result.is_err());
    }
}
