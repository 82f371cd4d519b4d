use std::time::Duration;

use reqwest::{Client, Response};

use crate::utils::error::{DirectoryError, Result};

pub fn build_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

async fn checked_get(client: &Client, url: &str) -> Result<Response> {
    tracing::debug!("GET {}", url);
    let response = client.get(url).send().await?;
    let status = response.status();
    tracing::debug!("Response status: {}", status);

    if !status.is_success() {
        return Err(DirectoryError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

pub async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    Ok(checked_get(client, url).await?.text().await?)
}

pub async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    Ok(checked_get(client, url).await?.bytes().await?.to_vec())
}
