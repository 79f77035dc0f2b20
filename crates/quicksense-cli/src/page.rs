//! Loading pages into tabs.

use std::path::Path;

use anyhow::Context;
use tracing::info;
use url::Url;

/// A loaded page: its address and raw HTML.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub url: String,
    pub html: String,
}

/// Fetch `source` over HTTP(S), or read it as a local HTML file.
pub async fn load(client: &reqwest::Client, source: &str) -> anyhow::Result<LoadedPage> {
    if let Ok(url) = Url::parse(source) {
        match url.scheme() {
            "http" | "https" => return fetch(client, url).await,
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| anyhow::anyhow!("Invalid file URL: {}", source))?;
                return read_file(&path);
            }
            _ => {}
        }
    }
    read_file(Path::new(source))
}

async fn fetch(client: &reqwest::Client, url: Url) -> anyhow::Result<LoadedPage> {
    info!("Fetching {}", url);
    let response = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", url))?
        .error_for_status()
        .with_context(|| format!("Failed to fetch {}", url))?;
    let final_url = response.url().to_string();
    let html = response.text().await?;
    Ok(LoadedPage {
        url: final_url,
        html,
    })
}

fn read_file(path: &Path) -> anyhow::Result<LoadedPage> {
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let absolute = std::fs::canonicalize(path)?;
    let url = Url::from_file_path(&absolute)
        .map(String::from)
        .unwrap_or_else(|_| absolute.display().to_string());
    Ok(LoadedPage { url, html })
}
