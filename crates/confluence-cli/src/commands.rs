//! One handler per subcommand. Each prints its result to stdout.

use anyhow::{Context, Result};
use confluence_core::{AuthenticatedClient, Comparison, Config, Page, TokenRefresher};
use tracing::debug;

use crate::render::render;

pub struct Output {
    pub json: bool,
}

impl Output {
    fn page(&self, page: &Page) -> Result<()> {
        println!("{}", render(page, self.json)?);
        Ok(())
    }

    fn pages(&self, pages: &[Page]) -> Result<()> {
        if self.json {
            println!("{}", render(&pages, true)?);
            return Ok(());
        }
        if pages.is_empty() {
            eprintln!("No pages found.");
        }
        for page in pages {
            self.page(page)?;
        }
        Ok(())
    }
}

pub async fn fetch(client: &AuthenticatedClient, out: &Output, id: &str) -> Result<()> {
    let page = client
        .pages()
        .fetch_by_id(id)
        .await
        .with_context(|| format!("Failed to fetch page {}", id))?;
    out.page(&page)
}

pub async fn fetch_all(
    client: &AuthenticatedClient,
    out: &Output,
    space: Option<&str>,
    offset: u32,
    limit: u32,
) -> Result<()> {
    let pages = client
        .pages()
        .fetch_all(space, offset, limit)
        .await
        .context("Failed to list pages")?;
    debug!(count = pages.len(), offset = offset, "Listed pages");
    out.pages(&pages)
}

pub async fn fetch_by_update_date(
    client: &AuthenticatedClient,
    out: &Output,
    date: &str,
    comparison: Comparison,
) -> Result<()> {
    let pages = client
        .pages()
        .fetch_updated_since(date, comparison)
        .await
        .with_context(|| format!("Failed to search pages modified {} {}", comparison, date))?;
    out.pages(&pages)
}

pub async fn update(
    client: &AuthenticatedClient,
    out: &Output,
    id: &str,
    title: &str,
    body: &str,
    message: Option<&str>,
) -> Result<()> {
    let pages = client.pages();
    let result = match message {
        Some(message) => pages.update_with_message(id, title, body, message).await,
        None => pages.update(id, title, body).await,
    };
    let page = result.with_context(|| format!("Failed to update page {}", id))?;
    out.page(&page)
}

pub async fn delete(client: &AuthenticatedClient, id: &str) -> Result<()> {
    client
        .pages()
        .delete(id)
        .await
        .with_context(|| format!("Failed to delete page {}", id))?;
    println!("Deleted page {}", id);
    Ok(())
}

pub async fn check_access(client: &AuthenticatedClient, out: &Output) -> Result<()> {
    let sites = client
        .accessible_resources()
        .await
        .context("Failed to list accessible sites")?;
    if sites.is_empty() {
        anyhow::bail!("The stored token cannot reach any site");
    }
    for site in &sites {
        println!("{}", render(site, out.json)?);
    }
    Ok(())
}

/// Print the consent URL. The state value is printed too so it can be
/// compared against the one the redirect comes back with.
pub fn auth_url(refresher: &TokenRefresher) -> Result<()> {
    let state = TokenRefresher::generate_state();
    let url = refresher.authorization_url(&state)?;
    println!("Open this URL to authorize access:\n\n{}\n", url);
    println!("state: {}", state);
    println!("Then run `confluence auth-exchange <code>` with the code from the redirect.");
    Ok(())
}

pub async fn auth_exchange(refresher: &TokenRefresher, config: &Config, code: &str) -> Result<()> {
    let credentials = refresher
        .exchange_code(code)
        .await
        .context("Failed to exchange authorization code")?;
    println!(
        "Authorized. Tokens stored for cloud id {} ({} API).",
        credentials.cloud_id, config.product
    );
    Ok(())
}
