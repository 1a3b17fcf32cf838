//! The BakkesMod plugin leaderboard, scraped live from the public catalog page.

use std::sync::OnceLock;
use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};
use crate::entities::Plugin;
use crate::error::{SiteError, SiteResult};

pub const BAKKES_PLUGINS_ORIGIN: &str = "https://bakkesplugins.com";
pub const DEFAULT_TRENDING: usize = 10;
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const MIN_CELLS: usize = 6;

/// Where the plugin list comes from. Every call is a fresh fetch.
#[async_trait]
pub trait PluginCatalogSource: Send + Sync {
    async fn fetch(&self) -> SiteResult<Vec<Plugin>>;
}

pub struct BakkesPluginsSource {
    http: reqwest::Client,
    url: String,
}

impl BakkesPluginsSource {
    pub fn new(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { http, url: url.to_string() })
    }
}

#[async_trait]
impl PluginCatalogSource for BakkesPluginsSource {
    async fn fetch(&self) -> SiteResult<Vec<Plugin>> {
        let html = self.http.get(&self.url).send().await
            .and_then(|x| x.error_for_status())
            .map_err(|e| SiteError::PluginFetchError(e.to_string()))?
            .text().await
            .map_err(|e| SiteError::PluginFetchError(e.to_string()))?;
        let plugins = parse_plugins_html(&html, Utc::now());
        debug!("Scraped {} plugins from {}", plugins.len(), &self.url);
        Ok(plugins)
    }
}

/// A fixed plugin list, for tests and offline runs.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    plugins: Vec<Plugin>,
}

impl StaticCatalog {
    pub fn new(plugins: Vec<Plugin>) -> Self {
        Self { plugins }
    }
}

#[async_trait]
impl PluginCatalogSource for StaticCatalog {
    async fn fetch(&self) -> SiteResult<Vec<Plugin>> {
        Ok(self.plugins.clone())
    }
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("plugin parser regex is valid"))
}

fn tbody_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?is)<tbody[^>]*>(.*?)</tbody>")
}

fn row_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)<tr[^>]*>")
}

fn cell_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?is)<td[^>]*>(.*?)</td>")
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"<[^>]*>")
}

fn href_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r#"(?i)data-href="([^"]*)""#)
}

fn cell_text(cell: &str) -> String {
    tag_regex().replace_all(cell, "")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Leading digits of `value` after dropping thousands separators, 0 if none.
fn parse_count(value: &str) -> u64 {
    let digits: String = value.replace(',', "")
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

/// Reads the catalog table: one plugin per row with at least six cells, in
/// the order number, name, author, description, views, downloads and an
/// optional last-updated cell. Rows without a name are skipped.
pub fn parse_plugins_html(html: &str, fetched_at: DateTime<Utc>) -> Vec<Plugin> {
    let Some(body) = tbody_regex().captures(html).and_then(|x| x.get(1)) else {
        warn!("No table body found in plugin catalog page");
        return vec![];
    };

    row_regex().split(body.as_str())
        .filter(|x| !x.trim().is_empty())
        .enumerate()
        .filter(|(_, row)| row.contains("<td"))
        .filter_map(|(index, row)| {
            let cells: Vec<String> = cell_regex().captures_iter(row)
                .map(|x| cell_text(&x[1]))
                .collect();
            if cells.len() < MIN_CELLS || cells[1].is_empty() {
                return None;
            }
            let url = href_regex().captures(row)
                .map(|x| x[1].to_string())
                .filter(|x| !x.is_empty())
                .map(|x| format!("{}{}", BAKKES_PLUGINS_ORIGIN, x))
                .unwrap_or_default();
            Some(Plugin {
                id: index + 1,
                name: cells[1].clone(),
                author: cells[2].clone(),
                description: cells[3].clone(),
                views: parse_count(&cells[4]),
                downloads: parse_count(&cells[5]),
                last_updated: cells.get(6).cloned().unwrap_or_default(),
                url,
                is_verified: row.contains("shield-alt"),
                created_at: fetched_at,
                updated_at: fetched_at,
            })
        })
        .collect()
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub plugins: Vec<Plugin>,
    pub last_fetched: DateTime<Utc>,
}

pub async fn get_all(source: &dyn PluginCatalogSource) -> SiteResult<Catalog> {
    let plugins = source.fetch().await?;
    Ok(Catalog { plugins, last_fetched: Utc::now() })
}

/// Most downloaded plugins first.
pub async fn trending(source: &dyn PluginCatalogSource, limit: Option<usize>) -> SiteResult<Vec<Plugin>> {
    let mut plugins = source.fetch().await?;
    plugins.sort_by(|a, b| b.downloads.cmp(&a.downloads));
    plugins.truncate(limit.unwrap_or(DEFAULT_TRENDING));
    Ok(plugins)
}

/// Plugins whose name, description or author contain `query`. A blank query returns everything.
pub async fn search(source: &dyn PluginCatalogSource, query: Option<&str>) -> SiteResult<Vec<Plugin>> {
    let plugins = source.fetch().await?;
    match crate::utils::normalize_query(query) {
        Some(q) => Ok(plugins.into_iter().filter(|x| x.matches_search(&q)).collect()),
        None => Ok(plugins),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const CATALOG_PAGE: &str = r#"
<html><body>
<table class="table">
  <thead><tr><th>#</th><th>Name</th><th>Author</th><th>Description</th><th>Views</th><th>Downloads</th><th>Updated</th></tr></thead>
  <tbody>
    <tr class="clickable" data-href="/plugins/view/1">
      <td>1</td>
      <td><i class="fas fa-shield-alt"></i> <b>Rocket Plugin</b></td>
      <td>Stanbroek</td>
      <td>Custom game modes &amp; more</td>
      <td>1,234,567</td>
      <td>98,765</td>
      <td>2024-03-01</td>
    </tr>
    <tr class="clickable" data-href="/plugins/view/2">
      <td>2</td>
      <td>Workshop&nbsp;Map Loader</td>
      <td>Martinn</td>
      <td>Load &lt;workshop&gt; maps</td>
      <td>500</td>
      <td>1,200</td>
    </tr>
    <tr><td>3</td><td></td><td>nobody</td><td>nameless</td><td>1</td><td>1</td></tr>
    <tr><td>4</td><td>Too short</td></tr>
    <tr class="clickable">
      <td>5</td><td>Ingame Rank</td><td>borgox</td><td>Shows ranks</td><td>n/a</td><td>5,000 downloads</td><td>2023-11-11</td>
    </tr>
  </tbody>
</table>
</body></html>
"#;

    pub(crate) fn catalog() -> StaticCatalog {
        StaticCatalog::new(parse_plugins_html(CATALOG_PAGE, Utc::now()))
    }

    #[test]
    fn test_parse_plugins_html() {
        let plugins = parse_plugins_html(CATALOG_PAGE, Utc::now());
        assert_eq!(plugins.len(), 3);

        let rocket = &plugins[0];
        assert_eq!(rocket.id, 1);
        assert_eq!(rocket.name, "Rocket Plugin");
        assert_eq!(rocket.description, "Custom game modes & more");
        assert_eq!(rocket.views, 1_234_567);
        assert_eq!(rocket.downloads, 98_765);
        assert_eq!(rocket.last_updated, "2024-03-01");
        assert_eq!(rocket.url, "https://bakkesplugins.com/plugins/view/1");
        assert!(rocket.is_verified);

        let loader = &plugins[1];
        assert_eq!(loader.id, 2);
        assert_eq!(loader.name, "Workshop Map Loader");
        assert_eq!(loader.description, "Load <workshop> maps");
        assert_eq!(loader.last_updated, "");
        assert!(!loader.is_verified);

        let rank = &plugins[2];
        assert_eq!(rank.id, 5);
        assert_eq!(rank.views, 0);
        assert_eq!(rank.downloads, 5_000);
        assert_eq!(rank.url, "");
    }

    #[test]
    fn test_cell_text_decodes_ampersand_last() {
        assert_eq!(cell_text("<b>Tips &amp;lt;3</b>"), "Tips &lt;3");
        assert_eq!(cell_text("Saves &amp; goals &gt; 10"), "Saves & goals > 10");
    }

    #[test]
    fn test_parse_without_table() {
        assert!(parse_plugins_html("<html>maintenance</html>", Utc::now()).is_empty());
    }

    #[tokio::test]
    async fn test_trending_and_search() {
        let source = catalog();
        let top = trending(&source, Some(2)).await.unwrap();
        let names: Vec<_> = top.iter().map(|x| x.name.as_str()).collect();
        assert_eq!(names, vec!["Rocket Plugin", "Ingame Rank"]);

        assert_eq!(search(&source, Some("MARTINN")).await.unwrap().len(), 1);
        assert_eq!(search(&source, Some("ranks")).await.unwrap()[0].name, "Ingame Rank");
        assert_eq!(search(&source, Some("  ")).await.unwrap().len(), 3);
        assert!(search(&source, Some("nothing like this")).await.unwrap().is_empty());

        let all = get_all(&source).await.unwrap();
        assert_eq!(all.plugins.len(), 3);
    }
}
