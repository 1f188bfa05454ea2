//! Web helpers: fetch a page as readable text, and a link-only web search.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use serde_json::json;

use crate::config::FetchConfig;
use crate::error::{ToolError, ToolResult};

use super::{rich_description, ToolDef};

const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
const SIMPLIFY_FAILED: &str = "<error>Page failed to be simplified from HTML</error>";
const NO_MORE_CONTENT: &str = "<error>No more content available.</error>";

/// Elements whose text never reaches the reader.
const SKIPPED: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "svg", "iframe",
    "template", "head",
];

/// Elements that start and end a line of output.
const BLOCKS: &[&str] = &[
    "p", "div", "section", "article", "main", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul",
    "ol", "pre", "blockquote", "table", "tr", "dl", "dt", "dd", "figure", "figcaption", "hr",
];

#[derive(Debug, Deserialize)]
pub struct FetchArgs {
    pub url: String,
    #[serde(default)]
    pub raw: bool,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default)]
    pub start_index: usize,
}

fn default_max_length() -> usize {
    5000
}

#[derive(Debug, Deserialize)]
pub struct SearchArgs {
    pub query: String,
    #[serde(default = "default_num_results")]
    pub num_results: usize,
}

fn default_num_results() -> usize {
    5
}

pub struct FetchTool {
    client: Client,
    user_agent: String,
}

impl FetchTool {
    pub fn new(config: &FetchConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("falling back to default HTTP client: {e}");
                Client::new()
            });
        Self {
            client,
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn tool_defs() -> Vec<ToolDef> {
        vec![
            ToolDef {
                name: "fetch".to_string(),
                description: rich_description(
                    "Fetch a URL and return its readable text content.",
                    "Use this when the user shares a link or asks about the contents of a web page.",
                    None,
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "url": {"type": "string", "description": "URL to fetch"},
                        "raw": {
                            "type": "boolean",
                            "description": "Return the raw body instead of simplified text",
                            "default": false
                        },
                        "max_length": {
                            "type": "integer",
                            "description": "Maximum number of characters to return (default 5000)",
                            "default": 5000
                        },
                        "start_index": {
                            "type": "integer",
                            "description": "Character offset to start from, for continuing a truncated page",
                            "default": 0
                        }
                    },
                    "required": ["url"]
                }),
            },
            ToolDef {
                name: "web_search".to_string(),
                description: rich_description(
                    "Search the web and return result links.",
                    "Use this when the user asks for information you need to look up online.",
                    None,
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {"type": "string", "description": "Search query"},
                        "num_results": {
                            "type": "integer",
                            "description": "How many links to return (default 5)",
                            "default": 5
                        }
                    },
                    "required": ["query"]
                }),
            },
        ]
    }

    /// GET the page and return `(content, prefix)`.
    async fn fetch_url(&self, url: &str, force_raw: bool) -> ToolResult<(String, String)> {
        let resp = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| ToolError::internal(format!("Failed to fetch {url}: {e}")))?;

        let status = resp.status();
        if status.as_u16() >= 400 {
            return Err(ToolError::internal(format!(
                "Failed to fetch {url} - status code {}",
                status.as_u16()
            )));
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = resp
            .text()
            .await
            .map_err(|e| ToolError::internal(format!("Failed to fetch {url}: {e}")))?;

        if content_type.contains("text/html") && !force_raw {
            return Ok((extract_text(&body), String::new()));
        }
        Ok((
            body,
            format!(
                "Content type {content_type} cannot be simplified to markdown, but here is the raw content:\n"
            ),
        ))
    }

    pub async fn fetch(&self, args: &FetchArgs) -> ToolResult<String> {
        if args.url.trim().is_empty() {
            return Err(ToolError::invalid_params("URL is required"));
        }
        tracing::debug!(url = %args.url, raw = args.raw, "fetching page");
        let (content, prefix) = self.fetch_url(&args.url, args.raw).await?;
        let page = window(&content, args.start_index, args.max_length);
        Ok(format!("{prefix}Contents of {}:\n{page}", args.url))
    }

    /// Result links, one per line, or an `<error>` line.
    pub async fn web_search(&self, query: &str, num_results: usize) -> String {
        let resp = self
            .client
            .get(SEARCH_URL)
            .query(&[("q", query)])
            .header("User-Agent", &self.user_agent)
            .send()
            .await;

        let body = match resp {
            Ok(resp) if resp.status() == StatusCode::OK => resp.text().await.ok(),
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "search request failed");
                None
            }
            Err(e) => {
                tracing::warn!("search request failed: {e}");
                None
            }
        };
        let Some(body) = body else {
            return "<error>Failed to perform search.</error>".to_string();
        };

        let links = search_links(&body, num_results);
        if links.is_empty() {
            return "<error>No results found.</error>".to_string();
        }
        links.join("\n")
    }
}

/// Readable text of an HTML document: boilerplate containers dropped, block
/// elements on their own lines.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = Selector::parse("body")
        .ok()
        .and_then(|s| document.select(&s).next())
        .unwrap_or_else(|| document.root_element());

    let mut out = String::new();
    walk(root, &mut out);

    let text = out
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if text.is_empty() {
        SIMPLIFY_FAILED.to_string()
    } else {
        text
    }
}

fn walk(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if SKIPPED.contains(&name) {
        return;
    }
    let block = BLOCKS.contains(&name);
    if block || name == "br" {
        out.push('\n');
    }
    if let Some(level) = heading_level(name) {
        out.push_str(&"#".repeat(level));
        out.push(' ');
    }
    if name == "li" {
        out.push_str("- ");
    }

    for child in element.children() {
        if let Some(el) = ElementRef::wrap(child) {
            walk(el, out);
        } else if let Some(text) = child.value().as_text() {
            let t = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if t.is_empty() {
                continue;
            }
            if !out.is_empty() && !out.ends_with(&['\n', ' '][..]) {
                out.push(' ');
            }
            out.push_str(&t);
        }
    }

    if block {
        out.push('\n');
    }
}

fn heading_level(name: &str) -> Option<usize> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Character window with a continuation hint when more remains.
pub fn window(content: &str, start_index: usize, max_length: usize) -> String {
    let total = content.chars().count();
    if start_index >= total {
        return NO_MORE_CONTENT.to_string();
    }
    let slice: String = content.chars().skip(start_index).take(max_length).collect();
    if slice.is_empty() {
        return NO_MORE_CONTENT.to_string();
    }
    let taken = slice.chars().count();
    let remaining = total - (start_index + taken);
    if taken == max_length && remaining > 0 {
        let next = start_index + taken;
        return format!(
            "{slice}\n\n<error>Content truncated. Call the fetch tool with a start_index of {next} to get more content.</error>"
        );
    }
    slice
}

/// `a.result__a` hrefs that look like absolute links.
pub fn search_links(html: &str, limit: usize) -> Vec<String> {
    let Ok(selector) = Selector::parse("a.result__a[href]") else {
        return Vec::new();
    };
    Html::parse_document(html)
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.contains("http"))
        .take(limit)
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── HTML extraction ───────────────────────────────────────────

    #[test]
    fn extract_drops_scripts_and_navigation() {
        let html = r#"<html><head><title>t</title><script>var x = 1;</script></head>
            <body><nav>Home | About</nav><h1>Weather</h1><p>Sunny   and
            warm.</p><script>alert(1)</script><footer>(c) 2024</footer></body></html>"#;
        let text = extract_text(html);
        assert_eq!(text, "# Weather\nSunny and warm.");
    }

    #[test]
    fn extract_puts_list_items_on_lines() {
        let html = "<body><ul><li>one</li><li>two <b>bold</b></li></ul></body>";
        assert_eq!(extract_text(html), "- one\n- two bold");
    }

    #[test]
    fn extract_empty_page_reports_failure() {
        let html = "<html><body><script>only()</script></body></html>";
        assert_eq!(extract_text(html), SIMPLIFY_FAILED);
    }

    // ── windowing ─────────────────────────────────────────────────

    #[test]
    fn window_short_content_is_whole() {
        assert_eq!(window("hello", 0, 5000), "hello");
    }

    #[test]
    fn window_truncates_with_hint() {
        let out = window("abcdefghij", 2, 4);
        assert!(out.starts_with("cdef\n\n<error>Content truncated."));
        assert!(out.contains("start_index of 6"));
    }

    #[test]
    fn window_exact_tail_has_no_hint() {
        assert_eq!(window("abcdef", 2, 4), "cdef");
    }

    #[test]
    fn window_counts_characters_not_bytes() {
        assert_eq!(window("°C°C", 1, 2), "C°\n\n<error>Content truncated. Call the fetch tool with a start_index of 3 to get more content.</error>");
    }

    #[test]
    fn window_past_end() {
        assert_eq!(window("abc", 3, 10), NO_MORE_CONTENT);
    }

    // ── search parsing ────────────────────────────────────────────

    #[test]
    fn search_links_filters_and_limits() {
        let html = r#"<div>
            <a class="result__a" href="https://a.example/">A</a>
            <a class="result__a" href="/relative">skip</a>
            <a class="other" href="https://ignored.example/">x</a>
            <a class="result__a" href="https://b.example/">B</a>
            <a class="result__a" href="https://c.example/">C</a>
        </div>"#;
        assert_eq!(
            search_links(html, 2),
            vec!["https://a.example/".to_string(), "https://b.example/".to_string()]
        );
    }

    #[test]
    fn search_links_none() {
        assert!(search_links("<p>nothing</p>", 5).is_empty());
    }

    // ── network errors ────────────────────────────────────────────

    #[tokio::test]
    async fn unreachable_url_is_internal_error() {
        let tool = FetchTool::new(&FetchConfig {
            timeout_secs: 1,
            ..FetchConfig::default()
        });
        let err = tool
            .fetch(&FetchArgs {
                url: "http://127.0.0.1:1/".to_string(),
                raw: false,
                max_length: 5000,
                start_index: 0,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), crate::error::INTERNAL_ERROR);
        assert!(err.to_string().starts_with("Failed to fetch http://127.0.0.1:1/:"));
    }

    #[test]
    fn fetch_args_defaults() {
        let args: FetchArgs = serde_json::from_value(json!({"url": "https://x"})).unwrap();
        assert_eq!((args.raw, args.max_length, args.start_index), (false, 5000, 0));
    }
}
