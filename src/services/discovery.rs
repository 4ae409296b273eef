// src/services/discovery.rs

//! Plan discovery service.
//!
//! Lists the anchors of the procurement page and turns the ones pointing at
//! monthly plan spreadsheets into [`RemoteFile`] descriptors.

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::error::Result;
use crate::models::{FileId, Link, RemoteFile};
use crate::utils::http::Fetcher;
use crate::utils::resolve_url;

/// Polish month names with their ASCII-folded spelling.
const MONTHS: [(&str, &str, u32); 12] = [
    ("styczeń", "styczen", 1),
    ("luty", "luty", 2),
    ("marzec", "marzec", 3),
    ("kwiecień", "kwiecien", 4),
    ("maj", "maj", 5),
    ("czerwiec", "czerwiec", 6),
    ("lipiec", "lipiec", 7),
    ("sierpień", "sierpien", 8),
    ("wrzesień", "wrzesien", 9),
    ("październik", "pazdziernik", 10),
    ("listopad", "listopad", 11),
    ("grudzień", "grudzien", 12),
];

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\D)(20\d{2})(?:\D|$)").expect("valid year pattern"));

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:ver|wersja|version)[\s._]*(\d+)").expect("valid version pattern")
});

static MONTH_REVISION_RE: LazyLock<Regex> = LazyLock::new(|| {
    let names: Vec<&str> = MONTHS
        .iter()
        .flat_map(|(name, folded, _)| [*name, *folded])
        .collect();
    Regex::new(&format!(r"(?i)(?:{})\s+(\d)(?:\.0)?\b", names.join("|")))
        .expect("valid month revision pattern")
});

/// Service turning the source page into plan descriptors.
pub struct PlanDiscovery {
    extensions: Vec<String>,
}

impl PlanDiscovery {
    /// Create a discovery service accepting the given link extensions.
    pub fn new(extensions: &[String]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Fetch the page and return every plan it advertises, in page order.
    pub async fn discover(&self, fetcher: &dyn Fetcher, page_url: &str) -> Result<Vec<RemoteFile>> {
        let html = fetcher.fetch_page(page_url).await?;
        let base = Url::parse(page_url)?;
        let links = extract_links(&html, &base);

        log::info!("Found {} links on {}", links.len(), page_url);

        let files: Vec<RemoteFile> = links
            .iter()
            .filter(|link| self.is_candidate(link))
            .filter_map(|link| {
                let file = parse_remote_file(link);
                if file.is_none() {
                    log::debug!("Ignoring link without plan period: {}", link.href);
                }
                file
            })
            .collect();

        log::info!("{} links point at procurement plans", files.len());
        Ok(files)
    }

    /// Spreadsheet link mentioning a month and a year.
    pub fn is_candidate(&self, link: &Link) -> bool {
        if !self.has_spreadsheet_extension(&link.href) {
            return false;
        }
        let haystack = combined_text(link);
        find_month(&haystack).is_some() && find_year(&haystack).is_some()
    }

    fn has_spreadsheet_extension(&self, href: &str) -> bool {
        let path = Url::parse(href)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| href.split(['?', '#']).next().unwrap_or(href).to_string())
            .to_lowercase();

        self.extensions
            .iter()
            .any(|ext| path.ends_with(&format!(".{ext}")))
    }
}

/// All `a[href]` anchors of a document, hrefs resolved against `base`.
pub fn extract_links(html: &str, base: &Url) -> Vec<Link> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?.trim();
            if href.is_empty() {
                return None;
            }
            let text = anchor.text().collect::<Vec<_>>().join(" ");
            Some(Link {
                text: text.split_whitespace().collect::<Vec<_>>().join(" "),
                href: resolve_url(base, href),
            })
        })
        .collect()
}

/// Derive the plan descriptor from a link, `None` without year or month.
///
/// The display text is searched before the URL for both the year and the
/// month, since upload paths often carry unrelated dates.
pub fn parse_remote_file(link: &Link) -> Option<RemoteFile> {
    let text = link.text.to_lowercase();
    let href = decoded_href(link);

    let year = find_year(&text).or_else(|| find_year(&href))?;
    let month = find_month(&text).or_else(|| find_month(&href))?;
    let version = extract_version(&combined_text(link));

    Some(RemoteFile {
        file_id: FileId::new(year, month),
        url: link.href.clone(),
        version,
    })
}

/// Version advertised in free text; 1 when nothing is advertised.
pub fn extract_version(text: &str) -> u32 {
    VERSION_RE
        .captures(text)
        .or_else(|| MONTH_REVISION_RE.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1)
}

/// Month number of the earliest month name in `text`.
pub fn find_month(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    MONTHS
        .iter()
        .flat_map(|(name, folded, num)| {
            [lower.find(*name), lower.find(*folded)]
                .into_iter()
                .flatten()
                .map(move |pos| (pos, *num))
        })
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, num)| num)
}

/// First standalone `20xx` year in `text`.
pub fn find_year(text: &str) -> Option<i32> {
    YEAR_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn combined_text(link: &Link) -> String {
    format!("{} {}", link.text.to_lowercase(), decoded_href(link))
}

/// Lowercased href with percent-escapes undone, so `grudzie%C5%84` reads as `grudzień`.
fn decoded_href(link: &Link) -> String {
    percent_decode_str(&link.href)
        .decode_utf8_lossy()
        .to_lowercase()
}
