//! Extraction of the statistics block from a fiction page.
//!
//! The block is a `div.stats-content` whose second child holds a `<ul>` that
//! alternates label and value items:
//!
//! ```text
//! li 1  "Total Views :"    li 2  "1,234"
//! li 3  "Average Views :"  li 4  "56"
//! li 5  "Followers :"      li 6  ...
//! li 7  "Favorites :"      li 8  ...
//! li 9  "Ratings :"        li 10 ...
//! li 11 "Pages"            li 12 ...
//! ```
//!
//! Scanning is done locally inside the stats block, so unrelated markup on the
//! page does not affect the result.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{Result, StatsError};
use crate::models::metric::Metric;
use crate::models::sample::Sample;

const STAT_ITEM_COUNT: usize = 12;

/// 1-based position of each counter's value item in the stats list.
const STAT_POSITIONS: [(Metric, usize); 6] = [
    (Metric::TotalViews, 2),
    (Metric::AverageViews, 4),
    (Metric::Followers, 6),
    (Metric::Favorites, 8),
    (Metric::Ratings, 10),
    (Metric::Pages, 12),
];

fn stats_block_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<div[^>]*class\s*=\s*["'][^"']*\bstats-content\b[^"']*["'][^>]*>"#)
            .expect("stats block pattern")
    })
}

fn list_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<ul[^>]*>(.*?)</ul>").expect("list pattern"))
}

fn list_item() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<li[^>]*>(.*?)</li>").expect("item pattern"))
}

fn any_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern"))
}

/// Parse the statistics block into a sample stamped with the current instant.
pub fn extract_sample(html: &str) -> Result<Sample> {
    let start = stats_block_start()
        .find(html)
        .ok_or_else(|| StatsError::Malformed("page has no stats-content block".to_string()))?
        .end();
    let block = &html[start..];

    let items = list_block()
        .captures_iter(block)
        .map(|caps| {
            list_item()
                .captures_iter(&caps[1])
                .map(|item| strip_tags(&item[1]))
                .collect::<Vec<String>>()
        })
        .find(|items| items.len() >= STAT_ITEM_COUNT)
        .ok_or_else(|| {
            StatsError::Malformed(format!(
                "stats-content block has no list with {STAT_ITEM_COUNT} items"
            ))
        })?;

    let mut sample = Sample::now();
    for (metric, position) in STAT_POSITIONS {
        sample.set(metric, parse_count(&items[position - 1])?);
    }
    Ok(sample)
}

fn strip_tags(fragment: &str) -> String {
    any_tag()
        .replace_all(fragment, "")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

/// `"1,234"` → `1234`. Counters are never negative.
fn parse_count(text: &str) -> Result<i64> {
    let normalized: String = text
        .chars()
        .filter(|c| !matches!(c, ',' | ' '))
        .collect();

    normalized
        .parse::<u64>()
        .ok()
        .and_then(|value| i64::try_from(value).ok())
        .ok_or_else(|| StatsError::Malformed(format!("not a count: {text:?}")))
}
