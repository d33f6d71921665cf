use crate::analysis::page::extract_sample;
use crate::commands::db::SampleStore;
use crate::error::Result;
use crate::models::sample::Sample;
use reqwest::blocking::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("rr-stats/", env!("CARGO_PKG_VERSION"));

pub fn http_client() -> Result<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()?)
}

/// Fetch a fiction page and read its statistics. No retries.
pub fn fetch_sample(client: &Client, url: &str) -> Result<Sample> {
    log::info!("fetching {url}");
    let page = client.get(url).send()?.error_for_status()?.text()?;
    extract_sample(&page)
}

/// Persist one sample, creating the table first if needed.
pub fn record_sample(store: &SampleStore, sample: &Sample) -> Result<()> {
    store.ensure_schema()?;
    store.append(sample)
}

pub fn run_sample_internal(store: &SampleStore, client: &Client, url: &str) -> Result<Sample> {
    let sample = fetch_sample(client, url)?;
    record_sample(store, &sample)?;
    Ok(sample)
}
