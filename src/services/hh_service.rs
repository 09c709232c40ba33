use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::dto::hh_dto::ListingsPage;
use crate::error::{Error, Result};

pub const PER_PAGE: u32 = 100;

/// Source of raw listing records for one employer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Every listing of the employer, pages concatenated in order. An
    /// employer without listings yields an empty vec.
    async fn fetch_all_listings(&self, employer_id: i32) -> Result<Vec<JsonValue>>;
}

#[derive(Clone)]
pub struct HhService {
    client: Client,
    base_url: String,
}

impl HhService {
    pub fn new(base_url: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.hh_api_url.clone(),
            &config.hh_user_agent,
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    async fn fetch_page(&self, employer_id: i32, page: u32) -> Result<ListingsPage> {
        debug!(employer_id, page, "Requesting listings page");
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
                ("employer_id", employer_id.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::UnexpectedResponse(format!(
                "HTTP {} for employer {} page {}: {}",
                status, employer_id, page, body
            )));
        }

        serde_json::from_str::<ListingsPage>(&body).map_err(|e| {
            Error::UnexpectedResponse(format!(
                "Undecodable body for employer {} page {}: {}",
                employer_id, page, e
            ))
        })
    }
}

#[async_trait]
impl ListingSource for HhService {
    #[instrument(skip(self))]
    async fn fetch_all_listings(&self, employer_id: i32) -> Result<Vec<JsonValue>> {
        let first = self.fetch_page(employer_id, 0).await?;
        let Some(mut listings) = first.items else {
            info!(employer_id, "Employer has no listings");
            return Ok(Vec::new());
        };

        let total_pages = first.pages.unwrap_or(1);
        for page in 1..total_pages {
            let next = self.fetch_page(employer_id, page).await?;
            let items = next.items.ok_or_else(|| {
                Error::UnexpectedResponse(format!(
                    "Page {} for employer {} has no items field",
                    page, employer_id
                ))
            })?;
            listings.extend(items);
        }

        info!(
            employer_id,
            pages = total_pages.max(1),
            listings = listings.len(),
            "Fetched employer listings"
        );
        Ok(listings)
    }
}
