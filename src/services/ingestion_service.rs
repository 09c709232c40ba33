//! Per-employer ingestion: fetch every listing, map it, load the company and
//! its vacancies. A failing employer never stops the run.

use std::collections::HashSet;
use std::fmt;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::dto::employer_dto::EmployerEntry;
use crate::error::Error;
use crate::models::company::Company;
use crate::models::vacancy::Vacancy;
use crate::services::hh_service::ListingSource;
use crate::services::vacancy_mapper::map_record;
use crate::services::vacancy_repository::VacancyStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployerStage {
    Pending,
    Fetching,
    Mapping,
    Loading,
    Done,
    Failed,
}

impl fmt::Display for EmployerStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EmployerStage::Pending => "pending",
            EmployerStage::Fetching => "fetching",
            EmployerStage::Mapping => "mapping",
            EmployerStage::Loading => "loading",
            EmployerStage::Done => "done",
            EmployerStage::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyLoad {
    Inserted,
    AlreadyPresent,
    /// No listings and no name in the employer entry.
    NotWritten,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployerResult {
    Done { company: CompanyLoad, inserted: u64 },
    Failed { stage: EmployerStage, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployerOutcome {
    pub employer_id: i32,
    pub fetched: usize,
    pub skipped: usize,
    pub result: EmployerResult,
}

impl EmployerOutcome {
    pub fn stage(&self) -> EmployerStage {
        match self.result {
            EmployerResult::Done { .. } => EmployerStage::Done,
            EmployerResult::Failed { .. } => EmployerStage::Failed,
        }
    }

    pub fn is_done(&self) -> bool {
        self.stage() == EmployerStage::Done
    }
}

#[derive(Debug, Clone, Default)]
pub struct IngestionSummary {
    pub outcomes: Vec<EmployerOutcome>,
}

impl IngestionSummary {
    pub fn succeeded(&self) -> impl Iterator<Item = &EmployerOutcome> {
        self.outcomes.iter().filter(|o| o.is_done())
    }

    pub fn failed(&self) -> impl Iterator<Item = &EmployerOutcome> {
        self.outcomes.iter().filter(|o| !o.is_done())
    }

    pub fn total_inserted(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|o| match o.result {
                EmployerResult::Done { inserted, .. } => inserted,
                EmployerResult::Failed { .. } => 0,
            })
            .sum()
    }

    pub fn log(&self) {
        for outcome in &self.outcomes {
            match &outcome.result {
                EmployerResult::Done { company, inserted } => info!(
                    employer_id = outcome.employer_id,
                    fetched = outcome.fetched,
                    skipped = outcome.skipped,
                    inserted,
                    company = ?company,
                    "Employer done"
                ),
                EmployerResult::Failed { stage, reason } => warn!(
                    employer_id = outcome.employer_id,
                    stage = %stage,
                    reason = %reason,
                    "Employer failed"
                ),
            }
        }
        info!(
            succeeded = self.succeeded().count(),
            failed = self.failed().count(),
            vacancies = self.total_inserted(),
            "Ingestion finished"
        );
    }
}

pub struct IngestionService<S, R> {
    source: S,
    store: R,
    concurrency: usize,
}

struct MappedBatch {
    company: Option<Company>,
    vacancies: Vec<Vacancy>,
    skipped: usize,
}

impl<S, R> IngestionService<S, R>
where
    S: ListingSource,
    R: VacancyStore,
{
    pub fn new(source: S, store: R) -> Self {
        Self {
            source,
            store,
            concurrency: 1,
        }
    }

    /// Employers processed at once. Each employer still loads through its own
    /// company insert and vacancy transaction.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Ingests every employer; outcomes keep the order of `employers`.
    pub async fn run(&self, employers: &[EmployerEntry]) -> IngestionSummary {
        info!(
            employers = employers.len(),
            concurrency = self.concurrency,
            "Starting ingestion"
        );
        let outcomes = stream::iter(employers)
            .map(|entry| self.ingest_employer(entry))
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        IngestionSummary { outcomes }
    }

    #[instrument(skip(self, entry), fields(employer_id = entry.employer_id))]
    pub async fn ingest_employer(&self, entry: &EmployerEntry) -> EmployerOutcome {
        let employer_id = entry.employer_id;
        let failed = |stage: EmployerStage, fetched: usize, skipped: usize, err: Error| {
            warn!(employer_id, stage = %stage, error = %err, "Employer ingestion failed");
            EmployerOutcome {
                employer_id,
                fetched,
                skipped,
                result: EmployerResult::Failed {
                    stage,
                    reason: err.to_string(),
                },
            }
        };

        debug!(stage = %EmployerStage::Pending, "Employer picked up");
        debug!(stage = %EmployerStage::Fetching, "Stage change");
        let listings = match self.source.fetch_all_listings(employer_id).await {
            Ok(listings) => listings,
            Err(err) => return failed(EmployerStage::Fetching, 0, 0, err),
        };
        let fetched = listings.len();

        debug!(stage = %EmployerStage::Mapping, fetched, "Stage change");
        let batch = map_listings(employer_id, &listings);
        let skipped = batch.skipped;
        let company = batch.company.or_else(|| company_from_entry(entry));

        debug!(stage = %EmployerStage::Loading, vacancies = batch.vacancies.len(), "Stage change");
        let company_load = match company {
            None => CompanyLoad::NotWritten,
            Some(company) => match self.store.insert_company(&company).await {
                Ok(()) => CompanyLoad::Inserted,
                Err(Error::DuplicateKey { .. }) => {
                    info!(employer_id, "Company already stored, treating as ingested");
                    CompanyLoad::AlreadyPresent
                }
                Err(err) => return failed(EmployerStage::Loading, fetched, skipped, err),
            },
        };

        let inserted = if batch.vacancies.is_empty() {
            0
        } else {
            match self.store.insert_vacancies(&batch.vacancies).await {
                Ok(inserted) => inserted,
                Err(err) => return failed(EmployerStage::Loading, fetched, skipped, err),
            }
        };

        debug!(stage = %EmployerStage::Done, inserted, "Stage change");
        EmployerOutcome {
            employer_id,
            fetched,
            skipped,
            result: EmployerResult::Done {
                company: company_load,
                inserted,
            },
        }
    }
}

/// Maps every listing, skipping malformed records, listings of another
/// employer and repeated vacancy ids (first occurrence wins).
fn map_listings(employer_id: i32, listings: &[serde_json::Value]) -> MappedBatch {
    let mut company = None;
    let mut vacancies = Vec::with_capacity(listings.len());
    let mut seen = HashSet::new();
    let mut skipped = 0;

    for (index, raw) in listings.iter().enumerate() {
        let mapped = match map_record(raw) {
            Ok(mapped) => mapped,
            Err(err) => {
                warn!(employer_id, index, error = %err, "Skipping malformed listing");
                skipped += 1;
                continue;
            }
        };

        if mapped.company.employer_id != employer_id {
            warn!(
                employer_id,
                index,
                listed_employer = mapped.company.employer_id,
                "Skipping listing of another employer"
            );
            skipped += 1;
            continue;
        }

        if !seen.insert(mapped.vacancy.vacancy_id) {
            debug!(employer_id, vacancy_id = mapped.vacancy.vacancy_id, "Skipping repeated listing");
            skipped += 1;
            continue;
        }

        company.get_or_insert(mapped.company);
        vacancies.push(mapped.vacancy);
    }

    MappedBatch {
        company,
        vacancies,
        skipped,
    }
}

fn company_from_entry(entry: &EmployerEntry) -> Option<Company> {
    let name = entry.name.as_ref()?;
    Some(Company {
        employer_id: entry.employer_id,
        name: name.clone(),
        profile_url: entry
            .url
            .clone()
            .unwrap_or_else(|| format!("https://hh.ru/employer/{}", entry.employer_id)),
    })
}
