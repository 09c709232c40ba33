pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    hh_service::HhService, ingestion_service::IngestionService, report_service::ReportService,
    vacancy_repository::VacancyRepository,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub hh_service: HhService,
    pub repository: VacancyRepository,
    pub report_service: ReportService,
    pub ingest_concurrency: usize,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Result<Self> {
        let hh_service = HhService::from_config(config)?;
        let repository = VacancyRepository::new(pool);
        let report_service = ReportService::new(repository.clone());

        Ok(Self {
            hh_service,
            repository,
            report_service,
            ingest_concurrency: config.ingest_concurrency,
        })
    }

    pub fn ingestion_service(&self) -> IngestionService<HhService, VacancyRepository> {
        IngestionService::new(self.hh_service.clone(), self.repository.clone())
            .with_concurrency(self.ingest_concurrency)
    }
}
