pub mod hh_service;
pub mod ingestion_service;
pub mod report_service;
pub mod vacancy_mapper;
pub mod vacancy_repository;
