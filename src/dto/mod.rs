pub mod employer_dto;
pub mod hh_dto;
