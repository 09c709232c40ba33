use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Vacancy {
    #[sqlx(rename = "vacancy_id_hh")]
    pub vacancy_id: i32,
    #[sqlx(rename = "company_id_hh")]
    pub employer_id: i32,
    #[sqlx(rename = "vacancy_name")]
    pub title: String,
    #[sqlx(rename = "data_published")]
    pub published_date: Option<NaiveDate>,
    /// Zero when the listing carries no salary range.
    #[sqlx(rename = "salary_average")]
    pub average_salary: i32,
    pub area: String,
    pub url: String,
    pub requirement: String,
    pub experience: String,
    pub employment: String,
}
