use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct CompanyVacancyCount {
    pub company_name: Option<String>,
    pub vacancy_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct VacancyListing {
    pub company_name: Option<String>,
    pub vacancy_name: Option<String>,
    pub salary_average: Option<i32>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VacancyReport {
    pub companies: Vec<CompanyVacancyCount>,
    pub vacancies: Vec<VacancyListing>,
    pub average_salary: Option<Decimal>,
    pub above_average: Vec<VacancyListing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_matches: Option<Vec<VacancyListing>>,
}
