use tracing::instrument;

use crate::error::Result;
use crate::models::report::VacancyReport;
use crate::services::vacancy_repository::VacancyRepository;

#[derive(Clone)]
pub struct ReportService {
    repository: VacancyRepository,
}

impl ReportService {
    pub fn new(repository: VacancyRepository) -> Self {
        Self { repository }
    }

    /// Runs the fixed analytical queries; the keyword search only when a
    /// keyword is given.
    #[instrument(skip(self))]
    pub async fn build(&self, keyword: Option<&str>) -> Result<VacancyReport> {
        let companies = self.repository.company_vacancy_counts().await?;
        let vacancies = self.repository.all_vacancies().await?;
        let average_salary = self.repository.average_salary().await?;
        let above_average = self.repository.vacancies_above_average_salary().await?;

        let keyword_matches = match keyword {
            Some(word) => Some(self.repository.vacancies_matching_keyword(word).await?),
            None => None,
        };

        Ok(VacancyReport {
            companies,
            vacancies,
            average_salary: average_salary.map(|avg| avg.round_dp(2)),
            above_average,
            keyword: keyword.map(str::to_string),
            keyword_matches,
        })
    }
}
