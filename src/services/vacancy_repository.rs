use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::database::schema::RESET_STATEMENTS;
use crate::error::{ConstraintKind, Error, Result};
use crate::models::company::Company;
use crate::models::report::{CompanyVacancyCount, VacancyListing};
use crate::models::vacancy::Vacancy;

/// Write side of the repository, as seen by the ingestion pipeline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VacancyStore: Send + Sync {
    /// Fails with [`Error::DuplicateKey`] when the employer is already stored.
    async fn insert_company(&self, company: &Company) -> Result<()>;

    /// Inserts the whole batch or nothing. Returns the number of rows written.
    async fn insert_vacancies(&self, vacancies: &[Vacancy]) -> Result<u64>;
}

const INSERT_COMPANY: &str = r#"
INSERT INTO companies (company_id_hh, company_name, employer_url)
VALUES ($1, $2, $3)
"#;

const INSERT_VACANCY: &str = r#"
INSERT INTO vacancies (
    vacancy_id_hh, company_id_hh, vacancy_name, data_published, salary_average,
    area, url, requirement, experience, employment
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
"#;

const AVERAGE_SALARY: &str = r#"
SELECT AVG(salary_average)
FROM vacancies
WHERE salary_average > 0
"#;

#[derive(Clone)]
pub struct VacancyRepository {
    pool: PgPool,
}

impl VacancyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Drops both tables and creates them again, empty. Must not run while an
    /// ingestion is in flight.
    #[instrument(skip(self))]
    pub async fn reset_schema(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for statement in RESET_STATEMENTS {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        info!("Schema reset: companies and vacancies recreated");
        Ok(())
    }

    pub async fn company_vacancy_counts(&self) -> Result<Vec<CompanyVacancyCount>> {
        let rows = sqlx::query_as::<_, CompanyVacancyCount>(
            r#"
            SELECT company_name, COUNT(*) AS vacancy_count
            FROM vacancies
            JOIN companies USING (company_id_hh)
            GROUP BY company_id_hh, company_name
            ORDER BY company_name, company_id_hh
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn all_vacancies(&self) -> Result<Vec<VacancyListing>> {
        let rows = sqlx::query_as::<_, VacancyListing>(
            r#"
            SELECT company_name, vacancy_name, salary_average, url
            FROM vacancies
            JOIN companies USING (company_id_hh)
            ORDER BY company_name, vacancy_id_hh
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Mean salary over listings that carry one; `None` when none do.
    pub async fn average_salary(&self) -> Result<Option<Decimal>> {
        let avg = sqlx::query_scalar::<_, Option<Decimal>>(AVERAGE_SALARY)
            .fetch_one(&self.pool)
            .await?;
        Ok(avg)
    }

    pub async fn vacancies_above_average_salary(&self) -> Result<Vec<VacancyListing>> {
        let rows = sqlx::query_as::<_, VacancyListing>(
            r#"
            SELECT company_name, vacancy_name, salary_average, url
            FROM vacancies
            JOIN companies USING (company_id_hh)
            WHERE salary_average > (
                SELECT AVG(salary_average)
                FROM vacancies
                WHERE salary_average > 0
            )
            ORDER BY salary_average DESC, vacancy_id_hh
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Case-insensitive substring search on the vacancy title. The keyword is
    /// bound as a parameter with LIKE wildcards escaped, so it always matches
    /// literally. A blank keyword matches nothing.
    pub async fn vacancies_matching_keyword(&self, keyword: &str) -> Result<Vec<VacancyListing>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = format!("%{}%", escape_like(keyword));
        let rows = sqlx::query_as::<_, VacancyListing>(
            r#"
            SELECT company_name, vacancy_name, salary_average, url
            FROM vacancies
            JOIN companies USING (company_id_hh)
            WHERE vacancy_name ILIKE $1 ESCAPE '\'
            ORDER BY company_name, vacancy_id_hh
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn vacancies_for_employer(&self, employer_id: i32) -> Result<Vec<Vacancy>> {
        let rows = sqlx::query_as::<_, Vacancy>(
            r#"
            SELECT vacancy_id_hh, company_id_hh, vacancy_name, data_published, salary_average,
                   area, url, requirement, experience, employment
            FROM vacancies
            WHERE company_id_hh = $1
            ORDER BY vacancy_id_hh
            "#,
        )
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl VacancyStore for VacancyRepository {
    async fn insert_company(&self, company: &Company) -> Result<()> {
        let result = sqlx::query(INSERT_COMPANY)
            .bind(company.employer_id)
            .bind(&company.name)
            .bind(&company.profile_url)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if ConstraintKind::classify(&err) == Some(ConstraintKind::Unique) => {
                Err(Error::DuplicateKey {
                    entity: "company",
                    id: company.employer_id,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip(self, vacancies), fields(batch = vacancies.len()))]
    async fn insert_vacancies(&self, vacancies: &[Vacancy]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;

        for vacancy in vacancies {
            let result = sqlx::query(INSERT_VACANCY)
                .bind(vacancy.vacancy_id)
                .bind(vacancy.employer_id)
                .bind(&vacancy.title)
                .bind(vacancy.published_date)
                .bind(vacancy.average_salary)
                .bind(&vacancy.area)
                .bind(&vacancy.url)
                .bind(&vacancy.requirement)
                .bind(&vacancy.experience)
                .bind(&vacancy.employment)
                .execute(&mut *tx)
                .await;

            match result {
                Ok(done) => inserted += done.rows_affected(),
                Err(err) => {
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!(error = ?rollback_err, "Rollback after failed vacancy insert failed");
                    }
                    return Err(match ConstraintKind::classify(&err) {
                        Some(kind) => Error::ConstraintViolation {
                            vacancy_id: vacancy.vacancy_id,
                            kind,
                            message: err.to_string(),
                        },
                        None => Error::Database(err),
                    });
                }
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
