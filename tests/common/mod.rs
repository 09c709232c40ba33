use chrono::NaiveDate;
use hh_vacancies::models::company::Company;
use hh_vacancies::models::vacancy::Vacancy;
use hh_vacancies::services::vacancy_repository::VacancyRepository;
use sqlx::{postgres::PgPoolOptions, Executor, PgPool};

/// A repository bound to a throwaway Postgres schema.
pub struct TestDb {
    pub repository: VacancyRepository,
    pub pool: PgPool,
    admin: PgPool,
    schema: String,
}

impl TestDb {
    /// Tests using this are `#[ignore]`d; run them with
    /// `TEST_DATABASE_URL` set and `cargo test -- --ignored`.
    pub async fn connect() -> Self {
        dotenvy::dotenv().ok();
        let url = std::env::var("TEST_DATABASE_URL")
            .expect("TEST_DATABASE_URL must point at a scratch Postgres database");
        let schema = format!("hh_test_{}", uuid::Uuid::new_v4().simple());

        let admin = PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .expect("connect admin pool");
        admin
            .execute(format!("CREATE SCHEMA {}", schema).as_str())
            .await
            .expect("create test schema");

        let search_path = schema.clone();
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .after_connect(move |conn, _meta| {
                let search_path = search_path.clone();
                Box::pin(async move {
                    conn.execute(format!("SET search_path TO {}", search_path).as_str())
                        .await?;
                    Ok(())
                })
            })
            .connect(&url)
            .await
            .expect("connect test pool");

        let repository = VacancyRepository::new(pool.clone());
        repository.reset_schema().await.expect("reset schema");

        Self {
            repository,
            pool,
            admin,
            schema,
        }
    }

    pub async fn vacancy_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vacancies")
            .fetch_one(&self.pool)
            .await
            .expect("count vacancies")
    }

    pub async fn teardown(self) {
        self.pool.close().await;
        self.admin
            .execute(format!("DROP SCHEMA {} CASCADE", self.schema).as_str())
            .await
            .expect("drop test schema");
    }
}

pub fn company(employer_id: i32, name: &str) -> Company {
    Company {
        employer_id,
        name: name.to_string(),
        profile_url: format!("https://hh.ru/employer/{}", employer_id),
    }
}

pub fn vacancy(vacancy_id: i32, employer_id: i32, title: &str, average_salary: i32) -> Vacancy {
    Vacancy {
        vacancy_id,
        employer_id,
        title: title.to_string(),
        published_date: NaiveDate::from_ymd_opt(2024, 3, 1),
        average_salary,
        area: "Москва".to_string(),
        url: format!("https://hh.ru/vacancy/{}", vacancy_id),
        requirement: "Опыт от 3 лет".to_string(),
        experience: "От 3 до 6 лет".to_string(),
        employment: "Полная занятость".to_string(),
    }
}
