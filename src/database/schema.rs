//! DDL for the two-table companies/vacancies model.

pub const DROP_VACANCIES: &str = "DROP TABLE IF EXISTS vacancies";
pub const DROP_COMPANIES: &str = "DROP TABLE IF EXISTS companies";

pub const CREATE_COMPANIES: &str = r#"
CREATE TABLE companies (
    company_id_hh INTEGER PRIMARY KEY,
    company_name VARCHAR(150),
    employer_url VARCHAR(150)
)
"#;

pub const CREATE_VACANCIES: &str = r#"
CREATE TABLE vacancies (
    vacancy_id_hh INTEGER PRIMARY KEY,
    company_id_hh INTEGER REFERENCES companies,
    vacancy_name VARCHAR(150),
    data_published DATE,
    salary_average INTEGER,
    area VARCHAR(150),
    url VARCHAR(150),
    requirement VARCHAR(500),
    experience VARCHAR(150),
    employment VARCHAR(150)
)
"#;

/// Column bounds shared with the record mapper.
pub const NAME_MAX_CHARS: usize = 150;
pub const REQUIREMENT_MAX_CHARS: usize = 500;

/// Statements run, in order, by a schema reset.
pub const RESET_STATEMENTS: [&str; 4] = [
    DROP_VACANCIES,
    DROP_COMPANIES,
    CREATE_COMPANIES,
    CREATE_VACANCIES,
];
