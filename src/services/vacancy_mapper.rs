//! Turns raw hh.ru listing records into [`Vacancy`] rows.
//!
//! Text fields are normalized and truncated to their column bounds rather
//! than rejected, so one oversized listing never sinks an employer's batch.
//! Optional fields of the wrong shape fall back to empty values. Only
//! missing or non-numeric identifiers and unreadable publication dates
//! produce a [`MappingError`].

use serde_json::Value as JsonValue;

use crate::database::schema::{NAME_MAX_CHARS, REQUIREMENT_MAX_CHARS};
use crate::dto::hh_dto::{NamedRef, RawEmployer, RawSalary, RawVacancy};
use crate::error::MappingError;
use crate::models::company::Company;
use crate::models::vacancy::Vacancy;
use crate::utils::text::normalize_bounded;
use crate::utils::time::parse_published_date;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedVacancy {
    pub vacancy: Vacancy,
    pub company: Company,
}

pub fn map_record(raw: &JsonValue) -> Result<MappedVacancy, MappingError> {
    if !raw.is_object() {
        return Err(MappingError::Malformed);
    }
    let record: RawVacancy =
        serde_json::from_value(raw.clone()).map_err(|_| MappingError::Malformed)?;

    let vacancy_id = parse_identifier("id", record.id.as_ref())?;
    let employer = record
        .employer
        .as_ref()
        .ok_or(MappingError::MissingField("employer"))?;
    let company = map_company(employer)?;

    let published_date = match record.published_at.as_ref() {
        None => None,
        Some(JsonValue::String(raw_date)) => {
            Some(parse_published_date(raw_date).ok_or_else(|| MappingError::InvalidField {
                field: "published_at",
                value: raw_date.clone(),
            })?)
        }
        Some(other) => {
            return Err(MappingError::InvalidField {
                field: "published_at",
                value: other.to_string(),
            })
        }
    };

    let vacancy = Vacancy {
        vacancy_id,
        employer_id: company.employer_id,
        title: normalize_bounded(record.name.as_deref(), NAME_MAX_CHARS),
        published_date,
        average_salary: average_salary(record.salary.as_ref()),
        area: named(record.area.as_ref()),
        url: normalize_bounded(record.alternate_url.as_deref(), NAME_MAX_CHARS),
        requirement: normalize_bounded(
            record.snippet.as_ref().and_then(|s| s.requirement.as_deref()),
            REQUIREMENT_MAX_CHARS,
        ),
        experience: named(record.experience.as_ref()),
        employment: named(record.employment.as_ref()),
    };

    Ok(MappedVacancy { vacancy, company })
}

pub fn map_company(employer: &RawEmployer) -> Result<Company, MappingError> {
    Ok(Company {
        employer_id: parse_identifier("employer.id", employer.id.as_ref())?,
        name: normalize_bounded(employer.name.as_deref(), NAME_MAX_CHARS),
        profile_url: normalize_bounded(employer.alternate_url.as_deref(), NAME_MAX_CHARS),
    })
}

/// Mean of the salary bounds; a single bound stands in for the mean and no
/// bounds at all give zero.
pub fn average_salary(salary: Option<&RawSalary>) -> i32 {
    let Some(salary) = salary else { return 0 };
    let average = match (salary.from, salary.to) {
        (Some(from), Some(to)) => ((from + to) / 2.0).floor(),
        (Some(bound), None) | (None, Some(bound)) => bound.floor(),
        (None, None) => 0.0,
    };
    if average.is_finite() {
        average.clamp(0.0, i32::MAX as f64) as i32
    } else {
        0
    }
}

fn named(value: Option<&NamedRef>) -> String {
    normalize_bounded(value.and_then(NamedRef::name), NAME_MAX_CHARS)
}

/// Identifiers arrive as strings or numbers; anything else is invalid.
fn parse_identifier(field: &'static str, raw: Option<&JsonValue>) -> Result<i32, MappingError> {
    let parsed = match raw {
        None | Some(JsonValue::Null) => return Err(MappingError::MissingField(field)),
        Some(JsonValue::String(s)) => s.trim().parse::<i32>().ok(),
        Some(JsonValue::Number(n)) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Some(_) => None,
    };
    parsed
        .filter(|id| *id > 0)
        .ok_or_else(|| MappingError::InvalidIdentifier {
            field,
            value: match raw {
                Some(JsonValue::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            },
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn listing() -> JsonValue {
        json!({
            "id": "93353083",
            "name": "Java Developer",
            "published_at": "2024-03-01T10:15:00+0300",
            "alternate_url": "https://hh.ru/vacancy/93353083",
            "salary": { "from": 100, "to": 200, "currency": "RUR", "gross": false },
            "area": { "id": "1", "name": "Москва" },
            "snippet": {
                "requirement": "Опыт разработки на <highlighttext>Java</highlighttext> от 3 лет.",
                "responsibility": "Писать код."
            },
            "experience": { "id": "between3And6", "name": "От 3 до 6 лет" },
            "employment": { "id": "full", "name": "Полная занятость" },
            "employer": {
                "id": "1740",
                "name": "Яндекс",
                "alternate_url": "https://hh.ru/employer/1740"
            }
        })
    }

    fn salary(from: Option<f64>, to: Option<f64>) -> RawSalary {
        RawSalary { from, to }
    }

    #[test]
    fn maps_full_listing() {
        let mapped = map_record(&listing()).unwrap();
        assert_eq!(
            mapped.company,
            Company {
                employer_id: 1740,
                name: "Яндекс".into(),
                profile_url: "https://hh.ru/employer/1740".into(),
            }
        );
        let v = mapped.vacancy;
        assert_eq!(v.vacancy_id, 93353083);
        assert_eq!(v.employer_id, 1740);
        assert_eq!(v.title, "Java Developer");
        assert_eq!(v.published_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(v.average_salary, 150);
        assert_eq!(v.area, "Москва");
        assert_eq!(v.requirement, "Опыт разработки на Java от 3 лет.");
        assert_eq!(v.experience, "От 3 до 6 лет");
        assert_eq!(v.employment, "Полная занятость");
    }

    #[test]
    fn salary_derivation() {
        assert_eq!(average_salary(Some(&salary(Some(100.0), Some(200.0)))), 150);
        assert_eq!(average_salary(Some(&salary(None, Some(200.0)))), 200);
        assert_eq!(average_salary(Some(&salary(Some(80000.0), None))), 80000);
        assert_eq!(average_salary(Some(&salary(None, None))), 0);
        assert_eq!(average_salary(None), 0);
        assert_eq!(average_salary(Some(&salary(Some(100.0), Some(101.0)))), 100);
    }

    #[test]
    fn null_salary_maps_to_zero() {
        let mut raw = listing();
        raw["salary"] = JsonValue::Null;
        assert_eq!(map_record(&raw).unwrap().vacancy.average_salary, 0);
    }

    #[test]
    fn numeric_identifiers_are_accepted() {
        let mut raw = listing();
        raw["id"] = json!(555);
        raw["employer"]["id"] = json!(1740);
        let mapped = map_record(&raw).unwrap();
        assert_eq!(mapped.vacancy.vacancy_id, 555);
        assert_eq!(mapped.company.employer_id, 1740);
    }

    #[test]
    fn missing_identifiers_fail() {
        let mut raw = listing();
        raw.as_object_mut().unwrap().remove("id");
        assert_eq!(map_record(&raw), Err(MappingError::MissingField("id")));

        let mut raw = listing();
        raw.as_object_mut().unwrap().remove("employer");
        assert_eq!(map_record(&raw), Err(MappingError::MissingField("employer")));
    }

    #[test]
    fn non_numeric_identifier_fails() {
        let mut raw = listing();
        raw["employer"]["id"] = json!("abc");
        assert!(matches!(
            map_record(&raw),
            Err(MappingError::InvalidIdentifier { field: "employer.id", .. })
        ));
    }

    #[test]
    fn bad_date_fails_but_missing_date_is_allowed() {
        let mut raw = listing();
        raw["published_at"] = json!("last tuesday");
        assert!(matches!(
            map_record(&raw),
            Err(MappingError::InvalidField { field: "published_at", .. })
        ));

        raw.as_object_mut().unwrap().remove("published_at");
        assert_eq!(map_record(&raw).unwrap().vacancy.published_date, None);
    }

    #[test]
    fn long_text_is_truncated() {
        let mut raw = listing();
        raw["name"] = json!("я".repeat(400));
        raw["snippet"]["requirement"] = json!("r".repeat(2000));
        let v = map_record(&raw).unwrap().vacancy;
        assert_eq!(v.title.chars().count(), NAME_MAX_CHARS);
        assert_eq!(v.requirement.chars().count(), REQUIREMENT_MAX_CHARS);
    }

    #[test]
    fn non_object_is_malformed() {
        assert_eq!(map_record(&json!([1, 2])), Err(MappingError::Malformed));
        assert_eq!(map_record(&json!("x")), Err(MappingError::Malformed));
    }

    #[test]
    fn missing_nested_objects_default_to_empty() {
        let raw = json!({ "id": "1", "employer": { "id": "2" } });
        let v = map_record(&raw).unwrap().vacancy;
        assert_eq!(v.area, "");
        assert_eq!(v.requirement, "");
        assert_eq!(v.average_salary, 0);
    }

    #[test]
    fn string_salary_bounds_are_read() {
        let raw = json!({
            "id": "1",
            "employer": { "id": "2" },
            "salary": { "from": "100", "to": 200 }
        });
        assert_eq!(map_record(&raw).unwrap().vacancy.average_salary, 150);

        let raw = json!({
            "id": "1",
            "employer": { "id": "2" },
            "salary": { "from": "about a hundred", "to": 200 }
        });
        assert_eq!(map_record(&raw).unwrap().vacancy.average_salary, 200);
    }

    #[test]
    fn plain_string_references_are_tolerated() {
        let mut raw = listing();
        raw["area"] = json!("Москва");
        raw["experience"] = json!(3);
        raw["snippet"] = json!("Опыт от 3 лет");
        raw["salary"] = json!("100000");
        raw["name"] = json!(["not", "text"]);
        let v = map_record(&raw).unwrap().vacancy;
        assert_eq!(v.area, "Москва");
        assert_eq!(v.experience, "");
        assert_eq!(v.requirement, "");
        assert_eq!(v.average_salary, 0);
        assert_eq!(v.title, "");
        assert_eq!(v.employment, "Полная занятость");
    }

    #[test]
    fn wrongly_typed_identifier_is_invalid_not_malformed() {
        let mut raw = listing();
        raw["id"] = json!(true);
        assert_eq!(
            map_record(&raw),
            Err(MappingError::InvalidIdentifier {
                field: "id",
                value: "true".into(),
            })
        );

        let mut raw = listing();
        raw["employer"]["id"] = json!({ "nested": 1 });
        assert!(matches!(
            map_record(&raw),
            Err(MappingError::InvalidIdentifier { field: "employer.id", .. })
        ));

        let mut raw = listing();
        raw["id"] = json!(-5);
        assert!(matches!(
            map_record(&raw),
            Err(MappingError::InvalidIdentifier { field: "id", .. })
        ));
    }

    #[test]
    fn non_string_date_is_invalid() {
        let mut raw = listing();
        raw["published_at"] = json!(20240301);
        assert!(matches!(
            map_record(&raw),
            Err(MappingError::InvalidField { field: "published_at", .. })
        ));
    }
}
