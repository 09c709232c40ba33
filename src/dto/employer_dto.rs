use serde::{Deserialize, Deserializer};
use validator::Validate;

fn deserialize_employer_id<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        String(String),
    }

    let raw = match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(i) => i,
        IntOrString::String(s) => s.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("Invalid employer id: {}", s))
        })?,
    };
    i32::try_from(raw)
        .map_err(|_| serde::de::Error::custom(format!("Employer id out of range: {}", raw)))
}

/// One entry of the employers file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct EmployerEntry {
    #[serde(alias = "id", alias = "employerId", deserialize_with = "deserialize_employer_id")]
    #[validate(range(min = 1))]
    pub employer_id: i32,
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub url: Option<String>,
}

impl EmployerEntry {
    pub fn new(employer_id: i32) -> Self {
        Self {
            employer_id,
            name: None,
            url: None,
        }
    }
}
