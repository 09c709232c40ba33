//! Wire shapes of the hh.ru `/vacancies` endpoint.
//!
//! Every field is optional and read leniently: a value of the wrong shape
//! becomes `None` instead of failing the whole record. Identifiers and the
//! publication date stay raw so the mapper can report what was wrong with
//! them.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// Takes the field if it has the expected shape and drops it otherwise.
fn deserialize_lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Salary bounds normally arrive as numbers, but numeric strings are accepted too.
fn deserialize_amount_flexible<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(JsonValue::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// One page of search results.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingsPage {
    pub items: Option<Vec<JsonValue>>,
    pub pages: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVacancy {
    #[serde(default)]
    pub id: Option<JsonValue>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub name: Option<String>,
    #[serde(default)]
    pub published_at: Option<JsonValue>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub alternate_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub salary: Option<RawSalary>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub area: Option<NamedRef>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub experience: Option<NamedRef>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub employment: Option<NamedRef>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub snippet: Option<RawSnippet>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub employer: Option<RawEmployer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSalary {
    #[serde(default, deserialize_with = "deserialize_amount_flexible")]
    pub from: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_amount_flexible")]
    pub to: Option<f64>,
}

/// A dictionary reference such as `area`; a bare string is taken as the name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NamedRef {
    Plain(String),
    Object {
        #[serde(default, deserialize_with = "deserialize_lenient")]
        name: Option<String>,
    },
}

impl NamedRef {
    pub fn name(&self) -> Option<&str> {
        match self {
            NamedRef::Plain(name) => Some(name),
            NamedRef::Object { name } => name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSnippet {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub requirement: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEmployer {
    #[serde(default)]
    pub id: Option<JsonValue>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub alternate_url: Option<String>,
}
