use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub employer_id: i32,
    pub name: String,
    pub profile_url: String,
}
