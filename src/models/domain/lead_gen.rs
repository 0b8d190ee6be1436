use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadGen {
    pub enabled: bool,
    pub title: String,
    pub description: String,
    pub fields: Vec<LeadField>,
    pub cta_text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, Copy)]
#[serde(rename_all = "lowercase")]
pub enum LeadField {
    Name,
    Email,
    Phone,
}

impl LeadField {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "name" => Some(LeadField::Name),
            "email" => Some(LeadField::Email),
            "phone" => Some(LeadField::Phone),
            _ => None,
        }
    }
}
