use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicService {
    pub id: String,
    pub title: String,
    pub is_active: bool,
}
