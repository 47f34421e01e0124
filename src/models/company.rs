use serde::{Deserialize, Serialize};

/// Company/role context attached to an interview. All fields optional; the
/// stage transition helper resolves a display name from whatever is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyContext {
    pub company_name: Option<String>,
    pub company_slug: Option<String>,
    pub role_slug: Option<String>,
}
