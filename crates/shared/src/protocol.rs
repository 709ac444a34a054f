//! JSON bodies exchanged with the wallet service.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Query string for both initiation calls: `GET /verify?url=..` and
/// `GET /issue?url=..`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiateQuery {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeVerifyRequest {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeIssueRequest {
    pub url: String,
    pub fields: IndexMap<String, String>,
}

/// Success body of the finalize calls. The service answers `{}` or
/// `{"success": true}`; both decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeAck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}
