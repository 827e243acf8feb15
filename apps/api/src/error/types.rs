use serde::Serialize;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    message: String,
    code: String,
    /// Offending identifiers of an `invalid_reference` error.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    invalid_ids: Option<Vec<String>>,
}

impl ErrorResponse {
    pub(super) fn new(message: String, code: &str, invalid_ids: Option<Vec<String>>) -> Self {
        Self {
            message,
            code: code.to_owned(),
            invalid_ids,
        }
    }
}
