use validator::Validate;

use crate::error::ApiError;

/// Runs derive-based request validation and folds the field errors into one
/// submitter-facing message.
pub fn validate<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload
        .validate()
        .map_err(|err| ApiError::Validation(format!("invalid request: {err}")))
}
