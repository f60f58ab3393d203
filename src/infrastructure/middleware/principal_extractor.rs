// Principal Extractor - resolves the caller's identity for mutating handlers

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{
    app_state::AppState,
    error::AppError,
    infrastructure::security::bearer_credential,
};

/// The authenticated identity performing an action.
///
/// Handlers that take a `Principal` argument reject the request with 401
/// before running when the `Authorization: Bearer` credential is missing
/// or fails verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(pub String);

impl Principal {
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|value| value.to_str())
            .transpose()
            .map_err(|_| AppError::Unauthorized("Invalid auth header".to_string()))?;

        let credential = bearer_credential(header)?;
        let principal = state.verifier.verify(credential).await?;
        Ok(Principal(principal))
    }
}
