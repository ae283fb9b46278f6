use async_graphql::{Context, ErrorExtensions};

use crate::{
    app_state::AppState,
    auth::{extract_claims_from_context, require_student, Claims},
    errors::{AppError, AppResult},
};

/// Converts a service result into a field result carrying `code` and
/// `statusCode` extensions.
pub fn field<T>(result: AppResult<T>) -> async_graphql::Result<T> {
    result.map_err(|err| err.extend())
}

pub fn app_state<'a>(ctx: &Context<'a>) -> AppResult<&'a AppState> {
    ctx.data::<AppState>()
        .map_err(|_| AppError::InternalError("Application state missing from schema".to_string()))
}

/// Claims of an authenticated student who passes the subscription gate.
pub async fn playing_student(ctx: &Context<'_>) -> AppResult<Claims> {
    let claims = extract_claims_from_context(ctx)?;
    require_student(&claims)?;
    app_state(ctx)?
        .subscription_service
        .ensure_active(claims.user_id())
        .await?;
    Ok(claims)
}
