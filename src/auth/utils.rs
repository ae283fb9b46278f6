use async_graphql::Context;

use crate::{
    auth::{claims::UserRole, Claims},
    errors::{AppError, AppResult},
};

/// Quests are played by students only.
pub fn require_student(claims: &Claims) -> AppResult<()> {
    if claims.role != UserRole::Student {
        return Err(AppError::Forbidden(
            "Only students can take quests".to_string(),
        ));
    }
    Ok(())
}

pub fn extract_claims_from_context(ctx: &Context<'_>) -> AppResult<Claims> {
    ctx.data::<Claims>()
        .cloned()
        .map_err(|_| AppError::Unauthorized("Authentication required".to_string()))
}
