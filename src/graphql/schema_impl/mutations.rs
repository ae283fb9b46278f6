use async_graphql::{Context, Object, ID};

use crate::{
    auth::{extract_claims_from_context, require_student},
    errors::AppResult,
    graphql::helpers::{app_state, field, playing_student},
    models::dto::{
        quest_dto::{AttemptDto, CompletionSummary, SubmitAnswerResponse},
        request::SubmitAnswerRequest,
    },
};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Starts the quest or resumes the attempt already in progress.
    async fn start_quest(&self, ctx: &Context<'_>, quest_id: ID) -> async_graphql::Result<AttemptDto> {
        field(start_quest(ctx, &quest_id).await)
    }

    async fn submit_answer(
        &self,
        ctx: &Context<'_>,
        input: SubmitAnswerRequest,
    ) -> async_graphql::Result<SubmitAnswerResponse> {
        field(submit_answer(ctx, &input).await)
    }

    async fn retry_settlement(
        &self,
        ctx: &Context<'_>,
        quest_id: ID,
    ) -> async_graphql::Result<CompletionSummary> {
        field(retry_settlement(ctx, &quest_id).await)
    }
}

async fn start_quest(ctx: &Context<'_>, quest_id: &str) -> AppResult<AttemptDto> {
    let claims = playing_student(ctx).await?;
    let outcome = app_state(ctx)?
        .progression_service
        .start_quest(claims.user_id(), quest_id)
        .await?;
    Ok(AttemptDto::from(outcome.into_attempt()))
}

async fn submit_answer(ctx: &Context<'_>, input: &SubmitAnswerRequest) -> AppResult<SubmitAnswerResponse> {
    let claims = playing_student(ctx).await?;
    let outcome = app_state(ctx)?
        .progression_service
        .submit_answer(claims.user_id(), input)
        .await?;
    Ok(SubmitAnswerResponse::from(outcome))
}

async fn retry_settlement(ctx: &Context<'_>, quest_id: &str) -> AppResult<CompletionSummary> {
    let claims = extract_claims_from_context(ctx)?;
    require_student(&claims)?;
    app_state(ctx)?
        .progression_service
        .retry_settlement(claims.user_id(), quest_id)
        .await
}
