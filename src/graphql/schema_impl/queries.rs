use async_graphql::{Context, Object, ID};

use crate::{
    auth::{extract_claims_from_context, require_student},
    errors::AppResult,
    graphql::helpers::{app_state, field, playing_student},
    models::dto::{
        quest_dto::QuestionView,
        request::PaginationParams,
        response::{LeaderboardEntry, RewardsOverview},
    },
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The question the caller's in-progress attempt points at.
    async fn current_question(
        &self,
        ctx: &Context<'_>,
        quest_id: ID,
    ) -> async_graphql::Result<QuestionView> {
        field(current_question(ctx, &quest_id).await)
    }

    async fn leaderboard(
        &self,
        ctx: &Context<'_>,
        limit: Option<i64>,
    ) -> async_graphql::Result<Vec<LeaderboardEntry>> {
        field(leaderboard(ctx, limit).await)
    }

    async fn my_rewards(
        &self,
        ctx: &Context<'_>,
        page: Option<PaginationParams>,
    ) -> async_graphql::Result<RewardsOverview> {
        field(my_rewards(ctx, page.unwrap_or_default()).await)
    }
}

async fn current_question(ctx: &Context<'_>, quest_id: &str) -> AppResult<QuestionView> {
    let claims = playing_student(ctx).await?;
    app_state(ctx)?
        .progression_service
        .current_question(claims.user_id(), quest_id)
        .await
}

async fn leaderboard(ctx: &Context<'_>, limit: Option<i64>) -> AppResult<Vec<LeaderboardEntry>> {
    extract_claims_from_context(ctx)?;
    app_state(ctx)?.leaderboard_service.leaderboard(limit).await
}

async fn my_rewards(ctx: &Context<'_>, page: PaginationParams) -> AppResult<RewardsOverview> {
    let claims = extract_claims_from_context(ctx)?;
    require_student(&claims)?;
    app_state(ctx)?
        .leaderboard_service
        .rewards_overview(claims.user_id(), &page)
        .await
}
