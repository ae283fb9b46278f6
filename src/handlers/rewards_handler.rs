use actix_web::{get, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::{require_student, AuthenticatedUser},
    constants::messages,
    errors::AppError,
    models::dto::{
        request::{LeaderboardParams, PaginationParams},
        response::ApiResponse,
    },
};

#[get("/leaderboard")]
async fn get_leaderboard(
    state: web::Data<AppState>,
    query: web::Query<LeaderboardParams>,
    _auth: AuthenticatedUser, // Require authentication
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    params.validate()?;

    let entries = state.leaderboard_service.leaderboard(params.limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(entries, messages::LEADERBOARD_FETCHED)))
}

#[get("/rewards/me")]
async fn get_my_rewards(
    state: web::Data<AppState>,
    query: web::Query<PaginationParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_student(&auth.0)?;
    let page = query.into_inner();
    page.validate()?;

    let overview = state
        .leaderboard_service
        .rewards_overview(auth.user_id(), &page)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(overview, messages::REWARDS_FETCHED)))
}
