use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_student, AuthenticatedUser},
    constants::messages,
    errors::AppError,
    models::dto::{
        quest_dto::{AttemptDto, SubmitAnswerResponse},
        request::SubmitAnswerRequest,
        response::ApiResponse,
    },
};

/// Role and subscription checks every quest route runs before the engine.
async fn authorize_student(state: &AppState, auth: &AuthenticatedUser) -> Result<(), AppError> {
    require_student(&auth.0)?;
    state.subscription_service.ensure_active(auth.user_id()).await
}

#[post("/start/{quest_id}")]
async fn start_quest(
    state: web::Data<AppState>,
    quest_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    authorize_student(&state, &auth).await?;

    let outcome = state
        .progression_service
        .start_quest(auth.user_id(), &quest_id)
        .await?;

    let response = if outcome.is_resumed() {
        let body = ApiResponse::ok(AttemptDto::from(outcome.into_attempt()), messages::QUEST_RESUMED);
        HttpResponse::Ok().json(body)
    } else {
        let body = ApiResponse::new(201, AttemptDto::from(outcome.into_attempt()), messages::QUEST_STARTED);
        HttpResponse::Created().json(body)
    };
    Ok(response)
}

#[get("/question/{quest_id}")]
async fn current_question(
    state: web::Data<AppState>,
    quest_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    authorize_student(&state, &auth).await?;

    let question = state
        .progression_service
        .current_question(auth.user_id(), &quest_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(question, messages::QUESTION_FETCHED)))
}

#[post("/answer/submit")]
async fn submit_answer(
    state: web::Data<AppState>,
    request: web::Json<SubmitAnswerRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    authorize_student(&state, &auth).await?;

    let outcome = state
        .progression_service
        .submit_answer(auth.user_id(), &request)
        .await?;

    let response = SubmitAnswerResponse::from(outcome);
    let message = match (response.completed, response.was_correct) {
        (true, _) => messages::QUEST_COMPLETED,
        (false, true) => messages::ANSWER_CORRECT,
        (false, false) => messages::ANSWER_INCORRECT,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::ok(response, message)))
}

#[post("/settlement/retry/{quest_id}")]
async fn retry_settlement(
    state: web::Data<AppState>,
    quest_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_student(&auth.0)?;

    let summary = state
        .progression_service
        .retry_settlement(auth.user_id(), &quest_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(summary, messages::QUEST_COMPLETED)))
}
