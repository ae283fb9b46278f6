pub mod graphql_handler;
pub mod health_handler;
pub mod quest_handler;
pub mod rewards_handler;

use actix_web::web;

use crate::{auth::AuthMiddleware, errors::AppError};

pub use graphql_handler::graphql;
pub use health_handler::{health_check, health_check_ready};
pub use quest_handler::{current_question, retry_settlement, start_quest, submit_answer};
pub use rewards_handler::{get_leaderboard, get_my_rewards};

/// Every route of the service. Expects `AppState`, `JwtService` and the
/// GraphQL `Schema` as app data.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Malformed bodies and queries get the same envelope as every other error.
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(err.to_string()).into()
    }))
    .service(health_check)
        .service(health_check_ready)
        .service(
            web::scope("/quest")
                .wrap(AuthMiddleware)
                .service(start_quest)
                .service(current_question)
                .service(submit_answer)
                .service(retry_settlement),
        )
        .service(get_leaderboard)
        .service(get_my_rewards)
        .service(graphql);
}
