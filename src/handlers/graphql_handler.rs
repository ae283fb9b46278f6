use actix_web::{post, web};
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use crate::{auth::AuthenticatedUser, graphql::Schema};

#[post("/graphql")]
async fn graphql(
    schema: web::Data<Schema>,
    request: GraphQLRequest,
    auth: Option<AuthenticatedUser>,
) -> GraphQLResponse {
    let mut request = request.into_inner();
    if let Some(user) = auth {
        request = request.data(user.0);
    }
    schema.execute(request).await.into()
}
