use super::models::{AccessToken, LoginForm};
use super::services::{LoginOutcome, login};
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use axum::{Form, Json, extract::State};
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(issue_token))
        .with_state(state.clone())
}

#[utoipa::path(
    post,
    path = "/token",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = OK, description = "Bearer credential for the operator", body = AccessToken),
        (status = BAD_REQUEST, description = "Incorrect username or password"),
        (status = INTERNAL_SERVER_ERROR, description = "Storage failure")
    ),
    tag = "operators",
    summary = "Operator login"
)]
pub async fn issue_token(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<AccessToken>, BusinessError> {
    match login(&state.db, state.verifier.as_ref(), &form.username, &form.password).await? {
        LoginOutcome::Granted(token) => Ok(Json(token)),
        LoginOutcome::InvalidCredentials => Err(BusinessError::InvalidCredentials),
    }
}
