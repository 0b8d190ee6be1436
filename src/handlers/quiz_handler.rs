use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        provider::{ProviderReply, ProviderResponse},
        request::CreateQuizRequest,
    },
};

#[post("/api/quizzes")]
pub async fn create_quiz(
    state: web::Data<AppState>,
    request: web::Json<CreateQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let quiz = state
        .quiz_builder_service
        .create_quiz(request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(quiz))
}

#[get("/api/quizzes/{id}")]
pub async fn get_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_builder_service.get_quiz(&id).await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[post("/api/quizzes/{id}/assistant-replies")]
pub async fn apply_assistant_reply(
    state: web::Data<AppState>,
    id: web::Path<String>,
    reply: web::Json<ProviderReply>,
) -> Result<HttpResponse, AppError> {
    let response = ProviderResponse::from(reply.into_inner());
    let result = state
        .quiz_builder_service
        .apply_assistant_reply(&id, &response)
        .await?;
    Ok(HttpResponse::Ok().json(result))
}
