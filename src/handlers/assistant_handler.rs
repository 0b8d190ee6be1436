use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    constants::{prompts::QUIZ_BUILDER_SYSTEM_PROMPT, tools::TOOL_SCHEMA_VERSION},
    errors::AppError,
    models::dto::{provider::ProviderResponse, request::ExtractRequest, response::ToolManifest},
    services::tool_schema::tool_definitions,
};

/// Runs the reply pipeline against a caller-supplied document. Nothing is stored.
#[post("/api/extract")]
pub async fn extract_reply(
    state: web::Data<AppState>,
    request: web::Json<ExtractRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    let response = ProviderResponse::from(request.response);
    let turn = state.reply_service.process_reply(&response, &request.current);
    Ok(HttpResponse::Ok().json(turn))
}

#[get("/api/tools")]
pub async fn list_tools() -> HttpResponse {
    HttpResponse::Ok().json(ToolManifest {
        version: TOOL_SCHEMA_VERSION,
        system_prompt: QUIZ_BUILDER_SYSTEM_PROMPT,
        tools: tool_definitions(),
    })
}

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(App::new().service(health_check)).await;

        let req = test::TestRequest::get().uri("/health").to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_list_tools() {
        let app = test::init_service(App::new().service(list_tools)).await;

        let req = test::TestRequest::get().uri("/api/tools").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["version"], TOOL_SCHEMA_VERSION);
        assert_eq!(body["tools"].as_array().map(Vec::len), Some(3));
        assert!(body["systemPrompt"].as_str().is_some());
    }

    #[actix_web::test]
    async fn test_extract_reply_is_delta_only() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(Config::test_config())))
                .service(extract_reply),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/extract")
            .set_json(json!({
                "response": {
                    "content": "Updated the description.",
                    "toolCalls": [{
                        "name": "update_quiz",
                        "arguments": "{\"title\":\"Pets\",\"description\":\"Find your pet\"}"
                    }]
                },
                "current": {"title": "Pets"}
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["text"], "Updated the description.");
        assert_eq!(body["delta"], json!({"description": "Find your pet"}));
    }
}
