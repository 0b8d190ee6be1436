use actix_web::{middleware::Logger, web, App, HttpServer};

use quiz_builder_server::{app_state::AppState, config::Config, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let bind_address = (config.web_server_host.clone(), config.web_server_port);
    let payload_limit = config.json_payload_limit;
    let state = AppState::new(config);

    log::info!(
        "starting HTTP server on {}:{}",
        bind_address.0,
        bind_address.1
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::JsonConfig::default().limit(payload_limit))
            .wrap(Logger::default())
            .service(handlers::health_check)
            .service(handlers::list_tools)
            .service(handlers::extract_reply)
            .service(handlers::create_quiz)
            .service(handlers::get_quiz)
            .service(handlers::apply_assistant_reply)
    })
    .bind(bind_address)?
    .run()
    .await
}
