use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};

use crate::adapters::api::{ApiState, configure_routes};
use crate::adapters::session::SessionSettings;
use crate::app::config::AppConfig;
use crate::app::error::AppError;
use crate::app::services::SqliteEmsService;

pub fn run(config: AppConfig) -> Result<(), AppError> {
    if let Some(parent) = std::path::Path::new(&config.db_path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(AppError::database_init)?;
    }

    let mut connection =
        crate::adapters::db::open_connection(&config.db_path).map_err(AppError::database_init)?;
    crate::adapters::db::run_migrations(&mut connection).map_err(AppError::database_init)?;

    let shared_connection = Arc::new(Mutex::new(connection));
    let api_state = ApiState {
        store: SqliteEmsService::new(Arc::clone(&shared_connection)),
        session: SessionSettings {
            jwt_secret: config.jwt_secret.clone(),
            production: config.environment.is_production(),
        },
    };

    tracing::info!(bind = %config.http_bind, "http server starting");

    let cors_origin = config.cors_origin.clone();
    let http_bind = config.http_bind.clone();

    actix_web::rt::System::new()
        .block_on(async move {
            HttpServer::new(move || {
                let cors = Cors::default()
                    .allowed_origin(&cors_origin)
                    .allow_any_method()
                    .allow_any_header()
                    .supports_credentials();

                App::new()
                    .wrap(cors)
                    .app_data(web::Data::new(api_state.clone()))
                    .configure(configure_routes)
            })
            .bind(&http_bind)?
            .run()
            .await
        })
        .map_err(AppError::runtime)
}
