mod config;
mod error;
mod logging;
mod runtime;
pub mod services;

pub use error::AppError;

pub fn run() -> Result<(), AppError> {
    logging::init()?;

    // .env is optional; real environment variables win
    let _ = dotenvy::dotenv();

    let config = config::AppConfig::from_env()?;

    tracing::info!(
        http_bind = %config.http_bind,
        db_path = %config.db_path,
        cors_origin = %config.cors_origin,
        environment = ?config.environment,
        "application bootstrap initialized"
    );

    if config.uses_default_secret() {
        tracing::warn!(
            "JWT_SECRET is unset; falling back to the built-in development secret, which must not be used in production"
        );
    }

    runtime::run(config)
}
