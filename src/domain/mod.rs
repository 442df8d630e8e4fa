pub mod meter_view;
pub mod models;
pub mod session_token;
