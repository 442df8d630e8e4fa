fn main() {
    if let Err(err) = ems_dashboard_api::app::run() {
        eprintln!("application startup failed: {err}");
        std::process::exit(1);
    }
}
