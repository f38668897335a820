//! Logging initialization and utilities

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable, e.g.
/// `RUST_LOG=animated_sprite2d=trace` to see per-frame evaluation.
///
/// # Example
/// ```
/// animated_sprite2d::core::logging::init();
/// log::info!("Player started");
/// ```
pub fn init() {
    // try_init so tools and tests can call this more than once
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();
}
