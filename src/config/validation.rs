use crate::config::types::Config;

/// Clamps all configured limits to their usable floor of 1
///
/// A `connection-limiter` of 0 would make the fetch gate unacquirable and
/// deadlock every request, so the floor is enforced here, once, at load time.
/// The same floor applies to `max-pages` (always fetch at least page one) and
/// `max-workers` (the parse pool needs at least one worker).
pub fn clamp_limits(config: &mut Config) {
    if config.connection_limiter < 1 {
        tracing::warn!(
            "connection-limiter {} is below 1, clamping to 1",
            config.connection_limiter
        );
        config.connection_limiter = 1;
    }

    if config.max_pages < 1 {
        tracing::warn!("max-pages {} is below 1, clamping to 1", config.max_pages);
        config.max_pages = 1;
    }

    if config.max_workers < 1 {
        tracing::warn!(
            "max-workers {} is below 1, clamping to 1",
            config.max_workers
        );
        config.max_workers = 1;
    }
}
