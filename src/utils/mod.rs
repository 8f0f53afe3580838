//! Utility functions shared by the library and the server binary.

use tracing_subscriber::EnvFilter;

/// Installs a formatted tracing subscriber driven by `RUST_LOG`.
///
/// Falls back to the `info` level when `RUST_LOG` is unset or invalid. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_reentrant() {
        init_tracing();
        init_tracing();
        tracing::info!("tracing initialised twice without panicking");
    }
}
