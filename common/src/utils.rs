// common/src/utils.rs
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Setup tracing for consistent logging across crates
pub fn setup_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Current wall-clock time in epoch seconds.
///
/// All expiry comparisons in the session manager go through this single
/// clock so the boundary rule is applied consistently.
pub fn epoch_now() -> i64 {
    chrono::Utc::now().timestamp()
}
