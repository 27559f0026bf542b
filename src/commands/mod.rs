mod check;
mod generate;
mod list;

pub use check::check;
pub use generate::generate;
pub use list::list;

/// Run synchronous work that may block on DNS off the async workers
async fn run_blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(value) => value,
        Err(e) => std::panic::resume_unwind(e.into_panic()),
    }
}
