//! Validate a configuration

use std::path::Path;

use podsd::{loader, Validator};

pub async fn check(configuration: &Path) -> podsd::Result<()> {
    let config = loader::load_file(configuration).await?;
    Validator::with_default_checks().gate(&config)?;

    println!(
        "{}: {} elements, {} services, configuration is valid",
        configuration.display(),
        config.len(),
        config.services().count()
    );
    Ok(())
}
