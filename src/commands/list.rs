//! List configured elements

use std::path::Path;

use podsd::{loader, names};

pub async fn list(configuration: &Path) -> podsd::Result<()> {
    let config = loader::load_file(configuration).await?;

    println!("{:<36} {:<8} {:<40} DESCRIPTION", "UNIT", "KIND", "SLICE");

    for id in config.graph().depth_first() {
        let Some(element) = config.get(&id) else {
            continue;
        };
        let unit = names::unit_name(&config, &id).unwrap_or_else(|| "?".into());
        let slice = names::slice_name(&config, &id).unwrap_or_else(|| "?".into());
        let kind = if element.is_group() { "group" } else { "service" };
        let desc: String = element.description().chars().take(40).collect();

        println!("{:<36} {:<8} {:<40} {}", unit, kind, format!("{}.slice", slice), desc);
    }

    println!();
    println!("{} elements listed", config.len());
    Ok(())
}
