//! Generate and write unit files

use std::path::{Path, PathBuf};

use podsd::{loader, writer, GeneratorOptions, UnitGenerator, Validator};

use super::run_blocking;

pub async fn generate(
    configuration: &Path,
    output_directory: &Path,
    podman: PathBuf,
    dry_run: bool,
) -> podsd::Result<()> {
    let config = loader::load_file(configuration).await?;
    let options = GeneratorOptions {
        podman,
        ..GeneratorOptions::default()
    };

    // Nothing is written unless validation and generation both succeed
    let units = run_blocking(move || {
        Validator::with_default_checks().gate(&config)?;
        UnitGenerator::system(&config).with_options(options).generate()
    })
    .await?;

    if dry_run {
        for unit in &units {
            println!("# {}", unit.file_name);
            println!("{}", unit.text);
        }
        return Ok(());
    }

    let written = writer::write_units(output_directory, &units).await?;
    println!("{} unit files written to {}", written.len(), output_directory.display());
    Ok(())
}
