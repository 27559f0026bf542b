//! TOML configuration loading
//!
//! Groups nest their members under `[[element.members]]`; the loader
//! walks the document depth-first and links each element to the group
//! it is declared in.

mod document;

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{Configuration, ConfigurationBuilder, Service};

use document::{Document, ElementDocument};

/// Parse a configuration document; `origin` names it in errors
pub fn parse_str(text: &str, origin: &str) -> Result<Configuration> {
    let parse_error = |message: String| Error::Parse {
        origin: origin.to_string(),
        message,
    };

    let document: Document = toml::from_str(text).map_err(|e| parse_error(e.to_string()))?;

    let mut builder = Configuration::builder();
    for element in document.element {
        add_element(&mut builder, element, origin)?;
    }
    let configuration = builder.build().map_err(|e| parse_error(e.to_string()))?;

    log::debug!("Loaded {} elements from {}", configuration.len(), origin);
    Ok(configuration)
}

fn add_element(builder: &mut ConfigurationBuilder, element: ElementDocument, origin: &str) -> Result<()> {
    let parse_error = |message: String| Error::Parse {
        origin: origin.to_string(),
        message,
    };

    match element {
        ElementDocument::Service(doc) => {
            let service = Service::try_from(doc).map_err(|e| parse_error(e.to_string()))?;
            builder.add_service(service)?;
        }
        ElementDocument::Group(doc) => {
            let group = doc.to_group().map_err(|e| parse_error(e.to_string()))?;
            builder.begin_group(group)?;
            for member in doc.members {
                add_element(builder, member, origin)?;
            }
            builder.end_group();
        }
    }
    Ok(())
}

/// Read and parse a configuration file
pub async fn load_file(path: &Path) -> Result<Configuration> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::io(path, e))?;
    parse_str(&text, &path.display().to_string())
}
