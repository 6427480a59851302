//! Print the forum's OpenAPI document as pretty JSON on stdout.

use std::io::{self, Write};

use color_eyre::eyre::{Context, Result};
use qanda::doc::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<()> {
    color_eyre::install()?;
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .context("serialise OpenAPI document")?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}").context("write OpenAPI document")?;
    Ok(())
}
