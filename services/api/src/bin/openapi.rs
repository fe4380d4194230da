//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI 3.0 document for the study planner REST API.
//! Usage: `openapi [OUTPUT_PATH]` (defaults to `openapi.json`).

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "openapi.json".to_string());

    let mut api_doc = ApiDoc::openapi();
    api_doc.info.title = "Study Planner API".to_string();

    std::fs::write(&path, api_doc.to_pretty_json()?)?;
    println!("OpenAPI specification generated at {}", path);
    Ok(())
}
