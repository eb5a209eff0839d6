use std::path::PathBuf;

use datamint_generate::{GenerateOptions, GenerationEngine, ProviderRegistry};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../schemas/examples/users.schema.json");
    let engine = GenerationEngine::new(GenerateOptions {
        seed: Some(42),
        ..GenerateOptions::default()
    });
    let document = engine.load_document(&schema_path)?;
    let generated = engine.generate_records(&document, &ProviderRegistry::new())?;
    println!("{}", serde_json::to_string_pretty(&generated.records)?);
    Ok(())
}
