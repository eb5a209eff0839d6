use datamint_core::document_json_schema;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema = document_json_schema()?;
    let json = serde_json::to_string_pretty(&schema)?;
    println!("{json}");
    Ok(())
}
