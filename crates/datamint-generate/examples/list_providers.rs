use datamint_generate::ProviderRegistry;

fn main() {
    let registry = ProviderRegistry::new();
    for path in registry.provider_paths() {
        println!("{path}");
    }
}
