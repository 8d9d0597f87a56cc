/// Generate the input schema of a tool from its input type
#[macro_export]
macro_rules! schema_from_type {
    ($type:ty) => {{
        // MCP clients such as VSCode/Copilot only understand Draft-07.
        let settings = schemars::generate::SchemaSettings::draft07();
        let generator = settings.into_generator();
        let schema = generator.into_root_schema_for::<$type>();
        match serde_json::to_value(schema) {
            Ok(Value::Object(schema)) => schema,
            _ => panic!("Failed to generate schema for {}", stringify!($type)),
        }
    }};
}
