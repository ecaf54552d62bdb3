#[cfg(test)]
pub mod test {
    use std::collections::HashMap;

    use crate::schema::Schema;
    use crate::value::Value;

    /// A small schema exercising every rule kind.
    pub fn test_schema() -> Schema {
        Schema::new()
            .key("HOST", "localhost", &["The application host."])
            .key("PORT", 8080, &["The port number."])
            .key("DEBUG", false, &["Enable debug mode."])
            .key("TOKEN", "", &[])
            .key(
                "EXTENSIONS",
                &[".mp3", ".ogg"][..],
                &["File extensions to accept.", "Order matters."],
            )
            .key("PRELOAD", 10, &["maximum of 25"])
            .key("CACHE_PATH", "cache/data.txt", &[])
            .alias("TOKEN", "API_TOKEN")
            .deprecated("DEBUGG", "DEBUG")
            .cap("PRELOAD", 25)
            .resolved_path("CACHE_PATH")
            .untracked("INTERNAL")
            .derived("ADDRESS", address)
    }

    fn address(values: &HashMap<String, Value>) -> Option<Value> {
        let host = values.get("HOST")?.as_str()?;
        let port = values.get("PORT")?.as_int()?;
        Some(Value::Str(format!("{host}:{port}")))
    }

    #[test]
    fn test_schema_has_all_keys() {
        let schema = test_schema();
        assert_eq!(schema.len(), 7);
        assert!(schema.is_untracked("ADDRESS"));
        assert!(schema.is_untracked("CACHE_PATH"));
    }
}
