/// Ensure a collection name matches `[A-Za-z][A-Za-z0-9_]*`.
pub(crate) fn validate_collection_name(name: &str) -> Result<(), String> {
    let mut chars = name.chars();

    let Some(first) = chars.next() else {
        return Err("collection name is empty".to_string());
    };
    if !first.is_ascii_alphabetic() {
        return Err(format!(
            "collection name '{name}' must start with an ASCII letter"
        ));
    }
    if let Some(bad) = chars.find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
        return Err(format!(
            "collection name '{name}' contains invalid character '{bad}'"
        ));
    }

    Ok(())
}
