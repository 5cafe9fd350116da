//! Builders for `responseSchema` values (OpenAPI subset, upper-case type names).

use serde_json::{json, Value};

/// Object with one required field holding an ordered list of strings.
///
/// ```
/// let schema = gemini_image::schema::string_list("panels", "A visual description of one panel.");
/// assert_eq!(schema["required"][0], "panels");
/// ```
pub fn string_list(field: &str, item_description: &str) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            field: {
                "type": "ARRAY",
                "items": {
                    "type": "STRING",
                    "description": item_description,
                }
            }
        },
        "required": [field],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_list_shape() {
        let schema = string_list("panels", "desc");
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["panels"]["type"], "ARRAY");
        assert_eq!(schema["properties"]["panels"]["items"]["type"], "STRING");
        assert_eq!(schema["properties"]["panels"]["items"]["description"], "desc");
        assert_eq!(schema["required"], json!(["panels"]));
    }
}
