//! Outgoing Notion payload builders.

use serde_json::{json, Map, Value};

/// `[{"type": "text", "text": {"content": ...}}]`
pub fn rich_text(content: &str) -> Value {
    json!([{ "type": "text", "text": { "content": content } }])
}

/// A block of `kind` carrying a single text run.
pub fn text_block(kind: &str, content: &str) -> Value {
    let mut block = Map::new();
    block.insert("object".to_string(), json!("block"));
    block.insert("type".to_string(), json!(kind));
    block.insert(kind.to_string(), json!({ "rich_text": rich_text(content) }));
    Value::Object(block)
}

pub fn paragraph(content: &str) -> Value {
    text_block("paragraph", content)
}

/// One paragraph per non-blank line.
pub fn paragraphs_from_lines(content: &str) -> Vec<Value> {
    content
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(paragraph)
        .collect()
}

/// `{"title": {"title": [...]}}` page property map.
pub fn title_properties(title: &str) -> Value {
    json!({ "title": { "title": [{ "text": { "content": title } }] } })
}

/// Map a plain JSON value onto a Notion property value by its shape.
///
/// Strings become `title` for a `title`/`name` key and `rich_text` otherwise;
/// objects are assumed to be Notion-shaped already and pass through.
pub fn convert_property(key: &str, value: &Value) -> Value {
    match value {
        Value::String(s) => {
            let key = key.to_lowercase();
            if key == "title" || key == "name" {
                json!({ "title": [{ "text": { "content": s } }] })
            } else {
                plain_rich_text(s)
            }
        }
        Value::Number(n) => json!({ "number": n }),
        Value::Bool(b) => json!({ "checkbox": b }),
        Value::Array(items) => {
            let options: Vec<Value> = items
                .iter()
                .map(|item| json!({ "name": display_string(item) }))
                .collect();
            json!({ "multi_select": options })
        }
        Value::Object(_) => value.clone(),
        Value::Null => plain_rich_text("null"),
    }
}

pub fn convert_properties(properties: &Map<String, Value>) -> Map<String, Value> {
    properties
        .iter()
        .map(|(key, value)| (key.clone(), convert_property(key, value)))
        .collect()
}

fn plain_rich_text(content: &str) -> Value {
    json!({ "rich_text": [{ "text": { "content": content } }] })
}

fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_title_vs_rich_text() {
        assert_eq!(
            convert_property("Name", &json!("Launch")),
            json!({"title": [{"text": {"content": "Launch"}}]})
        );
        assert_eq!(
            convert_property("TITLE", &json!("Launch")),
            json!({"title": [{"text": {"content": "Launch"}}]})
        );
        assert_eq!(
            convert_property("Notes", &json!("ready")),
            json!({"rich_text": [{"text": {"content": "ready"}}]})
        );
    }

    #[test]
    fn test_scalar_and_collection_shapes() {
        assert_eq!(convert_property("Estimate", &json!(3)), json!({"number": 3}));
        assert_eq!(
            convert_property("Done", &json!(true)),
            json!({"checkbox": true})
        );
        assert_eq!(
            convert_property("Tags", &json!(["a", 2])),
            json!({"multi_select": [{"name": "a"}, {"name": "2"}]})
        );
        assert_eq!(
            convert_property("Notes", &Value::Null),
            json!({"rich_text": [{"text": {"content": "null"}}]})
        );
    }

    #[test]
    fn test_object_passes_through() {
        let raw = json!({"select": {"name": "High"}});
        assert_eq!(convert_property("Priority", &raw), raw);
    }

    #[test]
    fn test_blocks() {
        assert_eq!(
            paragraph("hello"),
            json!({
                "object": "block",
                "type": "paragraph",
                "paragraph": {"rich_text": [{"type": "text", "text": {"content": "hello"}}]}
            })
        );
        let blocks = paragraphs_from_lines("one\n\n  \ntwo");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1]["paragraph"]["rich_text"][0]["text"]["content"], "two");
    }
}
