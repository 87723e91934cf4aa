//! Typed Notion API objects.
//!
//! Only the fields the tools read are modelled. Property maps keep the order
//! the API returned them in, since formatted output lists properties in that
//! order.

use std::{fmt, marker::PhantomData};

use serde::{
    de::{DeserializeOwned, MapAccess, Visitor},
    Deserialize, Deserializer,
};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

/// Concatenated plain text of a rich text array.
pub fn plain_text(items: &[RichText]) -> String {
    items.iter().map(|t| t.plain_text.as_str()).collect()
}

/// Name-keyed map preserving response order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<T>(pub Vec<(String, T)>);

impl<T> Default for OrderedMap<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> OrderedMap<T> {
    pub fn get(&self, key: &str) -> Option<&T> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for OrderedMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<T>(PhantomData<T>);

        impl<'de, T: DeserializeOwned> Visitor<'de> for OrderedVisitor<T> {
            type Value = OrderedMap<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of named entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, T>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DateValue {
    #[serde(default)]
    pub start: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RelationRef {
    pub id: String,
}

/// A page property value, closed over the types the tools know how to show.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default)]
        title: Vec<RichText>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichText>,
    },
    Number {
        number: Option<f64>,
    },
    Select {
        select: Option<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    Date {
        date: Option<DateValue>,
    },
    Checkbox {
        #[serde(default)]
        checkbox: bool,
    },
    Url {
        url: Option<String>,
    },
    Email {
        email: Option<String>,
    },
    PhoneNumber {
        phone_number: Option<String>,
    },
    Status {
        status: Option<SelectOption>,
    },
    Relation {
        #[serde(default)]
        relation: Vec<RelationRef>,
    },
    #[serde(other)]
    Unsupported,
}

impl PropertyValue {
    /// Text shown in listings; empty when there is nothing worth showing.
    pub fn display(&self) -> String {
        match self {
            PropertyValue::Title { title } => plain_text(title),
            PropertyValue::RichText { rich_text } => plain_text(rich_text),
            PropertyValue::Number { number } => number.map(|n| n.to_string()).unwrap_or_default(),
            PropertyValue::Select { select } | PropertyValue::Status { status: select } => {
                select.as_ref().map(|s| s.name.clone()).unwrap_or_default()
            }
            PropertyValue::MultiSelect { multi_select } => multi_select
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            PropertyValue::Date { date } => date
                .as_ref()
                .and_then(|d| d.start.clone())
                .unwrap_or_default(),
            PropertyValue::Checkbox { checkbox } => {
                let mark = if *checkbox { "✓" } else { "✗" };
                mark.to_string()
            }
            PropertyValue::Url { url: value }
            | PropertyValue::Email { email: value }
            | PropertyValue::PhoneNumber {
                phone_number: value,
            } => value.clone().unwrap_or_default(),
            PropertyValue::Relation { relation } => relation
                .iter()
                .map(|r| r.id.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            PropertyValue::Unsupported => String::new(),
        }
    }

    pub fn as_title(&self) -> Option<&[RichText]> {
        match self {
            PropertyValue::Title { title } => Some(title),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Parent {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub database_id: Option<String>,
    #[serde(default)]
    pub page_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub last_edited_time: Option<String>,
    #[serde(default)]
    pub parent: Parent,
    #[serde(default)]
    pub properties: OrderedMap<PropertyValue>,
}

impl Page {
    /// Title from the first of `title`, `Title`, `Name`, `name` that holds a
    /// non-empty title, then any title-typed property.
    pub fn title(&self) -> Option<String> {
        const TITLE_KEYS: [&str; 4] = ["title", "Title", "Name", "name"];

        TITLE_KEYS
            .iter()
            .filter_map(|key| self.properties.get(key))
            .chain(self.properties.iter().map(|(_, v)| v))
            .filter_map(PropertyValue::as_title)
            .find(|title| !title.is_empty())
            .map(plain_text)
    }

    pub fn title_or_untitled(&self) -> String {
        self.title().unwrap_or_else(|| "Untitled".to_string())
    }

    pub fn parent_database(&self) -> Option<&str> {
        if self.parent.kind == "database_id" {
            self.parent.database_id.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OptionsConfig {
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RelationConfig {
    #[serde(default)]
    pub database_id: Option<String>,
}

/// One column of a database schema.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatabaseProperty {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub select: Option<OptionsConfig>,
    #[serde(default)]
    pub multi_select: Option<OptionsConfig>,
    #[serde(default)]
    pub relation: Option<RelationConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Database {
    pub id: String,
    #[serde(default)]
    pub title: Vec<RichText>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub properties: OrderedMap<DatabaseProperty>,
}

impl Database {
    /// First title segment only, matching how Notion shows short titles.
    pub fn title(&self) -> Option<&str> {
        self.title.first().map(|t| t.plain_text.as_str())
    }
}

/// Payload shared by every text-bearing block type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct TextPayload {
    #[serde(default)]
    rich_text: Vec<RichText>,
    #[serde(default)]
    checked: Option<bool>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Paragraph(Vec<RichText>),
    Heading1(Vec<RichText>),
    Heading2(Vec<RichText>),
    Heading3(Vec<RichText>),
    BulletedListItem(Vec<RichText>),
    NumberedListItem(Vec<RichText>),
    Quote(Vec<RichText>),
    ToDo { text: Vec<RichText>, checked: bool },
    Code { text: Vec<RichText>, language: String },
    Divider,
    /// Any block type without dedicated handling. Keeps its rich text, if any.
    Other { kind: String, text: Vec<RichText> },
}

impl BlockContent {
    pub fn kind(&self) -> &str {
        match self {
            BlockContent::Paragraph(_) => "paragraph",
            BlockContent::Heading1(_) => "heading_1",
            BlockContent::Heading2(_) => "heading_2",
            BlockContent::Heading3(_) => "heading_3",
            BlockContent::BulletedListItem(_) => "bulleted_list_item",
            BlockContent::NumberedListItem(_) => "numbered_list_item",
            BlockContent::Quote(_) => "quote",
            BlockContent::ToDo { .. } => "to_do",
            BlockContent::Code { .. } => "code",
            BlockContent::Divider => "divider",
            BlockContent::Other { kind, .. } => kind,
        }
    }

    pub fn rich_text(&self) -> &[RichText] {
        match self {
            BlockContent::Paragraph(text)
            | BlockContent::Heading1(text)
            | BlockContent::Heading2(text)
            | BlockContent::Heading3(text)
            | BlockContent::BulletedListItem(text)
            | BlockContent::NumberedListItem(text)
            | BlockContent::Quote(text)
            | BlockContent::ToDo { text, .. }
            | BlockContent::Code { text, .. }
            | BlockContent::Other { text, .. } => text,
            BlockContent::Divider => &[],
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    id: String,
    #[serde(default)]
    has_children: bool,
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawBlock")]
pub struct Block {
    pub id: String,
    pub has_children: bool,
    pub content: BlockContent,
    /// Filled in by recursive listings; never part of an API response.
    pub children: Vec<Block>,
}

impl TryFrom<RawBlock> for Block {
    type Error = serde_json::Error;

    fn try_from(mut raw: RawBlock) -> Result<Self, Self::Error> {
        let payload: TextPayload = match raw.rest.remove(&raw.kind) {
            Some(Value::Object(obj)) => serde_json::from_value(Value::Object(obj))?,
            _ => TextPayload::default(),
        };
        let text = payload.rich_text;

        let content = match raw.kind.as_str() {
            "paragraph" => BlockContent::Paragraph(text),
            "heading_1" => BlockContent::Heading1(text),
            "heading_2" => BlockContent::Heading2(text),
            "heading_3" => BlockContent::Heading3(text),
            "bulleted_list_item" => BlockContent::BulletedListItem(text),
            "numbered_list_item" => BlockContent::NumberedListItem(text),
            "quote" => BlockContent::Quote(text),
            "to_do" => BlockContent::ToDo {
                text,
                checked: payload.checked.unwrap_or(false),
            },
            "code" => BlockContent::Code {
                text,
                language: payload.language.unwrap_or_default(),
            },
            "divider" => BlockContent::Divider,
            _ => BlockContent::Other {
                kind: raw.kind,
                text,
            },
        };

        Ok(Block {
            id: raw.id,
            has_children: raw.has_children,
            content,
            children: Vec::new(),
        })
    }
}

/// One result of `POST /search`: either a page or a database.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "object", rename_all = "snake_case")]
pub enum SearchResult {
    Page(Page),
    Database(Database),
}

/// Paginated list envelope (`{"object": "list", "results": [...], "has_more": ...}`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct List<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rich(text: &str) -> Value {
        json!([{"type": "text", "plain_text": text, "text": {"content": text}}])
    }

    #[test]
    fn test_page_properties_keep_order() {
        let page: Page = serde_json::from_value(json!({
            "object": "page",
            "id": "p1",
            "url": "https://notion.so/p1",
            "properties": {
                "Status": {"id": "a", "type": "status", "status": {"name": "Doing"}},
                "Name": {"id": "title", "type": "title", "title": rich("Roadmap")},
                "Estimate": {"id": "b", "type": "number", "number": 3},
                "Done": {"id": "c", "type": "checkbox", "checkbox": false},
                "Owner": {"id": "d", "type": "people", "people": []}
            }
        }))
        .unwrap();

        let keys: Vec<&str> = page.properties.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Status", "Name", "Estimate", "Done", "Owner"]);
        assert_eq!(page.title().as_deref(), Some("Roadmap"));
        assert_eq!(page.properties.get("Estimate").unwrap().display(), "3");
        assert_eq!(page.properties.get("Done").unwrap().display(), "✗");
        assert_eq!(
            page.properties.get("Owner"),
            Some(&PropertyValue::Unsupported)
        );
    }

    #[test]
    fn test_title_falls_back_to_any_title_property() {
        let page: Page = serde_json::from_value(json!({
            "id": "p2",
            "properties": {
                "Task": {"type": "title", "title": rich("Write docs")}
            }
        }))
        .unwrap();
        assert_eq!(page.title_or_untitled(), "Write docs");

        let empty: Page = serde_json::from_value(json!({"id": "p3"})).unwrap();
        assert_eq!(empty.title_or_untitled(), "Untitled");
    }

    #[test]
    fn test_property_display() {
        let cases = [
            (json!({"type": "rich_text", "rich_text": rich("notes")}), "notes"),
            (json!({"type": "number", "number": 2.5}), "2.5"),
            (json!({"type": "number", "number": null}), ""),
            (json!({"type": "select", "select": {"name": "High"}}), "High"),
            (
                json!({"type": "multi_select", "multi_select": [{"name": "a"}, {"name": "b"}]}),
                "a, b",
            ),
            (json!({"type": "date", "date": {"start": "2024-05-01"}}), "2024-05-01"),
            (json!({"type": "checkbox", "checkbox": true}), "✓"),
            (json!({"type": "url", "url": "https://x.dev"}), "https://x.dev"),
            (json!({"type": "email", "email": null}), ""),
            (json!({"type": "relation", "relation": [{"id": "r1"}]}), "r1"),
        ];
        for (raw, expected) in cases {
            let value: PropertyValue = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(value.display(), expected, "for {}", raw);
        }
    }

    #[test]
    fn test_block_content() {
        let block: Block = serde_json::from_value(json!({
            "object": "block",
            "id": "b1",
            "type": "to_do",
            "has_children": true,
            "to_do": {"rich_text": rich("ship it"), "checked": true}
        }))
        .unwrap();
        assert!(block.has_children);
        assert_eq!(
            block.content,
            BlockContent::ToDo {
                text: vec![RichText {
                    plain_text: "ship it".to_string()
                }],
                checked: true
            }
        );

        let callout: Block = serde_json::from_value(json!({
            "id": "b2",
            "type": "callout",
            "callout": {"rich_text": rich("note"), "icon": {"emoji": "💡"}}
        }))
        .unwrap();
        assert_eq!(callout.content.kind(), "callout");
        assert_eq!(plain_text(callout.content.rich_text()), "note");

        let image: Block = serde_json::from_value(json!({
            "id": "b3",
            "type": "image",
            "image": {"type": "external", "external": {"url": "https://x"}}
        }))
        .unwrap();
        assert!(image.content.rich_text().is_empty());
    }

    #[test]
    fn test_search_result_variants() {
        let list: List<SearchResult> = serde_json::from_value(json!({
            "object": "list",
            "results": [
                {"object": "page", "id": "p1", "properties": {}},
                {"object": "database", "id": "d1", "title": rich("Tasks"), "properties": {}}
            ],
            "has_more": true
        }))
        .unwrap();
        assert_eq!(list.results.len(), 2);
        assert!(matches!(list.results[0], SearchResult::Page(_)));
        match &list.results[1] {
            SearchResult::Database(db) => assert_eq!(db.title(), Some("Tasks")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(list.has_more);
    }
}
