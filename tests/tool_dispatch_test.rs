//! Tool calls dispatched end to end against a mock Notion API.

mod common;

use serde_json::json;
use wiremock::{
    matchers::{body_json, body_partial_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use common::{dispatcher, list_json, page_json, paragraph_json};

#[tokio::test]
async fn test_tools_listed_in_family_order() {
    let server = MockServer::start().await;
    let names: Vec<String> = dispatcher(&server)
        .list_tools()
        .into_iter()
        .map(|t| t.name.to_string())
        .collect();

    assert_eq!(
        names,
        vec![
            "notion_page_create",
            "notion_page_get",
            "notion_page_update",
            "notion_page_delete",
            "notion_database_query",
            "notion_database_create_page",
            "notion_database_update_page",
            "notion_database_get_schema",
            "notion_block_append",
            "notion_block_get_children",
            "notion_block_update",
            "notion_block_delete",
            "notion_search",
            "notion_search_by_title",
        ]
    );
}

#[tokio::test]
async fn test_page_get_includes_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/pages/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json("p1", "Roadmap")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/blocks/p1/children"))
        .and(query_param("page_size", "100"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_json(vec![paragraph_json("b1", "First step")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = dispatcher(&server)
        .dispatch("notion_page_get", Some(&json!({"pageId": "p1"})))
        .await;

    assert!(!response.is_error());
    let text = response.text_content();
    assert!(text.starts_with("# Page Information\n\n**Title:** Roadmap\n**ID:** p1\n"));
    assert!(text.contains("## Content\n\nFirst step\n"));
}

#[tokio::test]
async fn test_page_create_without_parent_targets_workspace() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .and(body_partial_json(json!({"parent": {"workspace": true}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json("new-1", "Notes")))
        .expect(1)
        .mount(&server)
        .await;

    let response = dispatcher(&server)
        .dispatch("notion_page_create", Some(&json!({"title": "Notes"})))
        .await;

    assert_eq!(
        response.text_content(),
        "Created page \"Notes\" with ID: new-1\nURL: https://www.notion.so/new-1"
    );
}

#[tokio::test]
async fn test_missing_required_field_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json("x", "x")))
        .expect(0)
        .mount(&server)
        .await;

    let response = dispatcher(&server)
        .dispatch("notion_page_create", Some(&json!({"content": "body"})))
        .await;

    assert!(response.is_error());
    assert!(response.text_content().starts_with("Error: "));
    assert!(response.text_content().contains("title"));
}

#[tokio::test]
async fn test_search_applies_default_page_size() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .and(body_partial_json(json!({"page_size": 20, "query": "plan"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(list_json(vec![page_json("p1", "Plan")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = dispatcher(&server)
        .dispatch("notion_search", Some(&json!({"query": "plan"})))
        .await;

    let text = response.text_content();
    assert!(text.starts_with("# Search Results\n\nFound 1 items for \"plan\"\n\n"));
    assert!(text.contains("## 📄 Page: Plan\n"));
    assert!(text.contains("- **Created:** 2024-03-01\n"));
}

#[tokio::test]
async fn test_search_by_title_filters_and_previews() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(vec![
            page_json("p1", "Weekly Plan"),
            page_json("p2", "Budget"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/blocks/p1/children"))
        .and(query_param("page_size", "3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_json(vec![paragraph_json("b1", "Ship it")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = dispatcher(&server)
        .dispatch("notion_search_by_title", Some(&json!({"title": "plan"})))
        .await;

    let text = response.text_content();
    assert!(text.starts_with("# Title Search Results\n\nFound 1 pages matching \"plan\"\n\n"));
    assert!(text.contains("## Weekly Plan\n"));
    assert!(text.contains("- **Preview:** Ship it\n"));
    assert!(!text.contains("Budget"));
}

#[tokio::test]
async fn test_block_delete_reports_id() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/blocks/b9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paragraph_json("b9", "")))
        .expect(1)
        .mount(&server)
        .await;

    let response = dispatcher(&server)
        .dispatch("notion_block_delete", Some(&json!({"blockId": "b9"})))
        .await;

    assert_eq!(response.text_content(), "Deleted block b9");
}

#[tokio::test]
async fn test_remote_error_becomes_error_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/databases/db1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "object": "error",
            "code": "restricted_resource",
            "message": "Insufficient permissions for this endpoint."
        })))
        .mount(&server)
        .await;

    let response = dispatcher(&server)
        .dispatch("notion_database_get_schema", Some(&json!({"databaseId": "db1"})))
        .await;

    assert!(response.is_error());
    assert_eq!(
        response.text_content(),
        "Error: Insufficient permissions for this endpoint."
    );
}

fn database_row_json(id: &str, title: &str, database_id: &str) -> serde_json::Value {
    let mut page = page_json(id, title);
    page["parent"] = json!({"type": "database_id", "database_id": database_id});
    page
}

#[tokio::test]
async fn test_page_update_sends_title_and_archived() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/v1/pages/p1"))
        .and(body_json(json!({
            "properties": {"title": {"title": [{"text": {"content": "Renamed"}}]}},
            "archived": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json("p1", "Renamed")))
        .expect(1)
        .mount(&server)
        .await;

    let response = dispatcher(&server)
        .dispatch(
            "notion_page_update",
            Some(&json!({"pageId": "p1", "title": "Renamed", "archived": false})),
        )
        .await;

    assert_eq!(
        response.text_content(),
        "Updated page p1 with new title \"Renamed\" (archived: false)"
    );
}

#[tokio::test]
async fn test_database_query_body_and_listing() {
    let server = MockServer::start().await;
    let mut row = page_json("r1", "Task A");
    row["properties"] = json!({
        "Name": {"type": "title", "title": [{"plain_text": "Task A"}]},
        "Status": {"type": "select", "select": {"name": "Done"}},
        "Estimate": {"type": "number", "number": 3}
    });
    Mock::given(method("POST"))
        .and(path("/v1/databases/db1/query"))
        .and(body_json(json!({
            "page_size": 10,
            "filter": {"property": "Status", "select": {"equals": "Done"}},
            "sorts": [{"property": "Estimate", "direction": "ascending"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(vec![row])))
        .expect(1)
        .mount(&server)
        .await;

    let response = dispatcher(&server)
        .dispatch(
            "notion_database_query",
            Some(&json!({
                "databaseId": "db1",
                "filter": {"property": "Status", "select": {"equals": "Done"}},
                "sorts": [{"property": "Estimate", "direction": "ascending"}]
            })),
        )
        .await;

    assert!(!response.is_error(), "{}", response.text_content());
    let text = response.text_content();
    assert!(text.starts_with("Found 1 items:\n\n- **Task A** (ID: r1)\n"));
    assert!(text.contains("  - Status: Done\n"));
    assert!(text.contains("  - Estimate: 3\n"));
    assert!(!text.contains("  - Name:"));
}

#[tokio::test]
async fn test_database_create_page_converts_properties() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .and(body_json(json!({
            "parent": {"database_id": "db1"},
            "properties": {
                "Name": {"title": [{"text": {"content": "Task B"}}]},
                "Done": {"checkbox": false},
                "Points": {"number": 5}
            },
            "children": [{
                "object": "block",
                "type": "paragraph",
                "paragraph": {"rich_text": [{"type": "text", "text": {"content": "Details"}}]}
            }]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(database_row_json("r2", "Task B", "db1")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = dispatcher(&server)
        .dispatch(
            "notion_database_create_page",
            Some(&json!({
                "databaseId": "db1",
                "properties": {"Name": "Task B", "Done": false, "Points": 5},
                "content": "Details"
            })),
        )
        .await;

    assert_eq!(
        response.text_content(),
        "Created database page with ID: r2\nURL: https://www.notion.so/r2"
    );
}

#[tokio::test]
async fn test_database_update_page_passes_notion_shaped_values() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/v1/pages/r2"))
        .and(body_json(json!({
            "properties": {"Status": {"select": {"name": "Done"}}, "Points": {"number": 8}}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(database_row_json("r2", "Task B", "db1")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = dispatcher(&server)
        .dispatch(
            "notion_database_update_page",
            Some(&json!({
                "pageId": "r2",
                "properties": {"Status": {"select": {"name": "Done"}}, "Points": 8}
            })),
        )
        .await;

    assert_eq!(response.text_content(), "Updated database page r2");
}

#[tokio::test]
async fn test_block_update_retrieves_then_patches_todo() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/blocks/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "block",
            "id": "t1",
            "type": "to_do",
            "has_children": false,
            "to_do": {"rich_text": [{"plain_text": "Draft"}], "checked": false}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/v1/blocks/t1"))
        .and(body_json(json!({
            "to_do": {
                "rich_text": [{"type": "text", "text": {"content": "Final"}}],
                "checked": true
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(paragraph_json("t1", "Final")))
        .expect(1)
        .mount(&server)
        .await;

    let response = dispatcher(&server)
        .dispatch(
            "notion_block_update",
            Some(&json!({"blockId": "t1", "content": "Final", "checked": true})),
        )
        .await;

    assert_eq!(response.text_content(), "Updated block t1");
}

async fn mount_nested_children(server: &MockServer, nested_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/v1/blocks/root/children"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(vec![
            json!({
                "object": "block",
                "id": "c1",
                "type": "paragraph",
                "has_children": true,
                "paragraph": {"rich_text": [{"plain_text": "Top"}]}
            }),
            paragraph_json("c2", "Sibling"),
        ])))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/blocks/c1/children"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(vec![json!({
            "object": "block",
            "id": "n1",
            "type": "bulleted_list_item",
            "has_children": false,
            "bulleted_list_item": {"rich_text": [{"plain_text": "Nested"}]}
        })])))
        .expect(nested_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_block_children_recursive_descends() {
    let server = MockServer::start().await;
    mount_nested_children(&server, 1).await;

    let response = dispatcher(&server)
        .dispatch(
            "notion_block_get_children",
            Some(&json!({"blockId": "root", "recursive": true})),
        )
        .await;

    assert_eq!(
        response.text_content(),
        "# Block Children\n\nTop\n  • Nested\nSibling\n"
    );
}

#[tokio::test]
async fn test_block_children_flat_by_default() {
    let server = MockServer::start().await;
    mount_nested_children(&server, 0).await;

    let response = dispatcher(&server)
        .dispatch("notion_block_get_children", Some(&json!({"blockId": "root"})))
        .await;

    assert_eq!(response.text_content(), "# Block Children\n\nTop\nSibling\n");
}

#[tokio::test]
async fn test_search_by_title_limits_to_database() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(vec![
            database_row_json("p1", "Plan A", "db1"),
            database_row_json("p2", "Plan B", "db2"),
            page_json("p3", "Plan C"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/blocks/p1/children"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(vec![])))
        .expect(1)
        .mount(&server)
        .await;
    for other in ["p2", "p3"] {
        Mock::given(method("GET"))
            .and(path(format!("/v1/blocks/{}/children", other)))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_json(vec![])))
            .expect(0)
            .mount(&server)
            .await;
    }

    let response = dispatcher(&server)
        .dispatch(
            "notion_search_by_title",
            Some(&json!({"title": "plan", "inDatabase": "db1"})),
        )
        .await;

    let text = response.text_content();
    assert!(text.starts_with("# Title Search Results\n\nFound 1 pages matching \"plan\"\n\n"));
    assert!(text.contains("## Plan A\n"));
    assert!(text.contains("- **Database:** db1\n"));
    assert!(!text.contains("Plan B"));
    assert!(!text.contains("Plan C"));
    assert!(!text.contains("Preview"));
}

#[tokio::test]
async fn test_dot_segment_id_is_rejected_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json("x", "x")))
        .expect(0)
        .mount(&server)
        .await;

    let response = dispatcher(&server)
        .dispatch("notion_page_get", Some(&json!({"pageId": ".."})))
        .await;

    assert!(response.is_error());
    assert!(response
        .text_content()
        .starts_with("Error: Invalid request: '..' is not a valid Notion id"));
}
