use std::collections::HashMap;
use std::path::Path;

use httpmock::{
    Method::{GET, POST, PUT},
    MockServer,
};
use lopdf::{
    Document, Object, Stream, StringFormat,
    content::{Content, Operation},
    dictionary,
};
use serde_json::json;
use smedocs::{
    config::Config,
    processing::KnowledgeService,
    store::{USER_INPUT_SOURCE, load_store},
};
use tempfile::TempDir;

/// Write a single-page PDF with one text line per `(text, size)` pair.
fn write_pdf(path: &Path, lines: &[(&str, i64)]) {
    let mut operations = vec![Operation::new("BT", vec![])];
    let mut y = 780;
    for (text, size) in lines {
        operations.push(Operation::new("Tf", vec!["F1".into(), (*size).into()]));
        operations.push(Operation::new("Tm", vec![
            1.into(),
            0.into(),
            0.into(),
            1.into(),
            72.into(),
            y.into(),
        ]));
        operations.push(Operation::new("Tj", vec![Object::String(
            text.as_bytes().to_vec(),
            StringFormat::Literal,
        )]));
        y -= 24;
    }
    operations.push(Operation::new("ET", vec![]));

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("encode content"),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("save pdf");
}

fn config_for(root: &TempDir, search_url: &str) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("SME_INPUT_DIR", root.path().join("input").display().to_string()),
        (
            "SME_STORE_PATH",
            root.path().join("data/docs.json").display().to_string(),
        ),
        ("SME_CHUNK_WORDS", "5".to_string()),
        ("ES_HOST", search_url.to_string()),
        ("ES_INDEX", "manuals".to_string()),
    ]);
    Config::from_lookup(|key| vars.get(key).cloned()).expect("config")
}

#[tokio::test]
async fn directory_to_search_engine_round_trip() {
    let root = TempDir::new().expect("tempdir");
    let input = root.path().join("input");
    std::fs::create_dir_all(&input).expect("input dir");
    write_pdf(
        &input.join("a_manual.pdf"),
        &[
            ("Introduction", 18),
            ("Welcome to the device.", 12),
            ("It is small.", 12),
            ("Wiring", 18),
            ("Red to red.", 12),
        ],
    );
    write_pdf(
        &input.join("b_manual.PDF"),
        &[
            ("Introduction", 20),
            ("Second manual text.", 12),
            ("More text.", 12),
        ],
    );
    std::fs::write(input.join("c_broken.pdf"), b"not a pdf").expect("broken pdf");

    let server = MockServer::start_async().await;
    let exists = server
        .mock_async(|when, then| {
            when.method(GET).path("/manuals");
            then.status(404);
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(PUT).path("/manuals");
            then.status(200).json_body(json!({ "acknowledged": true }));
        })
        .await;
    let bulk = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/manuals/_bulk")
                .body_contains(r#"{"index":{"_id":"Introduction (2)"}}"#)
                .body_contains(r#""source":"b_manual.PDF""#);
            then.status(200).json_body(json!({
                "errors": false,
                "items": [
                    { "index": { "_id": "Introduction", "result": "created" } },
                    { "index": { "_id": "Wiring", "result": "created" } },
                    { "index": { "_id": "Introduction (2)", "result": "created" } }
                ]
            }));
        })
        .await;

    let config = config_for(&root, &server.base_url());
    let service = KnowledgeService::load(&config).expect("service");

    let outcome = service
        .rebuild_from_directory(&config.input_dir)
        .await
        .expect("rebuild");
    assert_eq!(outcome.documents_processed, 2);
    assert_eq!(outcome.documents_skipped, 1);
    assert_eq!(outcome.headings, 3);

    let store = load_store(&config.store_path).expect("persisted store");
    assert_eq!(
        store.keys().collect::<Vec<_>>(),
        ["Introduction", "Wiring", "Introduction (2)"]
    );
    let intro = store.get("Introduction").expect("intro");
    assert_eq!(intro.content, "Welcome to the device. It is small.");
    assert_eq!(intro.source, "a_manual.pdf");
    let second = store.get("Introduction (2)").expect("second intro");
    assert_eq!(second.title, "Introduction");
    assert_eq!(second.source, "b_manual.PDF");

    let summary = service.index_documents().await.expect("index");
    assert_eq!(summary.inserted, 3);
    exists.assert_async().await;
    create.assert_async().await;
    bulk.assert_async().await;
}

#[tokio::test]
async fn submissions_are_chunked_and_appended() {
    let root = TempDir::new().expect("tempdir");
    std::fs::create_dir_all(root.path().join("input")).expect("input dir");

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/manuals");
            then.status(200).json_body(json!({ "manuals": {} }));
        })
        .await;
    let bulk = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/manuals/_bulk")
                .body_contains("Field notes (Part 1/2)")
                .body_contains("Field notes (Part 2/2)");
            then.status(200).json_body(json!({
                "errors": false,
                "items": [
                    { "index": { "result": "created" } },
                    { "index": { "result": "created" } }
                ]
            }));
        })
        .await;
    let search = server
        .mock_async(|when, then| {
            when.method(POST).path("/manuals/_search").body_contains("\"size\":2");
            then.status(200).json_body(json!({
                "hits": {
                    "hits": [
                        {
                            "_id": "x",
                            "_score": 1.2,
                            "_source": {
                                "title": "Field notes (Part 1/2)",
                                "content": "one two three four five",
                                "source": "user_input"
                            }
                        }
                    ]
                }
            }));
        })
        .await;

    let config = config_for(&root, &server.base_url());
    let service = KnowledgeService::load(&config).expect("service");

    let outcome = service
        .submit_text("Field notes", "one two three four five six seven")
        .await
        .expect("submit");
    assert_eq!(outcome.chunk_ids.len(), 2);
    assert_eq!(outcome.indexed, 2);
    bulk.assert_async().await;

    let store = load_store(&config.store_path).expect("persisted store");
    assert_eq!(store.len(), 2);
    let first = store.get(&outcome.chunk_ids[0]).expect("first chunk");
    assert_eq!(first.id.as_deref(), Some(outcome.chunk_ids[0].as_str()));
    assert_eq!(first.source, USER_INPUT_SOURCE);
    assert_eq!(first.content, "one two three four five");

    let context = service.query_context("notes").await.expect("query");
    assert_eq!(
        context,
        "Heading: Field notes (Part 1/2)\nContent: one two three four five"
    );
    search.assert_async().await;
}
