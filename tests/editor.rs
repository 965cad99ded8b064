//! Tests for importing the visual editor's saved graphs.
mod common;
use common::*;
use kaiwa::error::{GraphError, ImportError};
use kaiwa::prelude::*;
use kaiwa::step::{HttpMethod, StepPayload};
use serde_json::json;

fn import(value: serde_json::Value) -> std::result::Result<Graph, ImportError> {
    EditorGraph::from_json(&value.to_string())?.into_graph()
}

#[test]
fn test_imports_editor_graph() {
    let graph = EditorGraph::from_json(EDITOR_GRAPH_JSON)
        .unwrap()
        .with_name("Support Bot")
        .into_graph()
        .expect("Failed to import");

    assert_eq!(graph.name(), "Support Bot");
    assert_eq!(graph.nodes().len(), 4);
    assert_eq!(graph.entry().unwrap().id, "start");
    assert!(graph.validate().is_ok());

    let welcome = graph.get_node("node-1").unwrap();
    assert_eq!(welcome.label, "Welcome");
    assert_eq!(welcome.steps[0].kind, StepKind::Text);
    assert_eq!(welcome.steps[1].kind, StepKind::QuickReply);
    assert_eq!(welcome.steps[1].outcome_count(), Some(2));
    assert_eq!(welcome.steps[0].id, "node-1:0");

    assert_eq!(
        graph
            .edge_at("node-1", SourcePort::Option { step: 1, option: 0 })
            .map(|e| e.target_node_id.as_str()),
        Some("node-2")
    );
    assert_eq!(
        graph
            .edge_at("node-1", SourcePort::StepDefault { step: 1 })
            .map(|e| e.target_node_id.as_str()),
        Some("node-3")
    );
    assert!(graph.edge_at("node-2", SourcePort::Default).is_some());
}

#[test]
fn test_import_maps_step_details() {
    let graph = EditorGraph::from_json(EDITOR_GRAPH_JSON)
        .unwrap()
        .into_graph()
        .unwrap();
    assert_eq!(graph.name(), "Chatbot Flow 1");

    let details = graph.get_node("node-2").unwrap();
    match &details.steps[0].payload {
        StepPayload::Input(input) => {
            assert_eq!(input.variable, "email");
            assert_eq!(input.validation.max_retries, 2);
            assert_eq!(
                input.validation.error_message.as_deref(),
                Some("That is not an email")
            );
        }
        other => panic!("Expected input payload, got {:?}", other),
    }

    // Website inputs become text inputs with a URL pattern.
    assert_eq!(details.steps[1].kind, StepKind::TextInput);
    match &details.steps[1].payload {
        StepPayload::Input(input) => assert!(input.validation.regex.is_some()),
        other => panic!("Expected input payload, got {:?}", other),
    }

    match &details.steps[2].payload {
        StepPayload::ListMenu(list) => {
            assert_eq!(list.button_label, "Topics");
            assert_eq!(list.options.len(), 2);
            assert_eq!(list.options[0].description.as_deref(), Some("Plans and billing"));
            assert_eq!(list.options[1].description, None);
        }
        other => panic!("Expected list payload, got {:?}", other),
    }

    let goodbye = graph.get_node("node-3").unwrap();
    assert_eq!(goodbye.steps[0].kind, StepKind::Text);

    let names: Vec<String> = collect_variables(&graph).into_iter().map(|v| v.name).collect();
    assert_eq!(names, vec!["email", "website"]);
}

#[test]
fn test_imported_graph_compiles() {
    let graph = EditorGraph::from_json(EDITOR_GRAPH_JSON)
        .unwrap()
        .into_graph()
        .unwrap();
    let document = Compiler::builder(&graph).build().compile().unwrap();
    assert_eq!(document.start.as_deref(), Some("node-1"));
    assert_eq!(document.screens.len(), 3);
    assert!(document.screen("node-1").unwrap().terminal);
    assert!(!document.screen("node-2").unwrap().terminal);
    assert!(document.screen("node-3").unwrap().terminal);
}

#[test]
fn test_import_rejects_unknown_step_type() {
    let err = import(json!({
        "nodes": [
            { "id": "start", "data": { "label": "Start", "isStart": true, "steps": [] } },
            { "id": "n1", "data": { "label": "A", "steps": [{ "type": "File Input", "content": "Upload" }] } }
        ],
        "edges": []
    }))
    .unwrap_err();
    match err {
        ImportError::UnknownStepType { node_id, type_name } => {
            assert_eq!(node_id, "n1");
            assert_eq!(type_name, "File Input");
        }
        other => panic!("Expected UnknownStepType, got {:?}", other),
    }
}

#[test]
fn test_import_rejects_malformed_handle() {
    let err = import(json!({
        "nodes": [
            { "id": "start", "data": { "label": "Start", "isStart": true } },
            { "id": "n1", "data": { "label": "A", "steps": [{ "type": "Text", "content": "Hi" }] } }
        ],
        "edges": [{ "source": "start", "sourceHandle": "output-0", "target": "n1" }]
    }))
    .unwrap_err();
    assert!(matches!(err, ImportError::InvalidHandle { ref handle, .. } if handle == "output-0"));
}

#[test]
fn test_import_validates_drafts() {
    let err = import(json!({
        "nodes": [
            { "id": "start", "data": { "label": "Start", "isStart": true } },
            { "id": "n1", "data": { "label": "A", "steps": [{
                "type": "Quick Reply",
                "content": "Pick",
                "buttons": [{ "label": "1" }, { "label": "2" }, { "label": "3" }, { "label": "4" }]
            }] } }
        ],
        "edges": []
    }))
    .unwrap_err();
    assert!(matches!(
        err,
        ImportError::Graph(GraphError::InvalidStepPayload { .. })
    ));

    let err = import(json!({ "nodes": [], "edges": [] })).unwrap_err();
    assert!(matches!(err, ImportError::Graph(GraphError::NoEntryNode)));

    assert!(matches!(
        EditorGraph::from_json("{ not json"),
        Err(ImportError::JsonParseError(_))
    ));
}

#[test]
fn test_import_rejects_non_finite_bounds() {
    let err = import(json!({
        "nodes": [
            { "id": "start", "data": { "label": "Start", "isStart": true } },
            { "id": "n1", "data": { "label": "A", "steps": [
                { "type": "Number Input", "content": "Age?", "variable": "age",
                  "validation": { "min": "NaN", "max": "inf" } }
            ] } }
        ],
        "edges": []
    }))
    .unwrap_err();
    match err {
        ImportError::Graph(GraphError::InvalidStepPayload { node_id, violations, .. }) => {
            assert_eq!(node_id, "n1");
            assert_eq!(violations.len(), 2);
        }
        other => panic!("Expected InvalidStepPayload, got {:?}", other),
    }
}

#[test]
fn test_import_parses_lenient_fields() {
    let graph = import(json!({
        "nodes": [
            { "id": "start", "data": { "label": "Start", "isStart": true } },
            { "id": "n1", "data": { "label": "A", "steps": [
                { "type": "Number Input", "content": "Age?", "variable": " age ",
                  "validation": { "min": "18", "max": 99, "maxRetries": 4 } },
                { "type": "Webhook", "url": "https://hooks.example.com", "method": "get" },
                { "type": "Chatbot", "targetFlowId": "flow-7", "targetNodeId": "" }
            ] } }
        ],
        "edges": [{ "source": "start", "target": "n1" }]
    }))
    .unwrap();
    assert_eq!(Graph::from_json(&graph.to_json().unwrap()).unwrap(), graph);

    let steps = &graph.get_node("n1").unwrap().steps;
    match &steps[0].payload {
        StepPayload::Input(input) => {
            assert_eq!(input.variable, "age");
            assert_eq!(input.validation.min, Some(18.0));
            assert_eq!(input.validation.max, Some(99.0));
            assert_eq!(input.validation.max_retries, 4);
        }
        other => panic!("Expected input payload, got {:?}", other),
    }
    match &steps[1].payload {
        StepPayload::Webhook(hook) => assert_eq!(hook.method, HttpMethod::Get),
        other => panic!("Expected webhook payload, got {:?}", other),
    }
    match &steps[2].payload {
        StepPayload::SubflowJump(jump) => {
            assert_eq!(jump.target_flow_id, "flow-7");
            assert_eq!(jump.target_node_id, None);
        }
        other => panic!("Expected subflow jump payload, got {:?}", other),
    }
}
