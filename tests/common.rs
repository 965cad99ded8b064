//! Common test utilities for building conversation graphs.
use kaiwa::prelude::*;

/// Entry -> A (one text step, no outgoing edge).
#[allow(dead_code)]
pub fn create_single_text_graph() -> (Graph, String) {
    let graph = Graph::new("Single");
    let (graph, a) = graph
        .add_node(vec![Step::text("Hello there")])
        .expect("text step is valid");
    let graph = graph
        .connect(ENTRY_NODE_ID, SourcePort::Default, &a)
        .expect("entry can route to A");
    (graph, a)
}

/// Entry -> A (TextInput storing `user_email`) -> B (text using the variable).
#[allow(dead_code)]
pub fn create_signup_graph() -> (Graph, String, String) {
    let graph = Graph::new("Signup");
    let (graph, a) = graph
        .add_node(vec![Step::input(
            StepKind::TextInput,
            "What is your email?",
            "user_email",
        )])
        .expect("input step is valid");
    let (graph, b) = graph
        .add_node(vec![Step::text("We will write to {{vars.user_email}}")])
        .expect("text step is valid");
    let graph = graph
        .connect(ENTRY_NODE_ID, SourcePort::Default, &a)
        .and_then(|g| g.connect(&a, SourcePort::Default, &b))
        .expect("edges are valid");
    (graph, a, b)
}

/// Entry -> A with a two-button quick reply; only button 0 is routed, to B.
#[allow(dead_code)]
pub fn create_quick_reply_graph() -> (Graph, String, String) {
    let graph = Graph::new("Choices");
    let (graph, a) = graph
        .add_node(vec![Step::quick_reply("Continue?", &["Yes", "No"])])
        .expect("quick reply is valid");
    let (graph, b) = graph
        .add_node(vec![Step::text("Great!")])
        .expect("text step is valid");
    let graph = graph
        .connect(ENTRY_NODE_ID, SourcePort::Default, &a)
        .and_then(|g| g.connect(&a, SourcePort::Option { step: 0, option: 0 }, &b))
        .expect("edges are valid");
    (graph, a, b)
}

/// A node holding `[quick reply (3), text, list (2)]` plus two plain targets,
/// with routes on several step ports. Returns `(graph, menu, b, c)`.
#[allow(dead_code)]
pub fn create_menu_graph() -> (Graph, String, String, String) {
    let graph = Graph::new("Menu");
    let (graph, menu) = graph
        .add_node(vec![
            Step::quick_reply("How can we help?", &["Sales", "Support", "Other"]),
            Step::text("Or pick from the list"),
            Step::list_menu("Departments", "Open list", &["Billing", "Shipping"]),
        ])
        .expect("menu steps are valid");
    let (graph, b) = graph
        .add_node(vec![Step::text("Sales here")])
        .expect("text step is valid");
    let (graph, c) = graph
        .add_node(vec![Step::text("Support here")])
        .expect("text step is valid");
    let graph = graph
        .connect(ENTRY_NODE_ID, SourcePort::Default, &menu)
        .and_then(|g| g.connect(&menu, SourcePort::Option { step: 0, option: 0 }, &b))
        .and_then(|g| g.connect(&menu, SourcePort::Option { step: 0, option: 1 }, &c))
        .and_then(|g| g.connect(&menu, SourcePort::Option { step: 2, option: 1 }, &c))
        .and_then(|g| g.connect(&menu, SourcePort::StepDefault { step: 2 }, &b))
        .expect("edges are valid");
    (graph, menu, b, c)
}

/// A graph as the visual editor saves it, including render-only fields.
#[allow(dead_code)]
pub const EDITOR_GRAPH_JSON: &str = r##"{
    "nodes": [
        {
            "id": "start",
            "type": "startNode",
            "position": { "x": 0, "y": 0 },
            "data": { "label": "Start", "isStart": true, "steps": [] }
        },
        {
            "id": "node-1",
            "type": "groupNode",
            "position": { "x": 300, "y": 0 },
            "data": {
                "label": "Welcome",
                "steps": [
                    { "type": "Text", "content": "Hi {{contact.first_name}}", "icon": "T", "iconBg": "#fff" },
                    {
                        "type": "Quick Reply",
                        "content": "Need help?",
                        "buttons": [{ "label": "Yes" }, { "label": "No" }]
                    }
                ]
            }
        },
        {
            "id": "node-2",
            "type": "groupNode",
            "position": { "x": 600, "y": 0 },
            "data": {
                "label": "Details",
                "steps": [
                    { "type": "Email Input", "content": "Your email?", "variable": "email",
                      "validation": { "maxRetries": "2", "errorMessage": "That is not an email" } },
                    { "type": "Website Input", "content": "Your site?", "variable": "website" },
                    {
                        "type": "List",
                        "content": "Pick a topic",
                        "buttonText": "Topics",
                        "options": [
                            { "title": "Pricing", "description": "Plans and billing" },
                            { "title": "Integrations" }
                        ]
                    }
                ]
            }
        },
        {
            "id": "node-3",
            "type": "groupNode",
            "position": { "x": 900, "y": 0 },
            "data": {
                "label": "Goodbye",
                "steps": [{ "type": "Text Message", "content": "Bye {{vars.email}}" }]
            }
        }
    ],
    "edges": [
        { "id": "e1", "source": "start", "target": "node-1", "sourceHandle": null },
        { "id": "e2", "source": "node-1", "target": "node-2", "sourceHandle": "handle-1-0" },
        { "id": "e3", "source": "node-1", "target": "node-3", "sourceHandle": "handle-1-default" },
        { "id": "e4", "source": "node-2", "target": "node-3" }
    ]
}"##;
