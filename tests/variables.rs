//! Tests for variable collection and token helpers.
mod common;
use common::*;
use kaiwa::prelude::*;
use kaiwa::variables::*;

#[test]
fn test_collects_declared_variable_with_token() {
    let (graph, a, _) = create_signup_graph();
    let variables = collect_variables(&graph);
    assert_eq!(variables.len(), 1);
    assert_eq!(variables[0].name, "user_email");
    assert_eq!(variables[0].token, "{{vars.user_email}}");
    assert_eq!(variables[0].node_id, a);
    assert_eq!(
        variables[0].declaring_step_id,
        graph.get_node(&a).unwrap().steps[0].id
    );
}

#[test]
fn test_collection_order_and_duplicates() {
    let graph = Graph::new("Order");
    let (graph, first) = graph
        .add_node(vec![
            Step::input(StepKind::TextInput, "Name?", "name"),
            Step::text("Nice to meet you"),
            Step::input(StepKind::NumberInput, "Age?", "age"),
        ])
        .unwrap();
    let (graph, _) = graph
        .add_node(vec![
            Step::input(StepKind::PhoneInput, "Phone?", ""),
            Step::input(StepKind::TextInput, "Name again?", "name"),
            Step::input(StepKind::TimeInput, "When?", "slot"),
        ])
        .unwrap();

    let names: Vec<String> = collect_variables(&graph).into_iter().map(|v| v.name).collect();
    assert_eq!(names, vec!["name", "age", "name", "slot"]);
    assert_eq!(duplicate_names(&graph), vec!["name".to_string()]);

    // Duplicates are kept as-is, each with its own declaring step.
    let declared = collect_variables(&graph);
    assert_eq!(declared[0].node_id, first);
    assert_ne!(declared[0].declaring_step_id, declared[2].declaring_step_id);
}

#[test]
fn test_non_input_steps_declare_nothing() {
    let (graph, _, _, _) = create_menu_graph();
    assert!(collect_variables(&graph).is_empty());
    assert!(duplicate_names(&graph).is_empty());
}

#[test]
fn test_system_variables_are_fixed() {
    let tokens: Vec<String> = system_variables().iter().map(|v| v.token()).collect();
    assert_eq!(
        tokens,
        vec![
            "{{contact.name}}",
            "{{contact.first_name}}",
            "{{contact.phone}}",
            "{{contact.wa_id}}",
        ]
    );

    // Available regardless of graph content.
    let empty = Graph::new("Empty");
    assert_eq!(available_tokens(&empty), tokens);
}

#[test]
fn test_available_tokens_merge_graph_variables() {
    let graph = Graph::new("Tokens");
    let (graph, _) = graph
        .add_node(vec![
            Step::input(StepKind::EmailInput, "Email?", "email"),
            Step::input(StepKind::EmailInput, "Again?", "email"),
        ])
        .unwrap();
    let tokens = available_tokens(&graph);
    assert_eq!(tokens.len(), system_variables().len() + 1);
    assert_eq!(tokens.last().map(String::as_str), Some("{{vars.email}}"));
}

#[test]
fn test_token_builders_and_scanner() {
    assert_eq!(vars_token("city"), "{{vars.city}}");
    assert_eq!(contact_token("phone"), "{{contact.phone}}");

    let found = referenced_tokens("Hi {{contact.first_name}}, your code is {{ vars.code }}. {{other.x}} {{vars.}}");
    assert_eq!(
        found,
        vec![
            TokenRef {
                namespace: "contact".to_string(),
                name: "first_name".to_string()
            },
            TokenRef {
                namespace: "vars".to_string(),
                name: "code".to_string()
            },
        ]
    );
    assert!(referenced_tokens("no tokens here").is_empty());
}
