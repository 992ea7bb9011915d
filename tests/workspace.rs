//! End-to-end tests for a mapping session and the execution seam.
mod common;
use common::*;
use mapflow::execution::run_test;
use mapflow::flow::NodeKind;
use mapflow::prelude::*;
use std::cell::Cell;

type Reply = std::result::Result<TestResponse, ExecutionError>;

fn loaded_workspace() -> MappingWorkspace {
    let mut workspace = MappingWorkspace::new(MessageKind::Request);
    workspace.load_source(ORDER_XML).expect("valid source");
    workspace.load_target(PURCHASE_ORDER_XML).expect("valid target");
    workspace
}

#[test]
fn test_loaded_structures_match_fixture_trees() {
    let workspace = loaded_workspace();
    let paths = |tree: &[FieldNode]| -> Vec<String> {
        mapflow::schema::collect_all(tree)
            .iter()
            .map(|n| n.path.clone())
            .collect()
    };
    assert_eq!(paths(workspace.source_tree()), paths(&order_tree()));
    assert_eq!(paths(workspace.target_tree()), paths(&purchase_order_tree()));
}

#[test]
fn test_failed_load_keeps_previous_tree() {
    let mut workspace = loaded_workspace();
    let before = workspace.source_tree().to_vec();

    assert!(workspace.load_source("<Order><id>").is_err());
    assert_eq!(workspace.source_tree(), before.as_slice());
}

#[test]
fn test_combined_structure_is_filtered_by_message_kind() {
    let mut workspace = MappingWorkspace::new(MessageKind::Response);
    let tree = workspace.load_source(COMBINED_XML).expect("valid XML");
    assert_eq!(tree[0].name, "getOrderResponse");

    workspace
        .set_message_kind(MessageKind::Fault)
        .expect("raw document is still valid");
    assert_eq!(workspace.source_tree()[0].name, "getOrderFault");
    assert_eq!(workspace.message_kind(), MessageKind::Fault);
}

#[test]
fn test_switching_kind_drops_mappings_outside_the_new_tree() {
    let mut workspace = MappingWorkspace::new(MessageKind::Request);
    workspace.load_source(COMBINED_XML).expect("valid XML");
    workspace.load_target(PURCHASE_ORDER_XML).expect("valid XML");
    workspace
        .associate("getOrderRequest.orderId", "PurchaseOrder.id", AssociationMode::Merge)
        .expect("paths exist");

    let dropped = workspace
        .set_message_kind(MessageKind::Response)
        .expect("raw documents are still valid");
    assert_eq!(dropped.len(), 1);
    assert_eq!(dropped[0].target_path, "PurchaseOrder.id");
    assert!(workspace.mappings().is_empty());
    assert!(workspace.test_request(ORDER_XML).mappings.is_empty());

    workspace
        .associate("getOrderResponse.total", "PurchaseOrder.total", AssociationMode::Merge)
        .expect("paths exist");
    let dropped = workspace
        .set_message_kind(MessageKind::Response)
        .expect("raw documents are still valid");
    assert!(dropped.is_empty());
    assert_eq!(workspace.mappings().len(), 1);
}

#[test]
fn test_json_schema_structures_are_not_filtered() {
    let mut workspace = MappingWorkspace::new(MessageKind::Fault);
    let tree = workspace.load_target(CUSTOMER_SCHEMA).expect("valid schema");
    assert_eq!(tree[0].name, "Customer");
}

#[test]
fn test_auto_map_scenario_leaves_tax_unmapped() {
    let mut workspace = loaded_workspace();
    let report = workspace.auto_map(None).expect("no selection to resolve");

    assert_eq!(report.status, AutoMapStatus::Created(2));
    assert_eq!(workspace.mappings().len(), 2);
    assert!(!workspace.mappings().is_target_mapped("PurchaseOrder.tax"));

    // A second run finds nothing new.
    let again = workspace.auto_map(None).expect("no selection to resolve");
    assert_eq!(again.status, AutoMapStatus::NoMatches);
    assert_eq!(workspace.mappings().len(), 2);
}

#[test]
fn test_scoped_auto_map_with_unknown_path_fails() {
    let mut workspace = loaded_workspace();
    assert_eq!(
        workspace.auto_map(Some(("Order.nope", "PurchaseOrder.tax"))),
        Err(MappingError::FieldNotFound("Order.nope".to_string()))
    );
    assert!(workspace.mappings().is_empty());
}

#[test]
fn test_associate_by_path_merges_sources() {
    let mut workspace = loaded_workspace();
    workspace
        .associate("Order.id", "PurchaseOrder.tax", AssociationMode::Merge)
        .expect("paths exist");
    let outcome = workspace
        .associate("Order.total", "PurchaseOrder.tax", AssociationMode::Merge)
        .expect("paths exist");

    assert!(matches!(outcome, AssociationOutcome::Merged(_)));
    let mapping = workspace
        .mappings()
        .for_target("PurchaseOrder.tax")
        .expect("mapped");
    assert_eq!(mapping.source_fields.len(), 2);
}

#[test]
fn test_flow_editor_commit_replaces_mapping_content() {
    let mut workspace = loaded_workspace();
    workspace.auto_map(None).expect("no selection to resolve");
    let original = workspace
        .mappings()
        .for_target("PurchaseOrder.total")
        .expect("auto-mapped")
        .clone();

    let mut editor = workspace
        .open_flow_editor("PurchaseOrder.total")
        .expect("target exists");
    // The direct mapping comes back as source -> target.
    assert_eq!(editor.state(), EditorState::Populated { valid: true });

    let round = editor
        .add_function(BuiltinFunction::Round.descriptor())
        .expect("editor is open");
    let source_node = editor
        .graph()
        .nodes
        .iter()
        .find(|n| n.kind() == NodeKind::SourceField)
        .map(|n| n.id.clone())
        .expect("restored source node");
    editor
        .connect(&source_node, OUTPUT_HANDLE, &round, "value")
        .expect("valid edge");
    editor.connect_to_target(&round).expect("valid edge");

    let id = workspace.commit_flow(&mut editor).expect("graph is valid");
    assert_eq!(id, original.id);
    assert_eq!(workspace.mappings().len(), 2);

    let updated = workspace.mappings().get(&id).expect("still there");
    assert_eq!(updated.name, original.name);
    assert!(updated.visual_flow_data.is_some());
    assert_eq!(editor.state(), EditorState::Saved);

    // Reopening restores the saved graph exactly.
    let reopened = workspace
        .open_flow_editor("PurchaseOrder.total")
        .expect("target exists");
    assert_eq!(Some(reopened.graph()), updated.visual_flow_data.as_ref());
}

#[test]
fn test_toggle_expanded_in_workspace() {
    let mut workspace = loaded_workspace();
    workspace.toggle_expanded(Side::Target, "PurchaseOrder");
    assert!(workspace.target_tree()[0].expanded);
    assert!(!workspace.source_tree()[0].expanded);
}

#[test]
fn test_test_request_carries_session_state() {
    let mut workspace = MappingWorkspace::new(MessageKind::Request);
    workspace.load_source(COMBINED_XML).expect("valid XML");
    workspace.load_target(PURCHASE_ORDER_XML).expect("valid XML");
    workspace
        .associate("getOrderRequest.orderId", "PurchaseOrder.id", AssociationMode::Merge)
        .expect("paths exist");

    let request = workspace.test_request("<getOrderRequest><orderId>7</orderId></getOrderRequest>");
    assert_eq!(request.mapping_type, MessageKind::Request);
    assert_eq!(request.mappings.len(), 1);
    assert!(request.source_structure_xml.starts_with("<getOrderRequest"));

    let json = serde_json::to_value(&request).expect("serializable");
    assert_eq!(json["mappingType"], "request");
    assert!(json.get("inputXml").is_some());
    assert!(json.get("targetStructureXml").is_some());
}

#[test]
fn test_run_test_returns_output_xml() {
    let workspace = loaded_workspace();
    let calls = Cell::new(0);
    let executor = |request: &TestRequest| -> Reply {
        calls.set(calls.get() + 1);
        assert_eq!(request.input_xml, ORDER_XML);
        Ok(TestResponse {
            success: true,
            output_xml: Some("<PurchaseOrder/>".to_string()),
            error: None,
        })
    };

    let output = workspace.run_test(&executor, ORDER_XML);
    assert_eq!(output, Ok("<PurchaseOrder/>".to_string()));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_backend_failure_is_surfaced_verbatim() {
    let mut workspace = loaded_workspace();
    workspace.auto_map(None).expect("no selection to resolve");
    let before = workspace.mappings().clone();

    let executor = |_: &TestRequest| -> Reply {
        Ok(TestResponse {
            success: false,
            output_xml: None,
            error: Some("XPath 'Order/total' did not match".to_string()),
        })
    };
    assert_eq!(
        workspace.run_test(&executor, ORDER_XML),
        Err(ExecutionError::Backend(
            "XPath 'Order/total' did not match".to_string()
        ))
    );
    assert_eq!(workspace.mappings(), &before);
}

#[test]
fn test_transport_errors_and_empty_output() {
    let request = loaded_workspace().test_request(ORDER_XML);

    let unreachable = |_: &TestRequest| -> Reply {
        Err(ExecutionError::Transport("connection refused".to_string()))
    };
    assert_eq!(
        run_test(&unreachable, &request),
        Err(ExecutionError::Transport("connection refused".to_string()))
    );

    let silent = |_: &TestRequest| -> Reply {
        Ok(TestResponse {
            success: true,
            output_xml: None,
            error: None,
        })
    };
    assert_eq!(run_test(&silent, &request), Err(ExecutionError::EmptyOutput));
}
