//! Tests for the mapping record model and the mapping set.
mod common;
use common::*;
use mapflow::mapping::{FunctionNodeData, MappingKind, NODE_MAPPING};
use mapflow::prelude::*;

#[test]
fn test_two_drops_onto_one_target_merge_into_one_mapping() {
    let source = shipment_tree();
    let target = delivery_tree();
    let mut ids = SequentialIds::new();
    let mut set = MappingSet::new();

    let first = set.associate(
        field(&source, "Shipment.customer.name"),
        field(&target, "Delivery.recipient.name"),
        AssociationMode::Merge,
        &mut ids,
    );
    let second = set.associate(
        field(&source, "Shipment.customer.email"),
        field(&target, "Delivery.recipient.name"),
        AssociationMode::Merge,
        &mut ids,
    );

    assert!(matches!(first, AssociationOutcome::Created(_)));
    assert_eq!(second, AssociationOutcome::Merged(first.mapping_id().to_string()));
    assert_eq!(set.len(), 1);

    let mapping = set
        .for_target("Delivery.recipient.name")
        .expect("target should be mapped");
    assert_eq!(mapping.source_fields, vec!["name", "email"]);
    assert_eq!(
        mapping.source_paths,
        vec!["Shipment.customer.name", "Shipment.customer.email"]
    );
}

#[test]
fn test_dropping_the_same_source_twice_is_unchanged() {
    let source = order_tree();
    let target = purchase_order_tree();
    let mut ids = SequentialIds::new();
    let mut set = MappingSet::new();

    let total = field(&source, "Order.total");
    let tax = field(&target, "PurchaseOrder.tax");
    set.associate(total, tax, AssociationMode::Merge, &mut ids);
    let again = set.associate(total, tax, AssociationMode::Merge, &mut ids);

    assert!(matches!(again, AssociationOutcome::Unchanged(_)));
    assert_eq!(set.as_slice()[0].source_paths.len(), 1);
}

#[test]
fn test_replace_mode_discards_the_old_mapping() {
    let source = order_tree();
    let target = purchase_order_tree();
    let mut ids = SequentialIds::new();
    let mut set = MappingSet::new();

    let tax = field(&target, "PurchaseOrder.tax");
    let created = set.associate(field(&source, "Order.total"), tax, AssociationMode::Merge, &mut ids);
    let replaced = set.associate(field(&source, "Order.id"), tax, AssociationMode::Replace, &mut ids);

    assert!(matches!(replaced, AssociationOutcome::Replaced(_)));
    assert_ne!(created.mapping_id(), replaced.mapping_id());
    assert_eq!(set.len(), 1);
    assert_eq!(set.as_slice()[0].source_paths, vec!["Order.id"]);
    assert!(set.get(created.mapping_id()).is_none());
}

#[test]
fn test_structural_drop_records_node_mapping_parameters() {
    let source = shipment_tree();
    let target = delivery_tree();
    let mut ids = SequentialIds::new();
    let mut set = MappingSet::new();

    set.associate(
        field(&source, "Shipment.customer"),
        field(&target, "Delivery.items"),
        AssociationMode::Merge,
        &mut ids,
    );

    let mapping = &set.as_slice()[0];
    assert!(mapping.is_node_mapping());
    let function = mapping.function_node.as_ref().expect("node mapping marker");
    assert_eq!(function.function_name, NODE_MAPPING);
    assert_eq!(function.parameters["sourceType"], "object");
    assert_eq!(function.parameters["targetType"], "array");
    assert_eq!(function.parameters["isSourceArray"], "false");
    assert_eq!(function.parameters["isTargetArray"], "true");
}

#[test]
fn test_apply_auto_map_skips_targets_mapped_meanwhile() {
    let source = order_tree();
    let target = purchase_order_tree();
    let mut ids = SequentialIds::new();
    let mut set = MappingSet::new();

    let mut mapper = AutoMapper::builder().build();
    let report = mapper.auto_map(&source, &target, set.as_slice(), None);

    set.associate(
        field(&source, "Order.total"),
        field(&target, "PurchaseOrder.total"),
        AssociationMode::Merge,
        &mut ids,
    );
    assert_eq!(set.apply_auto_map(&report), 1);
    assert_eq!(set.len(), 2);
}

#[test]
fn test_upsert_flow_keeps_identity_of_existing_mapping() {
    let source = order_tree();
    let target = purchase_order_tree();
    let mut ids = SequentialIds::new();
    let mut set = MappingSet::new();

    let tax = field(&target, "PurchaseOrder.tax");
    let created = set.associate(field(&source, "Order.total"), tax, AssociationMode::Merge, &mut ids);
    let original_name = set.as_slice()[0].name.clone();

    let mut graph = FlowGraph::new(tax.clone());
    let total = graph
        .add_source_field(&source, "Order.total")
        .expect("field exists");
    graph.connect_to_target(&total).expect("valid edge");
    let saved = graph.save(tax, &mut ids).expect("graph is valid");

    let stored_id = set.upsert_flow(saved);
    assert_eq!(stored_id, created.mapping_id());
    assert_eq!(set.len(), 1);

    let mapping = &set.as_slice()[0];
    assert_eq!(mapping.name, original_name);
    assert_eq!(mapping.kind(), MappingKind::VisualFlow);
    assert_eq!(mapping.visual_flow_data, Some(graph));
}

#[test]
fn test_remove_operations() {
    let mut mapper = AutoMapper::builder().build();
    let report = mapper.auto_map(&shipment_tree(), &delivery_tree(), &[], None);
    let mut set = MappingSet::new();
    set.apply_auto_map(&report);
    let total = set.len();
    assert!(total >= 4);

    let first = set.as_slice()[0].id.clone();
    set.remove(&first).expect("mapping exists");
    assert_eq!(
        set.remove(&first),
        Err(MappingError::MappingNotFound(first.clone()))
    );

    assert!(set.remove_for_target("Delivery.items.qty").is_some());
    assert!(set.remove_for_target("Delivery.items.qty").is_none());
    assert_eq!(set.len(), total - 2);

    let ids: Vec<String> = set.iter().take(2).map(|m| m.id.clone()).collect();
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    assert_eq!(set.remove_many(&ids), 2);

    set.clear();
    assert!(set.is_empty());
}

#[test]
fn test_export_and_import_round_trip() {
    let source = shipment_tree();
    let target = delivery_tree();
    let mut ids = SequentialIds::new();
    let mut mapper = AutoMapper::builder().build();
    let mut set = MappingSet::new();
    set.apply_auto_map(&mapper.auto_map(&source, &target, &[], None));

    let recipient = field(&target, "Delivery.recipient.name");
    let mut graph = FlowGraph::new(recipient.clone());
    let name = graph
        .add_source_field(&source, "Shipment.customer.name")
        .expect("field exists");
    let upper = graph.add_function(BuiltinFunction::ToUpperCase.descriptor());
    graph.connect(&name, OUTPUT_HANDLE, &upper, "value").expect("valid edge");
    graph.connect_to_target(&upper).expect("valid edge");
    set.upsert_flow(graph.save(recipient, &mut ids).expect("graph is valid"));

    let json = set.to_json().expect("serializable");
    let restored = MappingSet::from_json(&json).expect("readable");
    assert_eq!(restored, set);

    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
    let first = &value[0];
    assert!(first.get("sourceFields").is_some());
    assert!(first.get("targetPath").is_some());
}

#[test]
fn test_import_accepts_string_encoded_flow_data() {
    let target = purchase_order_tree();
    let tax = field(&target, "PurchaseOrder.tax");
    let graph = FlowGraph::new(tax.clone());
    let encoded = graph.to_json().expect("serializable");

    let json = serde_json::json!([{
        "id": "m-1",
        "name": "tax",
        "sourceFields": [],
        "sourcePaths": [],
        "targetField": "tax",
        "targetPath": "PurchaseOrder.tax",
        "visualFlowData": encoded,
    }])
    .to_string();

    let set = MappingSet::from_json(&json).expect("string-encoded flow data is accepted");
    assert_eq!(set.as_slice()[0].visual_flow_data, Some(graph));
    assert!(set.as_slice()[0].needs_transformation());
}

#[test]
fn test_import_rejects_duplicate_targets() {
    let json = r#"[
        {"id": "a", "name": "a", "sourceFields": ["id"], "sourcePaths": ["Order.id"],
         "targetField": "id", "targetPath": "PurchaseOrder.id"},
        {"id": "b", "name": "b", "sourceFields": ["total"], "sourcePaths": ["Order.total"],
         "targetField": "id", "targetPath": "PurchaseOrder.id"}
    ]"#;
    assert_eq!(
        MappingSet::from_json(json),
        Err(MappingError::DuplicateTarget("PurchaseOrder.id".to_string()))
    );
}

#[test]
fn test_legacy_function_mapping_is_recognised() {
    let mut mapping: FieldMapping = serde_json::from_str(
        r#"{"id": "m", "name": "n", "sourceFields": ["id"], "sourcePaths": ["Order.id"],
            "targetField": "id", "targetPath": "PurchaseOrder.id"}"#,
    )
    .expect("minimal mapping");
    assert_eq!(mapping.kind(), MappingKind::Direct);

    mapping.function_node = Some(FunctionNodeData::new("fn-1", "trim"));
    assert!(matches!(mapping.kind(), MappingKind::Function(f) if f.function_name == "trim"));
}

#[test]
fn test_merging_into_a_saved_flow_keeps_every_source_wired() {
    let mut workspace = MappingWorkspace::new(MessageKind::Request);
    workspace.load_source(ORDER_XML).expect("valid source");
    workspace.load_target(PURCHASE_ORDER_XML).expect("valid target");

    let mut editor = workspace
        .open_flow_editor("PurchaseOrder.tax")
        .expect("target exists");
    let id = editor
        .add_source_field(workspace.source_tree(), "Order.id")
        .expect("field exists");
    editor.connect_to_target(&id).expect("valid edge");
    workspace.commit_flow(&mut editor).expect("graph is valid");

    let outcome = workspace
        .associate("Order.total", "PurchaseOrder.tax", AssociationMode::Merge)
        .expect("paths exist");
    assert!(matches!(outcome, AssociationOutcome::Merged(_)));

    let mapping = workspace
        .mappings()
        .for_target("PurchaseOrder.tax")
        .expect("mapped");
    assert_eq!(mapping.kind(), MappingKind::VisualFlow);
    assert_eq!(mapping.source_paths, vec!["Order.id", "Order.total"]);

    // The reopened graph wires both sources, so saving it keeps them.
    let mut reopened = workspace
        .open_flow_editor("PurchaseOrder.tax")
        .expect("target exists");
    assert_eq!(reopened.graph().wired_source_fields().len(), 2);
    let saved = reopened
        .save(&mut SequentialIds::starting_at(50))
        .expect("graph is valid");
    assert_eq!(saved.source_paths, vec!["Order.id", "Order.total"]);
}

#[test]
fn test_merging_a_leaf_into_a_node_mapping_drops_the_structural_marker() {
    let source = shipment_tree();
    let target = delivery_tree();
    let mut ids = SequentialIds::new();
    let mut set = MappingSet::new();

    let recipient = field(&target, "Delivery.recipient");
    set.associate(field(&source, "Shipment.customer"), recipient, AssociationMode::Merge, &mut ids);
    assert!(set.as_slice()[0].is_node_mapping());

    let merged = set.associate(
        field(&source, "Shipment.reference"),
        recipient,
        AssociationMode::Merge,
        &mut ids,
    );
    assert!(matches!(merged, AssociationOutcome::Merged(_)));

    let mapping = &set.as_slice()[0];
    assert_eq!(mapping.kind(), MappingKind::Direct);
    assert_eq!(
        mapping.source_paths,
        vec!["Shipment.customer", "Shipment.reference"]
    );
}
