//! Common test fixtures: field trees, structure documents and mappings.
use mapflow::prelude::*;

/// `Order { id: string, total: number }`
#[allow(dead_code)]
pub fn order_tree() -> Vec<FieldNode> {
    vec![FieldNode::branch(
        "Order",
        "Order",
        FieldType::Object,
        vec![
            FieldNode::leaf("id", "Order.id", FieldType::String),
            FieldNode::leaf("total", "Order.total", FieldType::Number),
        ],
    )]
}

/// `PurchaseOrder { id: string, total: number, tax: number }`
#[allow(dead_code)]
pub fn purchase_order_tree() -> Vec<FieldNode> {
    vec![FieldNode::branch(
        "PurchaseOrder",
        "PurchaseOrder",
        FieldType::Object,
        vec![
            FieldNode::leaf("id", "PurchaseOrder.id", FieldType::String),
            FieldNode::leaf("total", "PurchaseOrder.total", FieldType::Number),
            FieldNode::leaf("tax", "PurchaseOrder.tax", FieldType::Number),
        ],
    )]
}

/// A source with a nested customer object and an array of order lines.
///
/// ```text
/// Shipment
///   reference: string
///   customer { name: string, email: string }
///   lines[] { sku: string, qty: number }
/// ```
#[allow(dead_code)]
pub fn shipment_tree() -> Vec<FieldNode> {
    vec![FieldNode::branch(
        "Shipment",
        "Shipment",
        FieldType::Object,
        vec![
            FieldNode::leaf("reference", "Shipment.reference", FieldType::String),
            FieldNode::branch(
                "customer",
                "Shipment.customer",
                FieldType::Object,
                vec![
                    FieldNode::leaf("name", "Shipment.customer.name", FieldType::String),
                    FieldNode::leaf("email", "Shipment.customer.email", FieldType::String),
                ],
            ),
            FieldNode::branch(
                "lines",
                "Shipment.lines",
                FieldType::Array,
                vec![
                    FieldNode::leaf("sku", "Shipment.lines.sku", FieldType::String),
                    FieldNode::leaf("qty", "Shipment.lines.qty", FieldType::Number),
                ],
            ),
        ],
    )]
}

/// The target counterpart of [`shipment_tree`], with differently named containers.
///
/// ```text
/// Delivery
///   reference: string
///   recipient { name: string, email: string }
///   items[] { sku: string, qty: number }
/// ```
#[allow(dead_code)]
pub fn delivery_tree() -> Vec<FieldNode> {
    vec![FieldNode::branch(
        "Delivery",
        "Delivery",
        FieldType::Object,
        vec![
            FieldNode::leaf("reference", "Delivery.reference", FieldType::String),
            FieldNode::branch(
                "recipient",
                "Delivery.recipient",
                FieldType::Object,
                vec![
                    FieldNode::leaf("name", "Delivery.recipient.name", FieldType::String),
                    FieldNode::leaf("email", "Delivery.recipient.email", FieldType::String),
                ],
            ),
            FieldNode::branch(
                "items",
                "Delivery.items",
                FieldType::Array,
                vec![
                    FieldNode::leaf("sku", "Delivery.items.sku", FieldType::String),
                    FieldNode::leaf("qty", "Delivery.items.qty", FieldType::Number),
                ],
            ),
        ],
    )]
}

/// A combined structure holding all three messages of one operation under a generic
/// wrapper root.
#[allow(dead_code)]
pub const COMBINED_XML: &str = "<SourceMessage>\
<getOrderRequest><orderId>42</orderId><customer><name>Ada</name></customer></getOrderRequest>\
<getOrderResponse><status>OK</status><total>19.5</total></getOrderResponse>\
<getOrderFault><code>E1</code><reason>missing</reason></getOrderFault>\
</SourceMessage>";

/// Like [`COMBINED_XML`] but under a root that is not a generic wrapper.
#[allow(dead_code)]
pub const SERVICE_XML: &str = "<OrderService version=\"2\">\
<OrderRequest><orderId>42</orderId></OrderRequest>\
<OrderResponse><status>OK</status></OrderResponse>\
</OrderService>";

/// Source sample for workspace tests, in the shape of [`order_tree`].
#[allow(dead_code)]
pub const ORDER_XML: &str = "<Order><id>A-1</id><total>10.5</total></Order>";

/// Target sample for workspace tests, in the shape of [`purchase_order_tree`].
#[allow(dead_code)]
pub const PURCHASE_ORDER_XML: &str =
    "<PurchaseOrder><id>A-1</id><total>10.5</total><tax>2.1</tax></PurchaseOrder>";

/// A JSON schema for a customer record, using a shared definition and a date format.
#[allow(dead_code)]
pub const CUSTOMER_SCHEMA: &str = r##"{
  "type": "object",
  "properties": {
    "Customer": {
      "type": "object",
      "properties": {
        "name": { "type": "string" },
        "birthDate": { "type": "string", "format": "date" },
        "age": { "type": "integer" },
        "address": { "$ref": "#/definitions/address" },
        "tags": { "type": "array", "items": { "type": "string" } }
      }
    }
  },
  "definitions": {
    "address": {
      "type": "object",
      "properties": {
        "street": { "type": "string" },
        "city": { "type": "string" }
      }
    }
  }
}"##;

/// Looks up a field in a tree by path, panicking with the path on a miss.
#[allow(dead_code)]
pub fn field<'a>(tree: &'a [FieldNode], path: &str) -> &'a FieldNode {
    mapflow::schema::find_by_path(tree, path)
        .unwrap_or_else(|| panic!("no field at path '{}'", path))
}
