//! Tests for narrowing combined XML structures to one message kind.
mod common;
use common::*;
use mapflow::message::try_filter;
use mapflow::prelude::*;
use rstest::rstest;

#[rstest]
#[case(MessageKind::Request, "<getOrderRequest>", &["getOrderResponse", "getOrderFault"])]
#[case(MessageKind::Response, "<getOrderResponse>", &["getOrderRequest", "getOrderFault"])]
#[case(MessageKind::Fault, "<getOrderFault>", &["getOrderRequest", "getOrderResponse"])]
fn test_single_match_under_wrapper_becomes_root(
    #[case] kind: MessageKind,
    #[case] root: &str,
    #[case] dropped: &[&str],
) {
    let filtered = filter_xml_by_message_type(COMBINED_XML, kind);

    assert!(
        filtered.trim_start().starts_with(root),
        "expected {} as root, got {}",
        root,
        filtered
    );
    assert!(!filtered.contains("SourceMessage"));
    for name in dropped {
        assert!(!filtered.contains(name), "{} should be filtered out", name);
    }
}

#[test]
fn test_promoted_message_parses_as_its_own_tree() {
    let filtered = filter_xml_by_message_type(COMBINED_XML, MessageKind::Request);
    let tree = parse_structure(&filtered).expect("filtered document is well-formed");

    assert_eq!(tree[0].name, "getOrderRequest");
    assert_eq!(field(&tree, "getOrderRequest.orderId").field_type, FieldType::Number);
    assert!(field(&tree, "getOrderRequest.customer").is_node_mappable());
}

#[test]
fn test_non_wrapper_root_is_kept_with_attributes() {
    let filtered = filter_xml_by_message_type(SERVICE_XML, MessageKind::Response);

    assert!(filtered.contains("<OrderService"));
    assert!(filtered.contains("version=\"2\""));
    assert!(filtered.contains("<OrderResponse>"));
    assert!(!filtered.contains("OrderRequest"));
}

#[test]
fn test_multiple_matches_keep_original_root() {
    let xml = "<root><aRequest><x>1</x></aRequest><bRequest><y>2</y></bRequest>\
               <aResponse><z>3</z></aResponse></root>";
    let filtered = filter_xml_by_message_type(xml, MessageKind::Request);

    assert!(filtered.contains("<root>"));
    assert!(filtered.contains("<aRequest>"));
    assert!(filtered.contains("<bRequest>"));
    assert!(!filtered.contains("aResponse"));
}

#[test]
fn test_matching_is_case_insensitive() {
    let xml = "<message><orderrequest><id>1</id></orderrequest><orderresponse/></message>";
    let filtered = filter_xml_by_message_type(xml, MessageKind::Request);
    assert!(filtered.trim_start().starts_with("<orderrequest>"));
}

#[test]
fn test_no_match_returns_input_unchanged() {
    let xml = "<SourceMessage><Order><id>1</id></Order></SourceMessage>";
    assert_eq!(filter_xml_by_message_type(xml, MessageKind::Fault), xml);
    assert_eq!(try_filter(xml, MessageKind::Fault), Ok(None));
}

#[rstest]
#[case("<SourceMessage><getOrderRequest>")]
#[case("not xml at all")]
#[case("")]
fn test_malformed_input_fails_open(#[case] xml: &str) {
    for kind in MessageKind::ALL {
        assert_eq!(filter_xml_by_message_type(xml, kind), xml);
    }
    assert!(try_filter(xml, MessageKind::Request).is_err());
}

#[rstest]
#[case("getOrder_Req_V1", MessageKind::Request)]
#[case("CalculateInput", MessageKind::Request)]
#[case("getOrder_Resp_V1", MessageKind::Response)]
#[case("CalculateOutput", MessageKind::Response)]
#[case("ServiceException", MessageKind::Fault)]
#[case("validationError", MessageKind::Fault)]
fn test_kind_patterns(#[case] tag: &str, #[case] kind: MessageKind) {
    assert!(kind.matches(tag));
}

#[test]
fn test_message_kind_parses_and_serializes_lowercase() {
    assert_eq!("Response".parse::<MessageKind>(), Ok(MessageKind::Response));
    assert!("notify".parse::<MessageKind>().is_err());
    assert_eq!(
        serde_json::to_string(&MessageKind::Fault).expect("serializable"),
        "\"fault\""
    );
}
