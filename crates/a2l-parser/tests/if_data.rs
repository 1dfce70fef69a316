use a2l_parser::{parse, Attr, Error};

use crate::module;

#[test]
fn module_if_data_source_blocks() {
    let ast = parse(
        r#"
        /begin PROJECT project ""
            /begin MODULE module ""
                /begin A2ML
                    block "IF_DATA" taggedunion {
                        "MODULE" struct {
                            taggedstruct {
                                (block "SOURCE" struct {
                                    struct {
                                        char[100];
                                        int;
                                        long;
                                    };
                                    taggedstruct {
                                        "QP_BLOB" struct {
                                            int;
                                            long;
                                        };
                                    };
                                };)*;
                            };
                        };
                    };
                /end A2ML
                /begin IF_DATA MODULE
                    /begin SOURCE s0 1 2
                    /end SOURCE
                    /begin SOURCE s1 3 4 QP_BLOB 5 6
                    /end SOURCE
                /end IF_DATA
            /end MODULE
        /end PROJECT"#,
    )
    .unwrap();

    let if_data = module(&ast).child("if_data").unwrap();
    assert_eq!(if_data.kind_name(), "IF_DATA");
    assert_eq!(if_data.properties(), ["MODULE"]);

    let Some(Attr::IfData(content)) = if_data.attribute("MODULE") else {
        panic!("MODULE arm missing");
    };
    let sources = content.list("SOURCE");
    assert_eq!(sources.len(), 2);

    let s0 = &sources[0];
    assert_eq!(s0.str_at(0), Some("s0"));
    assert_eq!(s0.int_at(1), Some(1));
    assert_eq!(s0.int_at(2), Some(2));
    assert!(s0.get("QP_BLOB").is_none());

    let s1 = &sources[1];
    assert_eq!(s1.str_at(0), Some("s1"));
    assert_eq!(s1.int_at(1), Some(3));
    assert_eq!(s1.int_at(2), Some(4));
    let blob = s1.get("QP_BLOB").unwrap();
    assert_eq!(blob.int_at(0), Some(5));
    assert_eq!(blob.int_at(1), Some(6));
}

fn xcp_module(if_data: &str) -> String {
    format!(
        r#"
        /begin PROJECT project ""
            /begin MODULE module ""
                /begin A2ML
                    struct Protocol {{
                        uint;
                        enum {{
                            "PARITY_NONE" = 0,
                            "PARITY_ODD" = 1,
                            "PARITY_EVEN" = 2
                        }};
                    }};
                    block "IF_DATA" taggedunion {{
                        "XCP" taggedstruct {{
                            "PROTOCOL" Protocol;
                            "TIMESTAMPS" struct {{
                                uint[3];
                            }};
                            "OPTIONAL_CMD";
                            (block "DAQ" struct {{
                                uint;
                                float;
                            }})*;
                        }};
                        "CAN";
                    }};
                /end A2ML
                {if_data}
            /end MODULE
        /end PROJECT"#
    )
}

#[test]
fn named_types_enums_arrays_and_markers() {
    let ast = parse(&xcp_module(
        r#"
        /begin IF_DATA XCP
            PROTOCOL 3 PARITY_ODD
            TIMESTAMPS 1 2 3
            OPTIONAL_CMD
            /begin DAQ 1 0.5
            /end DAQ
            /begin DAQ 2 1.5
            /end DAQ
        /end IF_DATA"#,
    ))
    .unwrap();

    let content = &module(&ast).child("if_data").unwrap().if_data_content().unwrap().value;

    let protocol = content.get("PROTOCOL").unwrap();
    assert_eq!(protocol.int_at(0), Some(3));
    assert_eq!(protocol.item(1).unwrap().as_str(), Some("PARITY_ODD"));

    let stamps = content.get("TIMESTAMPS").unwrap().item(0).unwrap();
    assert_eq!(stamps.len(), 3);
    assert_eq!(stamps.item(2).unwrap().as_int(), Some(3));

    assert!(content.has("OPTIONAL_CMD"));
    assert!(content.get("OPTIONAL_CMD").is_none());

    let daqs = content.list("DAQ");
    assert_eq!(daqs.len(), 2);
    assert_eq!(daqs[1].int_at(0), Some(2));
    assert_eq!(daqs[1].item(1).unwrap().as_f64(), Some(1.5));
}

#[test]
fn union_arm_without_content() {
    let ast = parse(&xcp_module("/begin IF_DATA CAN /end IF_DATA")).unwrap();
    let content = module(&ast).child("if_data").unwrap().if_data_content().unwrap();
    assert_eq!(content.tag, "CAN");
}

#[test]
fn unknown_union_arm_is_a_schema_error() {
    let err = parse(&xcp_module("/begin IF_DATA ETHERNET /end IF_DATA")).unwrap_err();
    assert!(matches!(err, Error::Schema { .. }));
    assert!(err.message().contains("ETHERNET"));
}

#[test]
fn unknown_tag_at_top_level_is_a_schema_error() {
    let err = parse(&xcp_module(
        r#"
        /begin IF_DATA XCP
            UNRELATED 1
        /end IF_DATA"#,
    ))
    .unwrap_err();
    assert!(matches!(err, Error::Schema { .. }));
}

#[test]
fn repeating_a_single_tag_is_a_schema_error() {
    let err = parse(&xcp_module(
        r#"
        /begin IF_DATA XCP
            PROTOCOL 3 PARITY_ODD
            PROTOCOL 3 PARITY_ODD
        /end IF_DATA"#,
    ))
    .unwrap_err();
    assert!(matches!(err, Error::Schema { .. }));
    assert!(err.message().contains("at most once"));
}

#[test]
fn enumerator_must_match() {
    let err = parse(&xcp_module(
        r#"
        /begin IF_DATA XCP
            PROTOCOL 3 PARITY_MAYBE
        /end IF_DATA"#,
    ))
    .unwrap_err();
    assert!(matches!(err, Error::Schema { .. }));
    assert!(err.message().contains("PARITY_MAYBE"));
}

#[test]
fn if_data_without_a2ml_schema() {
    let err = parse(
        r#"
        /begin PROJECT project ""
            /begin MODULE module ""
                /begin IF_DATA MODULE
                /end IF_DATA
            /end MODULE
        /end PROJECT"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Schema { .. }));
    assert!(err.message().contains("A2ML"));
}

#[test]
fn a2ml_schema_does_not_leak_between_modules() {
    let err = parse(
        r#"
        /begin PROJECT project ""
            /begin MODULE first ""
                /begin A2ML
                    block "IF_DATA" taggedunion { "XCP"; };
                /end A2ML
            /end MODULE
            /begin MODULE second ""
                /begin IF_DATA XCP
                /end IF_DATA
            /end MODULE
        /end PROJECT"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Schema { .. }));
}

#[test]
fn if_data_on_measurement_uses_module_schema() {
    let ast = parse(
        r#"
        /begin PROJECT project ""
            /begin MODULE module ""
                /begin A2ML
                    block "IF_DATA" taggedunion {
                        "DIM" struct {
                            uint;
                        };
                    };
                /end A2ML
                /begin MEASUREMENT n "" UWORD conv 1 0 0.0 100.0
                    /begin IF_DATA DIM 42
                    /end IF_DATA
                /end MEASUREMENT
            /end MODULE
        /end PROJECT"#,
    )
    .unwrap();
    let measurement = &module(&ast).children("measurement")[0];
    let if_data = &measurement.children("if_data")[0];
    let content = if_data.if_data_content().unwrap();
    assert_eq!(content.tag, "DIM");
    assert_eq!(content.value.int_at(0), Some(42));
}

#[test]
fn malformed_a2ml_is_an_a2ml_error() {
    let err = parse(
        r#"
        /begin PROJECT project ""
            /begin MODULE module ""
                /begin A2ML
                    struct {
                        int
                /end A2ML
            /end MODULE
        /end PROJECT"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::A2mlFormat { .. }));
}
