use a2l_parser::parse;
use expect_test::expect;
use pretty_assertions::assert_eq;
use unindent::unindent;

use crate::parse_module;

fn lines(source: &str) -> Vec<String> {
    parse(source)
        .unwrap()
        .dump()
        .map(|(indent, line)| format!("{}{}", "    ".repeat(indent), line))
        .collect()
}

#[test]
fn inline_constructs_on_one_line() {
    assert_eq!(lines("A2ML_VERSION 2 3"), ["A2ML_VERSION 2 3"]);
    assert_eq!(lines("ASAP2_VERSION 0x1 0x33"), ["ASAP2_VERSION 1 51"]);
}

#[test]
fn empty_block() {
    assert_eq!(
        lines("/begin PROJECT _ \"\" /end PROJECT"),
        ["/begin PROJECT _ \"\"", "/end PROJECT"]
    );
}

#[test]
fn schema_order_not_input_order() {
    // READ_ONLY is written before FORMAT here; dump re-emits the schema
    // order with positional fields on the /begin line.
    let ast = parse_module(
        r#"
        /begin CHARACTERISTIC c "lid" VALUE 4096 DEP 10.0 conv 0.0 200.0
            READ_ONLY
            MATRIX_DIM 2 4 8
            FORMAT "%d"
            /begin ANNOTATION
                ANNOTATION_LABEL "lab"
            /end ANNOTATION
        /end CHARACTERISTIC"#,
    );
    let expected = unindent(
        r#"
        /begin PROJECT project_name "project long identifier"
            /begin MODULE first_module_name "first module long identifier"
                /begin CHARACTERISTIC c "lid" VALUE 4096 DEP 10.0 conv 0.0 200.0
                    FORMAT "%d"
                    READ_ONLY
                    MATRIX_DIM 2 4 8
                    /begin ANNOTATION
                        ANNOTATION_LABEL "lab"
                    /end ANNOTATION
                /end CHARACTERISTIC
            /end MODULE
        /end PROJECT"#,
    );
    assert_eq!(ast.render_default(), expected);
}

#[test]
fn a2ml_block_reemission() {
    let ast = parse(
        r#"
        /begin PROJECT p ""
            /begin MODULE m ""
                /begin A2ML
                    struct Flags { uint; };
                    block "IF_DATA" taggedunion {
                        "RASTER" struct {
                            uchar;
                        };
                    };
                /end A2ML
            /end MODULE
        /end PROJECT"#,
    )
    .unwrap();
    expect![[r#"
        /begin PROJECT p ""
            /begin MODULE m ""
                /begin A2ML
                    struct Flags {
                        uint;
                    };
                    block "IF_DATA" taggedunion {
                        "RASTER" struct {
                            uchar;
                        };
                    };
                /end A2ML
            /end MODULE
        /end PROJECT"#]]
    .assert_eq(&ast.render_default());
}

#[test]
fn rows_and_tails_get_their_own_lines() {
    let ast = parse_module(
        r#"
        /begin COMPU_VTAB v "" TAB_VERB 2 0 "zero" 1 "one"
            DEFAULT_VALUE "d"
        /end COMPU_VTAB"#,
    );
    let rendered = ast.render_default();
    assert!(rendered.contains("/begin COMPU_VTAB v \"\" TAB_VERB 2"));
    assert!(rendered.contains("\n            0.0 \"zero\""));
    assert!(rendered.contains("\n            1.0 \"one\""));
    assert!(rendered.contains("\n            DEFAULT_VALUE \"d\""));

    let ast = parse_module(
        r#"
        /begin FUNCTION f ""
            /begin SUB_FUNCTION child_a child_b
            /end SUB_FUNCTION
        /end FUNCTION"#,
    );
    let rendered = ast.render_default();
    assert!(rendered.contains("/begin SUB_FUNCTION\n                child_a\n                child_b\n            /end SUB_FUNCTION"));
}

#[test]
fn flags_scalars_and_repeatable_scalars() {
    let ast = parse_module(
        r#"
        /begin MOD_PAR "c"
            ADDR_EPK 0x10
            ADDR_EPK 0x20
        /end MOD_PAR"#,
    );
    let rendered = ast.render_default();
    // Hex literals normalize to decimal; each occurrence keeps its keyword.
    assert!(rendered.contains("ADDR_EPK 16\n            ADDR_EPK 32"));
}

#[test]
fn custom_render_parameters() {
    let ast = parse("/begin PROJECT _ \"\" /end PROJECT").unwrap();
    assert_eq!(
        ast.render(1, "|", '\t'),
        "/begin PROJECT _ \"\"|/end PROJECT"
    );
}

#[test]
fn memory_segment_offsets_stay_on_the_begin_line() {
    let ast = parse_module(
        r#"
        /begin MOD_PAR "c"
            /begin MEMORY_SEGMENT seg "lid" CODE RAM INTERN 0x8000 0x1000 -1 -1 -1 -1 -1
            /end MEMORY_SEGMENT
        /end MOD_PAR"#,
    );
    assert!(ast.render_default().contains(
        "/begin MEMORY_SEGMENT seg \"lid\" CODE RAM INTERN 32768 4096 -1 -1 -1 -1 -1"
    ));
}

/// The round-trip property: dumping and re-parsing yields an
/// attribute-equivalent tree.
#[test]
fn round_trip() {
    let source = r#"
        A2ML_VERSION 2 3
        ASAP2_VERSION 1 51
        /begin PROJECT proj "project"
            /begin HEADER "header comment"
                VERSION "V1.0"
                PROJECT_NO P123
            /end HEADER
            /begin MODULE ecu "engine controller"
                /begin A2ML
                    struct Protocol {
                        uint;
                        enum {
                            "PARITY_NONE" = 0,
                            "PARITY_ODD" = 1
                        };
                    };
                    block "IF_DATA" taggedunion {
                        "XCP" taggedstruct {
                            "PROTOCOL" Protocol;
                            "OPTIONAL_CMD";
                            (block "DAQ" struct {
                                uint;
                                float;
                            })*;
                        };
                        "CAN";
                    };
                /end A2ML
                /begin MOD_PAR "mod_par comment"
                    VERSION "BG5.0815"
                    ADDR_EPK 0x4010
                    SYSTEM_CONSTANT "CONTROLLER" "C167"
                    /begin MEMORY_SEGMENT seg "" CODE RAM INTERN 0 4096 -1 -1 -1 -1 -1
                    /end MEMORY_SEGMENT
                /end MOD_PAR
                /begin MOD_COMMON "common"
                    BYTE_ORDER MSB_LAST
                    ALIGNMENT_WORD 2
                /end MOD_COMMON
                /begin IF_DATA XCP
                    PROTOCOL 3 PARITY_ODD
                    OPTIONAL_CMD
                    /begin DAQ 1 0.5
                    /end DAQ
                    /begin DAQ 2 1.5
                    /end DAQ
                /end IF_DATA
                /begin CHARACTERISTIC torque_map "torque limitation" MAP 0x7140 DAMOS_KF 100.0 conv_torque 0.0 43.0
                    READ_ONLY
                    FORMAT "%4.2"
                    EXTENDED_LIMITS 0 9000
                    MAX_REFRESH 3 15
                    /begin AXIS_DESCR STD_AXIS N conv_n 14 0.0 5800.0
                        MAX_GRAD 20.0
                        FIX_AXIS_PAR 0 4 6
                        /begin FIX_AXIS_PAR_LIST
                            2.0 5.0 9.0
                        /end FIX_AXIS_PAR_LIST
                    /end AXIS_DESCR
                    /begin ANNOTATION
                        ANNOTATION_LABEL "valid range"
                        /begin ANNOTATION_TEXT
                            "first line"
                            "second line"
                        /end ANNOTATION_TEXT
                    /end ANNOTATION
                /end CHARACTERISTIC
                /begin MEASUREMENT n "engine speed" UWORD r_rpm 1 0 0.0 8000.0
                    ECU_ADDRESS 0x12345
                    /begin BIT_OPERATION
                        RIGHT_SHIFT 4
                        SIGN_EXTEND
                    /end BIT_OPERATION
                /end MEASUREMENT
                /begin COMPU_METHOD conv_torque "conversion" RAT_FUNC "%4.2" "Nm"
                    COEFFS 0 4 8 0 0 5
                /end COMPU_METHOD
                /begin COMPU_VTAB cm_dig "verbal" TAB_VERB 2
                    0 "off"
                    1 "on"
                    DEFAULT_VALUE "unknown"
                /end COMPU_VTAB
                /begin RECORD_LAYOUT rl
                    FNC_VALUES 1 SWORD COLUMN_DIR DIRECT
                    RESERVED 2 WORD
                /end RECORD_LAYOUT
                /begin VARIANT_CODING
                    VAR_SEPARATOR "."
                    /begin VAR_CRITERION Car "car body" Limousine Kombi
                        VAR_MEASUREMENT S_CAR
                    /end VAR_CRITERION
                    /begin VAR_FORBIDDEN_COMB
                        Car Limousine
                    /end VAR_FORBIDDEN_COMB
                /end VARIANT_CODING
                /begin FRAME frame "" 3 2
                    FRAME_MEASUREMENT LOOP_COUNTER
                /end FRAME
                /begin USER_RIGHTS engineers
                    READ_ONLY
                    /begin REF_GROUP g1 g2
                    /end REF_GROUP
                /end USER_RIGHTS
                /begin UNIT kms_per_hour "derived" "[km/h]" DERIVED
                    UNIT_CONVERSION 3.6 0.0
                /end UNIT
                /begin GROUP swc ""
                    ROOT
                /end GROUP
                /begin FUNCTION f ""
                    /begin DEF_CHARACTERISTIC torque_map
                    /end DEF_CHARACTERISTIC
                /end FUNCTION
            /end MODULE
        /end PROJECT"#;

    let first = parse(source).unwrap();
    let rendered = first.render_default();
    let second = parse(&rendered).unwrap_or_else(|e| panic!("re-parse failed: {e}\n{rendered}"));
    assert_eq!(first, second);

    // And the emission itself is a fixpoint.
    assert_eq!(rendered, second.render_default());
}
