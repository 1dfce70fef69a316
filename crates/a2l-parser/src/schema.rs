//! The A2L grammar, encoded as one static table entry per keyword.
//!
//! A [`BlockSchema`] describes everything the parser needs to know about a
//! construct: its positional fields, an optional variable-length tail, and
//! the optional elements (singletons before repeatables, which is also the
//! order `dump` re-emits them in). `block` distinguishes `/begin … /end`
//! constructs from inline ones like `COEFFS 0 1 2 3 4 5`.

/// Scalar kinds a field can be declared with.
///
/// Numeric coercion happens against these: an integer-valued float literal
/// is accepted for [`Scalar::Int`], and an integer literal is accepted for
/// [`Scalar::Float`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    Ident,
    Str,
    Int,
    Float,
}

/// Variable-length data following the positional fields of a block.
///
/// Tails run until the next reserved keyword, `/begin`, or `/end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tail {
    None,
    /// A list of identifiers, e.g. the content of `FUNCTION_LIST`.
    Idents(&'static str),
    /// A list of strings, e.g. the content of `ANNOTATION_TEXT`.
    Strings(&'static str),
    /// A list of integers, e.g. the content of `VAR_ADDRESS`.
    Ints(&'static str),
    /// A list of floats, e.g. the content of `FIX_AXIS_PAR_LIST`.
    Floats(&'static str),
    /// Fixed-width value rows, e.g. the `(in, out)` pairs of `COMPU_TAB`.
    Rows(&'static str, &'static [Scalar]),
}

impl Tail {
    pub(crate) fn attr(self) -> Option<&'static str> {
        match self {
            Tail::None => None,
            Tail::Idents(a) | Tail::Strings(a) | Tail::Ints(a) | Tail::Floats(a) => Some(a),
            Tail::Rows(a, _) => Some(a),
        }
    }
}

/// The shape of one optional element inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ElemKind {
    /// A bare keyword; its presence binds the attribute to the keyword text.
    Flag,
    /// The keyword followed by a single scalar.
    Scalar(Scalar),
    /// A nested construct with its own schema, named by keyword.
    Node(&'static str),
    /// `/begin A2ML … /end A2ML`, handed to the A2ML sub-parser.
    A2ml,
    /// `/begin IF_DATA … /end IF_DATA`, interpreted against the module's
    /// A2ML schema.
    IfData,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Elem {
    pub(crate) keyword: &'static str,
    pub(crate) attr: &'static str,
    pub(crate) kind: ElemKind,
    pub(crate) many: bool,
}

/// Static descriptor for one A2L construct.
#[derive(Debug)]
pub struct BlockSchema {
    pub(crate) keyword: &'static str,
    /// Written as `/begin KEYWORD … /end KEYWORD` rather than inline.
    pub(crate) block: bool,
    pub(crate) positional: &'static [(&'static str, Scalar)],
    /// A fixed-size run of equal scalars bound to one list attribute, e.g.
    /// the five offsets of `MEMORY_SEGMENT`. Emitted on the `/begin` line.
    pub(crate) fixed: Option<(&'static str, Scalar, usize)>,
    pub(crate) tail: Tail,
    pub(crate) elems: &'static [Elem],
}

impl BlockSchema {
    pub fn keyword(&self) -> &'static str {
        self.keyword
    }

    pub(crate) fn elem(&self, keyword: &str) -> Option<&'static Elem> {
        self.elems.iter().find(|e| e.keyword == keyword)
    }

    /// Declared attribute names in schema order: positional fields, fixed
    /// run, tail, then elements.
    pub(crate) fn property_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.positional
            .iter()
            .map(|(name, _)| *name)
            .chain(self.fixed.iter().map(|(name, _, _)| *name))
            .chain(self.tail.attr())
            .chain(self.elems.iter().map(|e| e.attr))
    }
}

use Scalar::{Float, Ident, Int, Str};

const fn flag(keyword: &'static str, attr: &'static str) -> Elem {
    Elem {
        keyword,
        attr,
        kind: ElemKind::Flag,
        many: false,
    }
}

const fn scalar(keyword: &'static str, attr: &'static str, kind: Scalar) -> Elem {
    Elem {
        keyword,
        attr,
        kind: ElemKind::Scalar(kind),
        many: false,
    }
}

const fn scalars(keyword: &'static str, attr: &'static str, kind: Scalar) -> Elem {
    Elem {
        keyword,
        attr,
        kind: ElemKind::Scalar(kind),
        many: true,
    }
}

const fn node(keyword: &'static str, attr: &'static str) -> Elem {
    Elem {
        keyword,
        attr,
        kind: ElemKind::Node(keyword),
        many: false,
    }
}

const fn nodes(keyword: &'static str, attr: &'static str) -> Elem {
    Elem {
        keyword,
        attr,
        kind: ElemKind::Node(keyword),
        many: true,
    }
}

const fn if_data(many: bool) -> Elem {
    Elem {
        keyword: "IF_DATA",
        attr: "if_data",
        kind: ElemKind::IfData,
        many,
    }
}

/// An inline construct: `KEYWORD field…` with no `/begin`.
const fn leaf(keyword: &'static str, positional: &'static [(&'static str, Scalar)]) -> BlockSchema {
    BlockSchema {
        keyword,
        block: false,
        positional,
        fixed: None,
        tail: Tail::None,
        elems: &[],
    }
}

const fn block(
    keyword: &'static str,
    positional: &'static [(&'static str, Scalar)],
    elems: &'static [Elem],
) -> BlockSchema {
    BlockSchema {
        keyword,
        block: true,
        positional,
        fixed: None,
        tail: Tail::None,
        elems,
    }
}

const fn tail_block(
    keyword: &'static str,
    positional: &'static [(&'static str, Scalar)],
    tail: Tail,
    elems: &'static [Elem],
) -> BlockSchema {
    BlockSchema {
        keyword,
        block: true,
        positional,
        fixed: None,
        tail,
        elems,
    }
}

static A2ML_VERSION: BlockSchema = leaf(
    "A2ML_VERSION",
    &[("version_no", Int), ("upgrade_no", Int)],
);

static ASAP2_VERSION: BlockSchema = leaf(
    "ASAP2_VERSION",
    &[("version_no", Int), ("upgrade_no", Int)],
);

static PROJECT: BlockSchema = block(
    "PROJECT",
    &[("name", Ident), ("long_identifier", Str)],
    &[node("HEADER", "header"), nodes("MODULE", "module")],
);

static HEADER: BlockSchema = block(
    "HEADER",
    &[("comment", Str)],
    &[
        scalar("VERSION", "version", Str),
        scalar("PROJECT_NO", "project_no", Ident),
    ],
);

static MODULE: BlockSchema = block(
    "MODULE",
    &[("name", Ident), ("long_identifier", Str)],
    &[
        Elem {
            keyword: "A2ML",
            attr: "a2ml",
            kind: ElemKind::A2ml,
            many: false,
        },
        node("MOD_PAR", "mod_par"),
        node("MOD_COMMON", "mod_common"),
        if_data(false),
        node("VARIANT_CODING", "variant_coding"),
        node("FRAME", "frame"),
        nodes("CHARACTERISTIC", "characteristic"),
        nodes("AXIS_PTS", "axis_pts"),
        nodes("MEASUREMENT", "measurement"),
        nodes("COMPU_METHOD", "compu_method"),
        nodes("COMPU_TAB", "compu_tab"),
        nodes("COMPU_VTAB", "compu_vtab"),
        nodes("COMPU_VTAB_RANGE", "compu_vtab_range"),
        nodes("FUNCTION", "function"),
        nodes("GROUP", "group"),
        nodes("RECORD_LAYOUT", "record_layout"),
        nodes("USER_RIGHTS", "user_rights"),
        nodes("UNIT", "unit"),
    ],
);

static MOD_PAR: BlockSchema = block(
    "MOD_PAR",
    &[("comment", Str)],
    &[
        scalar("VERSION", "version", Str),
        scalar("EPK", "epk", Str),
        scalar("SUPPLIER", "supplier", Str),
        scalar("CUSTOMER", "customer", Str),
        scalar("CUSTOMER_NO", "customer_no", Str),
        scalar("USER", "user", Str),
        scalar("PHONE_NO", "phone_no", Str),
        scalar("ECU", "ecu", Str),
        scalar("CPU_TYPE", "cpu_type", Str),
        scalar("NO_OF_INTERFACES", "no_of_interfaces", Int),
        scalar("ECU_CALIBRATION_OFFSET", "ecu_calibration_offset", Int),
        scalars("ADDR_EPK", "addr_epk", Int),
        nodes("SYSTEM_CONSTANT", "system_constant"),
        nodes("CALIBRATION_METHOD", "calibration_method"),
        nodes("MEMORY_LAYOUT", "memory_layout"),
        nodes("MEMORY_SEGMENT", "memory_segment"),
    ],
);

static MOD_COMMON: BlockSchema = block(
    "MOD_COMMON",
    &[("comment", Str)],
    &[
        scalar("S_REC_LAYOUT", "s_rec_layout", Ident),
        scalar("DEPOSIT", "deposit", Ident),
        scalar("BYTE_ORDER", "byte_order", Ident),
        scalar("DATA_SIZE", "data_size", Int),
        scalar("ALIGNMENT_BYTE", "alignment_byte", Int),
        scalar("ALIGNMENT_WORD", "alignment_word", Int),
        scalar("ALIGNMENT_LONG", "alignment_long", Int),
        scalar("ALIGNMENT_FLOAT32_IEEE", "alignment_float32_ieee", Int),
        scalar("ALIGNMENT_FLOAT64_IEEE", "alignment_float64_ieee", Int),
    ],
);

static SYSTEM_CONSTANT: BlockSchema =
    leaf("SYSTEM_CONSTANT", &[("name", Str), ("value", Str)]);

static CALIBRATION_METHOD: BlockSchema = block(
    "CALIBRATION_METHOD",
    &[("method", Str), ("version", Int)],
    &[nodes("CALIBRATION_HANDLE", "calibration_handle")],
);

static CALIBRATION_HANDLE: BlockSchema =
    tail_block("CALIBRATION_HANDLE", &[], Tail::Ints("handle"), &[]);

static MEMORY_LAYOUT: BlockSchema = BlockSchema {
    keyword: "MEMORY_LAYOUT",
    block: true,
    positional: &[("prg_type", Ident), ("address", Int), ("size", Int)],
    fixed: Some(("offset", Int, 5)),
    tail: Tail::None,
    elems: &[if_data(true)],
};

static MEMORY_SEGMENT: BlockSchema = BlockSchema {
    keyword: "MEMORY_SEGMENT",
    block: true,
    positional: &[
        ("name", Ident),
        ("long_identifier", Str),
        ("prg_type", Ident),
        ("memory_type", Ident),
        ("attribute", Ident),
        ("address", Int),
        ("size", Int),
    ],
    fixed: Some(("offset", Int, 5)),
    tail: Tail::None,
    elems: &[if_data(true)],
};

static CHARACTERISTIC: BlockSchema = block(
    "CHARACTERISTIC",
    &[
        ("name", Ident),
        ("long_identifier", Str),
        ("type", Ident),
        ("address", Int),
        ("deposit", Ident),
        ("max_diff", Float),
        ("conversion", Ident),
        ("lower_limit", Float),
        ("upper_limit", Float),
    ],
    &[
        scalar("DISPLAY_IDENTIFIER", "display_identifier", Ident),
        scalar("FORMAT", "format", Str),
        scalar("BYTE_ORDER", "byte_order", Ident),
        scalar("BIT_MASK", "bit_mask", Int),
        scalar("NUMBER", "number", Int),
        node("EXTENDED_LIMITS", "extended_limits"),
        flag("READ_ONLY", "read_only"),
        flag("GUARD_RAILS", "guard_rails"),
        node("MAX_REFRESH", "max_refresh"),
        scalar("REF_MEMORY_SEGMENT", "ref_memory_segment", Ident),
        scalar("COMPARISON_QUANTITY", "comparison_quantity", Ident),
        scalar("CALIBRATION_ACCESS", "calibration_access", Ident),
        node("MATRIX_DIM", "matrix_dim"),
        scalar("ECU_ADDRESS_EXTENSION", "ecu_address_extension", Int),
        node("FUNCTION_LIST", "function_list"),
        node("MAP_LIST", "map_list"),
        node("DEPENDENT_CHARACTERISTIC", "dependent_characteristic"),
        node("VIRTUAL_CHARACTERISTIC", "virtual_characteristic"),
        nodes("ANNOTATION", "annotation"),
        nodes("AXIS_DESCR", "axis_descr"),
        if_data(true),
    ],
);

static AXIS_PTS: BlockSchema = block(
    "AXIS_PTS",
    &[
        ("name", Ident),
        ("long_identifier", Str),
        ("address", Int),
        ("input_quantity", Ident),
        ("deposit_record", Ident),
        ("max_diff", Float),
        ("conversion", Ident),
        ("max_axis_points", Int),
        ("lower_limit", Float),
        ("upper_limit", Float),
    ],
    &[
        scalar("DISPLAY_IDENTIFIER", "display_identifier", Ident),
        flag("READ_ONLY", "read_only"),
        scalar("FORMAT", "format", Str),
        scalar("DEPOSIT", "deposit", Ident),
        scalar("BYTE_ORDER", "byte_order", Ident),
        node("FUNCTION_LIST", "function_list"),
        scalar("REF_MEMORY_SEGMENT", "ref_memory_segment", Ident),
        flag("GUARD_RAILS", "guard_rails"),
        node("EXTENDED_LIMITS", "extended_limits"),
        scalar("CALIBRATION_ACCESS", "calibration_access", Ident),
        scalar("ECU_ADDRESS_EXTENSION", "ecu_address_extension", Int),
        nodes("ANNOTATION", "annotation"),
        if_data(true),
    ],
);

static MEASUREMENT: BlockSchema = block(
    "MEASUREMENT",
    &[
        ("name", Ident),
        ("long_identifier", Str),
        ("datatype", Ident),
        ("conversion", Ident),
        ("resolution", Int),
        ("accuracy", Float),
        ("lower_limit", Float),
        ("upper_limit", Float),
    ],
    &[
        scalar("DISPLAY_IDENTIFIER", "display_identifier", Ident),
        flag("READ_WRITE", "read_write"),
        scalar("FORMAT", "format", Str),
        scalar("ARRAY_SIZE", "array_size", Int),
        scalar("BIT_MASK", "bit_mask", Int),
        node("BIT_OPERATION", "bit_operation"),
        scalar("BYTE_ORDER", "byte_order", Ident),
        node("MAX_REFRESH", "max_refresh"),
        node("VIRTUAL", "virtual"),
        node("FUNCTION_LIST", "function_list"),
        scalar("ECU_ADDRESS", "ecu_address", Int),
        scalar("ERROR_MASK", "error_mask", Int),
        scalar("REF_MEMORY_SEGMENT", "ref_memory_segment", Ident),
        node("MATRIX_DIM", "matrix_dim"),
        scalar("ECU_ADDRESS_EXTENSION", "ecu_address_extension", Int),
        nodes("ANNOTATION", "annotation"),
        if_data(true),
    ],
);

static BIT_OPERATION: BlockSchema = block(
    "BIT_OPERATION",
    &[],
    &[
        scalar("LEFT_SHIFT", "left_shift", Int),
        scalar("RIGHT_SHIFT", "right_shift", Int),
        flag("SIGN_EXTEND", "sign_extend"),
    ],
);

static VIRTUAL: BlockSchema =
    tail_block("VIRTUAL", &[], Tail::Idents("measuring_channel"), &[]);

static COMPU_METHOD: BlockSchema = block(
    "COMPU_METHOD",
    &[
        ("name", Ident),
        ("long_identifier", Str),
        ("conversion_type", Ident),
        ("format", Str),
        ("unit", Str),
    ],
    &[
        node("FORMULA", "formula"),
        node("COEFFS", "coeffs"),
        scalar("COMPU_TAB_REF", "compu_tab_ref", Ident),
        scalar("REF_UNIT", "ref_unit", Ident),
    ],
);

static FORMULA: BlockSchema = block(
    "FORMULA",
    &[("f", Str)],
    &[scalar("FORMULA_INV", "formula_inv", Str)],
);

static COEFFS: BlockSchema = leaf(
    "COEFFS",
    &[
        ("a", Float),
        ("b", Float),
        ("c", Float),
        ("d", Float),
        ("e", Float),
        ("f", Float),
    ],
);

static COMPU_TAB: BlockSchema = tail_block(
    "COMPU_TAB",
    &[
        ("name", Ident),
        ("long_identifier", Str),
        ("conversion_type", Ident),
        ("number_value_pairs", Int),
    ],
    Tail::Rows("in_val_out_val", &[Float, Float]),
    &[scalar("DEFAULT_VALUE", "default_value", Str)],
);

static COMPU_VTAB: BlockSchema = tail_block(
    "COMPU_VTAB",
    &[
        ("name", Ident),
        ("long_identifier", Str),
        ("conversion_type", Ident),
        ("number_value_pairs", Int),
    ],
    Tail::Rows("in_val_out_val", &[Float, Str]),
    &[scalar("DEFAULT_VALUE", "default_value", Str)],
);

static COMPU_VTAB_RANGE: BlockSchema = tail_block(
    "COMPU_VTAB_RANGE",
    &[
        ("name", Ident),
        ("long_identifier", Str),
        ("number_value_pairs", Int),
    ],
    Tail::Rows("in_val_out_val", &[Float, Float, Str]),
    &[scalar("DEFAULT_VALUE", "default_value", Str)],
);

static FUNCTION: BlockSchema = block(
    "FUNCTION",
    &[("name", Ident), ("long_identifier", Str)],
    &[
        scalar("FUNCTION_VERSION", "function_version", Str),
        node("DEF_CHARACTERISTIC", "def_characteristic"),
        node("REF_CHARACTERISTIC", "ref_characteristic"),
        node("IN_MEASUREMENT", "in_measurement"),
        node("OUT_MEASUREMENT", "out_measurement"),
        node("LOC_MEASUREMENT", "loc_measurement"),
        node("SUB_FUNCTION", "sub_function"),
        nodes("ANNOTATION", "annotation"),
    ],
);

static GROUP: BlockSchema = block(
    "GROUP",
    &[("group_name", Ident), ("group_long_identifier", Str)],
    &[
        flag("ROOT", "root"),
        node("REF_CHARACTERISTIC", "ref_characteristic"),
        node("REF_MEASUREMENT", "ref_measurement"),
        node("FUNCTION_LIST", "function_list"),
        node("SUB_GROUP", "sub_group"),
        nodes("ANNOTATION", "annotation"),
    ],
);

static RECORD_LAYOUT: BlockSchema = block(
    "RECORD_LAYOUT",
    &[("name", Ident)],
    &[
        node("FNC_VALUES", "fnc_values"),
        node("IDENTIFICATION", "identification"),
        node("AXIS_PTS_X", "axis_pts_x"),
        node("AXIS_PTS_Y", "axis_pts_y"),
        node("AXIS_PTS_Z", "axis_pts_z"),
        node("AXIS_RESCALE_X", "axis_rescale_x"),
        node("AXIS_RESCALE_Y", "axis_rescale_y"),
        node("AXIS_RESCALE_Z", "axis_rescale_z"),
        node("NO_AXIS_PTS_X", "no_axis_pts_x"),
        node("NO_AXIS_PTS_Y", "no_axis_pts_y"),
        node("NO_AXIS_PTS_Z", "no_axis_pts_z"),
        node("NO_RESCALE_X", "no_rescale_x"),
        node("NO_RESCALE_Y", "no_rescale_y"),
        node("NO_RESCALE_Z", "no_rescale_z"),
        node("FIX_NO_AXIS_PTS_X", "fix_no_axis_pts_x"),
        node("FIX_NO_AXIS_PTS_Y", "fix_no_axis_pts_y"),
        node("FIX_NO_AXIS_PTS_Z", "fix_no_axis_pts_z"),
        node("SRC_ADDR_X", "src_addr_x"),
        node("SRC_ADDR_Y", "src_addr_y"),
        node("SRC_ADDR_Z", "src_addr_z"),
        node("RIP_ADDR_W", "rip_addr_w"),
        node("RIP_ADDR_X", "rip_addr_x"),
        node("RIP_ADDR_Y", "rip_addr_y"),
        node("RIP_ADDR_Z", "rip_addr_z"),
        node("SHIFT_OP_X", "shift_op_x"),
        node("SHIFT_OP_Y", "shift_op_y"),
        node("SHIFT_OP_Z", "shift_op_z"),
        node("OFFSET_X", "offset_x"),
        node("OFFSET_Y", "offset_y"),
        node("OFFSET_Z", "offset_z"),
        node("DIST_OP_X", "dist_op_x"),
        node("DIST_OP_Y", "dist_op_y"),
        node("DIST_OP_Z", "dist_op_z"),
        scalar("ALIGNMENT_BYTE", "alignment_byte", Int),
        scalar("ALIGNMENT_WORD", "alignment_word", Int),
        scalar("ALIGNMENT_LONG", "alignment_long", Int),
        scalar("ALIGNMENT_FLOAT32_IEEE", "alignment_float32_ieee", Int),
        scalar("ALIGNMENT_FLOAT64_IEEE", "alignment_float64_ieee", Int),
        nodes("RESERVED", "reserved"),
    ],
);

static FNC_VALUES: BlockSchema = leaf(
    "FNC_VALUES",
    &[
        ("position", Int),
        ("data_type", Ident),
        ("index_mode", Ident),
        ("addresstype", Ident),
    ],
);

static IDENTIFICATION: BlockSchema =
    leaf("IDENTIFICATION", &[("position", Int), ("data_type", Ident)]);

static AXIS_PTS_X: BlockSchema = axis_pts_item("AXIS_PTS_X");
static AXIS_PTS_Y: BlockSchema = axis_pts_item("AXIS_PTS_Y");
static AXIS_PTS_Z: BlockSchema = axis_pts_item("AXIS_PTS_Z");

const fn axis_pts_item(keyword: &'static str) -> BlockSchema {
    leaf(
        keyword,
        &[
            ("position", Int),
            ("data_type", Ident),
            ("index_incr", Ident),
            ("addressing", Ident),
        ],
    )
}

static AXIS_RESCALE_X: BlockSchema = axis_rescale_item("AXIS_RESCALE_X");
static AXIS_RESCALE_Y: BlockSchema = axis_rescale_item("AXIS_RESCALE_Y");
static AXIS_RESCALE_Z: BlockSchema = axis_rescale_item("AXIS_RESCALE_Z");

const fn axis_rescale_item(keyword: &'static str) -> BlockSchema {
    leaf(
        keyword,
        &[
            ("position", Int),
            ("data_type", Ident),
            ("max_number_of_rescale_pairs", Int),
            ("index_incr", Ident),
            ("addressing", Ident),
        ],
    )
}

const fn positioned_item(keyword: &'static str) -> BlockSchema {
    leaf(keyword, &[("position", Int), ("data_type", Ident)])
}

static NO_AXIS_PTS_X: BlockSchema = positioned_item("NO_AXIS_PTS_X");
static NO_AXIS_PTS_Y: BlockSchema = positioned_item("NO_AXIS_PTS_Y");
static NO_AXIS_PTS_Z: BlockSchema = positioned_item("NO_AXIS_PTS_Z");
static NO_RESCALE_X: BlockSchema = positioned_item("NO_RESCALE_X");
static NO_RESCALE_Y: BlockSchema = positioned_item("NO_RESCALE_Y");
static NO_RESCALE_Z: BlockSchema = positioned_item("NO_RESCALE_Z");
static SRC_ADDR_X: BlockSchema = positioned_item("SRC_ADDR_X");
static SRC_ADDR_Y: BlockSchema = positioned_item("SRC_ADDR_Y");
static SRC_ADDR_Z: BlockSchema = positioned_item("SRC_ADDR_Z");
static RIP_ADDR_W: BlockSchema = positioned_item("RIP_ADDR_W");
static RIP_ADDR_X: BlockSchema = positioned_item("RIP_ADDR_X");
static RIP_ADDR_Y: BlockSchema = positioned_item("RIP_ADDR_Y");
static RIP_ADDR_Z: BlockSchema = positioned_item("RIP_ADDR_Z");
static SHIFT_OP_X: BlockSchema = positioned_item("SHIFT_OP_X");
static SHIFT_OP_Y: BlockSchema = positioned_item("SHIFT_OP_Y");
static SHIFT_OP_Z: BlockSchema = positioned_item("SHIFT_OP_Z");
static OFFSET_X: BlockSchema = positioned_item("OFFSET_X");
static OFFSET_Y: BlockSchema = positioned_item("OFFSET_Y");
static OFFSET_Z: BlockSchema = positioned_item("OFFSET_Z");
static DIST_OP_X: BlockSchema = positioned_item("DIST_OP_X");
static DIST_OP_Y: BlockSchema = positioned_item("DIST_OP_Y");
static DIST_OP_Z: BlockSchema = positioned_item("DIST_OP_Z");

static FIX_NO_AXIS_PTS_X: BlockSchema =
    leaf("FIX_NO_AXIS_PTS_X", &[("number_of_axis_points", Int)]);
static FIX_NO_AXIS_PTS_Y: BlockSchema =
    leaf("FIX_NO_AXIS_PTS_Y", &[("number_of_axis_points", Int)]);
static FIX_NO_AXIS_PTS_Z: BlockSchema =
    leaf("FIX_NO_AXIS_PTS_Z", &[("number_of_axis_points", Int)]);

static RESERVED: BlockSchema = leaf("RESERVED", &[("position", Int), ("data_size", Ident)]);

static VARIANT_CODING: BlockSchema = block(
    "VARIANT_CODING",
    &[],
    &[
        scalar("VAR_SEPARATOR", "var_separator", Str),
        scalar("VAR_NAMING", "var_naming", Ident),
        nodes("VAR_CRITERION", "var_criterion"),
        nodes("VAR_FORBIDDEN_COMB", "var_forbidden_comb"),
        nodes("VAR_CHARACTERISTIC", "var_characteristic"),
    ],
);

static VAR_CRITERION: BlockSchema = tail_block(
    "VAR_CRITERION",
    &[("name", Ident), ("long_identifier", Str)],
    Tail::Idents("value"),
    &[
        scalar("VAR_MEASUREMENT", "var_measurement", Ident),
        scalar(
            "VAR_SELECTION_CHARACTERISTIC",
            "var_selection_characteristic",
            Ident,
        ),
    ],
);

static VAR_FORBIDDEN_COMB: BlockSchema = tail_block(
    "VAR_FORBIDDEN_COMB",
    &[],
    Tail::Rows("criterion", &[Ident, Ident]),
    &[],
);

static VAR_CHARACTERISTIC: BlockSchema = tail_block(
    "VAR_CHARACTERISTIC",
    &[("name", Ident)],
    Tail::Idents("criterion_name"),
    &[node("VAR_ADDRESS", "var_address")],
);

static VAR_ADDRESS: BlockSchema = tail_block("VAR_ADDRESS", &[], Tail::Ints("address"), &[]);

static FRAME: BlockSchema = block(
    "FRAME",
    &[
        ("name", Ident),
        ("long_identifier", Str),
        ("scaling_unit", Int),
        ("rate", Int),
    ],
    &[
        node("FRAME_MEASUREMENT", "frame_measurement"),
        if_data(true),
    ],
);

static FRAME_MEASUREMENT: BlockSchema = BlockSchema {
    keyword: "FRAME_MEASUREMENT",
    block: false,
    positional: &[],
    fixed: None,
    tail: Tail::Idents("identifier"),
    elems: &[],
};

static USER_RIGHTS: BlockSchema = block(
    "USER_RIGHTS",
    &[("user_level_id", Ident)],
    &[
        flag("READ_ONLY", "read_only"),
        nodes("REF_GROUP", "ref_group"),
    ],
);

static REF_GROUP: BlockSchema = tail_block("REF_GROUP", &[], Tail::Idents("identifier"), &[]);

static UNIT: BlockSchema = block(
    "UNIT",
    &[
        ("name", Ident),
        ("long_identifier", Str),
        ("display", Str),
        ("type", Ident),
    ],
    &[
        node("SI_EXPONENTS", "si_exponents"),
        scalar("REF_UNIT", "ref_unit", Ident),
        node("UNIT_CONVERSION", "unit_conversion"),
    ],
);

static SI_EXPONENTS: BlockSchema = leaf(
    "SI_EXPONENTS",
    &[
        ("length", Int),
        ("mass", Int),
        ("time", Int),
        ("electric_current", Int),
        ("temperature", Int),
        ("amount_of_substance", Int),
        ("luminous_intensity", Int),
    ],
);

static UNIT_CONVERSION: BlockSchema =
    leaf("UNIT_CONVERSION", &[("gradient", Float), ("offset", Float)]);

static ANNOTATION: BlockSchema = block(
    "ANNOTATION",
    &[],
    &[
        scalar("ANNOTATION_LABEL", "annotation_label", Str),
        scalar("ANNOTATION_ORIGIN", "annotation_origin", Str),
        node("ANNOTATION_TEXT", "annotation_text"),
    ],
);

static ANNOTATION_TEXT: BlockSchema =
    tail_block("ANNOTATION_TEXT", &[], Tail::Strings("text"), &[]);

static AXIS_DESCR: BlockSchema = block(
    "AXIS_DESCR",
    &[
        ("attribute", Ident),
        ("input_quantity", Ident),
        ("conversion", Ident),
        ("max_axis_points", Int),
        ("lower_limit", Float),
        ("upper_limit", Float),
    ],
    &[
        flag("READ_ONLY", "read_only"),
        scalar("FORMAT", "format", Str),
        scalar("AXIS_PTS_REF", "axis_pts_ref", Ident),
        scalar("MAX_GRAD", "max_grad", Float),
        scalar("MONOTONY", "monotony", Ident),
        scalar("BYTE_ORDER", "byte_order", Ident),
        node("EXTENDED_LIMITS", "extended_limits"),
        node("FIX_AXIS_PAR", "fix_axis_par"),
        node("FIX_AXIS_PAR_DIST", "fix_axis_par_dist"),
        node("FIX_AXIS_PAR_LIST", "fix_axis_par_list"),
        scalar("DEPOSIT", "deposit", Ident),
        scalar("CURVE_AXIS_REF", "curve_axis_ref", Ident),
        nodes("ANNOTATION", "annotation"),
    ],
);

static FIX_AXIS_PAR: BlockSchema = leaf(
    "FIX_AXIS_PAR",
    &[("offset", Int), ("shift", Int), ("numberapo", Int)],
);

static FIX_AXIS_PAR_DIST: BlockSchema = leaf(
    "FIX_AXIS_PAR_DIST",
    &[("offset", Int), ("distance", Int), ("numberapo", Int)],
);

static FIX_AXIS_PAR_LIST: BlockSchema = tail_block(
    "FIX_AXIS_PAR_LIST",
    &[],
    Tail::Floats("axis_pts_value"),
    &[],
);

static EXTENDED_LIMITS: BlockSchema = leaf(
    "EXTENDED_LIMITS",
    &[("lower_limit", Float), ("upper_limit", Float)],
);

static MAX_REFRESH: BlockSchema =
    leaf("MAX_REFRESH", &[("scaling_unit", Int), ("rate", Int)]);

static MATRIX_DIM: BlockSchema = leaf("MATRIX_DIM", &[("x", Int), ("y", Int), ("z", Int)]);

static FUNCTION_LIST: BlockSchema = tail_block("FUNCTION_LIST", &[], Tail::Idents("name"), &[]);

static MAP_LIST: BlockSchema = tail_block("MAP_LIST", &[], Tail::Idents("name"), &[]);

const fn ident_list(keyword: &'static str) -> BlockSchema {
    tail_block(keyword, &[], Tail::Idents("identifier"), &[])
}

static DEF_CHARACTERISTIC: BlockSchema = ident_list("DEF_CHARACTERISTIC");
static REF_CHARACTERISTIC: BlockSchema = ident_list("REF_CHARACTERISTIC");
static IN_MEASUREMENT: BlockSchema = ident_list("IN_MEASUREMENT");
static OUT_MEASUREMENT: BlockSchema = ident_list("OUT_MEASUREMENT");
static LOC_MEASUREMENT: BlockSchema = ident_list("LOC_MEASUREMENT");
static SUB_FUNCTION: BlockSchema = ident_list("SUB_FUNCTION");
static REF_MEASUREMENT: BlockSchema = ident_list("REF_MEASUREMENT");
static SUB_GROUP: BlockSchema = ident_list("SUB_GROUP");

static DEPENDENT_CHARACTERISTIC: BlockSchema = tail_block(
    "DEPENDENT_CHARACTERISTIC",
    &[("formula", Str)],
    Tail::Idents("characteristic"),
    &[],
);

static VIRTUAL_CHARACTERISTIC: BlockSchema = tail_block(
    "VIRTUAL_CHARACTERISTIC",
    &[("formula", Str)],
    Tail::Idents("characteristic"),
    &[],
);

static IF_DATA: BlockSchema = block("IF_DATA", &[], &[]);

/// The schema for `keyword`, if it names an A2L construct with one.
pub fn schema(keyword: &str) -> Option<&'static BlockSchema> {
    let schema = match keyword {
        "A2ML_VERSION" => &A2ML_VERSION,
        "ASAP2_VERSION" => &ASAP2_VERSION,
        "PROJECT" => &PROJECT,
        "HEADER" => &HEADER,
        "MODULE" => &MODULE,
        "MOD_PAR" => &MOD_PAR,
        "MOD_COMMON" => &MOD_COMMON,
        "SYSTEM_CONSTANT" => &SYSTEM_CONSTANT,
        "CALIBRATION_METHOD" => &CALIBRATION_METHOD,
        "CALIBRATION_HANDLE" => &CALIBRATION_HANDLE,
        "MEMORY_LAYOUT" => &MEMORY_LAYOUT,
        "MEMORY_SEGMENT" => &MEMORY_SEGMENT,
        "CHARACTERISTIC" => &CHARACTERISTIC,
        "AXIS_PTS" => &AXIS_PTS,
        "MEASUREMENT" => &MEASUREMENT,
        "BIT_OPERATION" => &BIT_OPERATION,
        "VIRTUAL" => &VIRTUAL,
        "COMPU_METHOD" => &COMPU_METHOD,
        "FORMULA" => &FORMULA,
        "COEFFS" => &COEFFS,
        "COMPU_TAB" => &COMPU_TAB,
        "COMPU_VTAB" => &COMPU_VTAB,
        "COMPU_VTAB_RANGE" => &COMPU_VTAB_RANGE,
        "FUNCTION" => &FUNCTION,
        "GROUP" => &GROUP,
        "RECORD_LAYOUT" => &RECORD_LAYOUT,
        "FNC_VALUES" => &FNC_VALUES,
        "IDENTIFICATION" => &IDENTIFICATION,
        "AXIS_PTS_X" => &AXIS_PTS_X,
        "AXIS_PTS_Y" => &AXIS_PTS_Y,
        "AXIS_PTS_Z" => &AXIS_PTS_Z,
        "AXIS_RESCALE_X" => &AXIS_RESCALE_X,
        "AXIS_RESCALE_Y" => &AXIS_RESCALE_Y,
        "AXIS_RESCALE_Z" => &AXIS_RESCALE_Z,
        "NO_AXIS_PTS_X" => &NO_AXIS_PTS_X,
        "NO_AXIS_PTS_Y" => &NO_AXIS_PTS_Y,
        "NO_AXIS_PTS_Z" => &NO_AXIS_PTS_Z,
        "NO_RESCALE_X" => &NO_RESCALE_X,
        "NO_RESCALE_Y" => &NO_RESCALE_Y,
        "NO_RESCALE_Z" => &NO_RESCALE_Z,
        "FIX_NO_AXIS_PTS_X" => &FIX_NO_AXIS_PTS_X,
        "FIX_NO_AXIS_PTS_Y" => &FIX_NO_AXIS_PTS_Y,
        "FIX_NO_AXIS_PTS_Z" => &FIX_NO_AXIS_PTS_Z,
        "SRC_ADDR_X" => &SRC_ADDR_X,
        "SRC_ADDR_Y" => &SRC_ADDR_Y,
        "SRC_ADDR_Z" => &SRC_ADDR_Z,
        "RIP_ADDR_W" => &RIP_ADDR_W,
        "RIP_ADDR_X" => &RIP_ADDR_X,
        "RIP_ADDR_Y" => &RIP_ADDR_Y,
        "RIP_ADDR_Z" => &RIP_ADDR_Z,
        "SHIFT_OP_X" => &SHIFT_OP_X,
        "SHIFT_OP_Y" => &SHIFT_OP_Y,
        "SHIFT_OP_Z" => &SHIFT_OP_Z,
        "OFFSET_X" => &OFFSET_X,
        "OFFSET_Y" => &OFFSET_Y,
        "OFFSET_Z" => &OFFSET_Z,
        "DIST_OP_X" => &DIST_OP_X,
        "DIST_OP_Y" => &DIST_OP_Y,
        "DIST_OP_Z" => &DIST_OP_Z,
        "RESERVED" => &RESERVED,
        "VARIANT_CODING" => &VARIANT_CODING,
        "VAR_CRITERION" => &VAR_CRITERION,
        "VAR_FORBIDDEN_COMB" => &VAR_FORBIDDEN_COMB,
        "VAR_CHARACTERISTIC" => &VAR_CHARACTERISTIC,
        "VAR_ADDRESS" => &VAR_ADDRESS,
        "FRAME" => &FRAME,
        "FRAME_MEASUREMENT" => &FRAME_MEASUREMENT,
        "USER_RIGHTS" => &USER_RIGHTS,
        "REF_GROUP" => &REF_GROUP,
        "UNIT" => &UNIT,
        "SI_EXPONENTS" => &SI_EXPONENTS,
        "UNIT_CONVERSION" => &UNIT_CONVERSION,
        "ANNOTATION" => &ANNOTATION,
        "ANNOTATION_TEXT" => &ANNOTATION_TEXT,
        "AXIS_DESCR" => &AXIS_DESCR,
        "FIX_AXIS_PAR" => &FIX_AXIS_PAR,
        "FIX_AXIS_PAR_DIST" => &FIX_AXIS_PAR_DIST,
        "FIX_AXIS_PAR_LIST" => &FIX_AXIS_PAR_LIST,
        "EXTENDED_LIMITS" => &EXTENDED_LIMITS,
        "MAX_REFRESH" => &MAX_REFRESH,
        "MATRIX_DIM" => &MATRIX_DIM,
        "FUNCTION_LIST" => &FUNCTION_LIST,
        "MAP_LIST" => &MAP_LIST,
        "DEF_CHARACTERISTIC" => &DEF_CHARACTERISTIC,
        "REF_CHARACTERISTIC" => &REF_CHARACTERISTIC,
        "IN_MEASUREMENT" => &IN_MEASUREMENT,
        "OUT_MEASUREMENT" => &OUT_MEASUREMENT,
        "LOC_MEASUREMENT" => &LOC_MEASUREMENT,
        "SUB_FUNCTION" => &SUB_FUNCTION,
        "REF_MEASUREMENT" => &REF_MEASUREMENT,
        "SUB_GROUP" => &SUB_GROUP,
        "DEPENDENT_CHARACTERISTIC" => &DEPENDENT_CHARACTERISTIC,
        "VIRTUAL_CHARACTERISTIC" => &VIRTUAL_CHARACTERISTIC,
        "IF_DATA" => &IF_DATA,
        _ => return None,
    };
    Some(schema)
}

pub(crate) fn if_data_schema() -> &'static BlockSchema {
    &IF_DATA
}

/// Reserved words. Besides the constructs with a schema this covers every
/// element keyword (scalars and flags) and `A2ML`; the lexer re-classifies
/// all of them as [`crate::TokenKind::Keyword`], which is also what stops
/// variable-length tails.
pub fn is_keyword(text: &str) -> bool {
    if schema(text).is_some() {
        return true;
    }
    matches!(
        text,
        "A2ML"
            | "ADDR_EPK"
            | "ALIGNMENT_BYTE"
            | "ALIGNMENT_FLOAT32_IEEE"
            | "ALIGNMENT_FLOAT64_IEEE"
            | "ALIGNMENT_LONG"
            | "ALIGNMENT_WORD"
            | "ANNOTATION_LABEL"
            | "ANNOTATION_ORIGIN"
            | "ARRAY_SIZE"
            | "AXIS_PTS_REF"
            | "BIT_MASK"
            | "BYTE_ORDER"
            | "CALIBRATION_ACCESS"
            | "COMPARISON_QUANTITY"
            | "COMPU_TAB_REF"
            | "CPU_TYPE"
            | "CURVE_AXIS_REF"
            | "CUSTOMER"
            | "CUSTOMER_NO"
            | "DATA_SIZE"
            | "DEFAULT_VALUE"
            | "DEPOSIT"
            | "DISPLAY_IDENTIFIER"
            | "ECU"
            | "ECU_ADDRESS"
            | "ECU_ADDRESS_EXTENSION"
            | "ECU_CALIBRATION_OFFSET"
            | "EPK"
            | "ERROR_MASK"
            | "FORMAT"
            | "FORMULA_INV"
            | "FUNCTION_VERSION"
            | "GUARD_RAILS"
            | "LEFT_SHIFT"
            | "MAX_GRAD"
            | "MONOTONY"
            | "NO_OF_INTERFACES"
            | "NUMBER"
            | "PHONE_NO"
            | "PROJECT_NO"
            | "READ_ONLY"
            | "READ_WRITE"
            | "REF_MEMORY_SEGMENT"
            | "REF_UNIT"
            | "RIGHT_SHIFT"
            | "ROOT"
            | "SIGN_EXTEND"
            | "SUPPLIER"
            | "S_REC_LAYOUT"
            | "USER"
            | "VAR_MEASUREMENT"
            | "VAR_NAMING"
            | "VAR_SELECTION_CHARACTERISTIC"
            | "VAR_SEPARATOR"
            | "VERSION"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_nested_element_resolves_to_a_schema() {
        fn check(s: &'static BlockSchema) {
            for elem in s.elems {
                if let ElemKind::Node(keyword) = elem.kind {
                    let nested = schema(keyword)
                        .unwrap_or_else(|| panic!("{} references unknown {}", s.keyword, keyword));
                    assert_eq!(nested.keyword, keyword);
                }
            }
        }
        for keyword in [
            "PROJECT",
            "HEADER",
            "MODULE",
            "MOD_PAR",
            "MOD_COMMON",
            "CHARACTERISTIC",
            "AXIS_PTS",
            "MEASUREMENT",
            "COMPU_METHOD",
            "COMPU_TAB",
            "COMPU_VTAB",
            "COMPU_VTAB_RANGE",
            "FUNCTION",
            "GROUP",
            "RECORD_LAYOUT",
            "VARIANT_CODING",
            "FRAME",
            "USER_RIGHTS",
            "UNIT",
            "ANNOTATION",
            "AXIS_DESCR",
            "MEMORY_LAYOUT",
            "MEMORY_SEGMENT",
            "CALIBRATION_METHOD",
        ] {
            check(schema(keyword).unwrap());
        }
    }

    #[test]
    fn element_keywords_are_reserved() {
        for s in ["MODULE", "CHARACTERISTIC", "MEASUREMENT", "MOD_PAR"] {
            for elem in schema(s).unwrap().elems {
                assert!(is_keyword(elem.keyword), "{} is not reserved", elem.keyword);
            }
        }
        assert!(is_keyword("A2ML"));
        assert!(!is_keyword("UBYTE"));
        assert!(!is_keyword("name"));
    }

    #[test]
    fn properties_follow_schema_order() {
        let project = schema("PROJECT").unwrap();
        let names: Vec<_> = project.property_names().collect();
        assert_eq!(names, vec!["name", "long_identifier", "header", "module"]);
    }
}
