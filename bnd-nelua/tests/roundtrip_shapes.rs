//! Integration test: parse shapes.h + canvas.h → emit Nelua bindings → check
//! the declarations and their order.

use std::path::Path;
use std::sync::LazyLock;

// libclang allows one `Clang` instance at a time, so generate once.
static SHAPES: LazyLock<String> = LazyLock::new(|| {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../tests/fixtures/shapes/bnd-nelua.toml");
    bnd_nelua::generate(&path).expect("generate shapes bindings")
});

fn lines() -> Vec<&'static str> {
    SHAPES.lines().collect()
}

/// Index of the first line starting with `prefix`.
fn position(prefix: &str) -> usize {
    lines()
        .iter()
        .position(|l| l.starts_with(prefix))
        .unwrap_or_else(|| panic!("no line starting with `{prefix}` in:\n{}", *SHAPES))
}

/// The full text of the declaration starting with `prefix`, up to and
/// including its closing brace for multi-line bodies.
fn declaration(prefix: &str) -> String {
    let all = lines();
    let start = position(prefix);
    if !all[start].ends_with('{') {
        return all[start].to_string();
    }
    let end = all[start..]
        .iter()
        .position(|l| *l == "}")
        .map(|i| start + i)
        .expect("unterminated body");
    all[start..=end].join("\n")
}

#[test]
fn preamble_comes_first() {
    let all = lines();
    assert_eq!(all[0], "## linklib 'shapes'");
    assert_eq!(all[1], "global shapes = @record{ }");
}

#[test]
fn anonymous_enum_hooked_up_and_simplified() {
    assert_eq!(
        declaration("global ShapeKind ="),
        "global ShapeKind = @enum {\n\tCIRCLE = 0,\n\tSQUARE = 1,\n\tTRIANGLE = 2\n}"
    );
}

#[test]
fn named_enum_strips_its_own_name() {
    assert_eq!(
        declaration("global Color ="),
        "global Color = @enum {\n\tRed = 0,\n\tGreen = 5,\n\tBlue = 6\n}"
    );
}

#[test]
fn anonymous_struct_and_union_hooked_up() {
    assert_eq!(
        declaration("global Point ="),
        "global Point = @record {\n\tx: cint,\n\ty: cint\n}"
    );
    assert_eq!(
        declaration("global PointRef ="),
        "global PointRef = @*record {\n\tx: cint,\n\ty: cint\n}"
    );
    assert_eq!(
        declaration("global Number ="),
        "global Number = @union {\n\ti: cint,\n\tf: float32\n}"
    );
}

#[test]
fn struct_fields_translate() {
    assert_eq!(
        declaration("global Rect ="),
        "global Rect = @record {\n\torigin: Point,\n\twidth: cuint,\n\theight: cuint\n}"
    );
    assert_eq!(
        declaration("global _Polygon ="),
        "global _Polygon = @record {\n\tcount: csize,\n\tpoints: [8]Point,\n\tlabel: cstring\n}"
    );
    // registered once, under the tag
    assert!(!SHAPES.contains("global Polygon ="));
}

#[test]
fn typedef_aliases_and_function_types() {
    assert_eq!(declaration("global ShapeUserData ="), "global ShapeUserData = @pointer");
    assert_eq!(
        declaration("global ShapeContextImpl ="),
        "global ShapeContextImpl = @record {}"
    );
    assert_eq!(
        declaration("global ShapeContext ="),
        "global ShapeContext = @*ShapeContextImpl"
    );
    assert_eq!(
        declaration("global ShapeVisitor ="),
        "global ShapeVisitor = @function(a0: ShapeKind, a1: pointer): cint"
    );
    assert_eq!(declaration("global ShapeFlags ="), "global ShapeFlags = @cuint");
}

#[test]
fn functions_are_imported_once() {
    let expected = [
        "global function shape_context_create(a0: cstring): ShapeContext <cimport> end",
        "global function shape_context_destroy(a0: ShapeContext) <cimport> end",
        "global function shape_visit(a0: ShapeContext, a1: ShapeVisitor, a2: ShapeUserData): cint <cimport> end",
        "global function rect_area(a0: Rect): float64 <cimport> end",
        "global function polygon_is_closed(a0: *Polygon): boolean <cimport> end",
    ];
    for line in expected {
        assert_eq!(
            SHAPES.matches(line).count(),
            1,
            "expected `{line}` exactly once in:\n{}",
            *SHAPES
        );
    }
}

#[test]
fn second_header_reuses_first_headers_types() {
    assert_eq!(
        declaration("global Canvas ="),
        "global Canvas = @record {\n\tctx: ShapeContext,\n\tbounds: Rect,\n\ttitle: [32]cchar\n}"
    );
    assert_eq!(
        declaration("global function canvas_open"),
        "global function canvas_open(a0: ShapeContext, a1: Rect): *Canvas <cimport> end"
    );
    assert_eq!(SHAPES.matches("global Rect =").count(), 1);
    // types.h is only included, never walked
    assert!(!SHAPES.contains("size_t ="));
}

#[test]
fn declarations_follow_registration_order() {
    let order = [
        "global ShapeKind =",
        "global Color =",
        "global Point =",
        "global PointRef =",
        "global Rect =",
        "global _Polygon =",
        "global Number =",
        "global ShapeUserData =",
        "global ShapeContextImpl =",
        "global ShapeContext =",
        "global ShapeVisitor =",
        "global ShapeFlags =",
        "global function shape_context_create",
        "global function polygon_is_closed",
        "global Canvas =",
        "global function canvas_open",
        "global function canvas_close",
    ];
    let positions: Vec<usize> = order.iter().map(|p| position(p)).collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted, "out of order:\n{}", *SHAPES);
}
