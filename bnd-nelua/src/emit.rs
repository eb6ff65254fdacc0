//! Emitter — registry entities → Nelua source text.

use std::fmt::Write;

use tracing::debug;

use crate::model::*;
use crate::translate::param_list;

/// Emit the whole binding file: the link preamble, the namespace anchor
/// record, then one declaration per entity in registration order.
///
/// Enum constants are simplified first; that is the only mutation.
pub fn emit(registry: &mut Registry, library: &str, namespace: &str) -> String {
    registry.simplify_enums();

    let mut out = String::new();
    let _ = writeln!(out, "## linklib '{library}'");
    let _ = writeln!(out, "global {namespace} = @record{{ }}");

    for entity in registry.iter() {
        let text = render_entity(entity);
        if entity.noglobal() {
            let _ = writeln!(out, "{text}");
        } else {
            let _ = writeln!(out, "global {text}");
        }
    }

    debug!(entities = registry.len(), bytes = out.len(), "emitted bindings");
    out
}

/// Render a single entity's declaration, without the scope keyword.
pub fn render_entity(entity: &Entity) -> String {
    match entity {
        Entity::Alias(a) => render_alias(a),
        Entity::Enum(e) => render_enum(e),
        Entity::Struct(s) => render_struct(s),
        Entity::FuncType(f) => format!("{} = @{}", f.name, function_signature(f)),
        Entity::FuncDecl(f) => format!("function {}{} <cimport> end", f.name, arguments(f)),
        Entity::Method(m) => render_method(m),
    }
}

fn render_alias(a: &AliasType) -> String {
    if a.ty.is_empty() {
        format!("{} = @void", a.name)
    } else {
        format!("{} = {}", a.name, a.ty)
    }
}

fn render_enum(e: &EnumType) -> String {
    if e.values.is_empty() {
        return format!("{} = @enum {{}}", e.name);
    }
    let body: Vec<String> = e
        .values
        .iter()
        .map(|(name, value)| format!("\t{name} = {value}"))
        .collect();
    format!("{} = @enum {{\n{}\n}}", e.name, body.join(",\n"))
}

fn render_struct(s: &StructType) -> String {
    let pointer = if s.pointer { "*" } else { "" };
    let keyword = if s.is_union { "union" } else { "record" };
    if s.fields.is_empty() {
        return format!("{} = @{pointer}{keyword} {{}}", s.name);
    }
    let body: Vec<String> = s
        .fields
        .iter()
        .map(|(name, ty)| format!("\t{name}: {ty}"))
        .collect();
    format!(
        "{} = @{pointer}{keyword} {{\n{}\n}}",
        s.name,
        body.join(",\n")
    )
}

fn render_method(m: &MethodDecl) -> String {
    let mut text = format!(
        "function {}:{}{}\n",
        m.record,
        m.method,
        arguments(&m.signature)
    );
    for line in &m.body {
        let _ = writeln!(text, "\t{line}");
    }
    text.push_str("end");
    text
}

/// `function(a0: cint): cint`
fn function_signature(f: &FuncType) -> String {
    format!("function{}", arguments(f))
}

/// `(a0: cint)` plus `: ret` when the function returns something.
fn arguments(f: &FuncType) -> String {
    let mut text = format!("({})", param_list(&f.args));
    if !f.ret_type.is_empty() {
        text.push_str(": ");
        text.push_str(&f.ret_type);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn func(name: &str, args: &[&str], ret: &str) -> FuncType {
        FuncType {
            name: name.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            ret_type: ret.into(),
        }
    }

    #[test]
    fn preamble_then_registration_order() {
        let mut reg = Registry::new();
        let mut code = EnumType::new("CXErrorCode");
        code.values.insert("CXError_Success".into(), 0);
        code.values.insert("CXError_Failure".into(), 1);
        reg.register(code);
        let mut string = StructType::new("CXString");
        string.fields.push(("data".into(), "pointer".into()));
        string.fields.push(("private_flags".into(), "cuint".into()));
        reg.register(string);
        reg.register(Entity::FuncDecl(func("clang_getCString", &["CXString"], "cstring")));

        let out = emit(&mut reg, "clang", "clang");
        assert_eq!(
            out,
            "## linklib 'clang'\n\
             global clang = @record{ }\n\
             global CXErrorCode = @enum {\n\tSuccess = 0,\n\tFailure = 1\n}\n\
             global CXString = @record {\n\tdata: pointer,\n\tprivate_flags: cuint\n}\n\
             global function clang_getCString(a0: CXString): cstring <cimport> end\n"
        );
    }

    #[test]
    fn empty_bodies() {
        assert_eq!(
            render_entity(&EnumType::new("Nothing").into()),
            "Nothing = @enum {}"
        );
        assert_eq!(
            render_entity(&StructType::new("CXTargetInfoImpl").into()),
            "CXTargetInfoImpl = @record {}"
        );
    }

    #[test]
    fn enum_values_keep_their_full_range() {
        let mut mask = EnumType::new("Mask");
        mask.values.insert("ALL".into(), i128::from(u64::MAX));
        mask.values.insert("LOWEST".into(), i128::from(i64::MIN));
        assert_eq!(
            render_entity(&mask.into()),
            "Mask = @enum {\n\tALL = 18446744073709551615,\n\tLOWEST = -9223372036854775808\n}"
        );
    }

    #[test]
    fn pointer_and_union_records() {
        let mut handle = StructType::new("FileRef");
        handle.pointer = true;
        handle.fields.push(("fd".into(), "cint".into()));
        assert_eq!(
            render_entity(&handle.into()),
            "FileRef = @*record {\n\tfd: cint\n}"
        );
        assert_eq!(render_entity(&StructType::union("Bits").into()), "Bits = @union {}");
    }

    #[test]
    fn aliases() {
        assert_eq!(
            render_entity(&AliasType::new("CXIndex", "@pointer").into()),
            "CXIndex = @pointer"
        );
        assert_eq!(render_entity(&AliasType::new("Unit", "").into()), "Unit = @void");
    }

    #[test]
    fn function_types_and_declarations() {
        assert_eq!(
            render_entity(&Entity::FuncType(func(
                "CXCursorVisitor",
                &["CXCursor", "CXCursor", "CXClientData"],
                "CXChildVisitResult"
            ))),
            "CXCursorVisitor = @function(a0: CXCursor, a1: CXCursor, a2: CXClientData): CXChildVisitResult"
        );
        assert_eq!(
            render_entity(&Entity::FuncDecl(func("clang_disposeIndex", &["CXIndex"], ""))),
            "function clang_disposeIndex(a0: CXIndex) <cimport> end"
        );
        assert_eq!(
            render_entity(&Entity::FuncDecl(func("clang_getBuildSessionTimestamp", &[], "culonglong"))),
            "function clang_getBuildSessionTimestamp(): culonglong <cimport> end"
        );
    }

    #[test]
    fn methods_are_emitted_locally() {
        let mut reg = Registry::new();
        let mut dispose = MethodDecl::new("CXString", "dispose");
        dispose.body.push("clang_disposeString(self)".into());
        reg.register(dispose);

        let out = emit(&mut reg, "clang", "clang");
        assert!(
            out.ends_with(
                "\nfunction CXString:dispose()\n\tclang_disposeString(self)\nend\n"
            ),
            "{out}"
        );
        assert!(!out.contains("global function CXString:dispose"));
    }

    #[test]
    fn namespace_anchor_can_differ_from_library() {
        let mut reg = Registry::new();
        let out = emit(&mut reg, "z", "zlib");
        assert_eq!(out, "## linklib 'z'\nglobal zlib = @record{ }\n");
    }
}
