//! Type translation — [`CType`] → Nelua type expression text.

use crate::ast::{CType, RecordField};

/// Where a translated type is going to appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Parameter, return and field positions: the bare type text.
    Contextual,
    /// A type used as a value (the right-hand side of a type alias): the text
    /// is prefixed with `@` unless it is empty.
    TypeOf,
}

/// Translate `ty` into Nelua syntax.
///
/// `void` translates to the empty string; callers read that as "no value".
pub fn translate(ty: &CType, mode: Mode) -> String {
    let text = translate_contextual(ty);
    match mode {
        Mode::Contextual => text,
        Mode::TypeOf if text.is_empty() => text,
        Mode::TypeOf => format!("@{text}"),
    }
}

fn translate_contextual(ty: &CType) -> String {
    match ty {
        CType::Void => String::new(),
        CType::Bool => "boolean".to_string(),
        CType::Char => "cchar".to_string(),
        CType::SChar => "cschar".to_string(),
        CType::UChar => "cuchar".to_string(),
        CType::Char16 => "uint16".to_string(),
        CType::Char32 => "uint32".to_string(),
        // wchar_t is a 32-bit signed integer on the LP64 targets we parse for
        CType::WChar => "int32".to_string(),
        CType::Short => "cshort".to_string(),
        CType::UShort => "cushort".to_string(),
        CType::Int => "cint".to_string(),
        CType::UInt => "cuint".to_string(),
        CType::Long => "clong".to_string(),
        CType::ULong => "culong".to_string(),
        CType::LongLong => "clonglong".to_string(),
        CType::ULongLong => "culonglong".to_string(),
        CType::Int128 => "int128".to_string(),
        CType::UInt128 => "uint128".to_string(),
        CType::Float => "float32".to_string(),
        CType::Double => "float64".to_string(),
        CType::LongDouble => "clongdouble".to_string(),
        CType::Float128 => "float128".to_string(),

        CType::Pointer(pointee) => {
            let inner = translate_contextual(pointee);
            if inner == "cchar" {
                return "cstring".to_string();
            }
            match pointee.desugar() {
                CType::Void => "pointer".to_string(),
                // Function pointers are first-class function types in Nelua.
                CType::FunctionProto { .. } => inner,
                _ => format!("*{inner}"),
            }
        }

        CType::Record {
            name,
            is_union,
            fields,
        } => {
            if !name.is_empty() {
                return name.clone();
            }
            let keyword = if *is_union { "union" } else { "record" };
            inline_record(keyword, fields)
        }

        CType::Enum { name } => {
            if name.is_empty() {
                "enum{}".to_string()
            } else {
                name.clone()
            }
        }

        CType::Typedef { name } => match name.as_str() {
            "size_t" => "csize".to_string(),
            _ => name.clone(),
        },

        CType::FunctionProto { result, params } => {
            let params: Vec<String> = params.iter().map(translate_contextual).collect();
            let mut text = format!("function({})", param_list(&params));
            let ret = translate_contextual(result);
            if !ret.is_empty() {
                text.push_str(": ");
                text.push_str(&ret);
            }
            text
        }

        CType::ConstantArray { element, len } => {
            format!("[{len}]{}", translate_contextual(element))
        }

        CType::Elaborated(inner) => translate_contextual(inner),
    }
}

fn inline_record(keyword: &str, fields: &[RecordField]) -> String {
    if fields.is_empty() {
        return format!("{keyword}{{}}");
    }
    let members: Vec<String> = fields
        .iter()
        .map(|f| format!("{}: {}", f.name, translate_contextual(&f.ty)))
        .collect();
    format!("{keyword}{{ {} }}", members.join(", "))
}

/// Render positional parameters: `a0: cint, a1: cstring`.
pub(crate) fn param_list(types: &[String]) -> String {
    types
        .iter()
        .enumerate()
        .map(|(i, ty)| format!("a{i}: {ty}"))
        .collect::<Vec<_>>()
        .join(", ")
}
