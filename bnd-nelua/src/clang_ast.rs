//! Lowering — libclang `Entity`/`Type` → [`ast::Node`](crate::ast::Node) /
//! [`CType`].
//!
//! Only declarations located in the header being processed are lowered; the
//! rest of the translation unit (system headers, transitive includes) is
//! dropped here so unsupported types in unrelated files never surface.

use std::path::{Path, PathBuf};

use clang::{Entity, EntityKind, Index, Type as ClangType, TypeKind};
use tracing::{debug, trace};

use crate::ast::{CType, Node, NodeKind, RecordField};
use crate::error::{Error, Result};

/// Parse `path` with libclang and lower its declarations.
pub fn parse_header(index: &Index, path: &Path, args: &[String]) -> Result<Node> {
    if !path.is_file() {
        return Err(Error::ParseFailure {
            path: path.to_path_buf(),
            reason: "no such file".to_string(),
        });
    }
    let path_str = path.to_str().ok_or_else(|| Error::ParseFailure {
        path: path.to_path_buf(),
        reason: "path is not valid UTF-8".to_string(),
    })?;
    debug!(header = %path.display(), ?args, "parsing header");

    let tu = index
        .parser(path_str)
        .arguments(&args.iter().map(|s| s.as_str()).collect::<Vec<_>>())
        .parse()
        .map_err(|e| Error::ParseFailure {
            path: path.to_path_buf(),
            reason: format!("{e:?}"),
        })?;

    let root = tu.get_entity();
    let mut children = Vec::new();
    for entity in root.get_children() {
        if let Some(node) = lower_entity(&entity, path)? {
            children.push(node);
        }
    }
    Ok(Node::new(NodeKind::TranslationUnit, path_str).with_children(children))
}

/// Lower one entity and its in-file descendants. `None` for entities from
/// other files.
fn lower_entity(entity: &Entity, file: &Path) -> Result<Option<Node>> {
    let Some(location) = entity_file(entity) else {
        return Ok(None);
    };
    if location != file && !location.ends_with(file) {
        return Ok(None);
    }

    let kind = node_kind(entity.get_kind());
    let mut node = Node::new(kind, declaration_name(entity)).in_file(location);

    match kind {
        NodeKind::FieldDecl | NodeKind::FunctionDecl => {
            if let Some(ty) = entity.get_type() {
                node.ty = Some(lower_type(&ty)?);
            }
        }
        NodeKind::TypedefDecl => {
            if let Some(ty) = entity.get_typedef_underlying_type() {
                node.ty = Some(lower_type(&ty)?);
            }
        }
        NodeKind::EnumConstantDecl => {
            let unsigned_repr = entity
                .get_semantic_parent()
                .and_then(|parent| parent.get_enum_underlying_type())
                .is_some_and(|repr| is_unsigned(repr.get_canonical_type().get_kind()));
            node.enum_value = entity
                .get_enum_constant_value()
                .map(|(signed, unsigned)| {
                    if unsigned_repr {
                        i128::from(unsigned)
                    } else {
                        i128::from(signed)
                    }
                });
        }
        _ => {}
    }

    // Function bodies and parameter lists carry nothing the walker needs.
    if kind != NodeKind::FunctionDecl {
        for child in entity.get_children() {
            if let Some(lowered) = lower_entity(&child, file)? {
                node.children.push(lowered);
            }
        }
    }

    trace!(kind = ?node.kind, name = %node.name, "lowered");
    Ok(Some(node))
}

fn entity_file(entity: &Entity) -> Option<PathBuf> {
    let location = entity.get_location()?;
    let file = location.get_file_location().file?;
    Some(file.get_path())
}

fn node_kind(kind: EntityKind) -> NodeKind {
    match kind {
        EntityKind::TranslationUnit => NodeKind::TranslationUnit,
        EntityKind::EnumDecl => NodeKind::EnumDecl,
        EntityKind::EnumConstantDecl => NodeKind::EnumConstantDecl,
        EntityKind::TypedefDecl => NodeKind::TypedefDecl,
        EntityKind::StructDecl => NodeKind::StructDecl,
        EntityKind::UnionDecl => NodeKind::UnionDecl,
        EntityKind::FieldDecl => NodeKind::FieldDecl,
        EntityKind::FunctionDecl => NodeKind::FunctionDecl,
        _ => NodeKind::Other,
    }
}

fn is_unsigned(kind: TypeKind) -> bool {
    matches!(
        kind,
        TypeKind::Bool
            | TypeKind::CharU
            | TypeKind::UChar
            | TypeKind::Char16
            | TypeKind::Char32
            | TypeKind::UShort
            | TypeKind::UInt
            | TypeKind::ULong
            | TypeKind::ULongLong
            | TypeKind::UInt128
    )
}

/// The entity's spelling, or an empty string for anonymous declarations.
/// Newer libclang spells those `struct (unnamed at file.h:3:1)`.
fn declaration_name(entity: &Entity) -> String {
    if entity.is_anonymous() {
        return String::new();
    }
    match entity.get_name() {
        Some(name) if !is_unnamed_spelling(&name) => name,
        _ => String::new(),
    }
}

fn is_unnamed_spelling(name: &str) -> bool {
    name.contains("(unnamed") || name.contains("(anonymous")
}

// ---------------------------------------------------------------------------
// Type mapping: clang TypeKind → CType
// ---------------------------------------------------------------------------

fn lower_type(ty: &ClangType) -> Result<CType> {
    let lowered = match ty.get_kind() {
        TypeKind::Void => CType::Void,
        TypeKind::Bool => CType::Bool,
        TypeKind::CharS | TypeKind::CharU => CType::Char,
        TypeKind::SChar => CType::SChar,
        TypeKind::UChar => CType::UChar,
        TypeKind::Char16 => CType::Char16,
        TypeKind::Char32 => CType::Char32,
        TypeKind::WChar => CType::WChar,
        TypeKind::Short => CType::Short,
        TypeKind::UShort => CType::UShort,
        TypeKind::Int => CType::Int,
        TypeKind::UInt => CType::UInt,
        TypeKind::Long => CType::Long,
        TypeKind::ULong => CType::ULong,
        TypeKind::LongLong => CType::LongLong,
        TypeKind::ULongLong => CType::ULongLong,
        TypeKind::Int128 => CType::Int128,
        TypeKind::UInt128 => CType::UInt128,
        TypeKind::Float => CType::Float,
        TypeKind::Double => CType::Double,
        TypeKind::LongDouble => CType::LongDouble,
        TypeKind::Float128 => CType::Float128,

        TypeKind::Pointer => {
            let pointee = ty
                .get_pointee_type()
                .ok_or_else(|| missing(ty, "pointee"))?;
            CType::pointer(lower_type(&pointee)?)
        }

        TypeKind::ConstantArray => {
            let element = ty.get_element_type().ok_or_else(|| missing(ty, "element"))?;
            CType::ConstantArray {
                element: Box::new(lower_type(&element)?),
                len: ty.get_size().unwrap_or(0),
            }
        }

        // `T x[]` behaves as `T *x`.
        TypeKind::IncompleteArray => {
            let element = ty.get_element_type().ok_or_else(|| missing(ty, "element"))?;
            CType::pointer(lower_type(&element)?)
        }

        TypeKind::Elaborated => {
            let inner = ty
                .get_elaborated_type()
                .ok_or_else(|| missing(ty, "named type"))?;
            CType::Elaborated(Box::new(lower_type(&inner)?))
        }

        TypeKind::Attributed => {
            let inner = ty
                .get_modified_type()
                .ok_or_else(|| missing(ty, "modified type"))?;
            lower_type(&inner)?
        }

        TypeKind::Typedef => {
            let name = ty
                .get_declaration()
                .and_then(|d| d.get_name())
                .unwrap_or_default();
            if name.is_empty() {
                lower_type(&ty.get_canonical_type())?
            } else {
                CType::Typedef { name }
            }
        }

        TypeKind::Record => {
            let decl = ty.get_declaration().ok_or_else(|| missing(ty, "declaration"))?;
            let is_union = decl.get_kind() == EntityKind::UnionDecl;
            let name = declaration_name(&decl);
            let fields = if name.is_empty() {
                record_fields(&decl)?
            } else {
                Vec::new()
            };
            CType::Record {
                name,
                is_union,
                fields,
            }
        }

        TypeKind::Enum => {
            let name = ty
                .get_declaration()
                .map(|d| declaration_name(&d))
                .unwrap_or_default();
            CType::Enum { name }
        }

        TypeKind::FunctionPrototype => {
            let result = ty
                .get_result_type()
                .ok_or_else(|| missing(ty, "result type"))?;
            let params = ty
                .get_argument_types()
                .unwrap_or_default()
                .iter()
                .map(lower_type)
                .collect::<Result<Vec<_>>>()?;
            CType::function(lower_type(&result)?, params)
        }

        // K&R declaration: no parameter information.
        TypeKind::FunctionNoPrototype => {
            let result = ty
                .get_result_type()
                .ok_or_else(|| missing(ty, "result type"))?;
            CType::function(lower_type(&result)?, Vec::new())
        }

        TypeKind::Unexposed => {
            let canonical = ty.get_canonical_type();
            if canonical.get_kind() == TypeKind::Unexposed {
                return Err(unsupported(ty));
            }
            lower_type(&canonical)?
        }

        _ => return Err(unsupported(ty)),
    };
    Ok(lowered)
}

fn record_fields(decl: &Entity) -> Result<Vec<RecordField>> {
    decl.get_children()
        .iter()
        .filter(|c| c.get_kind() == EntityKind::FieldDecl)
        .map(|field| -> Result<RecordField> {
            let ty = field.get_type().ok_or_else(|| Error::UnsupportedTypeKind {
                kind: "<none>".to_string(),
                spelling: field.get_name().unwrap_or_default(),
            })?;
            Ok(RecordField {
                name: field.get_name().unwrap_or_default(),
                ty: lower_type(&ty)?,
            })
        })
        .collect()
}

fn unsupported(ty: &ClangType) -> Error {
    Error::UnsupportedTypeKind {
        kind: format!("{:?}", ty.get_kind()),
        spelling: ty.get_display_name(),
    }
}

/// A type whose accessor came back empty is as unusable as an unknown kind.
fn missing(ty: &ClangType, what: &str) -> Error {
    Error::UnsupportedTypeKind {
        kind: format!("{:?} without {what}", ty.get_kind()),
        spelling: ty.get_display_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnamed_spellings() {
        assert!(is_unnamed_spelling("struct (unnamed at /tmp/a.h:3:9)"));
        assert!(is_unnamed_spelling("enum (anonymous at a.h:1:1)"));
        assert!(!is_unnamed_spelling("CXCursor"));
    }

    #[test]
    fn enum_representation_signedness() {
        assert!(is_unsigned(TypeKind::UInt));
        assert!(is_unsigned(TypeKind::ULongLong));
        assert!(!is_unsigned(TypeKind::Int));
        assert!(!is_unsigned(TypeKind::CharS));
    }

    #[test]
    fn declaration_kinds() {
        assert_eq!(node_kind(EntityKind::StructDecl), NodeKind::StructDecl);
        assert_eq!(node_kind(EntityKind::UnionDecl), NodeKind::UnionDecl);
        assert_eq!(node_kind(EntityKind::ParmDecl), NodeKind::Other);
        assert_eq!(node_kind(EntityKind::TypeRef), NodeKind::Other);
    }
}
