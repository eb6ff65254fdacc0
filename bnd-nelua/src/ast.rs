//! Declaration tree — the clang-independent shape the walker consumes.
//!
//! [`crate::clang_ast`] lowers libclang cursors into these types; unit tests
//! build them by hand. Only the declaration kinds the walker dispatches on get
//! their own [`NodeKind`], everything else is [`NodeKind::Other`] and is walked
//! through transparently.

use std::path::{Path, PathBuf};

/// Declaration kind of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    TranslationUnit,
    EnumDecl,
    EnumConstantDecl,
    TypedefDecl,
    StructDecl,
    UnionDecl,
    FieldDecl,
    FunctionDecl,
    Other,
}

impl NodeKind {
    /// True for the kinds that introduce a declaration of their own, as
    /// opposed to references or statements.
    pub fn is_declaration(self) -> bool {
        !matches!(self, NodeKind::TranslationUnit | NodeKind::Other)
    }
}

/// One node of the declaration tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    /// Spelling; empty for anonymous declarations.
    pub name: String,
    /// Field type, typedef underlying type, or function type, depending on
    /// `kind`.
    pub ty: Option<CType>,
    /// Value of an enum constant.
    pub enum_value: Option<i128>,
    /// File the node was declared in. `None` for the translation unit and
    /// compiler built-ins.
    pub file: Option<PathBuf>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            ty: None,
            enum_value: None,
            file: None,
            children: Vec::new(),
        }
    }

    pub fn with_type(mut self, ty: CType) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn with_value(mut self, value: i128) -> Self {
        self.enum_value = Some(value);
        self
    }

    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    /// Children that are declarations themselves.
    pub fn declaration_children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(|c| c.kind.is_declaration())
    }

    /// Whether this node was declared in `file` (exact match, or `file` is a
    /// trailing component of the node's path).
    pub fn is_from(&self, file: &Path) -> bool {
        self.file
            .as_deref()
            .is_some_and(|f| f == file || f.ends_with(file))
    }
}

/// A member of an anonymous record, carried inline in [`CType::Record`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub name: String,
    pub ty: CType,
}

/// A C type expression.
///
/// Closed: every kind the translator knows about has a variant here, and
/// anything else is rejected while lowering from clang.
#[derive(Debug, Clone, PartialEq)]
pub enum CType {
    Void,
    Bool,
    /// Plain `char`, whichever signedness the target gives it.
    Char,
    SChar,
    UChar,
    Char16,
    Char32,
    WChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Int128,
    UInt128,
    Float,
    Double,
    LongDouble,
    Float128,
    Pointer(Box<CType>),
    /// `struct`/`union` reached through a type reference. Named records keep
    /// only their name; anonymous ones carry their fields.
    Record {
        name: String,
        is_union: bool,
        fields: Vec<RecordField>,
    },
    /// Enum reached through a type reference; `name` is empty when anonymous.
    Enum {
        name: String,
    },
    Typedef {
        name: String,
    },
    FunctionProto {
        result: Box<CType>,
        params: Vec<CType>,
    },
    ConstantArray {
        element: Box<CType>,
        len: usize,
    },
    /// `struct foo`, `enum bar` and other sugar around a named type.
    Elaborated(Box<CType>),
}

impl CType {
    pub fn pointer(pointee: CType) -> Self {
        CType::Pointer(Box::new(pointee))
    }

    pub fn named_record(name: impl Into<String>) -> Self {
        CType::Record {
            name: name.into(),
            is_union: false,
            fields: Vec::new(),
        }
    }

    pub fn typedef(name: impl Into<String>) -> Self {
        CType::Typedef { name: name.into() }
    }

    pub fn function(result: CType, params: Vec<CType>) -> Self {
        CType::FunctionProto {
            result: Box::new(result),
            params,
        }
    }

    /// Strip elaborated sugar.
    pub fn desugar(&self) -> &CType {
        match self {
            CType::Elaborated(inner) => inner.desugar(),
            other => other,
        }
    }

    /// The pointee of a pointer type, through sugar.
    pub fn pointee(&self) -> Option<&CType> {
        match self.desugar() {
            CType::Pointer(pointee) => Some(pointee),
            _ => None,
        }
    }
}
