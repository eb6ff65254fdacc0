//! Walker — depth-first pass over a header's declaration tree that fills the
//! [`Registry`].
//!
//! C lets a typedef name an anonymous `struct`/`enum` only after the body has
//! been seen, so members found outside a named scope are parked in orphan
//! buffers until the typedef arrives and claims them.

use std::path::PathBuf;

use tracing::{debug, trace, warn};

use crate::ast::{CType, Node, NodeKind, RecordField};
use crate::error::Error;
use crate::model::{AliasType, Entity, EntityId, EnumType, FuncType, Registry, StructType};
use crate::translate::{Mode, translate};

/// Context threaded by value through the traversal.
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    current_enum: Option<EntityId>,
    current_struct: Option<EntityId>,
    /// Inside the body of some record, named or not.
    in_record: bool,
}

/// Walks one header into a shared registry.
pub struct Walker<'r> {
    registry: &'r mut Registry,
    file: PathBuf,
    enum_orphans: Vec<(String, i128)>,
    struct_orphans: Vec<(String, String)>,
}

impl<'r> Walker<'r> {
    /// `file` is the header being processed; nodes from any other file are
    /// skipped.
    pub fn new(registry: &'r mut Registry, file: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            file: file.into(),
            enum_orphans: Vec::new(),
            struct_orphans: Vec::new(),
        }
    }

    /// Enum constants still waiting for a typedef.
    pub fn enum_orphans(&self) -> &[(String, i128)] {
        &self.enum_orphans
    }

    /// Struct fields still waiting for a typedef.
    pub fn struct_orphans(&self) -> &[(String, String)] {
        &self.struct_orphans
    }

    /// Walk the children of `root` (normally the translation unit).
    pub fn walk(&mut self, root: &Node) {
        let before = self.registry.len();
        self.walk_children(root, Scope::default());

        if !self.enum_orphans.is_empty() || !self.struct_orphans.is_empty() {
            warn!(
                file = %self.file.display(),
                enum_constants = self.enum_orphans.len(),
                fields = self.struct_orphans.len(),
                "anonymous members never claimed by a typedef"
            );
        }
        debug!(
            file = %self.file.display(),
            registered = self.registry.len() - before,
            "walk complete"
        );
    }

    fn walk_children(&mut self, node: &Node, scope: Scope) {
        for child in &node.children {
            if !child.is_from(&self.file) {
                continue;
            }
            match child.kind {
                NodeKind::EnumDecl => self.walk_enum_decl(child, scope),
                NodeKind::EnumConstantDecl => self.walk_enum_constant_decl(child, scope),
                NodeKind::TypedefDecl => self.walk_typedef_decl(child),
                NodeKind::StructDecl | NodeKind::UnionDecl => self.walk_record_decl(child, scope),
                NodeKind::FieldDecl => self.walk_field_decl(child, scope),
                NodeKind::FunctionDecl => self.walk_function_decl(child),
                NodeKind::TranslationUnit | NodeKind::Other => self.walk_children(child, scope),
            }
        }
    }

    fn walk_enum_decl(&mut self, node: &Node, scope: Scope) {
        let mut inner = scope;
        inner.current_enum = if node.is_anonymous() {
            None
        } else {
            let id = self.register(EnumType::new(&node.name));
            self.expect_kind(id, &node.name, |e| matches!(e, Entity::Enum(_)))
        };
        self.walk_children(node, inner);
    }

    fn walk_enum_constant_decl(&mut self, node: &Node, scope: Scope) {
        let value = node.enum_value.unwrap_or_default();
        match scope.current_enum {
            Some(id) => {
                if let Entity::Enum(e) = self.registry.get_mut(id) {
                    e.values.insert(node.name.clone(), value);
                }
            }
            None => {
                trace!(name = %node.name, value, "orphan enum constant");
                self.enum_orphans.push((node.name.clone(), value));
            }
        }
    }

    fn walk_record_decl(&mut self, node: &Node, scope: Scope) {
        let is_union = node.kind == NodeKind::UnionDecl;
        let mut inner = Scope {
            in_record: true,
            ..scope
        };

        if node.is_anonymous() {
            // The owning field's type already carries this layout inline.
            if scope.in_record {
                trace!("skipping anonymous record nested in a record body");
                return;
            }
            inner.current_struct = None;
        } else {
            let record = if is_union {
                StructType::union(&node.name)
            } else {
                StructType::new(&node.name)
            };
            let id = self.register(record);
            inner.current_struct =
                self.expect_kind(id, &node.name, |e| matches!(e, Entity::Struct(_)));
        }
        self.walk_children(node, inner);
    }

    fn walk_field_decl(&mut self, node: &Node, scope: Scope) {
        let Some(ty) = &node.ty else {
            warn!(name = %node.name, "field without a type, skipping");
            return;
        };
        let field = (node.name.clone(), translate(ty, Mode::Contextual));
        trace!(name = %field.0, ty = %field.1, "field");
        match scope.current_struct {
            Some(id) => {
                if let Entity::Struct(s) = self.registry.get_mut(id) {
                    s.fields.push(field);
                }
            }
            None => self.struct_orphans.push(field),
        }
    }

    fn walk_function_decl(&mut self, node: &Node) {
        let Some(CType::FunctionProto { result, params }) = node.ty.as_ref().map(CType::desugar)
        else {
            warn!(name = %node.name, "function without a prototype type, skipping");
            return;
        };
        let decl = signature(&node.name, result, params);
        self.register(Entity::FuncDecl(decl));
    }

    fn walk_typedef_decl(&mut self, node: &Node) {
        let name = node.name.as_str();
        let Some(underlying) = &node.ty else {
            warn!(name, "typedef without an underlying type, skipping");
            return;
        };

        if let Some(pointee) = underlying.pointee() {
            self.typedef_pointer(name, underlying, pointee);
            return;
        }

        let declarations: Vec<&Node> = node.declaration_children().collect();
        match declarations.as_slice() {
            [] => self.typedef_alias(name, underlying),
            [child] if child.kind == NodeKind::EnumDecl => self.typedef_enum(name, child),
            [child] if matches!(child.kind, NodeKind::StructDecl | NodeKind::UnionDecl) => {
                self.typedef_record(name, child)
            }
            _ => {
                let err = Error::UnrecognizedTypedefShape {
                    name: name.to_string(),
                };
                warn!(err = %err, children = declarations.len(), "skipping typedef");
            }
        }
    }

    /// `typedef R (*F)(A...)`, `typedef struct {..} *H` and `typedef T *P`.
    fn typedef_pointer(&mut self, name: &str, underlying: &CType, pointee: &CType) {
        match pointee.desugar() {
            CType::FunctionProto { result, params } => {
                self.register(Entity::FuncType(signature(name, result, params)));
            }
            CType::Record {
                name: record,
                is_union,
                fields,
            } if record.is_empty() => {
                let mut handle = if *is_union {
                    StructType::union(name)
                } else {
                    StructType::new(name)
                };
                handle.pointer = true;
                handle.fields = self.claim_record_fields(fields);
                self.register(handle);
            }
            _ => {
                self.register(AliasType::new(name, translate(underlying, Mode::TypeOf)));
            }
        }
    }

    /// Fields of an anonymous record reached through a pointer typedef. The
    /// pointee carries its own layout; the orphan buffer is only a fallback,
    /// and is cleared when it holds this same body.
    fn claim_record_fields(&mut self, carried: &[RecordField]) -> Vec<(String, String)> {
        if carried.is_empty() {
            return std::mem::take(&mut self.struct_orphans);
        }
        let fields: Vec<(String, String)> = carried
            .iter()
            .map(|f| (f.name.clone(), translate(&f.ty, Mode::Contextual)))
            .collect();
        if self.struct_orphans == fields {
            self.struct_orphans.clear();
        }
        fields
    }

    /// A typedef with no declaration of its own: `typedef unsigned Flags;`,
    /// `typedef struct Foo Bar;`.
    fn typedef_alias(&mut self, name: &str, underlying: &CType) {
        if let CType::Record { name: tag, .. } | CType::Enum { name: tag } = underlying.desugar()
            && tag == name
        {
            trace!(name, "skipping tag passthrough typedef");
            return;
        }
        self.register(AliasType::new(name, translate(underlying, Mode::TypeOf)));
    }

    fn typedef_enum(&mut self, name: &str, child: &Node) {
        if !child.is_anonymous() {
            self.hookup_named(name, &child.name);
            return;
        }
        let mut e = EnumType::new(name);
        e.values.extend(std::mem::take(&mut self.enum_orphans));
        self.register(e);
    }

    fn typedef_record(&mut self, name: &str, child: &Node) {
        if !child.is_anonymous() {
            self.hookup_named(name, &child.name);
            return;
        }
        let mut record = if child.kind == NodeKind::UnionDecl {
            StructType::union(name)
        } else {
            StructType::new(name)
        };
        record.fields = std::mem::take(&mut self.struct_orphans);
        self.register(record);
    }

    fn hookup_named(&mut self, typedef: &str, tag: &str) {
        if self.registry.rebind(tag, typedef) {
            debug!(tag, typedef, "rebound tag to typedef name");
        } else {
            warn!(tag, typedef, "typedef refers to an unregistered tag");
        }
    }

    fn register(&mut self, entity: impl Into<Entity>) -> EntityId {
        let entity = entity.into();
        if !self.registry.contains(entity.name()) {
            debug!(name = entity.name(), kind = entity.kind(), "registered");
        }
        self.registry.register(entity)
    }

    /// `id` if the entity it names passes `is_kind`, otherwise `None` with a
    /// warning (a same-name entity of another kind got there first).
    fn expect_kind(
        &self,
        id: EntityId,
        name: &str,
        is_kind: impl Fn(&Entity) -> bool,
    ) -> Option<EntityId> {
        let entity = self.registry.get(id);
        if is_kind(entity) {
            Some(id)
        } else {
            warn!(name, existing = entity.kind(), "name already registered as another kind");
            None
        }
    }
}

fn signature(name: &str, result: &CType, params: &[CType]) -> FuncType {
    FuncType {
        name: name.to_string(),
        args: params
            .iter()
            .map(|p| translate(p, Mode::Contextual))
            .collect(),
        ret_type: translate(result, Mode::Contextual),
    }
}
