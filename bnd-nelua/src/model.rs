//! Binding model — named entities and the registry that orders them.
//!
//! Entities hold already-translated type text, so the emitter never looks at
//! C types again.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::trace;

/// A typedef to a non-aggregate type. `ty` is the type-of text (`@cint`).
#[derive(Debug, Clone, PartialEq)]
pub struct AliasType {
    pub name: String,
    pub ty: String,
}

impl AliasType {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: String,
    pub values: IndexMap<String, i128>,
    pub simplified: bool,
}

impl EnumType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: IndexMap::new(),
            simplified: false,
        }
    }

    /// Strip the prefix shared by the enum's constants, once.
    ///
    /// The prefix is measured on the first constant: `<EnumName>_` when the
    /// constant starts with it, otherwise everything up to and including the
    /// first `_`. A first constant without `_` means no stripping. The same
    /// length is cut from every constant; a constant that would end up empty
    /// or starting with a digit keeps its full name.
    pub fn simplify(&mut self) {
        if self.simplified {
            return;
        }
        let Some(first) = self.values.keys().next() else {
            self.simplified = true;
            return;
        };
        let prefix_len = common_prefix_len(&self.name, first);

        let values = std::mem::take(&mut self.values);
        for (name, value) in values {
            let stripped = match name.get(prefix_len..) {
                Some(rest) if is_identifier(rest) => rest.to_string(),
                _ => name,
            };
            self.values.insert(stripped, value);
        }
        self.simplified = true;
    }
}

fn common_prefix_len(enum_name: &str, first: &str) -> usize {
    if !enum_name.is_empty()
        && first
            .strip_prefix(enum_name)
            .is_some_and(|rest| rest.starts_with('_'))
    {
        return enum_name.len() + 1;
    }
    first.find('_').map_or(0, |i| i + 1)
}

fn is_identifier(s: &str) -> bool {
    s.chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub name: String,
    /// `(field name, translated type)` in declaration order.
    pub fields: Vec<(String, String)>,
    pub methods: Vec<String>,
    /// The type is only ever used behind a pointer (`typedef struct {..} *H`).
    pub pointer: bool,
    pub is_union: bool,
}

impl StructType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            methods: Vec::new(),
            pointer: false,
            is_union: false,
        }
    }

    pub fn union(name: impl Into<String>) -> Self {
        Self {
            is_union: true,
            ..Self::new(name)
        }
    }
}

/// A function signature: positional argument types and a return type.
/// An empty `ret_type` means `void`.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncType {
    pub name: String,
    pub args: Vec<String>,
    pub ret_type: String,
}

impl FuncType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            ret_type: String::new(),
        }
    }
}

/// A function attached to a record's namespace (`function S:m() ... end`).
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub signature: FuncType,
    pub record: String,
    pub method: String,
    /// Body lines, emitted one per line.
    pub body: Vec<String>,
}

impl MethodDecl {
    pub fn new(record: impl Into<String>, method: impl Into<String>) -> Self {
        let record = record.into();
        let method = method.into();
        Self {
            signature: FuncType::new(format!("{record}:{method}")),
            record,
            method,
            body: Vec::new(),
        }
    }
}

/// Anything the registry can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Alias(AliasType),
    Enum(EnumType),
    Struct(StructType),
    /// A function-pointer type.
    FuncType(FuncType),
    /// An imported C function.
    FuncDecl(FuncType),
    Method(MethodDecl),
}

impl Entity {
    pub fn name(&self) -> &str {
        match self {
            Entity::Alias(a) => &a.name,
            Entity::Enum(e) => &e.name,
            Entity::Struct(s) => &s.name,
            Entity::FuncType(f) | Entity::FuncDecl(f) => &f.name,
            Entity::Method(m) => &m.signature.name,
        }
    }

    /// Methods live in their record's namespace; everything else is emitted
    /// at file scope.
    pub fn noglobal(&self) -> bool {
        matches!(self, Entity::Method(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Entity::Alias(_) => "alias",
            Entity::Enum(_) => "enum",
            Entity::Struct(s) if s.is_union => "union",
            Entity::Struct(_) => "struct",
            Entity::FuncType(_) => "function type",
            Entity::FuncDecl(_) => "function",
            Entity::Method(_) => "method",
        }
    }
}

impl From<AliasType> for Entity {
    fn from(a: AliasType) -> Self {
        Entity::Alias(a)
    }
}

impl From<EnumType> for Entity {
    fn from(e: EnumType) -> Self {
        Entity::Enum(e)
    }
}

impl From<StructType> for Entity {
    fn from(s: StructType) -> Self {
        Entity::Struct(s)
    }
}

impl From<MethodDecl> for Entity {
    fn from(m: MethodDecl) -> Self {
        Entity::Method(m)
    }
}

/// Position of an entity in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(usize);

/// Ordered, deduplicating store of named entities.
///
/// Entities live in an arena in registration order, which is also emission
/// order. Names map into the arena, so two names can share one entity after a
/// [`Registry::rebind`].
#[derive(Debug, Default)]
pub struct Registry {
    entities: Vec<Entity>,
    names: HashMap<String, EntityId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `entity` under its name unless the name is taken. Returns the
    /// id now bound to that name: the new entity's, or the existing one's.
    pub fn register(&mut self, entity: impl Into<Entity>) -> EntityId {
        let entity = entity.into();
        if let Some(&id) = self.names.get(entity.name()) {
            trace!(name = entity.name(), kind = entity.kind(), "already registered");
            return id;
        }
        let id = EntityId(self.entities.len());
        self.names.insert(entity.name().to_string(), id);
        self.entities.push(entity);
        id
    }

    pub fn id_of(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    pub fn lookup(&self, name: &str) -> Option<&Entity> {
        self.id_of(name).map(|id| &self.entities[id.0])
    }

    pub fn get(&self, id: EntityId) -> &Entity {
        &self.entities[id.0]
    }

    pub fn get_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.0]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Move the binding of `old` to `new`, keeping the entity where it is in
    /// the order. Returns false if `old` is not bound. Rebinding a name to
    /// itself leaves it bound.
    pub fn rebind(&mut self, old: &str, new: &str) -> bool {
        let Some(&id) = self.names.get(old) else {
            return false;
        };
        if old != new {
            self.names.remove(old);
            self.names.insert(new.to_string(), id);
        }
        true
    }

    /// Entities in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn simplify_enums(&mut self) {
        for entity in &mut self.entities {
            if let Entity::Enum(e) = entity {
                e.simplify();
            }
        }
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
