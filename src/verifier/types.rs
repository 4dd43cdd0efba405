//! The semantic type model.
//!
//! Types live in a `TypeArena` and are addressed by `TypeId`. Parameterized
//! and function types are interned, so two type expressions denote the same
//! type exactly when they resolve to the same id and every comparison in the
//! verifier is an id comparison.

use std::collections::HashMap;

use super::{
    scope::{Properties, ScopeId},
    symbols::SymbolId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

#[derive(Debug)]
pub enum Type {
    /// `*`
    Any,
    /// `void`
    Void,
    /// The type of `null`.
    Null,
    Class(ClassType),
    /// `Origin<Arguments...>`
    Parameterized {
        origin: TypeId,
        arguments: Vec<TypeId>,
    },
    Function(FunctionType),
}

/// A class or an interface.
#[derive(Debug)]
pub struct ClassType {
    pub name: String,
    pub is_interface: bool,
    /// At most one super type. `None` for `Object` and for interfaces that
    /// extend nothing.
    pub super_type: Option<TypeId>,
    /// Number of type parameters, e.g. 1 for `Array`.
    pub type_parameters: usize,
    /// Instance properties in definition order.
    pub prototype: Properties,
    /// Scope holding the static properties.
    pub scope: Option<ScopeId>,
    pub constructor: Option<SymbolId>,
}

impl ClassType {
    pub fn new(name: &str, is_interface: bool) -> Self {
        ClassType {
            name: String::from(name),
            is_interface,
            super_type: None,
            type_parameters: 0,
            prototype: Properties::default(),
            scope: None,
            constructor: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub required: Vec<TypeId>,
    pub optional: Vec<TypeId>,
    pub rest: Option<TypeId>,
    pub result: TypeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TypeKey {
    Parameterized(TypeId, Vec<TypeId>),
    Function(FunctionType),
}

pub struct TypeArena {
    types: Vec<Type>,
    interned: HashMap<TypeKey, TypeId>,
    pub any: TypeId,
    pub void: TypeId,
    pub null: TypeId,
    pub object: TypeId,
    pub number: TypeId,
    pub string: TypeId,
    pub boolean: TypeId,
    pub function: TypeId,
    pub class: TypeId,
    pub array: TypeId,
    pub promise: TypeId,
}

impl TypeArena {
    /// Creates the arena with the built-in types. Their members and scopes
    /// are filled in when the verifier registers the built-ins.
    pub fn new() -> Self {
        let mut arena = TypeArena {
            types: vec![],
            interned: HashMap::new(),
            any: TypeId(0),
            void: TypeId(0),
            null: TypeId(0),
            object: TypeId(0),
            number: TypeId(0),
            string: TypeId(0),
            boolean: TypeId(0),
            function: TypeId(0),
            class: TypeId(0),
            array: TypeId(0),
            promise: TypeId(0),
        };

        arena.any = arena.add(Type::Any);
        arena.void = arena.add(Type::Void);
        arena.null = arena.add(Type::Null);
        arena.object = arena.add_class(ClassType::new("Object", false));

        let object = arena.object;
        let builtin = |arena: &mut TypeArena, name: &str, type_parameters: usize| {
            let mut class = ClassType::new(name, false);
            class.super_type = Some(object);
            class.type_parameters = type_parameters;
            arena.add_class(class)
        };

        arena.number = builtin(&mut arena, "Number", 0);
        arena.string = builtin(&mut arena, "String", 0);
        arena.boolean = builtin(&mut arena, "Boolean", 0);
        arena.function = builtin(&mut arena, "Function", 0);
        arena.class = builtin(&mut arena, "Class", 0);
        arena.array = builtin(&mut arena, "Array", 1);
        arena.promise = builtin(&mut arena, "Promise", 1);
        arena
    }

    fn add(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    pub fn add_class(&mut self, class: ClassType) -> TypeId {
        self.add(Type::Class(class))
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    pub fn class(&self, id: TypeId) -> Option<&ClassType> {
        match self.get(id) {
            Type::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn class_mut(&mut self, id: TypeId) -> Option<&mut ClassType> {
        match &mut self.types[id.0 as usize] {
            Type::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Interns `origin<arguments>`.
    pub fn parameterized(&mut self, origin: TypeId, arguments: Vec<TypeId>) -> TypeId {
        let key = TypeKey::Parameterized(origin, arguments.clone());
        if let Some(id) = self.interned.get(&key) {
            return *id;
        }
        let id = self.add(Type::Parameterized { origin, arguments });
        self.interned.insert(key, id);
        id
    }

    /// Interns a function type.
    pub fn function(&mut self, function: FunctionType) -> TypeId {
        let key = TypeKey::Function(function.clone());
        if let Some(id) = self.interned.get(&key) {
            return *id;
        }
        let id = self.add(Type::Function(function));
        self.interned.insert(key, id);
        id
    }

    pub fn array_of(&mut self, element: TypeId) -> TypeId {
        let array = self.array;
        self.parameterized(array, vec![element])
    }

    pub fn promise_of(&mut self, result: TypeId) -> TypeId {
        let promise = self.promise;
        self.parameterized(promise, vec![result])
    }

    pub fn function_type(&self, id: TypeId) -> Option<&FunctionType> {
        match self.get(id) {
            Type::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn required_parameter_count(&self, id: TypeId) -> usize {
        self.function_type(id).map(|f| f.required.len()).unwrap_or(0)
    }

    /// Required, optional and rest parameter types, in order.
    pub fn parameters(&self, id: TypeId) -> Vec<TypeId> {
        match self.function_type(id) {
            Some(f) => f
                .required
                .iter()
                .chain(f.optional.iter())
                .chain(f.rest.iter())
                .copied()
                .collect(),
            None => vec![],
        }
    }

    fn first_argument_of(&self, id: TypeId, expected_origin: TypeId) -> Option<TypeId> {
        match self.get(id) {
            Type::Parameterized { origin, arguments } if *origin == expected_origin => {
                arguments.first().copied()
            }
            _ => None,
        }
    }

    /// `T` for `Array<T>`, `None` for anything else.
    pub fn array_element_type(&self, id: TypeId) -> Option<TypeId> {
        self.first_argument_of(id, self.array)
    }

    /// `T` for `Promise<T>`, `None` for anything else.
    pub fn promise_result_type(&self, id: TypeId) -> Option<TypeId> {
        self.first_argument_of(id, self.promise)
    }

    /// The class a type takes its members from: the origin of a
    /// parameterized type, `Function` for function types.
    pub fn member_origin(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            Type::Class(_) => Some(id),
            Type::Parameterized { origin, .. } => Some(*origin),
            Type::Function(_) => Some(self.function),
            _ => None,
        }
    }

    pub fn super_type(&self, id: TypeId) -> Option<TypeId> {
        self.member_origin(id)
            .and_then(|origin| self.class(origin))
            .and_then(|class| class.super_type)
    }

    /// The type itself followed by each super type, ending at the first
    /// missing super link. `extends` cycles are rejected when linking, so
    /// the chain is finite.
    pub fn super_chain(&self, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        std::iter::successors(self.member_origin(id), move |current| self.super_type(*current))
    }

    /// The first instance property called `name` in the hierarchy of `id`,
    /// together with the class declaring it.
    pub fn find_instance_property(&self, id: TypeId, name: &str) -> Option<(TypeId, SymbolId)> {
        self.super_chain(id).find_map(|class_id| {
            self.class(class_id)
                .and_then(|class| class.prototype.get(name))
                .map(|symbol| (class_id, symbol))
        })
    }

    /// Whether `base` appears in the super chain of `sub`, `sub` included.
    pub fn descends_from(&self, sub: TypeId, base: TypeId) -> bool {
        self.super_chain(sub).any(|class| class == base)
    }

    /// Built-in classes are allocated before anything else.
    pub fn is_builtin(&self, id: TypeId) -> bool {
        id <= self.promise
    }

    pub fn is_interface(&self, id: TypeId) -> bool {
        self.class(id).map(|class| class.is_interface).unwrap_or(false)
    }

    pub fn display(&self, id: TypeId) -> String {
        match self.get(id) {
            Type::Any => String::from("*"),
            Type::Void => String::from("void"),
            Type::Null => String::from("null"),
            Type::Class(class) => class.name.clone(),
            Type::Parameterized { origin, arguments } => format!(
                "{}<{}>",
                self.display(*origin),
                arguments
                    .iter()
                    .map(|a| self.display(*a))
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
            Type::Function(function) => {
                let mut params = function
                    .required
                    .iter()
                    .map(|p| self.display(*p))
                    .collect::<Vec<String>>();
                params.extend(function.optional.iter().map(|p| format!("{}=", self.display(*p))));
                if let Some(rest) = function.rest {
                    params.push(format!("...{}", self.display(rest)));
                }
                format!("function({}):{}", params.join(", "), self.display(function.result))
            }
        }
    }
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}
