use std::collections::BTreeMap;

use crate::lang::ast::Identifier;

/// Index of a scope inside a [`Variables`] arena
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ScopeId(usize);

struct Scope<T> {
    inner: BTreeMap<Identifier, T>,
    parent: Option<ScopeId>,
    /// Function this scope was created for, if any
    owner: Option<Identifier>,
}

/// Arena of chained variable scopes
///
/// Scopes refer to their parent by index. Call frames are pushed on top and released in LIFO
/// order with [`Variables::truncate`], so an id stays valid for as long as the frame that created
/// it is live.
pub struct Variables<T> {
    scopes: Vec<Scope<T>>,
}

impl<T> Variables<T> {
    /// Create an arena holding only the root scope
    pub fn new() -> Self {
        Variables {
            scopes: vec![Scope {
                inner: BTreeMap::default(),
                parent: None,
                owner: None,
            }],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn push_scope(&mut self, parent: ScopeId, owner: Option<Identifier>) -> ScopeId {
        assert!(parent.0 < self.scopes.len());
        self.scopes.push(Scope {
            inner: BTreeMap::default(),
            parent: Some(parent),
            owner,
        });

        ScopeId(self.scopes.len() - 1)
    }

    /// Drop every scope pushed after the arena had `len` entries
    pub fn truncate(&mut self, len: usize) {
        assert!(len >= 1, "root scope must outlive the run");
        self.scopes.truncate(len);
    }

    pub fn get(&self, scope: ScopeId, ident: &Identifier) -> Option<&T> {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            let scope = &self.scopes[id.0];
            if let Some(val) = scope.inner.get(ident) {
                return Some(val);
            }
            cur = scope.parent;
        }

        None
    }

    /// Bind `ident` in `scope` itself; parents are never touched
    pub fn insert(&mut self, scope: ScopeId, ident: Identifier, val: T) {
        self.scopes[scope.0].inner.insert(ident, val);
    }

    pub fn owner(&self, scope: ScopeId) -> Option<&Identifier> {
        self.scopes[scope.0].owner.as_ref()
    }
}

impl<T> Default for Variables<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[test]
fn test_lookup_chain() {
    let mut vars = Variables::new();
    let root = vars.root();
    vars.insert(root, Identifier::from("x"), 1);

    let child = vars.push_scope(root, Some(Identifier::from("f")));
    vars.insert(child, Identifier::from("y"), 2);

    assert_eq!(vars.get(child, &Identifier::from("x")), Some(&1));
    assert_eq!(vars.get(child, &Identifier::from("y")), Some(&2));
    assert_eq!(vars.get(root, &Identifier::from("y")), None);
    assert_eq!(vars.get(child, &Identifier::from("z")), None);
    assert_eq!(vars.owner(child), Some(&Identifier::from("f")));
    assert_eq!(vars.owner(root), None);
}

#[test]
fn test_shadowing() {
    let mut vars = Variables::new();
    let root = vars.root();
    vars.insert(root, Identifier::from("x"), 1);

    let child = vars.push_scope(root, None);
    vars.insert(child, Identifier::from("x"), 10);

    assert_eq!(vars.get(child, &Identifier::from("x")), Some(&10));
    assert_eq!(vars.get(root, &Identifier::from("x")), Some(&1));
}

#[test]
fn test_truncate() {
    let mut vars = Variables::new();
    let root = vars.root();
    let len = vars.len();

    let child = vars.push_scope(root, None);
    vars.insert(child, Identifier::from("tmp"), 5);
    let _grandchild = vars.push_scope(child, None);
    assert_eq!(vars.len(), 3);

    vars.truncate(len);
    assert_eq!(vars.len(), 1);
    assert_eq!(vars.get(root, &Identifier::from("tmp")), None);
}
