//! Scope-tree symbol table.
//!
//! Scopes are arena-allocated records mirroring block nesting. Each scope
//! maps identifiers to their declared type and use/init flags in insertion
//! order (declaration order drives static-slot layout and the post-pass
//! warning order). Labels are `<level><suffix>`: the unique level-0 scope is
//! `0`; deeper scopes get a per-level letter suffix `a..z, aa..` in lexical
//! order.

use indexmap::IndexMap;
use rowan::TextRange;
use std::fmt::Write as _;

use crate::diagnostics::LineCol;
use crate::parser::SyntaxKind;

/// Index handle into the scope arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Declared type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    Int,
    String,
    Boolean,
}

impl VarType {
    /// Panics on non-type kinds; the parser only feeds type keywords here.
    pub fn from_keyword(kind: SyntaxKind) -> VarType {
        match kind {
            SyntaxKind::KwInt => VarType::Int,
            SyntaxKind::KwString => VarType::String,
            SyntaxKind::KwBoolean => VarType::Boolean,
            other => panic!("not a type keyword: {:?}", other),
        }
    }
}

impl std::fmt::Display for VarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarType::Int => write!(f, "int"),
            VarType::String => write!(f, "string"),
            VarType::Boolean => write!(f, "boolean"),
        }
    }
}

/// Per-identifier record.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub ty: VarType,
    pub initialized: bool,
    pub used: bool,
    pub declared_at: LineCol,
    /// Span of the declaring identifier, for related-location rendering.
    pub declared_span: TextRange,
}

#[derive(Debug)]
struct Scope {
    label: String,
    level: u32,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    symbols: IndexMap<String, Symbol>,
    /// One-shot flag consumed by the code generator's sibling descent.
    traversed: bool,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    /// Number of scopes opened so far at each level, for suffix assignment.
    level_counts: Vec<u32>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Opens a scope under `parent` (`None` opens the level-0 scope) and
    /// assigns its label.
    pub fn open_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let level = match parent {
            Some(p) => self.scopes[p.index()].level + 1,
            None => 0,
        };

        if self.level_counts.len() <= level as usize {
            self.level_counts.push(0);
        }
        let ordinal = self.level_counts[level as usize];
        self.level_counts[level as usize] += 1;

        let label = if level == 0 {
            "0".to_string()
        } else {
            format!("{}{}", level, letter_suffix(ordinal))
        };

        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            label,
            level,
            parent,
            children: Vec::new(),
            symbols: IndexMap::new(),
            traversed: false,
        });
        if let Some(p) = parent {
            self.scopes[p.index()].children.push(id);
        }
        id
    }

    pub fn root(&self) -> ScopeId {
        assert!(!self.scopes.is_empty(), "symbol table has no scopes");
        ScopeId(0)
    }

    pub fn label(&self, scope: ScopeId) -> &str {
        &self.scopes[scope.index()].label
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.index()].parent
    }

    pub fn children(&self, scope: ScopeId) -> &[ScopeId] {
        &self.scopes[scope.index()].children
    }

    /// Declares `name` in `scope`. On collision returns the record of the
    /// first declaration.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: &str,
        ty: VarType,
        declared_at: LineCol,
        declared_span: TextRange,
    ) -> Result<(), (LineCol, TextRange)> {
        let symbols = &mut self.scopes[scope.index()].symbols;
        if let Some(existing) = symbols.get(name) {
            return Err((existing.declared_at, existing.declared_span));
        }
        symbols.insert(
            name.to_string(),
            Symbol {
                ty,
                initialized: false,
                used: false,
                declared_at,
                declared_span,
            },
        );
        Ok(())
    }

    /// Resolves `name` by walking from `scope` to the root. Returns the
    /// declaring scope.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if self.scopes[id.index()].symbols.contains_key(name) {
                return Some(id);
            }
            current = self.scopes[id.index()].parent;
        }
        None
    }

    pub fn symbol(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.scopes[scope.index()].symbols.get(name)
    }

    pub fn symbol_mut(&mut self, scope: ScopeId, name: &str) -> Option<&mut Symbol> {
        self.scopes[scope.index()].symbols.get_mut(name)
    }

    /// Symbols of one scope in declaration order.
    pub fn symbols(&self, scope: ScopeId) -> impl Iterator<Item = (&str, &Symbol)> {
        self.scopes[scope.index()]
            .symbols
            .iter()
            .map(|(name, symbol)| (name.as_str(), symbol))
    }

    /// All scopes in creation order (depth-first, matching the analyzer's
    /// walk).
    pub fn scopes(&self) -> impl Iterator<Item = ScopeId> + '_ {
        (0..self.scopes.len() as u32).map(ScopeId)
    }

    /// The code generator's descent: entering the outermost block yields the
    /// root; entering a nested block yields the first child of `from` whose
    /// one-shot `traversed` flag is still clear, and sets it.
    pub fn descend(&mut self, from: Option<ScopeId>) -> ScopeId {
        let target = match from {
            None => self.root(),
            Some(parent) => {
                let children = &self.scopes[parent.index()].children;
                *children
                    .iter()
                    .find(|c| !self.scopes[c.index()].traversed)
                    .expect("emission entered more blocks than analysis created")
            }
        };
        self.scopes[target.index()].traversed = true;
        target
    }

    /// Tree dump used by verbose output and tests.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        if !self.scopes.is_empty() {
            self.format_scope(self.root(), 0, &mut out);
        }
        out
    }

    fn format_scope(&self, id: ScopeId, indent: usize, out: &mut String) {
        let scope = &self.scopes[id.index()];
        let prefix = "  ".repeat(indent);
        let _ = writeln!(out, "{}Scope {}", prefix, scope.label);
        for (name, symbol) in &scope.symbols {
            let mut flags = Vec::new();
            if symbol.initialized {
                flags.push("initialized");
            }
            if symbol.used {
                flags.push("used");
            }
            let _ = writeln!(
                out,
                "{}  {}: {} [{}] {}",
                prefix,
                name,
                symbol.ty,
                flags.join(", "),
                symbol.declared_at
            );
        }
        for &child in &scope.children {
            self.format_scope(child, indent + 1, out);
        }
    }
}

/// Bijective base-26 suffix: 0 → `a`, 25 → `z`, 26 → `aa`, 51 → `az`,
/// 52 → `ba`.
fn letter_suffix(mut n: u32) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'a' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).expect("suffix is ASCII")
}
