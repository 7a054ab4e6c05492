//! A table-driven [`TypeOracle`] for tests: declare the facts a scenario
//! needs, leave everything else to the permissive defaults.

use rustc_hash::{FxHashMap, FxHashSet};
use tstl_core::ast::{DocComment, DocTag, NodeId};
use tstl_core::oracle::{ConstantValue, OracleSymbol, Signature, Type, TypeOracle};

#[derive(Default)]
pub struct MockTypeOracle {
    types: FxHashMap<NodeId, Type>,
    symbols: FxHashMap<NodeId, OracleSymbol>,
    signatures: FxHashMap<NodeId, Signature>,
    constants: FxHashMap<NodeId, ConstantValue>,
    contextual: FxHashMap<NodeId, Type>,
    exports: FxHashMap<NodeId, Vec<OracleSymbol>>,
    declarations: FxHashMap<OracleSymbol, Vec<NodeId>>,
    docs: FxHashMap<OracleSymbol, DocComment>,
    type_only_aliases: FxHashSet<NodeId>,
    next_symbol: u32,
}

impl MockTypeOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh oracle symbol handle.
    pub fn fresh_symbol(&mut self) -> OracleSymbol {
        self.next_symbol += 1;
        OracleSymbol(self.next_symbol)
    }

    pub fn set_type(&mut self, node: NodeId, ty: Type) -> &mut Self {
        self.types.insert(node, ty);
        self
    }

    /// Bind several identifier nodes to the same symbol, as the checker
    /// does for every reference to one declaration.
    pub fn bind_symbol(&mut self, symbol: OracleSymbol, nodes: &[NodeId]) -> &mut Self {
        for node in nodes {
            self.symbols.insert(*node, symbol);
        }
        self
    }

    pub fn set_signature(&mut self, call: NodeId, signature: Signature) -> &mut Self {
        self.signatures.insert(call, signature);
        self
    }

    pub fn set_constant(&mut self, node: NodeId, value: ConstantValue) -> &mut Self {
        self.constants.insert(node, value);
        self
    }

    pub fn set_contextual_type(&mut self, node: NodeId, ty: Type) -> &mut Self {
        self.contextual.insert(node, ty);
        self
    }

    pub fn add_export(&mut self, scope: NodeId, symbol: OracleSymbol) -> &mut Self {
        self.exports.entry(scope).or_default().push(symbol);
        self
    }

    pub fn add_declaration(&mut self, symbol: OracleSymbol, node: NodeId) -> &mut Self {
        self.declarations.entry(symbol).or_default().push(node);
        self
    }

    /// Attach doc-tag directives (e.g. `"forRange"`) to a symbol.
    pub fn set_symbol_directives(&mut self, symbol: OracleSymbol, tags: &[&str]) -> &mut Self {
        self.docs.insert(
            symbol,
            DocComment {
                text: Vec::new(),
                tags: tags
                    .iter()
                    .map(|name| DocTag {
                        name: name.to_string(),
                        text: String::new(),
                    })
                    .collect(),
            },
        );
        self
    }

    pub fn mark_type_only(&mut self, node: NodeId) -> &mut Self {
        self.type_only_aliases.insert(node);
        self
    }
}

impl TypeOracle for MockTypeOracle {
    fn type_of(&self, node: NodeId) -> Type {
        self.types.get(&node).cloned().unwrap_or_default()
    }

    fn type_from_type_node(&self, node: NodeId) -> Type {
        self.types.get(&node).cloned().unwrap_or_default()
    }

    fn symbol_of(&self, node: NodeId) -> Option<OracleSymbol> {
        self.symbols.get(&node).copied()
    }

    fn symbol_declarations(&self, symbol: OracleSymbol) -> Vec<NodeId> {
        self.declarations.get(&symbol).cloned().unwrap_or_default()
    }

    fn exports_of(&self, scope: NodeId) -> Vec<OracleSymbol> {
        self.exports.get(&scope).cloned().unwrap_or_default()
    }

    fn resolved_signature(&self, call: NodeId) -> Option<Signature> {
        self.signatures.get(&call).cloned()
    }

    fn contextual_type(&self, node: NodeId) -> Option<Type> {
        self.contextual.get(&node).cloned()
    }

    fn constant_value_of(&self, node: NodeId) -> Option<ConstantValue> {
        self.constants.get(&node).cloned()
    }

    fn doc_comment_of(&self, symbol: OracleSymbol) -> Option<DocComment> {
        self.docs.get(&symbol).cloned()
    }

    fn is_value_alias_declaration(&self, node: NodeId) -> bool {
        !self.type_only_aliases.contains(&node)
    }
}
