use std::collections::HashMap;

/// One lexical layer: four independent name tables.
#[derive(Debug)]
pub struct Layer<T, F, S, V> {
    types: HashMap<String, T>,
    functions: HashMap<String, F>,
    structs: HashMap<String, S>,
    vars: HashMap<String, V>,
    /// Every variable inserted into this layer, in declaration order,
    /// including ones later shadowed within the same layer.
    declared: Vec<(String, V)>,
}

impl<T, F, S, V> Default for Layer<T, F, S, V> {
    fn default() -> Self {
        Layer {
            types: HashMap::new(),
            functions: HashMap::new(),
            structs: HashMap::new(),
            vars: HashMap::new(),
            declared: Vec::new(),
        }
    }
}

impl<T, F, S, V> Layer<T, F, S, V> {
    pub fn declared(&self) -> &[(String, V)] {
        &self.declared
    }

    pub fn into_declared(self) -> Vec<(String, V)> {
        self.declared
    }
}

/// Layered symbol tables. Lookups walk from the innermost layer outwards, so
/// inner declarations shadow outer ones and a re-declaration in the same layer
/// overwrites the earlier binding.
#[derive(Debug)]
pub struct ScopeStack<T, F, S, V> {
    layers: Vec<Layer<T, F, S, V>>,
}

impl<T, F, S, V> Default for ScopeStack<T, F, S, V> {
    fn default() -> Self {
        ScopeStack { layers: Vec::new() }
    }
}

impl<T, F, S, V> ScopeStack<T, F, S, V> {
    pub fn new() -> Self {
        ScopeStack::default()
    }

    pub fn push(&mut self) {
        self.layers.push(Layer::default());
    }

    pub fn pop(&mut self) -> Option<Layer<T, F, S, V>> {
        self.layers.pop()
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// The innermost layer's variables in declaration order.
    pub fn peek_declared(&self) -> &[(String, V)] {
        self.layers
            .last()
            .map(|layer| layer.declared())
            .unwrap_or(&[])
    }

    // Inserting with no open layer is a no-op; every pass pushes its builtin
    // layer before inserting anything.

    pub fn insert_type(&mut self, name: &str, ty: T) {
        if let Some(layer) = self.layers.last_mut() {
            layer.types.insert(name.to_string(), ty);
        }
    }

    pub fn insert_function(&mut self, name: &str, function: F) {
        if let Some(layer) = self.layers.last_mut() {
            layer.functions.insert(name.to_string(), function);
        }
    }

    pub fn insert_struct(&mut self, name: &str, decl: S) {
        if let Some(layer) = self.layers.last_mut() {
            layer.structs.insert(name.to_string(), decl);
        }
    }

    pub fn lookup_type(&self, name: &str) -> Option<&T> {
        self.layers.iter().rev().find_map(|layer| layer.types.get(name))
    }

    pub fn lookup_function(&self, name: &str) -> Option<&F> {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.functions.get(name))
    }

    pub fn lookup_struct(&self, name: &str) -> Option<&S> {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.structs.get(name))
    }

    pub fn lookup_var(&self, name: &str) -> Option<&V> {
        self.layers.iter().rev().find_map(|layer| layer.vars.get(name))
    }
}

impl<T, F, S, V: Clone> ScopeStack<T, F, S, V> {
    pub fn insert_var(&mut self, name: &str, var: V) {
        if let Some(layer) = self.layers.last_mut() {
            layer.declared.push((name.to_string(), var.clone()));
            layer.vars.insert(name.to_string(), var);
        }
    }
}
