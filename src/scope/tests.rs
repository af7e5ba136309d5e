//! Unit tests for the scope stack.

use crate::scope::scope::ScopeStack;

type TestScope = ScopeStack<&'static str, u32, (), i32>;

#[test]
fn test_lookup_walks_outwards() {
    let mut scope = TestScope::new();
    scope.push();
    scope.insert_type("i32", "builtin i32");
    scope.push();
    scope.insert_var("x", 1);

    assert_eq!(scope.lookup_type("i32"), Some(&"builtin i32"));
    assert_eq!(scope.lookup_var("x"), Some(&1));
    assert_eq!(scope.lookup_var("y"), None);
}

#[test]
fn test_inner_layer_shadows() {
    let mut scope = TestScope::new();
    scope.push();
    scope.insert_var("x", 1);
    scope.push();
    scope.insert_var("x", 2);
    assert_eq!(scope.lookup_var("x"), Some(&2));

    scope.pop();
    assert_eq!(scope.lookup_var("x"), Some(&1));
}

#[test]
fn test_same_layer_redeclaration_overwrites() {
    let mut scope = TestScope::new();
    scope.push();
    scope.insert_var("x", 1);
    scope.insert_var("x", 2);

    assert_eq!(scope.lookup_var("x"), Some(&2));
    assert_eq!(
        scope.peek_declared(),
        &[("x".to_string(), 1), ("x".to_string(), 2)]
    );
}

#[test]
fn test_tables_are_independent() {
    let mut scope = TestScope::new();
    scope.push();
    scope.insert_function("f", 7);

    assert_eq!(scope.lookup_function("f"), Some(&7));
    assert_eq!(scope.lookup_type("f"), None);
    assert_eq!(scope.lookup_var("f"), None);
    assert_eq!(scope.lookup_struct("f"), None);
}

#[test]
fn test_pop_returns_declared_locals() {
    let mut scope = TestScope::new();
    scope.push();
    scope.insert_var("outer", 0);
    scope.push();
    scope.insert_var("a", 1);
    scope.insert_var("b", 2);
    assert_eq!(scope.depth(), 2);

    let layer = scope.pop().unwrap();
    let names: Vec<_> = layer
        .into_declared()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(scope.depth(), 1);
    assert_eq!(scope.lookup_var("a"), None);
}

#[test]
fn test_insert_without_layer_is_ignored() {
    let mut scope = TestScope::new();
    scope.insert_var("x", 1);

    assert_eq!(scope.lookup_var("x"), None);
    assert!(scope.peek_declared().is_empty());
    assert!(scope.pop().is_none());
}
