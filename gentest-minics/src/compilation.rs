//! Compilation snapshots and name binding.

use std::{collections::HashSet, sync::Arc};

use gentest_sdk::{
    Compilation, CompilationOptions, CompilationRef, Diagnostic, Location, MetadataReference,
    OutputKind, SyntaxTree, TypeSymbol,
};
use indexmap::IndexMap;

use crate::parser::{NameRef, ParsedTree, TypeDecl, parse};

/// Keyword types that always resolve.
const BUILTIN_TYPES: &[&str] = &[
    "object", "string", "bool", "byte", "sbyte", "char", "short", "ushort", "int", "uint", "long",
    "ulong", "float", "double", "decimal", "void", "dynamic",
];

/// An immutable mini C# compilation.
#[derive(Debug, Clone)]
pub struct MiniCompilation {
    assembly_name: String,
    trees: Vec<SyntaxTree>,
    parsed: Vec<Arc<ParsedTree>>,
    references: Vec<MetadataReference>,
    options: CompilationOptions,
}

impl MiniCompilation {
    pub fn new(
        assembly_name: impl Into<String>,
        trees: Vec<SyntaxTree>,
        references: Vec<MetadataReference>,
        options: CompilationOptions,
    ) -> Self {
        let parsed = trees.iter().map(|t| Arc::new(parse(t.text()))).collect();
        Self {
            assembly_name: assembly_name.into(),
            trees,
            parsed,
            references,
            options,
        }
    }
}

impl Compilation for MiniCompilation {
    fn assembly_name(&self) -> &str {
        &self.assembly_name
    }

    fn syntax_trees(&self) -> &[SyntaxTree] {
        &self.trees
    }

    fn references(&self) -> &[MetadataReference] {
        &self.references
    }

    fn options(&self) -> &CompilationOptions {
        &self.options
    }

    fn diagnostics(&self) -> Vec<Diagnostic> {
        Binder::new(self).bind()
    }

    fn declared_types(&self) -> Vec<TypeSymbol> {
        self.trees
            .iter()
            .zip(&self.parsed)
            .flat_map(|(tree, parsed)| {
                parsed.types.iter().map(move |decl| TypeSymbol {
                    namespace: decl.namespace.clone(),
                    name: decl.name.name.clone(),
                    path: tree.path().map(str::to_string),
                })
            })
            .collect()
    }

    fn add_syntax_trees(&self, trees: Vec<SyntaxTree>) -> CompilationRef {
        let mut next = self.clone();
        for tree in trees {
            next.parsed.push(Arc::new(parse(tree.text())));
            next.trees.push(tree);
        }
        Arc::new(next)
    }
}

/// A declaration seen while binding, keyed by namespace-qualified name.
struct Declared {
    partial: bool,
}

struct Binder<'c> {
    compilation: &'c MiniCompilation,
    source_namespaces: HashSet<String>,
    /// `(namespace, simple name)` of every source type.
    source_types: HashSet<(Option<String>, String)>,
}

impl<'c> Binder<'c> {
    fn new(compilation: &'c MiniCompilation) -> Self {
        let mut source_namespaces = HashSet::new();
        let mut source_types = HashSet::new();
        for parsed in &compilation.parsed {
            for ns in &parsed.namespaces {
                let mut prefix = String::new();
                for segment in ns.split('.') {
                    if !prefix.is_empty() {
                        prefix.push('.');
                    }
                    prefix.push_str(segment);
                    source_namespaces.insert(prefix.clone());
                }
            }
            for decl in &parsed.types {
                source_types.insert((decl.namespace.clone(), decl.name.name.clone()));
            }
        }
        Self {
            compilation,
            source_namespaces,
            source_types,
        }
    }

    fn bind(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut declared: IndexMap<(Option<String>, Option<String>, String), Declared> =
            IndexMap::new();

        for (tree, parsed) in self.compilation.trees.iter().zip(&self.compilation.parsed) {
            let path = tree.path();

            for error in &parsed.errors {
                diagnostics.push(
                    Diagnostic::error(error.id, error.message.clone())
                        .at(Location::in_tree(path, error.span)),
                );
            }

            let mut used = vec![false; parsed.usings.len()];
            for using in &parsed.usings {
                if !self.namespace_exists(&using.name.name) {
                    diagnostics.push(not_found(&using.name, path));
                }
            }

            for decl in &parsed.types {
                let key = (
                    decl.namespace.clone(),
                    decl.containing_type.clone(),
                    decl.name.name.clone(),
                );
                match declared.get(&key) {
                    Some(first) if !(first.partial && decl.partial) => {
                        diagnostics.push(duplicate(decl, path));
                    }
                    Some(_) => {}
                    None => {
                        declared.insert(
                            key,
                            Declared {
                                partial: decl.partial,
                            },
                        );
                    }
                }

                for base in &decl.bases {
                    if !self.resolve_type(base, decl, parsed, &mut used) {
                        diagnostics.push(not_found(base, path));
                    }
                }
            }

            for (using, used) in parsed.usings.iter().zip(used) {
                if !used && self.namespace_exists(&using.name.name) {
                    diagnostics.push(
                        Diagnostic::hidden("CS8019", "Unnecessary using directive.")
                            .at(Location::in_tree(path, using.name.span)),
                    );
                }
            }
        }

        if self.compilation.options.output_kind == OutputKind::Console
            && !self.compilation.parsed.iter().any(|p| p.has_main)
        {
            diagnostics.push(Diagnostic::error(
                "CS5001",
                "Program does not contain a static 'Main' method suitable for an entry point",
            ));
        }

        diagnostics
    }

    fn namespace_exists(&self, namespace: &str) -> bool {
        self.source_namespaces.contains(namespace)
            || self
                .compilation
                .references
                .iter()
                .any(|r| r.exports_namespace(namespace))
    }

    fn type_exists(&self, namespace: Option<&str>, name: &str) -> bool {
        self.source_types
            .contains(&(namespace.map(str::to_string), name.to_string()))
            || namespace.is_some_and(|ns| {
                self.compilation
                    .references
                    .iter()
                    .any(|r| r.exports_type(ns, name))
            })
    }

    /// Resolve a type name used by `decl`, marking the using directives that
    /// contributed.
    fn resolve_type(
        &self,
        name: &NameRef,
        decl: &TypeDecl,
        parsed: &ParsedTree,
        used: &mut [bool],
    ) -> bool {
        let global = name.global;
        let name = name.name.as_str();
        if BUILTIN_TYPES.contains(&name) {
            return true;
        }

        // Qualified names resolve on their own.
        if let Some((namespace, simple)) = name.rsplit_once('.') {
            return self.type_exists(Some(namespace), simple);
        }
        if global {
            return self.type_exists(None, name);
        }

        // Nested types are visible from their siblings.
        if decl.containing_type.is_some()
            && parsed
                .types
                .iter()
                .any(|t| t.containing_type == decl.containing_type && t.name.name == name)
        {
            return true;
        }

        // Enclosing namespaces, innermost first, then the global namespace.
        let mut scope = decl.namespace.as_deref();
        loop {
            if self.type_exists(scope, name) {
                return true;
            }
            match scope {
                Some(ns) => scope = ns.rsplit_once('.').map(|(outer, _)| outer),
                None => break,
            }
        }

        let mut found = false;
        for &index in &decl.usings_in_scope {
            let using = &parsed.usings[index];
            if self.type_exists(Some(&using.name.name), name) {
                used[index] = true;
                found = true;
            }
        }
        found
    }
}

fn not_found(name: &NameRef, path: Option<&str>) -> Diagnostic {
    Diagnostic::error(
        "CS0246",
        format!(
            "The type or namespace name '{}' could not be found (are you missing a using directive or an assembly reference?)",
            name.name
        ),
    )
    .at(Location::in_tree(path, name.span))
}

fn duplicate(decl: &TypeDecl, path: Option<&str>) -> Diagnostic {
    let container = match (&decl.containing_type, &decl.namespace) {
        (Some(outer), _) => format!("The type '{}'", outer),
        (None, Some(ns)) => format!("The namespace '{}'", ns),
        (None, None) => "The namespace '<global namespace>'".to_string(),
    };
    Diagnostic::error(
        "CS0101",
        format!(
            "{} already contains a definition for '{}'",
            container, decl.name.name
        ),
    )
    .at(Location::in_tree(path, decl.name.span))
}

#[cfg(test)]
mod tests {
    use gentest_sdk::Severity;

    use super::*;
    use crate::core_library;

    fn compile(sources: &[(&str, &str)]) -> MiniCompilation {
        MiniCompilation::new(
            "Test",
            sources
                .iter()
                .map(|(path, text)| SyntaxTree::new(Some(path), *text))
                .collect(),
            vec![core_library()],
            CompilationOptions::default(),
        )
    }

    fn ids(compilation: &MiniCompilation) -> Vec<String> {
        compilation.diagnostics().into_iter().map(|d| d.id).collect()
    }

    #[test]
    fn test_clean_compilation() {
        let c = compile(&[("Foo.cs", "using System;\n\nclass Foo : Attribute {}")]);
        assert!(ids(&c).is_empty());
        assert!(c.emit().success);
    }

    #[test]
    fn test_unresolved_base() {
        let c = compile(&[("Foo.cs", "class Foo : Missing {}")]);
        let diagnostics = c.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].id, "CS0246");
        assert_eq!(diagnostics[0].path(), Some("Foo.cs"));
        assert!(!c.emit().success);
    }

    #[test]
    fn test_cross_tree_resolution() {
        let c = compile(&[
            ("A.cs", "namespace N;\nclass A : B {}"),
            ("B.cs", "namespace N;\nclass B {}"),
        ]);
        assert!(ids(&c).is_empty());
    }

    #[test]
    fn test_enclosing_namespace_resolution() {
        let c = compile(&[
            ("A.cs", "namespace Outer.Inner;\nclass A : B {}"),
            ("B.cs", "namespace Outer;\nclass B {}"),
        ]);
        assert!(ids(&c).is_empty());
    }

    #[test]
    fn test_global_qualified_base() {
        let c = compile(&[("A.cs", "class A : global::System.Object {}")]);
        assert!(ids(&c).is_empty());
    }

    #[test]
    fn test_global_alias_skips_enclosing_namespaces() {
        let c = compile(&[
            ("A.cs", "namespace N;\nclass A : global::B {}"),
            ("B.cs", "namespace N;\nclass B {}"),
        ]);
        assert_eq!(ids(&c), vec!["CS0246"]);
    }

    #[test]
    fn test_second_file_scoped_namespace_reported_once() {
        let c = compile(&[("A.cs", "namespace A;\nnamespace B;\nclass C {}")]);
        assert_eq!(ids(&c), vec!["CS8954"]);
    }

    #[test]
    fn test_unknown_using() {
        let c = compile(&[("A.cs", "using Nowhere;\nclass A {}")]);
        assert_eq!(ids(&c), vec!["CS0246"]);
    }

    #[test]
    fn test_unnecessary_using_is_hidden() {
        let c = compile(&[("A.cs", "using System;\nclass A {}")]);
        let diagnostics = c.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].id, "CS8019");
        assert_eq!(diagnostics[0].severity, Severity::Hidden);
        assert!(c.emit().success);
    }

    #[test]
    fn test_duplicate_types() {
        let c = compile(&[("A.cs", "class A {}"), ("B.cs", "class A {}")]);
        assert_eq!(ids(&c), vec!["CS0101"]);

        let c = compile(&[("A.cs", "partial class A {}"), ("B.cs", "partial class A {}")]);
        assert!(ids(&c).is_empty());
    }

    #[test]
    fn test_console_requires_main() {
        let c = MiniCompilation::new(
            "App",
            vec![SyntaxTree::new(None, "class Program {}")],
            vec![],
            CompilationOptions::console(),
        );
        assert_eq!(ids(&c), vec!["CS5001"]);

        let c = MiniCompilation::new(
            "App",
            vec![SyntaxTree::new(None, "class Program { static void Main() {} }")],
            vec![],
            CompilationOptions::console(),
        );
        assert!(ids(&c).is_empty());
    }

    #[test]
    fn test_add_syntax_trees_resolves_missing_symbol() {
        let c = compile(&[("A.cs", "class A : B {}")]);
        assert_eq!(ids(&c), vec!["CS0246"]);

        let next = c.add_syntax_trees(vec![SyntaxTree::new(Some("gen/B.g.cs"), "class B {}")]);
        assert!(next.diagnostics().is_empty());
        assert_eq!(next.declared_types().len(), 2);
        // the original snapshot is untouched
        assert_eq!(c.syntax_trees().len(), 1);
    }
}
