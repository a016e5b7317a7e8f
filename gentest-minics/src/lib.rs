//! Reference front end for gentest: a mini C# dialect.
//!
//! The dialect understands the declaration skeleton of C# source: using
//! directives, file-scoped and block namespaces, type declarations with base
//! lists, nested types and static `Main` methods. Member bodies are skipped.
//! That is enough to exercise analyzers and generators end to end and to
//! surface the diagnostics generated code typically causes:
//!
//! | Id     | Severity | Meaning                                    |
//! |--------|----------|--------------------------------------------|
//! | CS0101 | error    | duplicate non-partial type in a namespace  |
//! | CS0246 | error    | unresolved type or namespace               |
//! | CS1001 | error    | identifier expected                        |
//! | CS1002 | error    | `;` expected                               |
//! | CS1022 | error    | unexpected token at namespace level        |
//! | CS1513 | error    | `}` expected                               |
//! | CS1514 | error    | `{` expected                               |
//! | CS5001 | error    | console program without a static `Main`    |
//! | CS8019 | hidden   | unnecessary using directive                |
//! | CS8954 | error    | more than one file-scoped namespace        |
//!
//! Names may carry a `global::` qualifier, which limits lookup to the global
//! namespace.

mod compilation;
mod lexer;
mod parser;

use std::sync::Arc;

pub use compilation::MiniCompilation;
use gentest_sdk::{CompilationOptions, CompilationRef, FrontEnd, MetadataReference, SyntaxTree};

/// The mini C# front end.
#[derive(Debug, Clone, Copy, Default)]
pub struct MiniCs;

impl MiniCs {
    /// A shared handle, as stored by test configurations.
    pub fn shared() -> Arc<dyn FrontEnd> {
        Arc::new(MiniCs)
    }
}

impl FrontEnd for MiniCs {
    fn name(&self) -> &'static str {
        "minics"
    }

    fn create_compilation(
        &self,
        assembly_name: &str,
        trees: Vec<SyntaxTree>,
        references: Vec<MetadataReference>,
        options: CompilationOptions,
    ) -> CompilationRef {
        Arc::new(MiniCompilation::new(assembly_name, trees, references, options))
    }
}

/// The core library every test usually references.
pub fn core_library() -> MetadataReference {
    MetadataReference::new("System.Runtime").with_namespace(
        "System",
        [
            "Object",
            "String",
            "Attribute",
            "Exception",
            "Int32",
            "Boolean",
            "Console",
            "IDisposable",
        ],
    )
}
