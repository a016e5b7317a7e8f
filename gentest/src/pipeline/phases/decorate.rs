//! Decorate phase - turns fragments into syntax trees.

use gentest_sdk::cancel;

use crate::{
    Result,
    pipeline::{Phase, RunContext},
    source::decorate,
};

/// Phase that decorates every fragment and parses it.
pub struct DecoratePhase;

impl Phase for DecoratePhase {
    fn name(&self) -> &'static str {
        "decorate"
    }

    fn description(&self) -> &'static str {
        "Decorate and parse source fragments"
    }

    fn run(&self, ctx: &mut RunContext<'_>) -> Result<()> {
        let front_end = ctx.configuration.front_end();
        for fragment in ctx.fragments {
            cancel::check(ctx.cancel)?;
            let text = decorate(ctx.imports, ctx.namespace, fragment);
            let tree = front_end.parse(&text, fragment.path(), ctx.cancel)?;
            ctx.syntax_trees.push(tree);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gentest_minics::MiniCs;
    use gentest_sdk::CancellationToken;

    use super::*;
    use crate::{Error, TestConfiguration, source::SourceFragment};

    #[test]
    fn test_fragments_keep_order_and_paths() {
        let config = TestConfiguration::new(MiniCs::shared(), Vec::new());
        let cancel = CancellationToken::new();
        let imports = vec!["System".to_string()];
        let fragments = vec![
            SourceFragment::at_path("Foo.cs", "class Foo {}"),
            SourceFragment::new("class Bar {}"),
        ];
        let mut ctx = RunContext::new(&config, &cancel, &imports, Some("App"), &fragments);

        DecoratePhase.run(&mut ctx).unwrap();

        assert_eq!(ctx.syntax_trees.len(), 2);
        assert_eq!(ctx.syntax_trees[0].path(), Some("Foo.cs"));
        assert_eq!(
            ctx.syntax_trees[0].text(),
            "using System;\n\nnamespace App;\n\nclass Foo {}"
        );
        assert_eq!(ctx.syntax_trees[1].path(), None);
    }

    #[test]
    fn test_cancelled_while_parsing() {
        let config = TestConfiguration::new(MiniCs::shared(), Vec::new());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let fragments = vec![SourceFragment::new("class Foo {}")];
        let mut ctx = RunContext::new(&config, &cancel, &[], None, &fragments);

        assert!(matches!(DecoratePhase.run(&mut ctx), Err(Error::Cancelled)));
        assert!(ctx.syntax_trees.is_empty());
    }
}
