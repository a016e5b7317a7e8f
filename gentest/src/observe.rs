//! Structured logging of a test run through `tracing`.
//!
//! Everything here only reads the run; turning logging off cannot change a
//! result.

use gentest_sdk::{Diagnostic, Severity, SyntaxTree};
use tracing::{debug, error, info, trace, warn};

use crate::{
    LoggingOptions, Result, Stage, TestResult,
    format::{format_code, format_diagnostics, short_file_name, tree_list},
    pipeline::{Plugin, RunContext},
};

/// Plugin that logs tested code, diagnostics and generated code according
/// to its [`LoggingOptions`].
#[derive(Debug, Clone, Copy)]
pub struct ObservabilityPlugin {
    options: LoggingOptions,
}

impl ObservabilityPlugin {
    pub fn new(options: LoggingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> LoggingOptions {
        self.options
    }

    fn log_result(&self, result: &TestResult) {
        let options = self.options;
        for (stage, enabled) in [
            (Stage::Analyzer, options.analyzer_diagnostics),
            (Stage::Generator, options.generator_diagnostics),
            (Stage::Final, options.final_diagnostics),
        ] {
            if enabled {
                log_diagnostics(result.diagnostics(stage), stage);
            }
        }

        if options.generated_code {
            log_generated_code(result);
        }
    }
}

impl Plugin for ObservabilityPlugin {
    fn name(&self) -> &'static str {
        "observability"
    }

    fn on_before_phase(&self, phase: &'static str, _ctx: &RunContext<'_>) -> Result<()> {
        debug!(phase, "phase started");
        Ok(())
    }

    fn on_after_phase(&self, phase: &'static str, ctx: &RunContext<'_>) -> Result<()> {
        debug!(phase, "phase finished");
        match phase {
            "decorate" if self.options.tested_code => {
                for tree in &ctx.syntax_trees {
                    log_tree(tree, "Tested code");
                }
            }
            "aggregate" => {
                if let Some(result) = &ctx.result {
                    self.log_result(result);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Log a tree's text with line numbers.
pub fn log_tree(tree: &SyntaxTree, message: &str) {
    let code = format_code(tree.text());
    match tree.path().and_then(short_file_name) {
        Some(file) => info!(file, "{} ({})\n{}", message, file, code),
        None => info!("{}\n{}", message, code),
    }
}

/// Log diagnostics grouped by severity, most severe first.
pub fn log_diagnostics(diagnostics: &[Diagnostic], stage: Stage) {
    if diagnostics.is_empty() {
        debug!(stage = %stage, "{} reported no diagnostics", stage);
        return;
    }

    for severity in Severity::DISPLAY_ORDER {
        let group: Vec<Diagnostic> = diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .cloned()
            .collect();
        if group.is_empty() {
            continue;
        }

        let count = group.len();
        let message = format!(
            "{} reported {} {} diagnostics:\n{}",
            stage,
            count,
            severity,
            format_diagnostics(&group)
        );
        match severity {
            Severity::Error => error!(stage = %stage, count, "{}", message),
            Severity::Warning => warn!(stage = %stage, count, "{}", message),
            Severity::Info => info!(stage = %stage, count, "{}", message),
            Severity::Hidden => trace!(stage = %stage, count, "{}", message),
        }
    }
}

/// Log the trees every generator added, one block per generator.
pub fn log_generated_code(result: &TestResult) {
    for (id, driver) in result.generator_results() {
        let Some(run) = driver.run_result() else {
            continue;
        };
        let trees: Vec<&SyntaxTree> = run.generated_trees().collect();
        if trees.is_empty() {
            continue;
        }

        info!(
            generator = %id,
            count = trees.len(),
            "Generator {} generated {} trees:\n{}",
            id,
            trees.len(),
            tree_list(trees.iter().copied(), 1).unwrap_or_default()
        );
        for tree in trees {
            log_tree(tree, "Generated code");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use gentest_sdk::{LineSpan, Location};
    use tracing::Level;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture(level: Level, f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        captured.text()
    }

    #[test]
    fn test_log_tree_with_file_name() {
        let tree = SyntaxTree::new(Some("gen/Foo.g.cs"), "class Foo\n{\n}");
        let output = capture(Level::INFO, || log_tree(&tree, "Generated code"));

        assert!(output.contains("Generated code (Foo.g.cs)"));
        assert!(output.contains("0 | class Foo\n1 | {\n2 | }"));
    }

    #[test]
    fn test_diagnostics_grouped_by_severity() {
        let diagnostics = vec![
            Diagnostic::warning("W0001", "first warning"),
            Diagnostic::error("E0001", "an error")
                .at(Location::in_tree(Some("A.cs"), LineSpan::on_line(0, 6, 1))),
            Diagnostic::warning("W0002", "second warning"),
            Diagnostic::hidden("H0001", "hidden"),
        ];
        let output = capture(Level::INFO, || log_diagnostics(&diagnostics, Stage::Final));

        let error_at = output
            .find("Final compilation analysis reported 1 error diagnostics")
            .unwrap();
        let warning_at = output
            .find("Final compilation analysis reported 2 warning diagnostics")
            .unwrap();
        assert!(error_at < warning_at);
        assert!(output.contains("A.cs: (0,6)-(0,7): E0001"));
        assert!(output.contains("ERROR"));
        assert!(output.contains("WARN"));
        // hidden diagnostics are trace level
        assert!(!output.contains("H0001"));

        let output = capture(Level::TRACE, || log_diagnostics(&diagnostics, Stage::Final));
        assert!(output.contains("reported 1 hidden diagnostics"));
    }

    #[test]
    fn test_no_diagnostics_is_debug() {
        let output = capture(Level::INFO, || log_diagnostics(&[], Stage::Analyzer));
        assert!(output.is_empty());

        let output = capture(Level::DEBUG, || log_diagnostics(&[], Stage::Analyzer));
        assert!(output.contains("Analyzer reported no diagnostics"));
    }
}
