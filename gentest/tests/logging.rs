//! Tests for run logging through a `tracing` dispatcher.

use std::{
    io,
    sync::{Arc, Mutex},
};

use gentest::{CancellationToken, GeneratorId, LoggingOptions, TestCase, TestConfiguration};
use gentest_minics::{MiniCs, core_library};
use gentest_sdk::{Diagnostic, GeneratorContext, SourceGenerator};
use tracing::{Dispatch, Level};

/// In-memory log sink.
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

fn dispatch(level: Level) -> (Dispatch, Captured) {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();
    (Dispatch::new(subscriber), captured)
}

struct Widgets;

impl SourceGenerator for Widgets {
    fn id(&self) -> GeneratorId {
        "widgets".into()
    }

    fn execute(&self, ctx: &mut GeneratorContext<'_>) -> eyre::Result<()> {
        ctx.report_diagnostic(Diagnostic::warning("WG0001", "widgets are deprecated"));
        ctx.add_source("Widget.g.cs", "class Widget : Gizmo {}")
    }
}

fn case() -> TestCase {
    let config = TestConfiguration::new(MiniCs::shared(), vec![core_library()])
        .with_additional_generators([Arc::new(Widgets) as Arc<dyn SourceGenerator>])
        .unwrap();
    TestCase::new(config)
        .with_added_namespace_imports(["System"])
        .with_code("class Tested : Attribute {}")
}

#[test]
fn test_all_logging() {
    let (dispatch, captured) = dispatch(Level::INFO);
    case()
        .run(&CancellationToken::new(), Some(&dispatch), LoggingOptions::ALL)
        .unwrap();
    let output = captured.text();

    assert!(output.contains("Tested code"));
    assert!(output.contains("0 | using System;"));
    assert!(output.contains("2 | class Tested : Attribute {}"));

    assert!(output.contains("Generator widgets generated 1 trees:\n\t[0] Widget.g.cs"));
    assert!(output.contains("Generated code (Widget.g.cs)"));
    assert!(output.contains("0 | class Widget : Gizmo {}"));

    assert!(output.contains("Generator reported 1 warning diagnostics:"));
    assert!(output.contains("WG0001"));
    assert!(output.contains("Final compilation analysis reported 1 error diagnostics:"));
    assert!(output.contains("\tWidget.g.cs: (0,15)-(0,20): CS0246"));
}

#[test]
fn test_only_selected_output_is_logged() {
    let (dispatch, captured) = dispatch(Level::INFO);
    case()
        .run(
            &CancellationToken::new(),
            Some(&dispatch),
            LoggingOptions::FINAL_DIAGNOSTICS,
        )
        .unwrap();
    let output = captured.text();

    assert!(output.contains("Final compilation analysis reported 1 error diagnostics:"));
    assert!(!output.contains("Tested code"));
    assert!(!output.contains("Generated code"));
    assert!(!output.contains("WG0001"));
}

#[test]
fn test_phases_logged_at_debug() {
    let (dispatch, captured) = dispatch(Level::DEBUG);
    case()
        .run(&CancellationToken::new(), Some(&dispatch), LoggingOptions::NONE)
        .unwrap();
    let output = captured.text();

    for phase in ["decorate", "assemble", "analyze", "generate", "aggregate"] {
        assert!(output.contains(&format!("phase=\"{}\"", phase)), "{phase} not logged");
    }
}

#[test]
fn test_phase_descriptions_logged_at_trace() {
    let (dispatch, captured) = dispatch(Level::TRACE);
    case()
        .run(&CancellationToken::new(), Some(&dispatch), LoggingOptions::NONE)
        .unwrap();
    let output = captured.text();

    assert!(output.contains("running phase"));
    assert!(output.contains("description=\"Run analyzers against the compilation\""));
}

#[test]
fn test_logging_does_not_change_result() {
    let cancel = CancellationToken::new();
    let (_, quiet) = case().run(&cancel, None, LoggingOptions::NONE).unwrap();

    let (dispatch, _) = dispatch(Level::TRACE);
    let (_, logged) = case()
        .run(&cancel, Some(&dispatch), LoggingOptions::ALL)
        .unwrap();

    assert_eq!(quiet.summary(), logged.summary());
    assert_eq!(
        quiet.summary().to_json().unwrap(),
        logged.summary().to_json().unwrap()
    );
}
