//! Latency budgets for parsing and indentation decisions.
//!
//! Compiled only in release mode; debug timings say nothing about what an
//! editor sees on every keystroke.
//!
//! Run with: `cargo test --release -p sharpdent --test performance_budgets`
//!
//! When `CI` is set, thresholds are multiplied by a relaxation factor
//! (default 3×, configurable via `SHARPDENT_PERF_CI_FACTOR`).

#![cfg(not(debug_assertions))]

use std::time::{Duration, Instant};

use sharpdent::indentation::{compute_indentation, resolve_column, FormattingOptions, ProjectionContext};
use sharpdent::syntax::SyntaxTree;

// ---------------------------------------------------------------------------
// Harness helpers
// ---------------------------------------------------------------------------

/// Median wall-clock time of three runs of `f`.
fn median_of_3<F: FnMut()>(mut f: F) -> Duration {
    let mut times = [Duration::ZERO; 3];
    for t in &mut times {
        let start = Instant::now();
        f();
        *t = start.elapsed();
    }
    times.sort();
    times[1]
}

fn ci_factor_from(ci: Option<&str>, factor: Option<&str>) -> f64 {
    let is_ci = ci.map(|v| !v.is_empty()).unwrap_or(false);
    if is_ci {
        factor
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|&f| f >= 1.0)
            .unwrap_or(3.0)
    } else {
        1.0
    }
}

fn ci_factor() -> f64 {
    ci_factor_from(
        std::env::var("CI").ok().as_deref(),
        std::env::var("SHARPDENT_PERF_CI_FACTOR").ok().as_deref(),
    )
}

fn assert_within_budget(label: &str, measured: Duration, budget_ms: u64) {
    let factor = ci_factor();
    let threshold = Duration::from_secs_f64(budget_ms as f64 * factor / 1000.0);
    assert!(
        measured <= threshold,
        "Time budget exceeded for '{label}': \
         measured {measured:.1?}, threshold {threshold:.1?} \
         (base {budget_ms}ms × {factor:.1})",
    );
}

#[test]
fn ci_factor_defaults() {
    assert!((ci_factor_from(None, None) - 1.0).abs() < f64::EPSILON);
    assert!((ci_factor_from(Some("true"), None) - 3.0).abs() < f64::EPSILON);
    assert!((ci_factor_from(Some("true"), Some("5.0")) - 5.0).abs() < f64::EPSILON);
    assert!((ci_factor_from(Some("true"), Some("0.5")) - 3.0).abs() < f64::EPSILON);
}

#[test]
#[should_panic(expected = "Time budget exceeded")]
fn assert_within_budget_panics_for_slow_op() {
    assert_within_budget("slow_op", Duration::from_secs(1), 5);
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn options() -> FormattingOptions {
    FormattingOptions::new(4, 4, false).unwrap()
}

/// A namespace with `classes` classes of ten methods each.
fn generate_source(classes: usize) -> String {
    let mut code = String::from("using System;\nusing System.Linq;\n\nnamespace Generated\n{\n");
    for c in 0..classes {
        code.push_str(&format!("    public class Class{c}\n    {{\n"));
        for m in 0..10 {
            code.push_str(&format!(
                r#"        public int Method{m}(int x, string name)
        {{
            var items = from i in Enumerable.Range(0, x)
                        where i % 2 == 0
                        select i * {m};
            if (x > 0)
                return items.Sum();
            switch (name)
            {{
                case "a":
                    x++;
                    break;
                default:
                    break;
            }}
            return Helper(x,
                          name);
        }}

"#
            ));
        }
        code.push_str("    }\n\n");
    }
    code.push_str("}\n");
    code
}

// ---------------------------------------------------------------------------
// Budgets
// ---------------------------------------------------------------------------

#[test]
fn parse_large_file_within_budget() {
    let code = generate_source(50);
    let measured = median_of_3(|| {
        let tree = SyntaxTree::parse(&code);
        assert!(tree.line_count() > 9000);
    });
    assert_within_budget("parse 50 classes", measured, 150);
}

#[test]
fn single_decision_at_end_of_large_file_within_budget() {
    let tree = SyntaxTree::parse(&generate_source(50));
    let line = tree.line_count() - 3;
    let measured = median_of_3(|| {
        let decision = compute_indentation(&tree, line, &options(), None).unwrap();
        assert!(resolve_column(&tree, line, &decision, &options()).is_some());
    });
    assert_within_budget("one decision", measured, 5);
}

#[test]
fn every_line_of_medium_file_within_budget() {
    let tree = SyntaxTree::parse(&generate_source(5));
    let measured = median_of_3(|| {
        for line in 0..tree.line_count() {
            compute_indentation(&tree, line, &options(), None).unwrap();
        }
    });
    assert_within_budget("all lines of 5 classes", measured, 250);
}

#[test]
fn projected_island_within_budget() {
    let mut code = String::new();
    for depth in 0..200 {
        let pad = " ".repeat(depth * 4);
        code.push_str(&format!("{pad}if (x)\n{pad}{{\n"));
    }
    code.push('\n');
    let tree = SyntaxTree::parse(&code);
    let projection = ProjectionContext {
        base_indentation: 12,
    };
    let line = tree.line_count() - 2;
    let measured = median_of_3(|| {
        compute_indentation(&tree, line, &options(), Some(&projection)).unwrap();
    });
    assert_within_budget("island 200 levels deep", measured, 20);
}
