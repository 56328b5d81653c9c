//! Decision engine.
//!
//! Runs locator → classifier → rule table and settles the rule's anchor into
//! a line to follow or a fixed column. Effective starts are resolved by
//! reclassifying the token before the anchor until a token that begins its
//! own line is reached; islands are projected by repeating that walk over
//! anchor lines until the island's top level.

use tokio_util::sync::CancellationToken;

use super::classifier::{Classifier, Site};
use super::decision::{IndentError, IndentationDecision};
use super::locator::{check, line_of, locate, prev_significant, token_start, Located};
use super::options::{FormattingOptions, ProjectionContext};
use super::rules::{rule, Anchor, AnchorRule, Classification};
use crate::syntax::{SyntaxToken, SyntaxTree};

/// Where a settled rule measures from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Base {
    Line(u32),
    FileStart,
    Column { column: u32, line: Option<u32> },
    Inherit,
    NoOpinion,
}

#[derive(Debug, Clone, Copy)]
struct Settled {
    base: Base,
    units: u32,
}

/// Computes the indentation decision for `line`.
pub fn compute_indentation(
    tree: &SyntaxTree,
    line: u32,
    options: &FormattingOptions,
    projection: Option<&ProjectionContext>,
) -> Result<IndentationDecision, IndentError> {
    compute_indentation_cancellable(tree, line, options, projection, &CancellationToken::new())
}

/// [`compute_indentation`] that aborts with [`IndentError::Cancelled`] once
/// `cancel` fires.
pub fn compute_indentation_cancellable(
    tree: &SyntaxTree,
    line: u32,
    options: &FormattingOptions,
    projection: Option<&ProjectionContext>,
    cancel: &CancellationToken,
) -> Result<IndentationDecision, IndentError> {
    let line_count = tree.line_count();
    if line >= line_count {
        return Err(IndentError::LineOutOfRange { line, line_count });
    }
    let decision = match projection {
        Some(projection) => project(tree, line, options, projection, cancel)?,
        None => {
            let settled = settle_line(tree, line, options, cancel)?;
            to_decision(tree, settled, options)
        }
    };
    log::trace!("line {}: {:?}", line, decision);
    Ok(decision)
}

/// Turns a decision into a concrete column; `None` for [`IndentationDecision::NoOpinion`].
pub fn resolve_column(
    tree: &SyntaxTree,
    line: u32,
    decision: &IndentationDecision,
    options: &FormattingOptions,
) -> Option<u32> {
    match *decision {
        IndentationDecision::Follow {
            anchor_line,
            extra_units,
        } => Some(
            tree.indentation_width(anchor_line.index, options.tab_size())
                .saturating_add(extra_units.saturating_mul(options.indent_unit())),
        ),
        IndentationDecision::Absolute(column) => Some(column),
        IndentationDecision::Inherit => Some(
            tree.previous_non_blank(line)
                .map_or(0, |prev| tree.indentation_width(prev, options.tab_size())),
        ),
        IndentationDecision::NoOpinion => None,
    }
}

fn to_decision(tree: &SyntaxTree, settled: Settled, options: &FormattingOptions) -> IndentationDecision {
    let units = settled.units.saturating_mul(options.indent_unit());
    match settled.base {
        Base::Line(index) => match tree.line(index) {
            Some(anchor_line) => IndentationDecision::Follow {
                anchor_line,
                extra_units: settled.units,
            },
            None => IndentationDecision::NoOpinion,
        },
        Base::FileStart => IndentationDecision::Absolute(units),
        Base::Column { column, .. } => IndentationDecision::Absolute(column.saturating_add(units)),
        Base::Inherit => IndentationDecision::Inherit,
        Base::NoOpinion => IndentationDecision::NoOpinion,
    }
}

/// Island placement: every anchor line is itself placed by the engine, and
/// the island's top level sits one unit inside `base_indentation`.
fn project(
    tree: &SyntaxTree,
    line: u32,
    options: &FormattingOptions,
    projection: &ProjectionContext,
    cancel: &CancellationToken,
) -> Result<IndentationDecision, IndentError> {
    let unit = options.indent_unit();
    let top_level = projection.base_indentation.saturating_add(unit);
    let mut current = line;
    let mut extra = 0u32;
    loop {
        check(cancel)?;
        let settled = settle_line(tree, current, options, cancel)?;
        let units = settled.units.saturating_mul(unit);
        match settled.base {
            Base::Line(anchor) if anchor < current => {
                extra = extra.saturating_add(units);
                current = anchor;
            }
            Base::Column {
                column,
                line: Some(anchor),
            } if anchor < current => {
                let offset = column.saturating_sub(tree.indentation_width(anchor, options.tab_size()));
                extra = extra.saturating_add(offset).saturating_add(units);
                current = anchor;
            }
            Base::Line(_) | Base::Column { line: Some(_), .. } => {
                log::debug!("line {}: projection anchor does not precede it", current);
                return Ok(IndentationDecision::NoOpinion);
            }
            Base::FileStart => {
                return Ok(IndentationDecision::Absolute(
                    top_level.saturating_add(units).saturating_add(extra),
                ))
            }
            Base::Column { column, line: None } => {
                return Ok(IndentationDecision::Absolute(
                    projection
                        .base_indentation
                        .saturating_add(column)
                        .saturating_add(units)
                        .saturating_add(extra),
                ))
            }
            Base::Inherit => match tree.previous_non_blank(current) {
                Some(prev) => current = prev,
                None => return Ok(IndentationDecision::Absolute(top_level.saturating_add(extra))),
            },
            Base::NoOpinion => return Ok(IndentationDecision::NoOpinion),
        }
    }
}

/// Classifies `line` and follows effective starts until the base is known.
fn settle_line(
    tree: &SyntaxTree,
    line: u32,
    options: &FormattingOptions,
    cancel: &CancellationToken,
) -> Result<Settled, IndentError> {
    let Some(target) = tree.line(line) else {
        return Err(IndentError::LineOutOfRange {
            line,
            line_count: tree.line_count(),
        });
    };
    let (located, context) = locate(tree, target, cancel)?;
    let classifier = Classifier::new(tree, cancel);
    let mut classification = match located {
        Located::Decided(classification) => classification,
        Located::Anchored { anchor, first } => {
            let site = Site {
                offset: tree.first_non_whitespace(line).unwrap_or(target.start),
                prev_line: context.prev_content_line,
            };
            classifier.classify(&anchor, first.as_ref(), site)?
        }
    };

    let mut units = 0u32;
    loop {
        check(cancel)?;
        let rule = rule(classification.category);
        log::trace!(
            "line {}: {:?} anchored at {:?}",
            line,
            classification.category,
            classification.anchor
        );
        let base = match rule.anchor {
            AnchorRule::NoOpinion => {
                log::debug!("line {}: no rule applies", line);
                return Ok(Settled {
                    base: Base::NoOpinion,
                    units: 0,
                });
            }
            AnchorRule::Inherit => {
                return Ok(Settled {
                    base: Base::Inherit,
                    units: 0,
                })
            }
            AnchorRule::FileStart => Base::FileStart,
            AnchorRule::Margin => Base::Column {
                column: 0,
                line: None,
            },
            AnchorRule::LineOf => match &classification.anchor {
                Anchor::Token(token) => Base::Line(line_of(tree, token)),
                Anchor::Line(index) => Base::Line(*index),
                Anchor::None => Base::FileStart,
            },
            AnchorRule::TokenColumn => match &classification.anchor {
                Anchor::Token(token) => Base::Column {
                    column: tree.column_of_offset(token_start(token), options.tab_size()),
                    line: Some(line_of(tree, token)),
                },
                Anchor::Line(index) => Base::Line(*index),
                Anchor::None => Base::FileStart,
            },
            AnchorRule::EffectiveStart => match &classification.anchor {
                Anchor::Line(index) => Base::Line(*index),
                Anchor::None => Base::FileStart,
                Anchor::Token(token) => {
                    units = units.saturating_add(rule.units);
                    match effective_start(tree, &classifier, token)? {
                        Some(next) => {
                            classification = next;
                            continue;
                        }
                        None => {
                            return Ok(Settled {
                                base: Base::Line(line_of(tree, token)),
                                units,
                            })
                        }
                    }
                }
            },
        };
        return Ok(Settled {
            base,
            units: units.saturating_add(rule.units),
        });
    }
}

/// Reclassifies `token` as if it began a line, when something precedes it on
/// its own line. `None` means the token's line is its effective start.
fn effective_start(
    tree: &SyntaxTree,
    classifier: &Classifier<'_>,
    token: &SyntaxToken,
) -> Result<Option<Classification>, IndentError> {
    let token_line = line_of(tree, token);
    let Some(prev) = prev_significant(token).filter(|prev| line_of(tree, prev) == token_line) else {
        return Ok(None);
    };
    let site = Site {
        offset: token_start(token),
        prev_line: None,
    };
    let next = classifier.classify(&prev, Some(token), site)?;
    if rule(next.category).anchor == AnchorRule::NoOpinion {
        return Ok(None);
    }
    let earlier = match &next.anchor {
        Anchor::Token(anchor) => token_start(anchor) < token_start(token),
        Anchor::Line(index) => *index <= token_line,
        Anchor::None => true,
    };
    Ok(earlier.then_some(next))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> FormattingOptions {
        FormattingOptions::new(4, 4, false).unwrap()
    }

    fn column(text: &str, line: u32) -> Option<u32> {
        let tree = SyntaxTree::parse(text);
        let decision = compute_indentation(&tree, line, &options(), None).unwrap();
        resolve_column(&tree, line, &decision, &options())
    }

    fn island(text: &str, line: u32, base: u32) -> Option<u32> {
        let tree = SyntaxTree::parse(text);
        let projection = ProjectionContext {
            base_indentation: base,
        };
        let decision = compute_indentation(&tree, line, &options(), Some(&projection)).unwrap();
        resolve_column(&tree, line, &decision, &options())
    }

    #[test]
    fn test_empty_document_is_absolute_zero() {
        let tree = SyntaxTree::parse("");
        assert_eq!(
            compute_indentation(&tree, 0, &options(), None),
            Ok(IndentationDecision::Absolute(0))
        );
    }

    #[test]
    fn test_out_of_range_line() {
        let tree = SyntaxTree::parse("class C\n{\n}");
        assert_eq!(
            compute_indentation(&tree, 3, &options(), None),
            Err(IndentError::LineOutOfRange {
                line: 3,
                line_count: 3
            })
        );
    }

    #[test]
    fn test_nested_block_bodies() {
        assert_eq!(column("namespace NS\n{\n    class Class\n    {\n\n", 4), Some(8));
    }

    #[test]
    fn test_effective_start_of_inline_if() {
        let text = "class Program { static void Main(string[] args) { if(true) if(true) if(true) args=null;\n";
        assert_eq!(column(text, 1), Some(8));
    }

    #[test]
    fn test_follow_decision_carries_units() {
        let tree = SyntaxTree::parse("class C\n{\n\n}");
        let decision = compute_indentation(&tree, 2, &options(), None).unwrap();
        match decision {
            IndentationDecision::Follow {
                anchor_line,
                extra_units,
            } => {
                assert_eq!(anchor_line.index, 1);
                assert_eq!(extra_units, 1);
            }
            other => panic!("unexpected decision {:?}", other),
        }
    }

    #[test]
    fn test_resolve_column_expands_tabs() {
        let tree = SyntaxTree::parse("class C\n{\n\tvoid M()\n\t{\n\n");
        let options = FormattingOptions::new(2, 8, true).unwrap();
        let decision = compute_indentation(&tree, 4, &options, None).unwrap();
        assert_eq!(resolve_column(&tree, 4, &decision, &options), Some(10));
        assert_eq!(
            resolve_column(&tree, 4, &IndentationDecision::NoOpinion, &options),
            None
        );
    }

    #[test]
    fn test_inherit_copies_previous_line() {
        let text = "class C\n{\n    string s = @\"a\n      b\n\";\n}";
        let tree = SyntaxTree::parse(text);
        let decision = compute_indentation(&tree, 3, &options(), None).unwrap();
        assert_eq!(decision, IndentationDecision::Inherit);
        assert_eq!(resolve_column(&tree, 3, &decision, &options()), Some(4));
    }

    #[test]
    fn test_island_top_level_is_one_unit_in() {
        assert_eq!(island("\n", 1, 8), Some(12));
        assert_eq!(island("Console.WriteLine();\n", 1, 8), Some(12));
    }

    #[test]
    fn test_island_follows_projected_lines() {
        assert_eq!(island("Console.Wri\nteLine();", 1, 8), Some(16));
        assert_eq!(island("if (true)\n        {\n\n        }", 2, 8), Some(16));
    }

    #[test]
    fn test_cancelled_before_start() {
        let tree = SyntaxTree::parse("class C\n{\n\n}");
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(
            compute_indentation_cancellable(&tree, 2, &options(), None, &cancel),
            Err(IndentError::Cancelled)
        );
    }
}
