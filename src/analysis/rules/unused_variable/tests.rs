use super::*;
use crate::analysis::Analyzer;
use crate::diagnostics::Diagnostic;
use crate::tokenizer::tokenize;

fn analyze_source(source: &str) -> Vec<Diagnostic> {
    let stream = tokenize(source).expect("source should tokenize");
    Analyzer::new()
        .diagnostics(&stream)
        .expect("stream should satisfy its contract")
}

/// Names of the reported variables, in source order.
fn reported(source: &str) -> Vec<String> {
    analyze_source(source)
        .into_iter()
        .map(|diag| {
            diag.message
                .trim_start_matches("Unused variable ")
                .trim_end_matches('.')
                .to_string()
        })
        .collect()
}

fn nth_variable(source: &str, name: &str, nth: usize) -> usize {
    let stream = tokenize(source).unwrap();
    let position = stream
        .iter()
        .filter(|token| token.kind == TokenKind::Variable && token.text == name)
        .nth(nth)
        .map(|token| token.position)
        .unwrap();
    position
}

#[test]
fn test_reassignment_then_use() {
    let source = "<?php $x = 1; $x = $x + 1; print($x);";
    assert!(analyze_source(source).is_empty());
}

#[test]
fn test_unused_simple_write() {
    let source = "<?php $x = 1; $y = 2; print($y);";
    let diags = analyze_source(source);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].rule_code, CODE);
    assert_eq!(diags[0].message, "Unused variable $x.");
    assert_eq!(diags[0].position, nth_variable(source, "$x", 0));
}

#[test]
fn test_for_loop_counter() {
    assert!(analyze_source("<?php for ($i = 0; $i < 10; $i++) { }").is_empty());
}

#[test]
fn test_while_cross_iteration_read() {
    let source = "<?php $total = 0; while (cond()) { $total = $total + 1; }";
    assert!(analyze_source(source).is_empty());
}

#[test]
fn test_do_while_condition_read() {
    let source = "<?php do { $line = read(); } while ($line !== null);";
    assert!(analyze_source(source).is_empty());
}

#[test]
fn test_write_in_loop_never_read() {
    assert_eq!(reported("<?php while (f()) { $tmp = 1; }"), vec!["$tmp"]);
}

#[test]
fn test_reference_parameter() {
    let source = "<?php function fill(&$out) { $out = 5; }";
    assert!(analyze_source(source).is_empty());
}

#[test]
fn test_value_parameter_write_is_reported() {
    let source = "<?php function fill($out) { $out = 5; }";
    assert_eq!(reported(source), vec!["$out"]);
}

#[test]
fn test_closure_capture_by_value() {
    let source = "<?php $x = 0; $f = function () use ($x) { $x = 1; }; return $f;";
    let diags = analyze_source(source);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].position, nth_variable(source, "$x", 2));
}

#[test]
fn test_closure_capture_by_reference() {
    let source = "<?php $x = 0; $f = function () use (&$x) { $x = 1; }; return $f;";
    assert!(analyze_source(source).is_empty());
}

#[test]
fn test_nested_closure_shadowing() {
    let source = "<?php $x = 1; $f = function () { $x = 2; }; return $f;";
    let diags = analyze_source(source);
    let positions: Vec<_> = diags.iter().map(|diag| diag.position).collect();
    assert!(positions.contains(&nth_variable(source, "$x", 0)));
    assert_eq!(diags.len(), 2);
}

#[test]
fn test_closure_reading_captured_value() {
    let source = "<?php function f() { $a = 1; return function () use ($a) { return $a; }; }";
    assert!(analyze_source(source).is_empty());
}

#[test]
fn test_static_local() {
    let source = "<?php function counter() { static $count = 0; }";
    assert!(analyze_source(source).is_empty());
}

#[test]
fn test_short_list_destructuring() {
    let source = "<?php [$a, $b] = pair(); echo $a;";
    let diags = analyze_source(source);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "Unused variable $b.");
    assert_eq!(diags[0].position, nth_variable(source, "$b", 0));
}

#[test]
fn test_list_destructuring() {
    assert_eq!(reported("<?php list($a, $b) = pair(); echo $b;"), vec!["$a"]);
}

#[test]
fn test_foreach_unused_value() {
    let source = "<?php foreach ($items as $key => $value) { echo $key; }";
    assert_eq!(reported(source), vec!["$value"]);
}

#[test]
fn test_foreach_accumulator_in_function() {
    let source = r#"<?php
function any(array $items) {
    $found = false;
    foreach ($items as $item) {
        if ($item) {
            $found = true;
        }
    }
    return $found;
}
"#;
    assert!(analyze_source(source).is_empty());
}

#[test]
fn test_compound_assignment_as_last_write() {
    assert_eq!(reported("<?php $s = ''; $s .= 'x';"), vec!["$s"]);
}

#[test]
fn test_increment_in_call_argument_is_reported() {
    assert_eq!(reported("<?php $x = 0; foo($x++);"), vec!["$x"]);
}

#[test]
fn test_separate_scopes_report_separately() {
    let source = "<?php function f() { $a = 1; } function g() { $a = 2; }";
    let diags = analyze_source(source);
    assert_eq!(diags.len(), 2);
    assert_eq!(diags[0].position, nth_variable(source, "$a", 0));
    assert_eq!(diags[1].position, nth_variable(source, "$a", 1));
}

#[test]
fn test_members_and_defaults_are_ignored() {
    let source = r#"<?php
class Counter {
    private $count = 0;
    public static $instances = 0;

    public function bump($by = 1) {
        $this->count = $by;
        self::$instances = 1;
        return $this;
    }
}
"#;
    assert!(analyze_source(source).is_empty());
}

#[test]
fn test_read_across_inline_html() {
    let source = "<?php $title = 'x'; ?>\n<h1><?php echo $title; ?></h1>\n";
    assert!(analyze_source(source).is_empty());
}

#[test]
fn test_outcomes_name_the_deciding_step() {
    let source = "<?php function f(&$r) { static $s; $r = 1; $s = 1; $u = 1; echo $u; }";
    let stream = tokenize(source).unwrap();
    let rule = UnusedVariableRule;
    let outcome = |name: &str, nth: usize| {
        rule.evaluate(&stream, nth_variable(source, name, nth)).unwrap()
    };
    assert_eq!(outcome("$r", 0), Outcome::Skip(SkipReason::NotAWrite));
    assert_eq!(
        outcome("$r", 1),
        Outcome::Skip(SkipReason::Exempt(Exemption::ReferenceParameter))
    );
    assert_eq!(
        outcome("$s", 1),
        Outcome::Skip(SkipReason::Exempt(Exemption::StaticLocal))
    );
    assert_eq!(outcome("$u", 0), Outcome::Skip(SkipReason::Used));
    assert_eq!(outcome("$u", 1), Outcome::Skip(SkipReason::NotAWrite));
}

#[test]
fn test_idempotent_analysis() {
    let source = "<?php $a = 1; function f() { $b = 2; $c = 3; return $c; } $d = [$e, $f] = g();";
    let first = analyze_source(source);
    let second = analyze_source(source);
    assert_eq!(first, second);
    assert!(first.windows(2).all(|pair| pair[0].position < pair[1].position));
}

#[test]
fn test_method_named_after_keyword() {
    let source =
        "<?php class Repo { public function list($limit = 10) { $rows = []; return $rows; } }";
    assert!(analyze_source(source).is_empty());
}

#[test]
fn test_keyword_member_calls_are_reads() {
    assert!(analyze_source("<?php $o->list($a);").is_empty());
    assert!(analyze_source("<?php Foo::for($y);").is_empty());
}

#[test]
fn test_alternative_while_syntax() {
    let source = "<?php while ($more): $more = next(); endwhile;";
    assert!(analyze_source(source).is_empty());
    let source = "<?php foreach ($items as $item): $tmp = $item; endforeach;";
    assert_eq!(reported(source), vec!["$tmp"]);
}

#[test]
fn test_arrow_function() {
    assert!(analyze_source("<?php $f = fn($a = 1) => 2; return $f;").is_empty());
    assert!(analyze_source("<?php $x = 1; $f = fn() => $x; return $f;").is_empty());
}

#[test]
fn test_heredoc_body_is_opaque() {
    assert!(analyze_source("<?php echo <<<EOT\nit's $a\nEOT;\n").is_empty());
    assert_eq!(reported("<?php $a = 1; echo <<<'EOT'\n$a\nEOT;\n"), vec!["$a"]);
}
