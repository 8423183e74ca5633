//! Test fixtures and small helpers over the public API.

#![allow(dead_code)]

use unused_var_lint::{lint_source, Diagnostic, LintConfig, TokenKind, TokenStream};

/// Lint `source` with the default configuration.
pub fn lint(source: &str) -> Vec<Diagnostic> {
    lint_source(source, &LintConfig::default())
        .unwrap_or_else(|e| panic!("failed to lint source: {e}\n{source}"))
}

/// Variable names of the reported diagnostics, in source order.
pub fn reported_names(source: &str) -> Vec<String> {
    lint(source)
        .into_iter()
        .map(|diag| {
            diag.message
                .trim_start_matches("Unused variable ")
                .trim_end_matches('.')
                .to_string()
        })
        .collect()
}

/// Position of the `nth` occurrence of variable `name`.
pub fn variable_position(stream: &TokenStream, name: &str, nth: usize) -> usize {
    stream
        .iter()
        .filter(|token| token.kind == TokenKind::Variable && token.text == name)
        .nth(nth)
        .map(|token| token.position)
        .unwrap_or_else(|| panic!("no occurrence {nth} of {name}"))
}

pub mod inline {
    /// Accumulator read after the loop.
    pub const CLEAN_FUNCTION: &str = r#"<?php
function total(array $items) {
    $sum = 0;
    foreach ($items as $item) {
        $sum += $item;
    }
    return $sum;
}
"#;

    /// One dead store among reassignments that are all read.
    pub const DEAD_STORE: &str = r#"<?php
function handle($request) {
    $unused = compute();
    $result = $request;
    $result = transform($result);
    return $result;
}
"#;

    /// Loop counters and conditions consume their writes, a body-only write does not.
    pub const LOOPS: &str = r#"<?php
$line = null;
do {
    $line = fgets($handle);
} while ($line !== false);

for ($i = 0; $i < 3; $i++) {
    $last = $i;
}
"#;

    /// By-reference capture is observable, by-value capture is not.
    pub const CLOSURES: &str = r#"<?php
$count = 0;
$increment = function () use (&$count) {
    $count++;
};
$snapshot = function () use ($count) {
    $count = 10;
};
return [$increment, $snapshot];
"#;

    /// Properties, static properties and parameter defaults are not locals.
    pub const CLASS_MEMBERS: &str = r#"<?php
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

    /// Template with a value read inside a later PHP block.
    pub const TEMPLATE: &str = r#"<html>
<?php $title = 'Home'; ?>
<h1><?= $title ?></h1>
<?php $footer = 'unused'; ?>
</html>
"#;
}
