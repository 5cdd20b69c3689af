//! Integration tests for placeholder substitution

use pollster::block_on;
use pretty_assertions::assert_eq;

use sheetsub::{
    scan_all, substitute_report, ErrorPolicy, MemorySink, Options, Processor, ResolveError,
    SubstituteError, SyntaxError, Value, ValueSource,
};

fn processor(policy: ErrorPolicy) -> Processor<MemorySink> {
    Processor::with_sink(
        Options::new()
            .with_on_error(policy)
            .with_filename("Test.svelte"),
        MemorySink::new(),
    )
}

fn run(sources: &[ValueSource], text: &str) -> String {
    processor(ErrorPolicy::Abort)
        .substitute_blocking(sources, text)
        .expect("Should substitute")
}

#[test]
fn test_single_value() {
    let sources = [ValueSource::new().with("green", "forestgreen")];
    insta::assert_snapshot!(run(&sources, "$green"), @"forestgreen");
}

#[test]
fn test_two_values() {
    let sources = [ValueSource::new()
        .with("green", "forestgreen")
        .with("red", "indianred")];
    insta::assert_snapshot!(
        run(&sources, "color: $green; color: $red;"),
        @"color: forestgreen; color: indianred;"
    );
}

#[test]
fn test_sequence_join() {
    let sources = [ValueSource::new().with("blood_red", vec![115, 16, 16])];
    assert_eq!(
        run(&sources, "color: rgb($blood_red);"),
        "color: rgb(115, 16, 16);"
    );
}

#[test]
fn test_deep_nesting() {
    let sources = [ValueSource::from_toml_str(
        r#"
[useless.nesting.color]
blood_red = "rgb(115, 16, 16)"
"#,
    )
    .unwrap()];
    assert_eq!(
        run(&sources, "color: $useless.nesting.color.blood_red;"),
        "color: rgb(115, 16, 16);"
    );
}

#[test]
fn test_first_match_across_sources() {
    let sources = [
        ValueSource::new().with("a", "alpha"),
        ValueSource::new().with("b", "beta"),
        ValueSource::new().with("c", "charlie"),
    ];
    assert_eq!(run(&sources, "$c"), "charlie");
}

#[test]
fn test_null_versus_absent() {
    let sources = [ValueSource::new().with("green", Value::Null)];
    assert_eq!(run(&sources, "$green"), "");
    assert_eq!(run(&[ValueSource::new()], "$green"), "$green");
}

#[test]
fn test_escape_is_idempotent() {
    let once = run(&[], "$$$$");
    assert_eq!(once, "$$");
    // A second pass sees one more escape, not the original text
    assert_eq!(run(&[], &once), "$");
}

#[test]
fn test_function_args() {
    let sources = [ValueSource::new().with(
        "func",
        Value::function(|args| {
            assert!(args.get(3).is_none());
            Some(Value::from(args.join("-")))
        }),
    )];
    assert_eq!(
        run(&sources, "$func(alpha, beta, charlie)"),
        "alpha-beta-charlie"
    );
}

#[test]
fn test_async_function() {
    let sources = [ValueSource::new().with(
        "add_rem",
        Value::async_function(|args: Vec<String>| async move {
            let total: f64 = args.iter().filter_map(|a| a.parse::<f64>().ok()).sum();
            Some(Value::from(format!("{}rem", total)))
        }),
    )];
    assert_eq!(
        run(&sources, "margin: $add_rem(1, 0.5);"),
        "margin: 1.5rem;"
    );
}

#[test]
fn test_mapping_flattens_to_properties() {
    let sources = [ValueSource::from_toml_str(
        r#"
[highlight.normal]
border-radius = "0.4rem"
border = "10px inset transparent"
"#,
    )
    .unwrap()];

    let css = run(&sources, ".card {\n$highlight.normal;\n}");
    insta::assert_snapshot!(css, @r"
    .card {
    border-radius: 0.4rem;
    border: 10px inset transparent;
    }
    ");
}

#[test]
fn test_primitive_round_trip_leaves_no_tokens() {
    let sources = [ValueSource::new()
        .with("green", "forestgreen")
        .with("size", 12)
        .with("ratio", 1.5)
        .with("on", true)];
    let text = "a: $green; b: $size; c: $ratio; d: $on;";

    let out = run(&sources, text);
    let remaining: Vec<String> = scan_all(&out, '$')
        .unwrap()
        .into_iter()
        .map(|t| t.name())
        .filter(|name| sources[0].get(name).is_some())
        .collect();

    assert!(remaining.is_empty(), "left over: {:?}", remaining);
}

#[test]
fn test_unterminated_quote_is_fatal_under_both_policies() {
    for policy in [ErrorPolicy::Report, ErrorPolicy::Abort] {
        let err = processor(policy)
            .substitute_blocking(&[], r#"$func("unterminated"#)
            .unwrap_err();
        assert!(matches!(
            err,
            SubstituteError::Syntax(SyntaxError::UnterminatedQuotedArgument { .. })
        ));
    }
}

#[test]
fn test_function_returning_function() {
    let sources = [ValueSource::new().with(
        "curried",
        Value::function(|_| Some(Value::function(|_| Some(Value::from("x"))))),
    )];

    let err = processor(ErrorPolicy::Abort)
        .substitute_blocking(&sources, "color: $curried;")
        .unwrap_err();
    assert!(matches!(
        err,
        SubstituteError::Resolve {
            source: ResolveError::DisallowedFunctionReturningFunction,
            ..
        }
    ));

    let report = block_on(substitute_report(
        &sources,
        "color: $curried;",
        Options::new().with_filename("Test.svelte"),
    ))
    .unwrap();
    assert_eq!(report.text, "color: $curried;");
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].token_raw, "$curried;");
}

#[test]
fn test_unicode_content_around_tokens() {
    let sources = [ValueSource::new().with("icon", "'🫀'")];
    assert_eq!(
        run(&sources, "a::before { content: $icon; } /* 🫀🫀 */ b { content: $icon; }"),
        "a::before { content: '🫀'; } /* 🫀🫀 */ b { content: '🫀'; }"
    );
}
