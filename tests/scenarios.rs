//! End-to-end scenarios from the pattern string down through match and
//! dispatch, covering the concrete examples the design settled on.

use corvid::{Binding, CliRouterBuilder, DispatchContext, ParsedInput, RouteOptions};

fn string(s: &str) -> String {
    s.to_string()
}

fn argv(words: &[&str]) -> Vec<String> {
    words.iter().map(|s| string(s)).collect()
}

#[tokio::test]
async fn literal_beats_parameter_route() {
    let router = CliRouterBuilder::new()
        .route("build", |_b: Binding, _ctx: DispatchContext<()>| async { "literal".to_string() })
        .unwrap()
        .route("{cmd}", |_b: Binding, _ctx: DispatchContext<()>| async { "parameter".to_string() })
        .unwrap()
        .build();

    let out = router.dispatch(&argv(&["build"]), DispatchContext::new(())).await.unwrap();
    assert_eq!(out, "literal");
}

#[tokio::test]
async fn end_of_options_suppresses_flag_interpretation() {
    let router = CliRouterBuilder::new()
        .route("git checkout -- {file}", |b: Binding, _ctx: DispatchContext<()>| async move {
            b.get("file").and_then(|v| v.as_str()).unwrap_or("").to_string()
        })
        .unwrap()
        .build();

    let out = router
        .dispatch(&argv(&["git", "checkout", "--", "-f"]), DispatchContext::new(()))
        .await
        .unwrap();
    assert_eq!(out, "-f");
}

#[tokio::test]
async fn option_order_does_not_affect_binding() {
    let router = CliRouterBuilder::new()
        .route(
            "serve --port {p:int} --verbose,-v",
            |b: Binding, _ctx: DispatchContext<()>| async move {
                (b.get("p").and_then(|v| v.as_int()).unwrap_or(-1), b.flag("verbose"))
            },
        )
        .unwrap()
        .build();

    let a = router.dispatch(&argv(&["serve", "--port", "80", "-v"]), DispatchContext::new(())).await.unwrap();
    let b = router.dispatch(&argv(&["serve", "-v", "--port", "80"]), DispatchContext::new(())).await.unwrap();
    assert_eq!(a, (80, true));
    assert_eq!(b, (80, true));
}

#[tokio::test]
async fn repeated_option_accumulates_into_an_ordered_list() {
    let router = CliRouterBuilder::new()
        .route_with(
            "tag --label {l}",
            |b: Binding, _ctx: DispatchContext<()>| async move {
                b.repeated("l").iter().filter_map(|v| v.as_str().map(str::to_string)).collect::<Vec<_>>()
            },
            RouteOptions { repeated_options: vec!["label".into()], ..Default::default() },
        )
        .unwrap()
        .build();

    let out = router
        .dispatch(&argv(&["tag", "--label", "a", "--label", "b"]), DispatchContext::new(()))
        .await
        .unwrap();
    assert_eq!(out, vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn no_match_reports_the_nearest_miss() {
    let router = CliRouterBuilder::new()
        .route("deploy {env}", |_b: Binding, _ctx: DispatchContext<()>| async {})
        .unwrap()
        .route("status", |_b: Binding, _ctx: DispatchContext<()>| async {})
        .unwrap()
        .build();

    let err = router.dispatch(&argv(&["deploy", "prod", "now"]), DispatchContext::new(())).await.unwrap_err();
    let report = router.report(&err).unwrap();
    assert_eq!(report.pattern_source, "deploy {env}");
}

#[test]
fn completion_suggests_matching_literals_by_prefix() {
    let router = CliRouterBuilder::<(), ()>::new()
        .route("deploy {env}", |_b: Binding, _ctx: DispatchContext<()>| async {})
        .unwrap()
        .route("destroy {env}", |_b: Binding, _ctx: DispatchContext<()>| async {})
        .unwrap()
        .route("status", |_b: Binding, _ctx: DispatchContext<()>| async {})
        .unwrap()
        .build();

    let candidates = router.complete("d");
    let texts: Vec<_> = candidates.iter().map(|c| c.text.as_str()).collect();
    assert!(texts.contains(&"deploy"));
    assert!(texts.contains(&"destroy"));
    assert!(!texts.contains(&"status"));
}

#[test]
fn completion_after_trailing_space_lists_declared_options() {
    let router = CliRouterBuilder::<(), ()>::new()
        .route("deploy {env} --verbose,-v", |_b: Binding, _ctx: DispatchContext<()>| async {})
        .unwrap()
        .build();

    let candidates = router.complete("deploy prod ");
    let texts: Vec<_> = candidates.iter().map(|c| c.text.as_str()).collect();
    assert!(texts.contains(&"--verbose"));
    assert!(texts.contains(&"-v"));
}

#[test]
fn invalid_pattern_is_rejected_before_build() {
    let result = CliRouterBuilder::<(), ()>::new()
        .route("{*rest} oops", |_b: Binding, _ctx: DispatchContext<()>| async {});
    assert!(result.is_err());
}

#[test]
fn parsed_input_invariant_holds_for_tokenizer_output() {
    let parsed: ParsedInput = corvid::tokenize_line("status --verbose");
    assert_eq!(parsed.partial_word.is_none(), parsed.trailing_space);
}
