use torshrt::binder::{ArgKind, ArgSpec, ArgValue, CommandSpec};

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn sample_spec() -> CommandSpec {
    CommandSpec::new("sample", "sample input ?count? ?scale?")
        .arg(ArgSpec::required("input", ArgKind::Str).with_aliases(&["tensor"]))
        .arg(ArgSpec::optional("count", ArgKind::Int, ArgValue::Int(1)))
        .arg(ArgSpec::optional("scale", ArgKind::Float, ArgValue::Float(1.0)))
}

#[test]
fn positional_and_named_bind_identically() {
    let spec = sample_spec();
    let positional = spec.bind(&words(&["tensor0", "3", "0.5"])).unwrap();
    let named = spec
        .bind(&words(&["-scale", "0.5", "-input", "tensor0", "-count", "3"]))
        .unwrap();
    assert_eq!(positional.get_str("input").unwrap(), named.get_str("input").unwrap());
    assert_eq!(positional.get_int("count").unwrap(), named.get_int("count").unwrap());
    assert_eq!(
        positional.get_float("scale").unwrap(),
        named.get_float("scale").unwrap()
    );
}

#[test]
fn hybrid_positional_head_then_named_tail() {
    let spec = sample_spec();
    let bound = spec.bind(&words(&["tensor0", "-scale", "2.0"])).unwrap();
    assert_eq!(bound.get_str("input").unwrap(), "tensor0");
    assert_eq!(bound.get_int("count").unwrap(), 1);
    assert_eq!(bound.get_float("scale").unwrap(), 2.0);
}

#[test]
fn alias_resolves_to_canonical_field() {
    let spec = sample_spec();
    let bound = spec.bind(&words(&["-tensor", "tensor7"])).unwrap();
    assert_eq!(bound.get_str("input").unwrap(), "tensor7");
}

#[test]
fn unknown_flag_names_the_flag() {
    let spec = sample_spec();
    let err = spec.bind(&words(&["-bogus", "1"])).unwrap_err();
    assert_eq!(err.message(), "Unknown parameter: -bogus");
}

#[test]
fn flag_without_value_is_rejected() {
    let spec = sample_spec();
    let err = spec.bind(&words(&["-input"])).unwrap_err();
    assert_eq!(err.message(), "Missing value for parameter -input");
}

#[test]
fn short_positional_call_reports_usage() {
    let spec = sample_spec();
    let err = spec.bind(&[]).unwrap_err();
    assert_eq!(err.message(), "wrong # args: should be \"sample input ?count? ?scale?\"");
}

#[test]
fn too_many_positional_words_report_usage() {
    let spec = sample_spec();
    let err = spec.bind(&words(&["a", "1", "2.0", "extra"])).unwrap_err();
    assert!(err.message().starts_with("wrong # args"));
}

#[test]
fn named_call_missing_required_names_the_field() {
    let spec = sample_spec();
    let err = spec.bind(&words(&["-count", "3"])).unwrap_err();
    assert_eq!(err.message(), "Required parameter missing: -input");
}

#[test]
fn negative_numbers_stay_positional() {
    let spec = CommandSpec::new("neg", "neg value ?other?")
        .arg(ArgSpec::required("value", ArgKind::Float))
        .arg(ArgSpec::optional("other", ArgKind::Float, ArgValue::Float(0.0)));
    let bound = spec.bind(&words(&["-3.5", "-.25"])).unwrap();
    assert_eq!(bound.get_float("value").unwrap(), -3.5);
    assert_eq!(bound.get_float("other").unwrap(), -0.25);
}

#[test]
fn integer_coercion_failure_names_field_and_token() {
    let spec = sample_spec();
    let err = spec.bind(&words(&["tensor0", "many"])).unwrap_err();
    assert_eq!(err.message(), "Invalid integer value for -count: \"many\"");
}

#[test]
fn boolean_coercion_accepts_words_and_digits() {
    let spec = CommandSpec::new("flag", "flag on")
        .arg(ArgSpec::required("on", ArgKind::Bool));
    assert!(spec.bind(&words(&["true"])).unwrap().get_bool("on").unwrap());
    assert!(!spec.bind(&words(&["0"])).unwrap().get_bool("on").unwrap());
    let err = spec.bind(&words(&["maybe"])).unwrap_err();
    assert_eq!(err.message(), "Invalid boolean value for -on: \"maybe\"");
}

#[test]
fn int_list_scalar_broadcasts_to_arity() {
    let spec = CommandSpec::new("pool", "pool stride")
        .arg(ArgSpec::required("stride", ArgKind::IntList(2)));
    let bound = spec.bind(&words(&["3"])).unwrap();
    assert_eq!(bound.get_int_list("stride").unwrap(), &[3, 3]);
    let bound = spec.bind(&words(&["2 4"])).unwrap();
    assert_eq!(bound.get_int_list("stride").unwrap(), &[2, 4]);
}

#[test]
fn int_list_length_mismatch_is_rejected() {
    let spec = CommandSpec::new("pool", "pool stride")
        .arg(ArgSpec::required("stride", ArgKind::IntList(2)));
    let err = spec.bind(&words(&["1 2 3"])).unwrap_err();
    assert_eq!(err.message(), "Expected 2 values for -stride, got 3");
}

#[test]
fn unbounded_int_list_keeps_all_entries() {
    let spec = CommandSpec::new("shape", "shape dims")
        .arg(ArgSpec::required("dims", ArgKind::IntList(0)));
    let bound = spec.bind(&words(&["2 3 4"])).unwrap();
    assert_eq!(bound.get_int_list("dims").unwrap(), &[2, 3, 4]);
}
