use torshrt::Interp;

fn eval(interp: &mut Interp, line: &str) -> String {
    match interp.eval_line(line) {
        Ok(result) => result,
        Err(err) => panic!("`{line}` failed: {err}"),
    }
}

#[test]
fn positional_and_named_calls_yield_equal_values() {
    let mut interp = Interp::new();
    let t = eval(&mut interp, "tensor_create {-1 2 -3}");
    let a = eval(&mut interp, &format!("tensor_abs {t}"));
    let b = eval(&mut interp, &format!("tensor_abs -input {t}"));
    assert_ne!(a, b, "each call mints its own result handle");
    assert_eq!(
        eval(&mut interp, &format!("tensor_values {a}")),
        eval(&mut interp, &format!("tensor_values {b}"))
    );
    assert_eq!(eval(&mut interp, &format!("tensor_values {a}")), "1 2 3");
}

#[test]
fn camel_case_alias_dispatches_the_same_handler() {
    let mut interp = Interp::new();
    let t = eval(&mut interp, "tensor_create {1 2 3}");
    let u = eval(&mut interp, "tensorCreate {4 5 6}");
    let sum = eval(&mut interp, &format!("tensorAdd {t} {u}"));
    assert_eq!(eval(&mut interp, &format!("tensor_values {sum}")), "5 7 9");
}

#[test]
fn missing_operand_is_an_arity_error() {
    let mut interp = Interp::new();
    let t = eval(&mut interp, "tensor_create {1 2 3}");
    let err = interp.eval_line(&format!("tensor_add {t}")).unwrap_err();
    assert!(err.message().starts_with("wrong # args"), "{err}");
}

#[test]
fn unknown_command_is_reported_by_name() {
    let mut interp = Interp::new();
    let err = interp.eval_line("tensor_frobnicate x").unwrap_err();
    assert_eq!(err.message(), "invalid command name \"tensor_frobnicate\"");
}

#[test]
fn optimizer_handle_does_not_resolve_as_tensor() {
    let mut interp = Interp::new();
    let t = eval(&mut interp, "tensor_create {1.0 2.0}");
    eval(&mut interp, &format!("tensor_set_requires_grad {t}"));
    let opt = eval(&mut interp, &format!("optimizer_sgd {{{t}}} 0.1"));
    let err = interp.eval_line(&format!("tensor_abs {opt}")).unwrap_err();
    assert_eq!(err.message(), format!("Invalid tensor name: {opt}"));
}

#[test]
fn introspection_encodes_scalars_and_lists() {
    let mut interp = Interp::new();
    let t = eval(&mut interp, "tensor_create {{1 2 3} {4 5 6}}");
    assert_eq!(eval(&mut interp, &format!("tensor_shape {t}")), "2 3");
    assert_eq!(eval(&mut interp, &format!("tensor_dtype {t}")), "float32");
    assert_eq!(eval(&mut interp, &format!("tensor_device {t}")), "cpu");
    assert_eq!(eval(&mut interp, &format!("tensor_numel {t}")), "6");
    assert_eq!(eval(&mut interp, &format!("tensor_requires_grad {t}")), "0");

    let s = eval(&mut interp, "tensor_create 7");
    assert_eq!(eval(&mut interp, &format!("tensor_item {s}")), "7");
    let err = interp.eval_line(&format!("tensor_item {t}")).unwrap_err();
    assert!(err.message().contains("exactly one element"), "{err}");
}

#[test]
fn jagged_data_is_rejected() {
    let mut interp = Interp::new();
    let err = interp.eval_line("tensor_create {{1 2} {3}}").unwrap_err();
    assert!(err.message().contains("Jagged lists"), "{err}");
}

#[test]
fn creation_options_apply() {
    let mut interp = Interp::new();
    let t = eval(&mut interp, "zeros {2 2} -dtype int64");
    assert_eq!(eval(&mut interp, &format!("tensor_dtype {t}")), "int64");

    let r = eval(&mut interp, "arange 5");
    assert_eq!(eval(&mut interp, &format!("tensor_values {r}")), "0 1 2 3 4");
    let r = eval(&mut interp, "arange 1 7 2");
    assert_eq!(eval(&mut interp, &format!("tensor_values {r}")), "1 3 5");

    let l = eval(&mut interp, "linspace 0 1 5");
    assert_eq!(eval(&mut interp, &format!("tensor_numel {l}")), "5");

    let err = interp.eval_line("zeros {2 2} -dtype float99").unwrap_err();
    assert_eq!(err.message(), "Unknown scalar type: float99");
}

#[test]
fn reductions_and_shape_ops() {
    let mut interp = Interp::new();
    let t = eval(&mut interp, "tensor_create {{1 2} {3 4}}");
    let total = eval(&mut interp, &format!("tensor_sum {t}"));
    assert_eq!(eval(&mut interp, &format!("tensor_item {total}")), "10");

    let cols = eval(&mut interp, &format!("tensor_sum {t} 0"));
    assert_eq!(eval(&mut interp, &format!("tensor_values {cols}")), "4 6");

    let flat = eval(&mut interp, &format!("tensor_reshape {t} {{4}}"));
    assert_eq!(eval(&mut interp, &format!("tensor_shape {flat}")), "4");

    let tt = eval(&mut interp, &format!("tensor_transpose {t}"));
    assert_eq!(eval(&mut interp, &format!("tensor_values {tt}")), "1 3 2 4");

    let cat = eval(&mut interp, &format!("tensor_cat {{{t} {t}}} 0"));
    assert_eq!(eval(&mut interp, &format!("tensor_shape {cat}")), "4 2");
}

#[test]
fn activations_preserve_shape() {
    let mut interp = Interp::new();
    let t = eval(&mut interp, "tensor_create {-1 0 1}");
    let relu = eval(&mut interp, &format!("tensor_relu {t}"));
    assert_eq!(eval(&mut interp, &format!("tensor_values {relu}")), "0 0 1");

    let sm = eval(&mut interp, &format!("tensor_softmax {t}"));
    assert_eq!(eval(&mut interp, &format!("tensor_shape {sm}")), "3");
    let total = eval(&mut interp, &format!("tensor_sum {sm}"));
    let total = eval(&mut interp, &format!("tensor_item {total}"));
    let total: f64 = total.parse().unwrap();
    assert!((total - 1.0).abs() < 1e-5);
}

#[test]
fn svd_and_qr_return_handle_lists() {
    let mut interp = Interp::new();
    let m = eval(&mut interp, "eye 3");
    let svd = eval(&mut interp, &format!("tensor_svd {m}"));
    let parts: Vec<&str> = svd.split_whitespace().collect();
    assert_eq!(parts.len(), 3);
    for part in &parts {
        assert!(part.starts_with("tensor"), "unexpected handle {part}");
        eval(&mut interp, &format!("tensor_shape {part}"));
    }

    let qr = eval(&mut interp, &format!("tensor_qr {m}"));
    assert_eq!(qr.split_whitespace().count(), 2);

    let det = eval(&mut interp, &format!("tensor_det {m}"));
    let det: f64 = det.parse().unwrap();
    assert!((det - 1.0).abs() < 1e-6);
}

#[test]
fn conv_and_pooling_shapes() {
    let mut interp = Interp::new();
    let input = eval(&mut interp, "rand {1 1 8 8}");
    let weight = eval(&mut interp, "rand {4 1 3 3}");
    let out = eval(&mut interp, &format!("tensor_conv2d {input} {weight}"));
    assert_eq!(eval(&mut interp, &format!("tensor_shape {out}")), "1 4 6 6");

    let padded = eval(
        &mut interp,
        &format!("tensor_conv2d -input {input} -weight {weight} -padding 1"),
    );
    assert_eq!(eval(&mut interp, &format!("tensor_shape {padded}")), "1 4 8 8");

    let pooled = eval(&mut interp, &format!("tensor_maxpool2d {input} 2"));
    assert_eq!(eval(&mut interp, &format!("tensor_shape {pooled}")), "1 1 4 4");

    let avg = eval(&mut interp, &format!("tensor_avgpool2d {input} {{2 2}}"));
    assert_eq!(eval(&mut interp, &format!("tensor_shape {avg}")), "1 1 4 4");
}

#[test]
fn layers_compose_and_expose_parameters() {
    let mut interp = Interp::new();
    let l1 = eval(&mut interp, "linear 4 8");
    let l2 = eval(&mut interp, "linear 8 2");
    let seq = eval(&mut interp, &format!("sequential {{{l1} {l2}}}"));

    let x = eval(&mut interp, "randn {3 4}");
    let y = eval(&mut interp, &format!("layer_forward {seq} {x}"));
    assert_eq!(eval(&mut interp, &format!("tensor_shape {y}")), "3 2");

    let params = eval(&mut interp, &format!("layer_parameters {seq}"));
    // weight + bias per linear layer
    assert_eq!(params.split_whitespace().count(), 4);

    let bn = eval(&mut interp, "batch_norm2d 4");
    let img = eval(&mut interp, "randn {2 4 5 5}");
    let normed = eval(&mut interp, &format!("layer_forward {bn} {img} -train true"));
    assert_eq!(eval(&mut interp, &format!("tensor_shape {normed}")), "2 4 5 5");
}

#[test]
fn recurrent_layers_return_the_output_sequence() {
    let mut interp = Interp::new();
    let lstm = eval(&mut interp, "lstm 6 12");
    let x = eval(&mut interp, "randn {2 5 6}");
    let y = eval(&mut interp, &format!("layer_forward {lstm} {x}"));
    assert_eq!(eval(&mut interp, &format!("tensor_shape {y}")), "2 5 12");

    let gru = eval(&mut interp, "gru 6 12 -numLayers 2");
    let y = eval(&mut interp, &format!("layer_forward {gru} {x}"));
    assert_eq!(eval(&mut interp, &format!("tensor_shape {y}")), "2 5 12");
}

#[test]
fn release_invalidates_the_handle() {
    let mut interp = Interp::new();
    let t = eval(&mut interp, "tensor_create {1 2 3}");
    eval(&mut interp, &format!("tensor_release {t}"));
    let err = interp.eval_line(&format!("tensor_values {t}")).unwrap_err();
    assert_eq!(err.message(), format!("Invalid tensor name: {t}"));
}

#[test]
fn scripts_skip_blanks_and_comments_and_stop_on_error() {
    let mut interp = Interp::new();
    let result = interp
        .eval_script(
            "# build a vector\n\
             \n\
             tensor_create {1 2 3}\n\
             tensor_numel tensor0\n",
        )
        .unwrap();
    assert_eq!(result, "3");

    let err = interp
        .eval_script("tensor_create {1 2 3}\ntensor_abs nosuch\nzeros {2}\n")
        .unwrap_err();
    assert_eq!(err.message(), "Invalid tensor name: nosuch");
    // the trailing command never ran
    assert!(interp.eval_line("tensor_values tensor2").is_err());
}
