//! End-to-end smoke: fit y = 2x through the command surface.

use torshrt::Interp;

fn eval(interp: &mut Interp, line: &str) -> String {
    match interp.eval_line(line) {
        Ok(result) => result,
        Err(err) => panic!("`{line}` failed: {err}"),
    }
}

fn item(interp: &mut Interp, handle: &str) -> f64 {
    eval(interp, &format!("tensor_item {handle}")).parse().unwrap()
}

#[test]
fn sgd_fits_a_scalar_weight() {
    let mut interp = Interp::new();
    let x = eval(&mut interp, "tensor_create {1 2 3 4}");
    let y = eval(&mut interp, "tensor_create {2 4 6 8}");
    let w = eval(&mut interp, "tensor_create {0.0}");
    eval(&mut interp, &format!("tensor_set_requires_grad {w}"));
    let opt = eval(&mut interp, &format!("optimizer_sgd {{{w}}} 0.02"));

    let mut first_loss = None;
    let mut last_loss = 0.0;
    for _ in 0..100 {
        let pred = eval(&mut interp, &format!("tensor_mul {x} {w}"));
        let loss = eval(&mut interp, &format!("mse_loss {pred} {y}"));
        last_loss = item(&mut interp, &loss);
        first_loss.get_or_insert(last_loss);
        eval(&mut interp, &format!("optimizer_zero_grad {opt}"));
        eval(&mut interp, &format!("tensor_backward {loss}"));
        eval(&mut interp, &format!("optimizer_step {opt}"));
    }

    assert!(last_loss < first_loss.unwrap(), "loss did not decrease");
    assert!(last_loss < 1e-3, "loss stayed at {last_loss}");
    let learned = item(&mut interp, &w);
    assert!((learned - 2.0).abs() < 0.05, "w converged to {learned}");
}

#[test]
fn adam_step_moves_the_weight() {
    let mut interp = Interp::new();
    let x = eval(&mut interp, "tensor_create {1 2 3 4}");
    let y = eval(&mut interp, "tensor_create {2 4 6 8}");
    let w = eval(&mut interp, "tensor_create {0.0}");
    eval(&mut interp, &format!("tensor_set_requires_grad {w}"));
    let opt = eval(
        &mut interp,
        &format!("optimizer_adam -parameters {{{w}}} -lr 0.1"),
    );

    let before = item(&mut interp, &w);
    let pred = eval(&mut interp, &format!("tensor_mul {x} {w}"));
    let loss = eval(&mut interp, &format!("mse_loss {pred} {y}"));
    eval(&mut interp, &format!("optimizer_zero_grad {opt}"));
    eval(&mut interp, &format!("tensor_backward {loss}"));
    eval(&mut interp, &format!("optimizer_step {opt}"));
    let after = item(&mut interp, &w);
    assert!((after - before).abs() > 1e-6, "step left the weight unchanged");
}

#[test]
fn module_parameters_train_through_shared_storage() {
    let mut interp = Interp::new();
    let layer = eval(&mut interp, "linear 1 1");
    let opt = eval(&mut interp, &format!("optimizer_sgd {{{layer}}} 0.05"));
    let x = eval(&mut interp, "tensor_create {{1.0} {2.0} {3.0}}");
    let y = eval(&mut interp, "tensor_create {{3.0} {5.0} {7.0}}");

    let mut first_loss = None;
    let mut last_loss = 0.0;
    for _ in 0..200 {
        let pred = eval(&mut interp, &format!("layer_forward {layer} {x} -train true"));
        let loss = eval(&mut interp, &format!("mse_loss {pred} {y}"));
        last_loss = item(&mut interp, &loss);
        first_loss.get_or_insert(last_loss);
        eval(&mut interp, &format!("optimizer_zero_grad {opt}"));
        eval(&mut interp, &format!("tensor_backward {loss}"));
        eval(&mut interp, &format!("optimizer_step {opt}"));
    }
    assert!(last_loss < first_loss.unwrap(), "loss did not decrease");
    assert!(last_loss < 0.1, "loss stayed at {last_loss}");
}

#[test]
fn invalid_learning_rate_is_rejected() {
    let mut interp = Interp::new();
    let w = eval(&mut interp, "tensor_create {0.0}");
    eval(&mut interp, &format!("tensor_set_requires_grad {w}"));
    let err = interp
        .eval_line(&format!("optimizer_sgd {{{w}}} -0.1"))
        .unwrap_err();
    assert_eq!(err.message(), "Invalid learning rate: must be positive");

    let err = interp
        .eval_line("optimizer_sgd {tensor99} 0.1")
        .unwrap_err();
    assert_eq!(err.message(), "Invalid parameter tensor: tensor99");
}
