use std::collections::HashSet;

use tch::Tensor;
use torshrt::{HandleKind, Registry};

#[test]
fn minted_handles_are_pairwise_distinct() {
    let mut registry = Registry::new();
    let mut seen = HashSet::new();
    for _ in 0..100 {
        assert!(seen.insert(registry.next_handle(HandleKind::Tensor)));
        assert!(seen.insert(registry.next_handle(HandleKind::Module)));
        assert!(seen.insert(registry.next_handle(HandleKind::Optimizer)));
    }
    assert_eq!(seen.len(), 300);
}

#[test]
fn handle_prefix_matches_kind() {
    let mut registry = Registry::new();
    assert_eq!(registry.next_handle(HandleKind::Tensor), "tensor0");
    assert_eq!(registry.next_handle(HandleKind::Tensor), "tensor1");
    assert_eq!(registry.next_handle(HandleKind::Module), "module0");
    assert_eq!(registry.next_handle(HandleKind::Optimizer), "optimizer0");
}

#[test]
fn stored_tensor_resolves_until_overwritten() {
    let mut registry = Registry::new();
    let handle = registry.insert_tensor(Tensor::from_slice(&[1.0f64, 2.0]));
    let first = registry.tensor(&handle).unwrap();
    assert_eq!(Vec::<f64>::try_from(&first.reshape([-1])).unwrap(), vec![1.0, 2.0]);

    registry.store_tensor(&handle, Tensor::from_slice(&[9.0f64]));
    let second = registry.tensor(&handle).unwrap();
    assert_eq!(Vec::<f64>::try_from(&second.reshape([-1])).unwrap(), vec![9.0]);
}

#[test]
fn never_issued_handle_is_a_recoverable_error() {
    let registry = Registry::new();
    let err = registry.tensor("tensor42").unwrap_err();
    assert_eq!(err.message(), "Invalid tensor name: tensor42");
}

#[test]
fn wrong_kind_handle_is_rejected() {
    let mut registry = Registry::new();
    let handle = registry.insert_tensor(Tensor::from_slice(&[1.0f64]));
    assert!(registry.module(&handle).is_err());
    assert!(registry.optimizer(&handle).is_err());
}

#[test]
fn release_removes_the_entry_without_reissuing_the_name() {
    let mut registry = Registry::new();
    let first = registry.insert_tensor(Tensor::from_slice(&[1.0f64]));
    registry.release(&first).unwrap();
    assert!(registry.tensor(&first).is_err());
    assert_eq!(registry.tensor_count(), 0);

    let second = registry.insert_tensor(Tensor::from_slice(&[2.0f64]));
    assert_ne!(first, second);

    let err = registry.release("tensor99").unwrap_err();
    assert_eq!(err.message(), "Invalid handle name: tensor99");
}
