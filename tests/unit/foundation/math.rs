use super::*;

#[test]
fn finite_or_replaces_nan_and_inf() {
    assert_eq!(finite_or(f64::NAN, 0.5), 0.5);
    assert_eq!(finite_or(f64::INFINITY, 1.0), 1.0);
    assert_eq!(finite_or(0.25, 1.0), 0.25);
}

#[test]
fn rng_is_deterministic_and_bounded() {
    let mut a = Rng64::new(123);
    let mut b = Rng64::new(123);
    for _ in 0..64 {
        let va = a.next_signed();
        assert_eq!(va, b.next_signed());
        assert!((-1.0..1.0).contains(&va));
    }
}

#[test]
fn fnv_hash_is_stable_and_input_sensitive() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"narrator");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"narrator");
    assert_eq!(a.finish(), b.finish());

    let mut c = Fnv1a64::new_default();
    c.write_bytes(b"narrator");
    c.write_u64(1);
    assert_ne!(a.finish(), c.finish());
}
