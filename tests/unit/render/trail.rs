use super::*;

#[test]
fn buffer_evicts_oldest_when_full() {
    let mut b = TrailBuffer::new(3);
    for i in 0..5 {
        b.push(Point::new(f64::from(i), 0.0));
    }
    assert_eq!(b.len(), 3);
    let xs: Vec<f64> = b.points().map(|p| p.x).collect();
    assert_eq!(xs, vec![2.0, 3.0, 4.0]);
}

#[test]
fn buffer_ignores_non_finite_points() {
    let mut b = TrailBuffer::new(4);
    b.push(Point::new(f64::NAN, 1.0));
    b.push(Point::new(1.0, f64::INFINITY));
    assert!(b.is_empty());
}

#[test]
fn zero_capacity_still_holds_one_point() {
    let mut b = TrailBuffer::new(0);
    b.push(Point::new(1.0, 1.0));
    b.push(Point::new(2.0, 2.0));
    assert_eq!(b.capacity(), 1);
    assert_eq!(b.points().next(), Some(Point::new(2.0, 2.0)));
}

#[test]
fn store_keys_by_entity_and_resets() {
    let mut s = TrailStore::new(8);
    s.record("fox", Point::new(1.0, 1.0));
    s.record("fox", Point::new(2.0, 1.0));
    s.record("owl", Point::new(5.0, 5.0));
    assert_eq!(s.len(), 2);
    assert_eq!(s.get("fox").map(TrailBuffer::len), Some(2));

    s.reset();
    assert_eq!(s.len(), 0);
    assert!(s.get("fox").is_none());
}
