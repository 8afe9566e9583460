crate::define_id!(WidgetId);

#[test]
fn ids_roundtrip_through_raw_i64() {
    let id = WidgetId::from_raw(7);
    assert_eq!(id.get(), 7);
    assert_eq!(i64::from(id), 7);
}

#[test]
fn ids_order_and_hash_like_their_raw_value() {
    let a = WidgetId::from_raw(1);
    let b = WidgetId::from_raw(2);
    assert!(a < b);

    let mut set = std::collections::HashSet::new();
    set.insert(a);
    set.insert(WidgetId::from_raw(1));
    assert_eq!(set.len(), 1);
}

#[test]
fn ids_serialize_as_bare_integers() {
    let id = WidgetId::from_raw(42);
    assert_eq!(serde_json::to_string(&id).unwrap(), "42");
}

#[test]
fn ids_display_as_their_raw_value() {
    assert_eq!(WidgetId::from_raw(9).to_string(), "9");
}
