use studio_core::Plan;

#[test]
fn parse_is_case_insensitive() {
    assert_eq!(Plan::parse("free"), Some(Plan::Free));
    assert_eq!(Plan::parse(" PAID "), Some(Plan::Paid));
    assert_eq!(Plan::parse("Enterprise"), None);
}

#[test]
fn default_plan_is_free() {
    assert_eq!(Plan::default(), Plan::Free);
    assert!(!Plan::Free.is_paid());
}

#[test]
fn serializes_as_storage_name() {
    assert_eq!(serde_json::to_string(&Plan::Paid).unwrap(), "\"Paid\"");
}
