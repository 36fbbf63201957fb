#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn cursor_name_prefers_display_name() {
    let user = Identity::new("u1").with_display_name("Ada").with_email("ada@example.com");
    assert_eq!(user.cursor_name(), "Ada");
}

#[test]
fn cursor_name_falls_back_to_email() {
    let user = Identity::new("u1").with_email("ada@example.com");
    assert_eq!(user.cursor_name(), "ada@example.com");

    let blank = Identity::new("u1").with_display_name("  ").with_email("ada@example.com");
    assert_eq!(blank.cursor_name(), "ada@example.com");
}

#[test]
fn cursor_name_falls_back_to_guest() {
    assert_eq!(Identity::new("u1").cursor_name(), "Guest");
}

#[test]
fn cursor_at_uses_identity_fields() {
    let user = Identity::new("ab").with_display_name("Bo");
    let cursor = user.cursor_at(Point::new(3.0, 4.0));
    assert_eq!(cursor.id, "ab");
    assert_eq!(cursor.name, "Bo");
    assert_eq!(cursor.color, cursor_color("ab"));
    assert_eq!((cursor.x, cursor.y), (3.0, 4.0));
}

#[test]
fn decodes_camel_case_with_missing_optionals() {
    let user: Identity = serde_json::from_str(r#"{"id":"u9","photoUrl":"http://x/p.png"}"#).unwrap();
    assert_eq!(user.id, "u9");
    assert_eq!(user.photo_url.as_deref(), Some("http://x/p.png"));
    assert!(user.display_name.is_none());
}
