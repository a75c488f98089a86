use deskpilot_core::{Message, Role};

#[test]
fn constructors_set_roles() {
    assert_eq!(Message::system("s").role, Role::System);
    assert_eq!(Message::user("u").role, Role::User);
    assert_eq!(Message::assistant("a").role, Role::Assistant);
    let tool = Message::tool("out", "call-1");
    assert_eq!(tool.role, Role::Tool);
    assert_eq!(tool.tool_call_id.as_deref(), Some("call-1"));
}

#[test]
fn serde_omits_empty_tool_fields() {
    let json = serde_json::to_string(&Message::user("hi")).unwrap();
    assert!(!json.contains("tool_call_id"));
    assert!(!json.contains("tool_calls"));
}

#[test]
fn deserializes_without_tool_fields() {
    let msg: Message = serde_json::from_str(r#"{"role":"assistant","content":"ok"}"#).unwrap();
    assert_eq!(msg.role, Role::Assistant);
    assert!(msg.tool_calls.is_empty());
}
