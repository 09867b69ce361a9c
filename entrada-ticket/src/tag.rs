use uuid::Uuid;

/// Mint a scannable ticket tag: a time component plus a random component.
/// Format: ENT-{unix millis}-{8 hex chars}
pub fn ticket_tag() -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let random = Uuid::new_v4().simple().to_string();
    format!("ENT-{}-{}", timestamp, random[..8].to_uppercase())
}

/// Pending requests live in their own tag namespace
pub fn pending_tag() -> String {
    format!("PEND-{}", Uuid::new_v4())
}
