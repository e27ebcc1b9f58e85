use chrono::Duration;
use uuid::Uuid;
use vendora_api::auth::JwtKeys;

/// Secret the test app signs and verifies tokens with.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

pub fn token_for(subject: Uuid, role: &str) -> String {
    JwtKeys::new(TEST_JWT_SECRET)
        .issue(subject, role, Duration::hours(1))
        .expect("Failed to sign test token")
}

/// `Authorization` header value for a vendor.
pub fn vendor_bearer(vendor_id: Uuid) -> String {
    format!("Bearer {}", token_for(vendor_id, "vendor"))
}
