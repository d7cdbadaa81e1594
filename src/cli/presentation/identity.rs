//! Brand identity presentation.

use crate::cli::output::envelope;
use crate::identity::BrandIdentity;
use serde_json::json;

pub fn format_identity_text(page_id: &str, identity: &BrandIdentity) -> String {
    format!(
        "Identity for {}\nFingerprint: {}\n\n{}",
        page_id,
        identity.fingerprint(),
        identity.brand_guidelines()
    )
}

pub fn format_identity_json(page_id: &str, identity: &BrandIdentity, message: &str) -> String {
    envelope(
        true,
        message,
        &json!({
            "page_id": page_id,
            "fingerprint": identity.fingerprint(),
            "identity": identity,
        }),
    )
}
