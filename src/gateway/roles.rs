//! Subject-attribute extraction for certificate-style identities.
//!
//! In certificate-based deployments the token carries a full subject
//! string like `"CN=alice,OU=ops,O=example"`. When a subject attribute is
//! configured, the username is the value of that attribute; otherwise the
//! identity is used as-is.

/// Reduce a remote-user string to the configured subject attribute value.
///
/// Matching is case-insensitive and the extracted value runs up to the
/// next `,` or the end of the string. Returns the input unchanged when no
/// attribute is configured or the key is absent.
pub fn normalize_remote_user(remote_user: &str, ssl_attribute: Option<&str>) -> String {
    let Some(attribute) = ssl_attribute else {
        return remote_user.to_string();
    };

    let haystack = remote_user.to_lowercase();
    let needle = format!("{}=", attribute.to_lowercase());

    let Some(start) = haystack.find(&needle) else {
        return remote_user.to_string();
    };

    let value = &haystack[start + needle.len()..];
    let end = value.find(',').unwrap_or(value.len());
    value[..end].trim().to_string()
}
