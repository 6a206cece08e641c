// Request path parsing module
// This file maps gateway request paths onto function names and
// bounded metric labels for control-plane endpoints
//
// Numan Thabit 2025 Nov

const FUNCTION_PREFIX: &str = "/function/";

/// Extract the function name from a `/function/<name>[/<rest>][?<query>]` path.
///
/// Returns an empty string for paths outside the function route.
pub fn extract_function_name(url: &str) -> String {
    let Some(rest) = url.strip_prefix(FUNCTION_PREFIX) else {
        return String::new();
    };
    let end = rest.find(|c: char| c == '/' || c == '?').unwrap_or(rest.len());
    rest[..end].trim_matches('/').to_string()
}

/// Trim trailing `/` from a control-plane path, falling back to `/`.
pub fn normalize_service_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Append the default namespace unless the name is already qualified.
pub fn qualify_function_name(service: &str, namespace: &str) -> String {
    if namespace.is_empty() || service.contains('.') {
        service.to_string()
    } else {
        format!("{service}.{namespace}")
    }
}
