use serde::Serialize;

/// Hands `value` to `log_action` as pretty JSON, but only when DEBUG is enabled,
/// so request bodies are never serialized twice on the hot path.
pub(crate) fn with_pretty_json_debug<T, F>(value: &T, log_action: F)
where
    T: Serialize + ?Sized,
    F: FnOnce(&str),
{
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    let pretty = serde_json::to_string_pretty(value)
        .unwrap_or_else(|error| format!("<unserializable body: {error}>"));
    log_action(&pretty);
}
