//! JSON snapshots of audited arguments and results
//!
//! A value that fails to serialize never fails the audited call. Its
//! snapshot becomes a fixed sentinel string instead.

use serde::Serialize;

pub const UNSERIALIZABLE_ARGUMENTS: &str = "[unserializable arguments]";
pub const UNSERIALIZABLE_RESULT: &str = "[unserializable result]";

/// Snapshot of the call arguments, stored as `old_values`
pub fn arguments<A: Serialize + ?Sized>(args: &A) -> String {
    serde_json::to_string(args).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to serialize audited arguments");
        UNSERIALIZABLE_ARGUMENTS.to_string()
    })
}

/// Snapshot of the return value, stored as `new_values`
pub fn result<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to serialize audited result");
        UNSERIALIZABLE_RESULT.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_tuple_arguments_serialize_as_array() {
        assert_eq!(arguments(&(100, "X")), r#"[100,"X"]"#);
        assert_eq!(arguments(&()), "null");
    }

    #[test]
    fn test_non_string_map_keys_fall_back_to_sentinel() {
        let mut by_pair = HashMap::new();
        by_pair.insert((1, 2), "pair");

        assert_eq!(arguments(&by_pair), UNSERIALIZABLE_ARGUMENTS);
        assert_eq!(result(&by_pair), UNSERIALIZABLE_RESULT);
    }

    #[test]
    fn test_result_snapshot() {
        #[derive(Serialize)]
        struct Transfer {
            id: u32,
            status: &'static str,
        }

        assert_eq!(
            result(&Transfer { id: 7, status: "DONE" }),
            r#"{"id":7,"status":"DONE"}"#
        );
    }
}
