use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

/// Option name under which the enabled content types are stored.
pub const ENABLED_TYPES_OPTION: &str = "rei-options";

/// The content types for which image reordering is switched on.
///
/// The stored option is whatever the settings form submitted: usually a list
/// of type names, sometimes a map of type name to flag. Anything that is
/// neither decodes to the empty set, which disables the feature everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnabledTypeSet(BTreeSet<String>);

impl EnabledTypeSet {
    /// Decode the raw option value.
    pub fn from_option(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Array(items)) => Self(
                items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            Some(Value::Object(map)) => Self(
                map.iter()
                    .filter(|(_, flag)| is_truthy(flag))
                    .map(|(name, _)| name.clone())
                    .collect(),
            ),
            _ => Self::default(),
        }
    }

    pub fn contains(&self, content_type: &str) -> bool {
        self.0.contains(content_type)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_of_names_is_enabled() {
        let set = EnabledTypeSet::from_option(Some(&json!(["page", "post"])));
        assert!(set.contains("page"));
        assert!(set.contains("post"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn map_keeps_only_truthy_flags() {
        let set = EnabledTypeSet::from_option(Some(&json!({
            "page": "page",
            "post": "",
            "book": 1,
            "movie": false
        })));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["book", "page"]);
    }

    #[test]
    fn absent_or_malformed_values_disable_everything() {
        assert!(EnabledTypeSet::from_option(None).is_empty());
        assert!(EnabledTypeSet::from_option(Some(&Value::Null)).is_empty());
        assert!(EnabledTypeSet::from_option(Some(&json!("page"))).is_empty());
        assert!(EnabledTypeSet::from_option(Some(&json!(42))).is_empty());
        assert!(EnabledTypeSet::from_option(Some(&json!([1, 2, null]))).is_empty());
    }
}
