use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serializable filter specification.
///
/// The boolean combinators accept `NONE`, `ALL` and `ANY` as input spellings of
/// `NOT`, `AND` and `OR`; output always uses the canonical names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operator")]
pub enum FilterSpec {
    #[serde(rename = "IN_LIST")]
    InList { column: String, values: Vec<Value> },

    #[serde(rename = "IN_RANGE")]
    InRange {
        column: String,
        min_val: f64,
        max_val: f64,
    },

    #[serde(rename = "NOT", alias = "NONE")]
    Not { arguments: Vec<FilterSpec> },

    #[serde(rename = "AND", alias = "ALL")]
    And { arguments: Vec<FilterSpec> },

    #[serde(rename = "OR", alias = "ANY")]
    Or { arguments: Vec<FilterSpec> },
}

impl FilterSpec {
    pub fn in_list(column: impl Into<String>, values: Vec<Value>) -> Self {
        FilterSpec::InList {
            column: column.into(),
            values,
        }
    }

    pub fn in_range(column: impl Into<String>, min_val: f64, max_val: f64) -> Self {
        FilterSpec::InRange {
            column: column.into(),
            min_val,
            max_val,
        }
    }

    pub fn not(argument: FilterSpec) -> Self {
        FilterSpec::Not {
            arguments: vec![argument],
        }
    }

    pub fn and(arguments: Vec<FilterSpec>) -> Self {
        FilterSpec::And { arguments }
    }

    pub fn or(arguments: Vec<FilterSpec>) -> Self {
        FilterSpec::Or { arguments }
    }

    /// Canonical operator name
    pub fn operator(&self) -> &'static str {
        match self {
            FilterSpec::InList { .. } => "IN_LIST",
            FilterSpec::InRange { .. } => "IN_RANGE",
            FilterSpec::Not { .. } => "NOT",
            FilterSpec::And { .. } => "AND",
            FilterSpec::Or { .. } => "OR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_leaves() {
        let spec: FilterSpec = serde_json::from_value(json!({
            "operator": "IN_RANGE", "column": "age", "min_val": 1, "max_val": 2
        }))
        .unwrap();
        assert_eq!(spec, FilterSpec::in_range("age", 1.0, 2.0));

        let spec: FilterSpec = serde_json::from_value(json!({
            "operator": "IN_LIST", "column": "name", "values": ["a", "b"]
        }))
        .unwrap();
        assert_eq!(spec, FilterSpec::in_list("name", vec![json!("a"), json!("b")]));
    }

    #[test]
    fn test_synonyms_parse_to_same_combinator() {
        let leaf = json!({"operator": "IN_LIST", "column": "name", "values": ["a"]});

        for (canonical, synonym) in [("NOT", "NONE"), ("AND", "ALL"), ("OR", "ANY")] {
            let a: FilterSpec =
                serde_json::from_value(json!({"operator": canonical, "arguments": [leaf.clone()]}))
                    .unwrap();
            let b: FilterSpec =
                serde_json::from_value(json!({"operator": synonym, "arguments": [leaf.clone()]}))
                    .unwrap();
            assert_eq!(a, b);
            assert_eq!(serde_json::to_value(&b).unwrap()["operator"], json!(canonical));
        }
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let result: Result<FilterSpec, _> = serde_json::from_value(json!({
            "operator": "XOR", "arguments": []
        }));
        assert!(result.is_err());

        let result: Result<FilterSpec, _> = serde_json::from_value(json!({
            "operator": "IN_RANGE", "column": "age", "min_val": 1
        }));
        assert!(result.is_err());
    }
}
