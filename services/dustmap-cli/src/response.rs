//! JSON rendering of query results.

use dust_lookup::QueryResult;
use serde_json::{json, Map, Value};

use crate::request::{ParsedRequest, RequestError};

/// Result fields plus the caller's coordinates, echoed under their own names.
pub fn render_result(request: &ParsedRequest, result: &QueryResult) -> Value {
    let mut object = match result.to_json() {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    for (name, values) in &request.echo {
        object.insert(
            (*name).to_string(),
            serde_json::to_value(values).unwrap_or(Value::Null),
        );
    }
    Value::Object(object)
}

/// Error object for a rejected body.
pub fn render_error(error: &RequestError) -> Value {
    json!({ "error": error.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{QueryBody, RequestLimits};
    use dust_lookup::{fields, FieldValue};

    #[test]
    fn test_render_echoes_coordinates() {
        let request = QueryBody::from_json(r#"{"ra": [1.5, 2], "dec": [0, 3]}"#)
            .unwrap()
            .validate(&RequestLimits::default())
            .unwrap();
        let mut result = QueryResult::new();
        result.insert(fields::SUCCESS, FieldValue::floats([1.0, 0.0]));

        let value = render_result(&request, &result);
        assert_eq!(
            value,
            json!({ "success": [1.0, 0.0], "ra": [1.5, 2.0], "dec": [0.0, 3.0] })
        );
    }

    #[test]
    fn test_render_error() {
        let value = render_error(&RequestError::MissingCoordinates);
        assert!(value["error"].as_str().unwrap().contains("'ra' and 'dec'"));
    }
}
