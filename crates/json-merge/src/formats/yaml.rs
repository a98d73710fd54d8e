use serde_json::Value;

use super::{Codec, DocType};
use crate::error::{ParseError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn doc_type(&self) -> DocType {
        DocType::Yaml
    }

    fn parse(&self, text: &str) -> Result<Value> {
        serde_yaml::from_str(text).map_err(|e| ParseError::codec(DocType::Yaml, e))
    }

    fn stringify(&self, value: &Value) -> Result<String> {
        serde_yaml::to_string(value).map_err(|e| ParseError::codec(DocType::Yaml, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_nested() {
        let text = "a:\n  b: 1\n  c: [x, true]\nd: ~\n";
        assert_eq!(
            YamlCodec.parse(text).unwrap(),
            json!({"a": {"b": 1, "c": ["x", true]}, "d": null})
        );
    }

    #[test]
    fn test_keeps_key_order() {
        let value = YamlCodec.parse("z: 1\na: 2\n").unwrap();
        assert_eq!(value.to_string(), r#"{"z":1,"a":2}"#);
    }

    #[test]
    fn test_stringify_round_trip() {
        let value = json!({"name": "x: y", "n": 1.5, "list": [1, {"k": null}]});
        let text = YamlCodec.stringify(&value).unwrap();
        assert_eq!(YamlCodec.parse(&text).unwrap(), value);
    }

    #[test]
    fn test_syntax_error() {
        let err = YamlCodec.parse("a: [1, 2").unwrap_err();
        assert!(matches!(err, ParseError::Codec { format: DocType::Yaml, .. }));
        assert!(err.to_string().starts_with("YAML: "));
    }
}
