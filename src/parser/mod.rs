//! Model parser (verb module)
//!
//! Transforms YAML or JSON model descriptions into a validated [`Model`].

use std::path::Path;

use crate::error::ParseError;
use crate::model::{Model, ModelDescription};

/// Parse a model from a file; `.json` files are read as JSON, anything else as YAML
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Model, ParseError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| ParseError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let model = if is_json { parse_json(&contents)? } else { parse_str(&contents)? };
    log::debug!(
        "loaded model '{}' from {}: {} dimensions, {} cubes",
        model.name,
        path.display(),
        model.dimensions().count(),
        model.cubes().count()
    );
    Ok(model)
}

/// Parse a model from a YAML string
pub fn parse_str(yaml: &str) -> Result<Model, ParseError> {
    let desc: ModelDescription = serde_yaml::from_str(yaml)?;
    parse_description(&desc)
}

/// Parse a model from a JSON string
pub fn parse_json(json: &str) -> Result<Model, ParseError> {
    let desc: ModelDescription = serde_json::from_str(json)?;
    parse_description(&desc)
}

/// Validate an already deserialized description
pub fn parse_description(desc: &ModelDescription) -> Result<Model, ParseError> {
    Ok(Model::from_description(desc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelError;
    use crate::testing::SALES_MODEL;
    use std::io::Write;

    #[test]
    fn test_parse_yaml() {
        let model = parse_str(SALES_MODEL).unwrap();
        assert_eq!(model.name, "retail");

        let date = model.dimension("date").unwrap();
        assert_eq!(date.level_names(), vec!["year", "month"]);
        assert_eq!(date.default_hierarchy().unwrap().name, "ym");

        let cube = model.cube("sales").unwrap();
        assert_eq!(cube.measures, vec!["amount"]);
        assert_eq!(model.cube_dimensions(cube).map(|d| d.name.as_str()).collect::<Vec<_>>(), vec!["date", "store"]);
    }

    #[test]
    fn test_parse_json_keeps_level_order() {
        let json = r#"{
            "name": "shop",
            "dimensions": {
                "date": {
                    "levels": {
                        "year": {"attributes": ["year"]},
                        "quarter": {"attributes": ["quarter"]},
                        "month": {"attributes": ["month"]}
                    },
                    "hierarchies": {"default": {"levels": ["year", "quarter", "month"]}}
                }
            },
            "cubes": {"orders": {"measures": ["total"], "dimensions": ["date"]}}
        }"#;
        let model = parse_json(json).unwrap();
        assert_eq!(model.dimension("date").unwrap().level_names(), vec!["year", "quarter", "month"]);
    }

    #[test]
    fn test_invalid_model_is_a_model_error() {
        let yaml = r#"
dimensions:
  date:
    levels:
      year: {attributes: [year]}
    hierarchies:
      ym: {levels: [year, month]}
"#;
        match parse_str(yaml) {
            Err(ParseError::Model { source: ModelError::LevelNotFound { level, .. } }) => assert_eq!(level, "month"),
            other => panic!("expected level error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(parse_str("dimensions: [unclosed"), Err(ParseError::Yaml { .. })));
    }

    #[test]
    fn test_parse_file_by_extension() {
        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        yaml.write_all(SALES_MODEL.as_bytes()).unwrap();
        assert_eq!(parse_file(yaml.path()).unwrap().name, "retail");

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        json.write_all(br#"{"name": "empty"}"#).unwrap();
        assert_eq!(parse_file(json.path()).unwrap().name, "empty");
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            parse_file("/nonexistent/model.yaml"),
            Err(ParseError::Io { .. })
        ));
    }
}
