//! Shared fixtures for unit tests

use crate::model::{Model, ModelDescription};

pub(crate) const SALES_MODEL: &str = r#"
name: retail
dimensions:
  date:
    key_field: date_id
    levels:
      year:
        attributes: [year]
      month:
        attributes: [month, month_name]
    hierarchies:
      ym:
        levels: [year, month]
  store:
    levels:
      store:
        key: store_id
        attributes: [store_id, store_name]
  product:
    levels:
      category:
        attributes: [category]
cubes:
  sales:
    measures: [amount]
    dimensions: [date, store]
    mappings:
      store.store_name: store_label
"#;

pub(crate) fn sales_model() -> Model {
    let desc: ModelDescription = serde_yaml::from_str(SALES_MODEL).unwrap();
    Model::from_description(&desc).unwrap()
}
