//! Integration tests for model loading and the dimensional model operations

mod common;

use common::load_fixture;
use cubist::model::{DimensionDescription, LevelDescription, OrderedMap};
use cubist::{aggregated_field_name, path, Aggregation, CompileError, Cut, ModelError, QueryCompiler, QueryError};

#[test]
fn test_fixture_loads() {
    let model = load_fixture("sales.yaml");
    assert_eq!(model.name, "retail");
    assert_eq!(model.label.as_deref(), Some("Retail sales"));
    assert_eq!(model.dimensions().count(), 3);

    let cube = model.cube("sales").unwrap();
    assert_eq!(cube.fact_source(), "sales_view");
    assert_eq!(cube.key(), "id");
    assert_eq!(cube.physical_column("date.year"), "sale_year");
    assert_eq!(cube.physical_column("amount"), "amount");
    assert_eq!(cube.joins.len(), 1);
    assert_eq!(cube.joins[0].alias.as_deref(), Some("store"));
    assert!(model.cube_by_id(cube.id).is_ok());
}

#[test]
fn test_level_keys_and_labels() {
    let model = load_fixture("sales.yaml");
    let date = model.dimension("date").unwrap();
    let year = date.level("year").unwrap();
    let month = date.level("month").unwrap();
    assert_eq!(year.key(), "year");
    assert_eq!(month.key(), "month");
    assert_eq!(month.label_attribute(), "month_name");
    assert_eq!(date.all_attributes(None).unwrap(), vec!["year", "month", "month_name"]);
    assert!(matches!(date.level("day"), Err(ModelError::LevelNotFound { .. })));
}

#[test]
fn test_flat_dimension_has_synthesized_default() {
    let model = load_fixture("sales.yaml");
    let store = model.dimension("store").unwrap();
    assert!(store.is_flat());
    let hierarchy = store.default_hierarchy().unwrap();
    assert_eq!(hierarchy.level_names(), vec!["store"]);
}

#[test]
fn test_multi_level_dimension_without_hierarchy_fails() {
    let model = load_fixture("sales.yaml");
    let product = model.dimension("product").unwrap();
    assert!(!product.is_flat());
    assert!(matches!(product.default_hierarchy(), Err(ModelError::NoHierarchy { levels: 2, .. })));
}

#[test]
fn test_levels_for_path() {
    let model = load_fixture("sales.yaml");
    let hierarchy = model.dimension("date").unwrap().default_hierarchy().unwrap();
    let names = |levels: &[std::sync::Arc<cubist::Level>]| {
        levels.iter().map(|l| l.name.clone()).collect::<Vec<_>>()
    };

    let empty: [i64; 0] = [];
    assert_eq!(names(hierarchy.levels_for_path(&empty, false).unwrap()), Vec::<String>::new());
    assert_eq!(names(hierarchy.levels_for_path(&empty, true).unwrap()), vec!["year"]);
    assert_eq!(names(hierarchy.levels_for_path(&[2023], false).unwrap()), vec!["year"]);
    assert_eq!(names(hierarchy.levels_for_path(&[2023], true).unwrap()), vec!["year", "month"]);
    assert_eq!(names(hierarchy.levels_for_path(&[2023, 1], true).unwrap()), vec!["year", "month"]);
    assert!(matches!(
        hierarchy.levels_for_path(&[2023, 1, 5], false),
        Err(QueryError::PathTooLong { .. })
    ));

    assert!(hierarchy.path_is_base(&[2023, 1]));
    assert!(!hierarchy.path_is_base(&[2023]));
    assert_eq!(hierarchy.next_level(&[2023]).unwrap().name, "month");
    assert!(matches!(hierarchy.next_level(&[2023, 1]), Err(QueryError::NoNextLevel { .. })));
}

#[test]
fn test_aggregated_field_names() {
    for agg in Aggregation::ALL {
        let name = aggregated_field_name("amount", &agg.to_string()).unwrap();
        assert_eq!(name, format!("amount_{}", agg));
    }
    assert_eq!(aggregated_field_name("amount", "sum").unwrap(), "amount_sum");
    assert_eq!(aggregated_field_name("amount", "average").unwrap(), "amount_average");
    assert!(matches!(
        aggregated_field_name("amount", "median"),
        Err(ModelError::UnknownAggregation(_))
    ));
}

#[test]
fn test_model_administration() {
    let mut model = load_fixture("sales.yaml");

    // in use by the sales cube
    assert!(matches!(
        model.remove_dimension("store"),
        Err(ModelError::DimensionInUse { .. })
    ));

    model.remove_cube_dimension("sales", "store").unwrap();
    let cube = model.cube("sales").unwrap();
    assert!(matches!(
        model.cube_dimension(cube, "store"),
        Err(ModelError::DimensionNotInCube { .. })
    ));
    assert_eq!(model.remove_dimension("store").unwrap().name, "store");
    assert!(matches!(model.dimension("store"), Err(ModelError::DimensionNotFound(_))));

    let region = DimensionDescription {
        levels: OrderedMap::new().with(
            "region",
            LevelDescription { attributes: vec!["region".into()], ..Default::default() },
        ),
        ..Default::default()
    };
    model.add_dimension("region", &region).unwrap();
    assert!(matches!(
        model.add_dimension("region", &region),
        Err(ModelError::DuplicateDimension(_))
    ));
    model.add_cube_dimension("sales", "region").unwrap();
    let cube = model.cube("sales").unwrap();
    assert_eq!(model.cube_dimension(cube, "region").unwrap().name, "region");
}

#[test]
fn test_cube_is_bound_to_its_model() {
    let model = load_fixture("sales.yaml");
    let other = load_fixture("sales.yaml");
    let cube = model.cube("sales").unwrap();
    assert_eq!(cube.model, model.id());

    let cuts = [Cut::point("date", path![2023])];
    assert!(QueryCompiler::new(&model, cube).conditions(&cuts).is_ok());
    let err = QueryCompiler::new(&other, cube).conditions(&cuts).unwrap_err();
    assert_eq!(
        err,
        CompileError::Config(ModelError::ForeignCube { cube: "sales".into(), model: "retail".into() })
    );
}

#[test]
fn test_unknown_cube() {
    let model = load_fixture("sales.yaml");
    assert!(matches!(model.cube("returns"), Err(ModelError::CubeNotFound(_))));
}
