use rowbridge::json::records_from_json;
use rowbridge::{
    BridgeError, DynamicModel, InferenceOptions, SchemaInferer, TypeSynthesizer, Value,
};
use serde_json::json;

#[test]
fn test_runtime_type_from_inferred_schema() {
    let docs = json!([
        {"id": 1, "city_name": "Oslo", "population": 700000},
        {"id": 2, "city_name": "Bergen"}
    ]);
    let records = records_from_json(&docs).unwrap();
    let (schema, rows) =
        SchemaInferer::infer_and_fill("city_stats", &records, &InferenceOptions::default())
            .unwrap();

    let descriptor = TypeSynthesizer::synthesize(&schema).unwrap();
    assert_eq!(descriptor.name(), "CityStats");
    assert_eq!(descriptor.schema(), &schema);

    let models = DynamicModel::from_rows(&descriptor, &rows);
    assert_eq!(models.len(), 2);
    let first = models[0].as_ref().unwrap();
    assert_eq!(first.get("city_name"), Some(&Value::Text("Oslo".into())));

    let second = models[1].as_ref().unwrap();
    assert_eq!(second.get("population"), Some(&Value::Null));
    // nulls stay out of the record rendering
    assert!(!second.to_record().contains_key("population"));
}

#[test]
fn test_every_synthesis_call_is_a_new_identity() {
    let docs = json!([{"id": 1}]);
    let records = records_from_json(&docs).unwrap();
    let schema =
        SchemaInferer::from_records("t", &records, &InferenceOptions::default()).unwrap();

    let first = TypeSynthesizer::synthesize(&schema).unwrap();
    let second = TypeSynthesizer::synthesize(&schema).unwrap();
    assert_ne!(first.type_id(), second.type_id());

    // instances of different identities still share the structure
    let a = DynamicModel::new(&first);
    let b = DynamicModel::new(&second);
    assert_eq!(a.to_row(), b.to_row());
}

#[test]
fn test_instances_enforce_their_columns() {
    let docs = json!([{"id": 1, "score": 0.5}]);
    let records = records_from_json(&docs).unwrap();
    let schema =
        SchemaInferer::from_records("runs", &records, &InferenceOptions::default()).unwrap();
    let descriptor = TypeSynthesizer::synthesize(&schema).unwrap();

    let mut model = DynamicModel::new(&descriptor);
    model.set("SCORE", Value::Integer(2)).unwrap();
    assert_eq!(model.get("score"), Some(&Value::Float(2.0)));

    assert!(model.set("score", Value::Text("fast".into())).is_err());
    assert!(matches!(
        model.set("elsewhere", Value::Integer(1)),
        Err(BridgeError::ColumnNotFound(_, _))
    ));
    assert!(model.get("elsewhere").is_none());
}

#[test]
fn test_descriptor_outlives_models_built_from_it() {
    let docs = json!([{"id": 1}]);
    let records = records_from_json(&docs).unwrap();
    let schema =
        SchemaInferer::from_records("t", &records, &InferenceOptions::default()).unwrap();
    let descriptor = TypeSynthesizer::synthesize(&schema).unwrap();

    let model = DynamicModel::new(&descriptor);
    drop(descriptor);
    // the instance keeps its shape through the shared descriptor
    assert_eq!(model.descriptor().schema().column_count(), 1);
    assert_eq!(model.to_row(), vec![Value::Null]);
}
