use rowbridge::json::records_from_json;
use rowbridge::{
    Record, RowProjector, Schema, SchemaInferer, TableModel, Value,
};
use serde_json::json;

#[derive(Debug, Clone, Default, PartialEq, TableModel)]
#[table(name = "people")]
struct Person {
    id: i64,
    #[column(name = "FullName")]
    full_name: String,
    nickname: Option<String>,
}

fn person_schema() -> Schema {
    SchemaInferer::from_model::<Person>().unwrap()
}

#[test]
fn test_model_to_row_and_back() {
    let schema = person_schema();
    let person = Person {
        id: 7,
        full_name: "Ada Lovelace".into(),
        nickname: None,
    };

    let row = RowProjector::model_to_row(&person, &schema);
    assert_eq!(
        row,
        vec![
            Value::Integer(7),
            Value::Text("Ada Lovelace".into()),
            Value::Null
        ]
    );

    let back: Person = RowProjector::row_to_model(&row, &schema).unwrap();
    assert_eq!(back, person);
}

#[test]
fn test_schema_decides_what_crosses() {
    // a narrower schema silently drops model fields it does not name
    let narrow = Schema::new(
        "people",
        vec![Person::columns().into_iter().next().unwrap()],
    );
    let person = Person {
        id: 1,
        full_name: "Grace".into(),
        nickname: Some("G".into()),
    };
    assert_eq!(
        RowProjector::model_to_row(&person, &narrow),
        vec![Value::Integer(1)]
    );

    // a wider schema leaves unknown columns behind without failing
    let mut columns = Person::columns();
    columns.push(rowbridge::Column::new("elsewhere", rowbridge::DataType::Text));
    let wide = Schema::new("people", columns);
    let row = vec![
        Value::Integer(2),
        Value::Text("Grace".into()),
        Value::Null,
        Value::Text("ignored".into()),
    ];
    let back: Person = RowProjector::row_to_model(&row, &wide).unwrap();
    assert_eq!(back.id, 2);
    assert_eq!(back.full_name, "Grace");
    assert_eq!(back.nickname, None);
}

#[test]
fn test_batch_conversion_reports_each_row() {
    let schema = person_schema();
    let rows = vec![
        vec![Value::Integer(1), Value::Text("a".into()), Value::Null],
        vec![
            Value::Text("not an id".into()),
            Value::Text("b".into()),
            Value::Null,
        ],
        vec![Value::Integer(3), Value::Text("c".into()), Value::Null],
    ];

    let outcomes: Vec<rowbridge::Result<Person>> =
        RowProjector::rows_to_models(&rows, &schema);
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_ok());
    assert!(outcomes[1].is_err());
    // a bad row never takes its siblings down
    assert!(outcomes[2].is_ok());

    assert!(RowProjector::rows_to_models_strict::<Person>(&rows, &schema).is_err());
}

#[test]
fn test_rows_to_records_and_back() {
    let schema = person_schema();
    let rows = vec![
        vec![Value::Integer(1), Value::Text("a".into()), Value::Null],
        vec![
            Value::Integer(2),
            Value::Text("b".into()),
            Value::Text("bee".into()),
        ],
    ];

    let records = RowProjector::rows_to_records(&rows, &schema).unwrap();
    assert_eq!(records.len(), 2);
    // null slots vanish from records
    assert!(!records[0].contains_key("nickname"));
    assert_eq!(records[1].get("nickname"), Some(&Value::Text("bee".into())));

    let back = RowProjector::record_to_row(&records[1], &schema).unwrap();
    assert_eq!(back, rows[1]);
}

#[test]
fn test_json_documents_flow_through_to_rows() {
    let docs = json!([
        {"id": 10, "FullName": "Ada", "nickname": null},
        {"FullName": "Grace", "id": 11}
    ]);
    let records = records_from_json(&docs).unwrap();
    let schema = person_schema();

    let rows: Vec<_> = records
        .iter()
        .map(|record| RowProjector::record_to_row(record, &schema).unwrap())
        .collect();

    assert_eq!(
        rows[0],
        vec![Value::Integer(10), Value::Text("Ada".into()), Value::Null]
    );
    assert_eq!(
        rows[1],
        vec![Value::Integer(11), Value::Text("Grace".into()), Value::Null]
    );

    let people: Vec<Person> = RowProjector::rows_to_models_strict(&rows, &schema).unwrap();
    assert_eq!(people[1].full_name, "Grace");
}

#[test]
fn test_non_nullable_columns_enforced_on_record_to_row() {
    let schema = person_schema();
    // FullName is declared on a plain String field, so null is rejected
    let record = Record::new().with("id", Value::Integer(1));
    assert!(RowProjector::record_to_row(&record, &schema).is_err());
}
