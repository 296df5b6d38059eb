//! Adapter round-trips between typed domain values and the generic value
//! form, exercised through the public API.

use rpcroute::{adapt, adapt_timestamp, coerce, EnumShape, RecordShape, Shape};
use serde::Serialize;
use serde_json::json;
use time::macros::datetime;

#[derive(Serialize)]
struct Address {
    street: String,
    city: String,
}

#[derive(Serialize)]
struct Customer {
    name: String,
    age: i32,
    vip: bool,
    addresses: Vec<Address>,
}

#[test]
fn test_nested_struct_adapts_and_coerces() {
    let customer = Customer {
        name: "Ada".to_string(),
        age: 36,
        vip: true,
        addresses: vec![Address {
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
        }],
    };

    let adapted = adapt(&customer).unwrap();
    assert_eq!(
        adapted,
        json!({
            "name": "Ada",
            "age": 36,
            "vip": true,
            "addresses": [{"street": "1 Main St", "city": "Springfield"}]
        })
    );

    let shape = Shape::Record(
        RecordShape::new("Customer")
            .field("name", Shape::String)
            .field("age", Shape::Int)
            .field("vip", Shape::Bool)
            .field(
                "addresses",
                Shape::list(Shape::Record(
                    RecordShape::new("Address")
                        .field("street", Shape::String)
                        .field("city", Shape::String),
                )),
            ),
    );
    assert_eq!(coerce(Some(&adapted), &shape).unwrap(), adapted);
}

#[test]
fn test_adapted_enum_matches_enum_shape() {
    #[derive(Serialize)]
    enum Status {
        Active,
    }

    let adapted = adapt(&Status::Active).unwrap();
    let shape = Shape::Enum(EnumShape::new("Status", &["Active", "Suspended"]));
    assert_eq!(coerce(Some(&adapted), &shape).unwrap(), json!("Active"));
}

#[test]
fn test_timestamp_round_trip() {
    let instant = datetime!(2024-05-17 13:45:00 UTC);
    let adapted = adapt_timestamp(instant);
    assert_eq!(
        coerce(Some(&adapted), &Shape::Timestamp).unwrap(),
        json!(1715953500000_i64)
    );
}

#[test]
fn test_record_coercion_fills_gaps_from_partial_input() {
    let shape = Shape::Record(
        RecordShape::new("Settings")
            .field("retries", Shape::Int)
            .field("verbose", Shape::Bool)
            .field("label", Shape::optional(Shape::String)),
    );

    let coerced = coerce(Some(&json!({"retries": "3"})), &shape).unwrap();
    assert_eq!(
        coerced,
        json!({"retries": 3, "verbose": false, "label": null})
    );
}
