mod synthetic_data;

use gridquery::query::{Query, QueryRequest};
use gridquery::{CompilerConfig, Schema};
use std::time::Instant;
use synthetic_data::Person;

const ROWS: usize = 200_000;

const REQUEST: &str = r#"{
    "filter": {
        "left": { "condition": { "property": "score", "operator": "gte", "value": "2500" } },
        "logic": "and",
        "right": {
            "left": { "condition": { "property": "name", "operator": "contains", "value": "\"an\"" } },
            "logic": "or",
            "right": { "condition": { "property": "active", "operator": "eq", "value": "true" } }
        }
    },
    "sort": [
        { "property": "name", "treatNullLowest": true },
        { "property": "score", "descending": true }
    ],
    "skip": 100,
    "take": 50
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let rows = synthetic_data::people(ROWS);
    println!("generated {ROWS} rows");

    let schema = Schema::builder("Person")
        .value("id", |p: &Person| p.id)
        .reference("name", |p: &Person| p.name.clone())
        .nullable("score", |p: &Person| p.score)
        .value("active", |p: &Person| p.active)
        .build();
    let config = CompilerConfig::json();

    let started = Instant::now();
    let request = QueryRequest::from_json(REQUEST)?;
    for _ in 0..1_000 {
        request.apply_with(Query::new(schema.clone(), &rows), &config)?;
    }
    println!("compile x1000: {:?}", started.elapsed());

    let started = Instant::now();
    let counted = request.apply_with_count_using(Query::new(schema.clone(), &rows), &config)?;
    let page = counted.query.to_vec();
    println!("execute: {:?} ({} of {} matching)", started.elapsed(), page.len(), counted.count);
    println!("{}", counted.query);
    Ok(())
}
