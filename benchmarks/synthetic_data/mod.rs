use fake::{Fake, faker::name::en::Name};
use rand::Rng;

#[derive(Debug, Clone)]
pub struct Person {
    pub id: i64,
    pub name: Option<String>,
    pub score: Option<f64>,
    pub active: bool,
}

/// Generates `total` rows; roughly one in ten names and scores is absent.
pub fn people(total: usize) -> Vec<Person> {
    let mut rng = rand::rng();
    (0..total)
        .map(|i| Person {
            id: i64::try_from(i).unwrap_or(i64::MAX),
            name: (!rng.random_ratio(1, 10)).then(|| Name().fake()),
            score: (!rng.random_ratio(1, 10)).then(|| rng.random_range(0.0..10000.0)),
            active: rng.random(),
        })
        .collect()
}
