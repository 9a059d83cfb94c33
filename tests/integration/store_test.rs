use chrono::Days;
use mortality_analysis::models::MAX_AGE;
use mortality_analysis::{DeathRecord, Sex, Table, TableStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::utils::{date, flat_population};

fn random_deaths(rng: &mut StdRng, n: usize) -> Vec<DeathRecord> {
    let locations = ["75056", "13055", "2A004", "97411", "69123"];
    (0..n)
        .map(|_| {
            let death = date(2019, 1, 1) + Days::new(rng.random_range(0..730));
            // Births from well before the top age up to 2022, past every death
            let birth = date(1880, 1, 1) + Days::new(rng.random_range(0..52_000));
            let sex = if rng.random_bool(0.5) { Sex::Male } else { Sex::Female };
            DeathRecord::new(sex, birth, death, locations[rng.random_range(0..locations.len())])
        })
        .collect()
}

#[test]
fn test_deaths_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = TableStore::open(dir.path()).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let deaths = random_deaths(&mut rng, 1000);

    store.write("deces-2019", &deaths).unwrap();
    assert_eq!(store.deaths().unwrap(), deaths);
}

#[test]
fn test_stored_ages_stay_in_range() {
    let dir = tempfile::tempdir().unwrap();
    let store = TableStore::open(dir.path()).unwrap();
    let mut rng = StdRng::seed_from_u64(99);
    store.write("a", &random_deaths(&mut rng, 500)).unwrap();
    store.write("b", &random_deaths(&mut rng, 500)).unwrap();

    let deaths = store.deaths().unwrap();
    assert_eq!(deaths.len(), 1000);
    assert!(deaths.iter().all(|d| d.age <= MAX_AGE));
    assert!(deaths.iter().any(|d| d.age == MAX_AGE));
    assert!(deaths.iter().any(|d| d.age == 0));
}

#[test]
fn test_parts_are_read_in_name_order_and_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let store = TableStore::open(dir.path()).unwrap();

    store.write("pyramid-2020.csv", &flat_population(2020, 7)).unwrap();
    store.write("pyramid-2019.csv", &flat_population(2019, 5)).unwrap();
    assert_eq!(store.parts(Table::Population).unwrap().len(), 2);

    let rows = store.population().unwrap();
    assert_eq!(rows.len(), 202);
    assert_eq!(rows[0].year, 2019);
    assert_eq!(rows[201].year, 2020);

    assert_eq!(store.clear(Table::Population).unwrap(), 2);
    assert!(store.population().unwrap().is_empty());
    // Other tables are untouched by a clear
    assert!(store.deaths().unwrap().is_empty());
}
