use std::collections::BTreeMap;

use mortality_analysis::Error;
use mortality_analysis::algorithm::{AGE_BANDS, average_mortality_rates, population_vector, project_cohorts};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn bands(values: &[(usize, f64)]) -> Vec<f64> {
    let mut v = vec![0.0; AGE_BANDS];
    for (age, value) in values {
        v[*age] = *value;
    }
    v
}

#[test]
fn test_two_year_projection() {
    let initial = bands(&[(0, 1000.0), (1, 900.0)]);
    let rates = bands(&[(0, 0.01), (1, 0.02)]);

    let years = project_cohorts(&initial, &rates, 2020, 2021).unwrap();
    assert_eq!(years.len(), 2);

    let first = &years[0];
    assert_eq!(first.year, 2020);
    assert!((first.deaths[0] - 10.0).abs() < 1e-9);
    assert!((first.deaths[1] - 18.0).abs() < 1e-9);

    let second = &years[1];
    assert_eq!(second.population[0], 0.0);
    assert!((second.population[1] - 990.0).abs() < 1e-9);
    assert!((second.population[2] - 882.0).abs() < 1e-9);
    assert!((second.deaths[1] - 19.8).abs() < 1e-9);
}

#[test]
fn test_random_projections_stay_non_negative_and_shrink() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        let initial: Vec<f64> = (0..AGE_BANDS).map(|_| rng.random_range(0.0..100_000.0)).collect();
        // Rates above 1 are clamped to the whole cohort
        let rates: Vec<f64> = (0..AGE_BANDS).map(|_| rng.random_range(0.0..1.5)).collect();

        let years = project_cohorts(&initial, &rates, 2020, 2040).unwrap();
        assert_eq!(years.len(), 21);
        for year in &years {
            assert!(year.population.iter().all(|p| *p >= 0.0));
            assert!(year.deaths.iter().zip(&year.population).all(|(d, p)| *d >= 0.0 && d <= p));
        }
        for pair in years.windows(2) {
            assert!(pair[1].total_population() <= pair[0].total_population() + 1e-6);
        }
    }
}

#[test]
fn test_population_vector_places_ages() {
    let vector = population_vector(&BTreeMap::from([(0, 12), (100, 3)]));
    assert_eq!(vector.len(), AGE_BANDS);
    assert_eq!(vector[0], 12.0);
    assert_eq!(vector[100], 3.0);
    assert_eq!(vector.iter().sum::<f64>(), 15.0);
}

#[test]
fn test_average_rates_count_missing_years_as_zero() {
    let deaths = BTreeMap::from([((2018, 50), 10), ((2019, 50), 30)]);
    let population = BTreeMap::from([((2018, 50), 1000), ((2019, 50), 1000)]);

    let rates = average_mortality_rates(&deaths, &population, 2018, 2020).unwrap();
    assert!((rates[50] - 0.04 / 3.0).abs() < 1e-12);
    assert_eq!(rates[49], 0.0);
}

#[test]
fn test_invalid_inputs_are_rejected() {
    let initial = bands(&[(0, 10.0)]);
    let mut rates = bands(&[]);
    rates[7] = f64::NAN;
    assert!(matches!(
        project_cohorts(&initial, &rates, 2020, 2021),
        Err(Error::InvalidRate { age: 7, .. })
    ));

    assert!(project_cohorts(&initial[..10], &bands(&[]), 2020, 2021).is_err());
    assert!(project_cohorts(&initial, &bands(&[]), 2021, 2020).is_err());
}
