use std::fs;
use std::path::Path;

use mortality_analysis::commands::{ImportTarget, Pipeline};
use mortality_analysis::config::{PyramidLayout, PyramidSource, RowSpan, SourceFile};
use mortality_analysis::import::import_death_file;
use mortality_analysis::{AnalysisConfig, MemoryChartSink, PopulationRow, Sex, TableStore};

use crate::utils::{date, death_line, test_config};

const PYRAMID_EXPORT: &str = "\
Population au 1er janvier 2019;;;;;
;Annee de naissance;Age;Hommes;Femmes;Ensemble
;2019;0;100;90;190
;2018;1;110;100;210
;1918;100 et plus;5;20;25
";

const METEO_EXPORT: &str = "\
ID OMM station;Date;Température (°C);department (code)
07149;2019-07-25T14:00:00+02:00;40.0;75
07150;2019-07-25T17:00:00+02:00;38.0;75
07190;2019-07-25T14:00:00+02:00;30.5;67
07149;2009-07-26T14:00:00+02:00;20.0;75
";

fn write_sources(config: &mut AnalysisConfig, data_dir: &Path) {
    fs::create_dir_all(data_dir).unwrap();

    let lines = [
        death_line("1", "19400312", "20190105", "75056"),
        death_line("2", "19300000", "20190106", "97411"),
        death_line("2", "19300101", "20190107", "2A004"),
        // Rejected: unknown sex
        death_line("3", "19300101", "20190107", "75056"),
    ];
    fs::write(data_dir.join("deces-test.txt"), lines.join("\n")).unwrap();
    fs::write(data_dir.join("pyramid.csv"), PYRAMID_EXPORT).unwrap();
    fs::write(data_dir.join("meteo.csv"), METEO_EXPORT).unwrap();

    config.death_sources = vec![SourceFile::named("http://localhost/deces-test.txt", "deces-test.txt")];
    config.pyramid_sources = vec![PyramidSource {
        source: SourceFile::named("http://localhost/pyramid.xlsx", "pyramid.xlsx"),
        sheet: "2019".to_string(),
        export: "pyramid.csv".to_string(),
        delimiter: ';',
        layout: PyramidLayout::SingleYear {
            year: 2019,
            rows: RowSpan { first: 3, last: 5 },
            age_col: 3,
            count_col: 6,
        },
    }];
}

#[test]
fn test_death_file_parse_summary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deces.txt");
    let lines = [
        death_line("1", "19400312", "20190105", "75056"),
        death_line("2", "19400312", "00000000", "75056"),
        "too short".to_string(),
    ];
    fs::write(&path, lines.join("\n")).unwrap();

    let (records, summary) = import_death_file(&path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(summary.total_lines, 3);
    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.error_count(), 2);

    let record = &records[0];
    assert_eq!(record.sex, Sex::Male);
    assert_eq!(record.birth_date, date(1940, 3, 12));
    assert_eq!(record.age, 78);
    assert_eq!(record.department, "75");
    assert!(record.is_metropolitan);
}

#[test]
fn test_import_fills_every_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    let data_dir = config.paths.data_dir.clone();
    write_sources(&mut config, &data_dir);

    let store = TableStore::open(&config.paths.store_dir).unwrap();
    let pipeline = Pipeline::new(config, store, MemoryChartSink::default());
    let report = pipeline.import(None).unwrap();
    assert_eq!(report.deaths, 3);
    assert_eq!(report.population, 3);
    // Two (date, department) averages inside the study period
    assert_eq!(report.temperature, 2);

    let deaths = pipeline.store.deaths().unwrap();
    assert_eq!(deaths.len(), 3);
    // Unknown birth month and day default to June 15th
    assert_eq!(deaths[1].birth_date, date(1930, 6, 15));
    assert!(!deaths[1].is_metropolitan);
    assert!(!deaths[2].is_metropolitan);

    let population = pipeline.store.population().unwrap();
    assert!(population.contains(&PopulationRow { year: 2019, age: 100, count: 25 }));

    let temperatures = pipeline.store.temperatures().unwrap();
    let paris = temperatures.iter().find(|t| t.department == "75").unwrap();
    assert_eq!(paris.date, date(2019, 7, 25));
    assert!((paris.temperature - 39.0).abs() < 1e-12);
}

#[test]
fn test_reimport_replaces_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    let data_dir = config.paths.data_dir.clone();
    write_sources(&mut config, &data_dir);

    let store = TableStore::open(&config.paths.store_dir).unwrap();
    let pipeline = Pipeline::new(config, store, MemoryChartSink::default());
    pipeline.import(Some(ImportTarget::Deaths)).unwrap();
    pipeline.import(Some(ImportTarget::Deaths)).unwrap();
    assert_eq!(pipeline.store.deaths().unwrap().len(), 3);
    assert!(pipeline.store.population().unwrap().is_empty());
}

#[test]
fn test_missing_sheet_export_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    let data_dir = config.paths.data_dir.clone();
    write_sources(&mut config, &data_dir);
    fs::remove_file(data_dir.join("pyramid.csv")).unwrap();

    let store = TableStore::open(&config.paths.store_dir).unwrap();
    let pipeline = Pipeline::new(config, store, MemoryChartSink::default());
    let error = pipeline.import(Some(ImportTarget::Population)).unwrap_err();
    assert!(error.to_string().contains("pyramid.csv"));
}
