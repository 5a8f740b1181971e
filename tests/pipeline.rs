use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ph_maternal_dashboard::data::{
    AgeGroup, DataLoader, DataProcessor, FilterSelection, IslandGroup, LoadFailure, TableCache,
    TableSources, NO_LEADING_CAUSE,
};
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn fixture_sources() -> TableSources {
    TableSources {
        geography: fixture("table19.csv"),
        causes: fixture("table20.csv"),
    }
}

/// Copies of both fixtures in `dir`, so tests can modify them.
fn scratch_sources(dir: &Path) -> TableSources {
    let sources = TableSources {
        geography: dir.join("table19.csv"),
        causes: dir.join("table20.csv"),
    };
    fs::copy(fixture("table19.csv"), &sources.geography).expect("copy geography");
    fs::copy(fixture("table20.csv"), &sources.causes).expect("copy causes");
    sources
}

#[test]
fn fixtures_melt_to_nine_rows_per_kept_row() {
    let data = DataLoader::load(&fixture_sources()).expect("load");

    // 7 places (blank row dropped), 5 causes (header echo and blank code dropped)
    assert_eq!(data.geography.len(), 7 * 9);
    assert_eq!(data.causes.len(), 5 * 9);

    let causes = data.causes.records().expect("cause records");
    assert!(causes.iter().all(|r| r.icd_code != "ICD-10 Code"));
    assert!(causes.iter().any(|r| r.icd_code == "O99" && r.cause.is_none()));
    assert_eq!(data.causes.total_deaths(), 96.0);
}

#[test]
fn fixtures_classify_places() {
    let data = DataLoader::load(&fixture_sources()).expect("load");
    let records = data.geography.records().expect("geography records");
    let lookup = |place: &str| {
        records
            .iter()
            .find(|r| r.place == place)
            .map(|r| (r.is_region, r.island_group))
            .expect(place)
    };

    assert_eq!(lookup("PHILIPPINES"), (false, IslandGroup::Other));
    assert_eq!(lookup("City of Manila"), (false, IslandGroup::Other));
    assert_eq!(
        lookup("NATIONAL CAPITAL REGION (NCR)"),
        (true, IslandGroup::Luzon)
    );
    assert_eq!(lookup("REGION IV-A (CALABARZON)"), (true, IslandGroup::Luzon));
    assert_eq!(
        lookup("REGION VII (CENTRAL VISAYAS)"),
        (true, IslandGroup::Visayas)
    );
    assert_eq!(lookup("REGION XI (DAVAO REGION)"), (true, IslandGroup::Mindanao));
    assert_eq!(
        lookup("BANGSAMORO AUTONOMOUS REGION IN MUSLIM MINDANAO (BARMM)"),
        (true, IslandGroup::Mindanao)
    );
}

#[test]
fn reload_of_unchanged_files_is_identical() {
    let first = DataLoader::load(&fixture_sources()).expect("first load");
    let second = DataLoader::load(&fixture_sources()).expect("second load");
    assert_eq!(first, second);
}

#[test]
fn cache_reloads_only_after_source_change() {
    let dir = tempdir().expect("tmp");
    let sources = scratch_sources(dir.path());
    let mut cache = TableCache::new(sources.clone());

    let first = cache.get_or_load().expect("load");
    assert!(!cache.is_stale());
    let again = cache.get_or_load().expect("cached");
    assert!(Arc::ptr_eq(&first, &again));

    let mut content = fs::read_to_string(&sources.causes).expect("read causes");
    content.push_str("O75,Other obstetric complications,2,0,0,0,1,1,0,0,0,0\n");
    fs::write(&sources.causes, content).expect("write causes");

    assert!(cache.is_stale());
    let reloaded = cache.get_or_load().expect("reload");
    assert!(!Arc::ptr_eq(&first, &reloaded));
    assert_eq!(reloaded.causes.len(), 6 * 9);
    assert_eq!(reloaded.geography, first.geography);
}

#[test]
fn missing_file_is_fatal_load_error() {
    let dir = tempdir().expect("tmp");
    let sources = TableSources {
        geography: fixture("table19.csv"),
        causes: dir.path().join("table20.csv"),
    };

    let err = DataLoader::load(&sources).expect_err("missing file");
    assert_eq!(err.path, sources.causes);
    assert!(matches!(err.source, LoadFailure::Missing));
    assert!(err.to_string().contains("table20.csv"));
}

#[test]
fn narrow_file_is_column_count_error() {
    let dir = tempdir().expect("tmp");
    let path = dir.path().join("table20.csv");
    fs::write(
        &path,
        "Preamble\nICD-10 Code,Cause,Total,Under 15,15-19\nO14,Pre-eclampsia,30,0,2\n",
    )
    .expect("write");

    let err = DataLoader::load_causes(&path).expect_err("too few columns");
    assert!(matches!(
        err.source,
        LoadFailure::ColumnCount {
            expected: 12,
            found: 5
        }
    ));
}

#[test]
fn default_dashboard_view() {
    let data = DataLoader::load(&fixture_sources()).expect("load");
    let selection = FilterSelection {
        age_groups: AgeGroup::ALL.into_iter().collect(),
        island_groups: IslandGroup::SELECTABLE.into_iter().collect(),
        cause_search: String::new(),
    };

    let view = DataProcessor::build_view(&data, &selection).expect("view");

    assert_eq!(view.total_deaths, 96.0);
    assert_eq!(view.island_selection_deaths, 1252.0);
    assert_eq!(view.leading_cause, "Postpartum hemorrhage");

    let top: Vec<&str> = view.top_causes.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(
        top,
        vec![
            "Postpartum hemorrhage",
            "Pre-eclampsia",
            "Puerperal sepsis",
            "Gestational hypertension"
        ]
    );

    let regions: Vec<(&str, f64)> = view
        .region_totals
        .iter()
        .map(|c| (c.category.as_str(), c.deaths))
        .collect();
    assert_eq!(
        regions,
        vec![
            ("REGION XI (DAVAO REGION)", 1200.0),
            ("NATIONAL CAPITAL REGION (NCR)", 20.0),
            ("REGION IV-A (CALABARZON)", 15.0),
            ("REGION VII (CENTRAL VISAYAS)", 10.0),
            ("BANGSAMORO AUTONOMOUS REGION IN MUSLIM MINDANAO (BARMM)", 7.0),
        ]
    );

    let share_total: f64 = view.age_group_share.iter().map(|c| c.deaths).sum();
    assert_eq!(share_total, view.total_deaths);
}

#[test]
fn island_and_search_filters() {
    let data = DataLoader::load(&fixture_sources()).expect("load");
    let selection = FilterSelection {
        age_groups: BTreeSet::from([AgeGroup::From20To24]),
        island_groups: BTreeSet::from([IslandGroup::Visayas]),
        cause_search: "HYPERTENSION".to_string(),
    };

    let view = DataProcessor::build_view(&data, &selection).expect("view");

    // Island filter leaves cause aggregates alone
    assert_eq!(view.total_deaths, 1.0);
    assert_eq!(view.leading_cause, "Gestational hypertension");
    assert_eq!(view.island_selection_deaths, 1.0);
    assert_eq!(view.region_totals.len(), 1);
    assert_eq!(view.region_totals[0].category, "REGION VII (CENTRAL VISAYAS)");
}

#[test]
fn search_without_match_empties_cause_views() {
    let data = DataLoader::load(&fixture_sources()).expect("load");
    let selection = FilterSelection {
        cause_search: "malaria".to_string(),
        ..FilterSelection::default()
    };

    let view = DataProcessor::build_view(&data, &selection).expect("view");

    assert_eq!(view.total_deaths, 0.0);
    assert_eq!(view.leading_cause, NO_LEADING_CAUSE);
    assert!(view.top_causes.is_empty());
    assert!(view.age_group_share.is_empty());
    // Geography is not searched
    assert_eq!(view.region_totals.len(), 5);
}
