//! End-to-end tests for the dataset -> train -> classify pipeline
//!
//! Each test writes a synthetic raw dataset into its own temp directory.

use std::path::Path;

use phishnet::classifier::{self, evaluate, Hyperparameters, Provenance, TrainedModel};
use phishnet::dataset::{self, load_feature_table, TESTING_FILE, TRAIN_VALIDATION_FILE};
use phishnet::extract::named;
use phishnet::schema::{StatisticalFeature, StructuralFeature};
use phishnet::{assemble, extract, FeatureSchema, Label, PhishError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use tempfile::TempDir;

const SHADETREE: &str = "http://shadetreetechnology.com/V4/validation/a111aedc8ae390eabcfa130e041a10a4";

const WORDS: &[&str] = &[
    "harbor", "maple", "quartz", "ember", "violet", "canyon", "lumen", "sierra", "falcon", "willow",
    "cobalt", "meadow", "summit", "birch", "atlas", "coral", "granite", "juniper", "orchid", "raven",
];

fn hex_token(i: usize) -> String {
    let x = (i as u128 + 1).wrapping_mul(0x9e37_79b9_7f4a_7c15_f39c_c060_5ced_c835);
    format!("{:032x}", x)
}

/// Phishing rows look like disposable validation pages on plain http;
/// legitimate rows are short https home pages.
fn write_raw(dir: &Path, per_class: usize) -> std::path::PathBuf {
    let mut csv = String::from("url,status\n");
    for i in 0..per_class {
        let word = WORDS[i % WORDS.len()];
        csv.push_str(&format!(
            "http://{word}{i}technology.com/V{}/validation/{},phishing\n",
            i % 9,
            hex_token(i)
        ));
        csv.push_str(&format!("https://www.{word}.org/about,legitimate\n"));
    }
    // Unusable rows are skipped
    csv.push_str("ftp://files.example.com/x,phishing\n");
    csv.push_str("https://www.example.com/,unknown\n");

    let path = dir.join("raw_dataset.csv");
    std::fs::write(&path, csv).unwrap();
    path
}

fn small_hp() -> Hyperparameters {
    Hyperparameters {
        n_estimators: 20,
        max_depth: 4,
        learning_rate: 0.3,
    }
}

#[test]
fn test_preprocess_train_classify() {
    let dir = TempDir::new().unwrap();
    let raw = write_raw(dir.path(), 40);
    let datasets = dir.path().join("datasets");
    let schema = FeatureSchema::reference();

    let summary = dataset::preprocess(&raw, &datasets, &schema, 0.7, 0).unwrap();
    assert_eq!(summary.raw_rows, 82);
    assert_eq!(summary.kept_rows, 80);
    assert_eq!(summary.train_rows, 56);
    assert_eq!(summary.test_rows, 24);
    assert!(summary.transformed.exists());

    let train = load_feature_table(&datasets.join(TRAIN_VALIDATION_FILE), &schema, "status").unwrap();
    assert_eq!(train.class_counts(), [28, 28]);

    let model = TrainedModel::fit(&train, Some(small_hp())).unwrap();
    let models = dir.path().join("models");
    std::fs::create_dir_all(&models).unwrap();
    let path = model.persist(&models).unwrap();
    assert_eq!(path, models.join(Provenance::Tuned.file_name()));

    let loaded = TrainedModel::load(&path).unwrap();
    let prediction = classifier::classify(&loaded, &schema, SHADETREE).unwrap();
    assert_eq!(prediction.label, Label::Phishing);
    assert!(prediction.phishing_probability >= 0.5);

    let legit = classifier::classify(&loaded, &schema, "https://www.tundra.org/about").unwrap();
    assert_eq!(legit.label, Label::Legitimate);
}

#[test]
fn test_loaded_model_matches_original() {
    let dir = TempDir::new().unwrap();
    let raw = write_raw(dir.path(), 20);
    let schema = FeatureSchema::reference();
    let table = dataset::build_feature_table(&dataset::load_raw(&raw).unwrap(), &schema);

    let model = TrainedModel::fit(&table, None).unwrap();
    let path = model.persist(dir.path()).unwrap();
    assert!(path.ends_with("untuned_model.json"));

    let loaded = TrainedModel::load(&path).unwrap();
    assert_eq!(loaded.schema(), model.schema());
    assert_eq!(loaded.hyperparameters(), &Hyperparameters::default());
    assert_eq!(loaded.trained_at(), model.trained_at());

    let vector = extract(SHADETREE, &schema).unwrap();
    let a = model.predict(&vector).unwrap();
    let b = loaded.predict(&vector).unwrap();
    assert_eq!(a.label, b.label);
    assert!((a.phishing_probability - b.phishing_probability).abs() < 1e-9);
}

#[test]
fn test_evaluation_is_reproducible() {
    let dir = TempDir::new().unwrap();
    let raw = write_raw(dir.path(), 30);
    let datasets = dir.path().join("datasets");
    let schema = FeatureSchema::reference();
    dataset::preprocess(&raw, &datasets, &schema, 0.7, 7).unwrap();

    let train = load_feature_table(&datasets.join(TRAIN_VALIDATION_FILE), &schema, "status").unwrap();
    let test = load_feature_table(&datasets.join(TESTING_FILE), &schema, "status").unwrap();

    let first = evaluate(&TrainedModel::fit(&train, Some(small_hp())).unwrap(), &test, Label::Phishing).unwrap();
    let second = evaluate(&TrainedModel::fit(&train, Some(small_hp())).unwrap(), &test, Label::Phishing).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.total(), test.len());
    assert!(first.accuracy >= 0.9, "accuracy {}", first.accuracy);
}

#[test]
fn test_split_is_stratified_and_seeded() {
    let dir = TempDir::new().unwrap();
    let mut csv = String::from("url,status\n");
    for i in 0..30 {
        csv.push_str(&format!("http://bad{i}.tk/login,phishing\n"));
    }
    for i in 0..70 {
        csv.push_str(&format!("https://good{i}.com/,legitimate\n"));
    }
    let raw = dir.path().join("raw.csv");
    std::fs::write(&raw, csv).unwrap();
    let schema = FeatureSchema::reference();

    let run = |seed: u64, out: &str| {
        let datasets = dir.path().join(out);
        dataset::preprocess(&raw, &datasets, &schema, 0.7, seed).unwrap();
        let train = load_feature_table(&datasets.join(TRAIN_VALIDATION_FILE), &schema, "status").unwrap();
        let test = load_feature_table(&datasets.join(TESTING_FILE), &schema, "status").unwrap();
        (train, test)
    };

    let (train, test) = run(3, "a");
    // legitimate, phishing
    assert_eq!(train.class_counts(), [49, 21]);
    assert_eq!(test.class_counts(), [21, 9]);

    let (train_again, _) = run(3, "b");
    assert_eq!(train.rows(), train_again.rows());

    let (train_other, _) = run(4, "c");
    assert_ne!(train.rows(), train_other.rows());
}

#[test]
fn test_non_http_input_is_invalid() {
    let schema = FeatureSchema::reference();
    for url in ["ftp://example.com", "example.com", "", "javascript:alert(1)"] {
        let err = extract(url, &schema).unwrap_err();
        assert!(classifier::is_invalid_input(&err), "{url:?} -> {err}");
    }
}

#[test]
fn test_model_rejects_vectors_from_another_schema() {
    let dir = TempDir::new().unwrap();
    let raw = write_raw(dir.path(), 10);
    let schema = FeatureSchema::reference();
    let table = dataset::build_feature_table(&dataset::load_raw(&raw).unwrap(), &schema);
    let model = TrainedModel::fit(&table, Some(small_hp())).unwrap();

    let other = FeatureSchema::from_names(&["ip", "port"], &["length_url"]).unwrap();
    let vector = extract(SHADETREE, &other).unwrap();
    match model.predict(&vector) {
        Err(PhishError::SchemaMismatch { expected, found }) => {
            assert_eq!(expected, schema.fingerprint());
            assert_eq!(found, other.fingerprint());
        }
        other => panic!("expected a schema mismatch, got {other:?}"),
    }
}

#[test]
fn test_assembler_follows_requested_order() {
    // ip = 1, punycode = 0, nb_qm = 1
    let url = "http://192.168.0.1:8080/paypal/login.php?a=1&b=2";
    let forward = assemble(url, &["ip", "punycode"], &["length_url", "nb_qm"]).unwrap();
    let swapped = assemble(url, &["punycode", "ip"], &["nb_qm", "length_url"]).unwrap();

    assert_eq!(forward.values(), [1.0, 0.0, url.len() as f64, 1.0]);
    assert_eq!(swapped.values(), [0.0, 1.0, 1.0, url.len() as f64]);
    assert_ne!(forward.fingerprint(), swapped.fingerprint());

    assert!(matches!(
        assemble(url, &["ip"], &["nb_bananas"]),
        Err(PhishError::UnknownFeature(_))
    ));
    assert!(matches!(
        assemble(url, &["ip", "ip"], &["length_url"]),
        Err(PhishError::DuplicateFeature(_))
    ));
}

#[test]
fn test_assembler_shuffled_full_catalog() {
    let url = "https://secure-paypa1.account.example.com.br/https/login.php?user=a_b&id=42#top";
    let by_name: HashMap<&str, f64> = named(url)
        .unwrap()
        .into_iter()
        .map(|f| (f.name, f.value))
        .collect();

    let mut structural: Vec<&str> = StructuralFeature::ALL.iter().map(|f| f.name()).collect();
    let mut statistical: Vec<&str> = StatisticalFeature::ALL.iter().map(|f| f.name()).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(2024);

    for _ in 0..5 {
        structural.shuffle(&mut rng);
        statistical.shuffle(&mut rng);
        let vector = assemble(url, &structural, &statistical).unwrap();
        let names = structural.iter().chain(&statistical);
        for (name, value) in names.zip(vector.values()) {
            assert_eq!(*value, by_name[name], "column {name}");
        }
    }
}
