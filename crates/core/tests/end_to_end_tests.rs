//! End-to-end tests: manifest, ledger and dataset driven by a stage runner
//!
//! Everything lives on disk under a temporary corpus directory, the way the
//! CLI lays it out.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tempfile::TempDir;

use batchline_core::dataset::DatasetRegistry;
use batchline_core::ledger::{Scope, StageLedger};
use batchline_core::manifest::ManifestStore;
use batchline_core::pipeline::PipelineConfig;
use batchline_core::revision::FixedRevision;
use batchline_core::runner::{RunnerError, StageRunner};
use batchline_core::settings::Settings;

/// Corpus directory with a ten-entry English manifest and an initialized ledger
fn create_corpus(dir: &TempDir) -> Settings {
    let settings = Settings::new(dir.path(), "en");
    let manifest: PathBuf = settings.manifest_path();
    fs::create_dir_all(manifest.parent().unwrap()).expect("Failed to create language dir");
    let lines: String = (0..10)
        .map(|i| format!("2001\t/src/doc_{i}.xml\t/2001/doc_{i}.xml\n"))
        .collect();
    fs::write(&manifest, lines).expect("Failed to write manifest");
    fs::write(settings.pipeline_path(), "xml2txt\ntxt2tag --lang=en\n")
        .expect("Failed to write pipeline");
    StageLedger::file()
        .init(&settings.scope())
        .expect("Failed to initialize ledger");
    settings
}

#[test]
fn test_windows_follow_ledger_updates() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let settings = create_corpus(&dir);
    let scope: Scope = settings.scope();
    let ledger = StageLedger::file();
    let manifest = ManifestStore::new(settings.manifest_path());

    let offset = ledger.count(&scope, "stageX").unwrap();
    let first = manifest.windowed(offset as usize, 4).unwrap();
    assert_eq!(first.len(), 4);
    assert_eq!(ledger.update(&scope, "stageX", 4).unwrap(), 4);

    let offset = ledger.count(&scope, "stageX").unwrap();
    assert_eq!(offset, 4);
    let second = manifest.windowed(offset as usize, 3).unwrap();
    assert_eq!(ledger.update(&scope, "stageX", 3).unwrap(), 7);

    let names: Vec<_> = second.iter().map(|e| e.basename().to_string()).collect();
    assert_eq!(names, vec!["doc_4.xml", "doc_5.xml", "doc_6.xml"]);
    assert!(first.iter().all(|e| !second.contains(e)));
    assert_eq!(ledger.backups(&scope).unwrap().len(), 2);
}

#[test]
fn test_stage_runner_to_completion() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let settings = create_corpus(&dir);
    let pipeline = PipelineConfig::load(&settings.pipeline_path()).unwrap();
    let registry = DatasetRegistry::new(settings.datasets_path());
    let dataset = registry.open("d1_txt", "v1", Some("xml2txt")).unwrap();

    let mut runner = StageRunner::new(
        "xml2txt",
        pipeline.clone(),
        ManifestStore::new(settings.manifest_path()),
        StageLedger::file(),
        settings.scope(),
        dataset,
    )
    .unwrap()
    .with_revision(FixedRevision::new("v0.3.0"));

    let mut written = 0;
    loop {
        let report = runner
            .run_batch(4, |batch, _| {
                let out = settings.datasets_path().join("d1_txt/v1/files");
                for entry in &batch.entries {
                    fs::write(out.join(entry.basename()), "text")?;
                }
                Ok::<_, std::io::Error>(())
            })
            .unwrap();
        if report.is_empty() {
            break;
        }
        written += report.processed;
    }

    assert_eq!(written, 10);
    assert_eq!(runner.ledger().count(&settings.scope(), "xml2txt").unwrap(), 10);
    let history = runner.dataset().history().unwrap();
    assert_eq!(history.len(), 3);
    assert!(history.iter().all(|r| r.revision == "v0.3.0" && r.limit == 4));

    let reloaded = registry.open("d1_txt", "v1", None).unwrap();
    assert_eq!(reloaded.files_processed(), 10);
    assert_eq!(fs::read_dir(reloaded.files_dir()).unwrap().count(), 10);

    // The next stage finds this dataset as its input
    let input = registry
        .select_input("d1_txt", &pipeline, "txt2tag")
        .unwrap()
        .into_result("d1_txt")
        .unwrap();
    assert_eq!(input.version_id(), "v1");
}

#[test]
fn test_changed_pipeline_refuses_existing_output() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let settings = create_corpus(&dir);
    let registry = DatasetRegistry::new(settings.datasets_path());
    registry
        .create("d2_tag", "txt2tag", &PipelineConfig::parse("xml2txt\ntxt2tag --lang=en\n"), Some("v1"))
        .unwrap();

    let changed = PipelineConfig::parse("xml2txt\ntxt2tag --lang=de\n");
    let result = StageRunner::new(
        "txt2tag",
        changed,
        ManifestStore::new(settings.manifest_path()),
        StageLedger::file(),
        settings.scope(),
        registry.open("d2_tag", "v1", Some("txt2tag")).unwrap(),
    );
    assert!(matches!(result, Err(RunnerError::ProvenanceMismatch { .. })));
}
