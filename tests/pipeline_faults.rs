// tests/pipeline_faults.rs
//
// Persistence is the one fatal failure class: a run that cannot write its
// output or its checkpoint must abort with an error instead of carrying on
// with progress it cannot record. Squatting directories on the target paths
// make the writes fail deterministically.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use moviehub_review_pipeline::model::mock::{ConstSentimentModel, EchoSummaryModel};
use moviehub_review_pipeline::{
    MoviePipeline, PersistenceError, PipelineConfig, PipelineError, ResultRow, RunState,
};

fn config_for(root: &Path) -> PipelineConfig {
    let mut cfg = PipelineConfig::default();
    cfg.paths.reviews_dir = root.join("reviews");
    cfg.paths.genre_dir = root.join("genres");
    cfg.paths.output_file = root.join("out").join("all.csv");
    cfg.paths.sample_output_file = root.join("out").join("sample.csv");
    cfg.paths.checkpoint_file = root.join("out").join("checkpoint.json");
    cfg
}

fn write_plan(root: &Path, files: &[(&str, &[(&str, i32)])]) {
    let genres = root.join("genres");
    fs::create_dir_all(&genres).unwrap();
    for (file_name, rows) in files {
        let mut body = String::from("name,year\n");
        for (title, year) in *rows {
            body.push_str(&format!("{title},{year}\n"));
        }
        fs::write(genres.join(file_name), body).unwrap();
    }
}

fn write_reviews(root: &Path, titles: &[&str]) {
    let reviews = root.join("reviews");
    fs::create_dir_all(&reviews).unwrap();
    for title in titles {
        let mut body = String::from("title,content,rating,username\n");
        for n in 0..3 {
            body.push_str(&format!(
                "t{n},\"Review {n} of {title}: a considered write-up long enough to clear every \
                 length filter the pipeline applies to incoming review text.\",7,u{n}\n"
            ));
        }
        fs::write(reviews.join(format!("{title}_reviews.csv")), body).unwrap();
    }
}

fn pipeline(cfg: PipelineConfig) -> MoviePipeline {
    MoviePipeline::new(
        cfg,
        Arc::new(ConstSentimentModel::new(0.6, 0.2)),
        Arc::new(EchoSummaryModel::new()),
    )
}

fn read_titles(path: &Path) -> Vec<String> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader
        .deserialize::<ResultRow>()
        .map(|r| r.unwrap().title)
        .collect()
}

#[test]
fn unwritable_output_path_aborts_before_any_processing() {
    let tmp = tempfile::tempdir().unwrap();
    write_plan(tmp.path(), &[("Action.csv", &[("Heat", 1995)])]);
    write_reviews(tmp.path(), &["Heat"]);
    let cfg = config_for(tmp.path());
    // a directory where the output file should go fails every create
    fs::create_dir_all(&cfg.paths.output_file).unwrap();

    let err = pipeline(cfg.clone()).run().expect_err("run must abort");
    assert!(
        matches!(
            err,
            PipelineError::Persistence(PersistenceError::OutputIo { .. })
        ),
        "err: {err}"
    );
    assert!(!cfg.paths.checkpoint_file.exists(), "no progress recorded");
}

#[test]
fn checkpoint_write_failure_is_fatal_after_the_durable_row() {
    let tmp = tempfile::tempdir().unwrap();
    write_plan(
        tmp.path(),
        &[("Action.csv", &[("Heat", 1995), ("Ronin", 1998)])],
    );
    write_reviews(tmp.path(), &["Heat", "Ronin"]);
    let cfg = config_for(tmp.path());
    // a directory on the tmp path fails the save that follows the first row
    fs::create_dir_all(cfg.paths.checkpoint_file.with_extension("json.tmp")).unwrap();

    let mut p = pipeline(cfg.clone());
    let err = p.run().expect_err("run must abort");
    assert!(
        matches!(
            err,
            PipelineError::Persistence(PersistenceError::Checkpoint { .. })
        ),
        "err: {err}"
    );
    assert_eq!(
        *p.state(),
        RunState::InProgress {
            genre_file: "Action.csv".to_string(),
            row: 0
        },
        "abort happened on the first row"
    );

    // the row flushed before the failing save is durable; nothing after it
    assert_eq!(read_titles(&cfg.paths.output_file), vec!["Heat"]);
}
