//! End-to-end flow: jobs submitted to the coordinator run a real translator
//! against a real on-disk cache database, and repeated jobs are served from
//! the cache without touching the translation backend again.

use anyhow::Result;
use doctrans_server::cache::CacheLifecycleManager;
use doctrans_server::coordinator::{
    DocumentJobRunner, JobCoordinator, JobOutcome, SubmitOutcome, TranslationJob,
};
use doctrans_server::translators::{
    DocumentTranslator, TranslationContext, TranslatorRegistry, TranslatorVariant,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(10);

/// Line-by-line uppercasing "translator". Every line not found in the cache
/// counts as one backend call, mirroring how a segment-based document
/// translator consults the cache before each remote request.
struct UppercasingTranslator {
    backend_calls: Arc<AtomicUsize>,
}

impl DocumentTranslator for UppercasingTranslator {
    fn translate(
        &self,
        input: &Path,
        output_dir: &Path,
        ctx: &TranslationContext,
    ) -> Result<PathBuf> {
        let content = std::fs::read_to_string(input)?;
        let lines: Vec<&str> = content.lines().collect();
        let total = lines.len().max(1);

        let mut translated = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            ctx.check_stop()?;
            let translation = match ctx.cached_translation(line)? {
                Some(hit) => hit,
                None => {
                    self.backend_calls.fetch_add(1, Ordering::SeqCst);
                    let fresh = line.to_uppercase();
                    ctx.store_translation(line, &fresh)?;
                    fresh
                }
            };
            translated.push(translation);
            ctx.report_progress((index + 1) as f32 / total as f32, Some(line))?;
        }

        let file_name = input.file_name().ok_or_else(|| anyhow::anyhow!("no file name"))?;
        let output_path = output_dir.join(file_name);
        std::fs::write(&output_path, translated.join("\n"))?;
        Ok(output_path)
    }
}

struct Fixture {
    coordinator: Arc<JobCoordinator>,
    backend_calls: Arc<AtomicUsize>,
    input_dir: tempfile::TempDir,
    result_dir: PathBuf,
    db_path: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let backend_calls = Arc::new(AtomicUsize::new(0));
        let calls = backend_calls.clone();

        let mut registry = TranslatorRegistry::new();
        registry.register("txt", TranslatorVariant::Standard, move |_job| {
            Box::new(UppercasingTranslator {
                backend_calls: calls.clone(),
            })
        });

        let (db_path, store) = CacheLifecycleManager::create_ephemeral().unwrap();
        let input_dir = tempfile::tempdir().unwrap();
        let result_dir = input_dir.path().join("result");

        let runner = DocumentJobRunner::new(
            Arc::new(registry),
            store,
            result_dir.clone(),
            Arc::new(|_: f32, _: Option<&str>| {}),
        );

        Fixture {
            coordinator: JobCoordinator::new(Arc::new(runner)),
            backend_calls,
            input_dir,
            result_dir,
            db_path,
        }
    }

    fn write_input(&self, name: &str, content: &str) -> PathBuf {
        let path = self.input_dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn job(&self, files: Vec<PathBuf>) -> TranslationJob {
        TranslationJob::new(files, "upper", "en", "en")
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = CacheLifecycleManager::destroy_ephemeral(&self.db_path);
    }
}

#[test]
fn test_job_translates_and_repeat_is_served_from_cache() {
    let fixture = Fixture::new();
    let input = fixture.write_input("doc.txt", "hello\nworld\nhello again");

    let (decision, outcome_rx) = fixture.coordinator.submit(fixture.job(vec![input.clone()]));
    assert_eq!(decision, SubmitOutcome::Started);
    assert_eq!(outcome_rx.recv_timeout(WAIT).unwrap(), JobOutcome::Completed);

    let output = std::fs::read_to_string(fixture.result_dir.join("doc.txt")).unwrap();
    assert_eq!(output, "HELLO\nWORLD\nHELLO AGAIN");
    assert_eq!(fixture.backend_calls.load(Ordering::SeqCst), 3);

    // Same content again: every segment is a cache hit.
    let (_, outcome_rx) = fixture.coordinator.submit(fixture.job(vec![input]));
    assert_eq!(outcome_rx.recv_timeout(WAIT).unwrap(), JobOutcome::Completed);
    assert_eq!(fixture.backend_calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_cache_is_shared_across_files_in_one_job() {
    let fixture = Fixture::new();
    let first = fixture.write_input("a.txt", "shared line\nonly in a");
    let second = fixture.write_input("b.txt", "shared line\nonly in b");

    let (_, outcome_rx) = fixture.coordinator.submit(fixture.job(vec![first, second]));
    assert_eq!(outcome_rx.recv_timeout(WAIT).unwrap(), JobOutcome::Completed);

    // Three distinct segments across both files, the shared one paid once.
    assert_eq!(fixture.backend_calls.load(Ordering::SeqCst), 3);
    let output = std::fs::read_to_string(fixture.result_dir.join("b.txt")).unwrap();
    assert_eq!(output, "SHARED LINE\nONLY IN B");
}

#[test]
fn test_jobs_submitted_back_to_back_complete_in_order() {
    let fixture = Fixture::new();
    let first = fixture.write_input("first.txt", "one");
    let second = fixture.write_input("second.txt", "two");
    let third = fixture.write_input("third.txt", "three");

    let (_, first_rx) = fixture.coordinator.submit(fixture.job(vec![first]));
    let (_, second_rx) = fixture.coordinator.submit(fixture.job(vec![second]));
    let (_, third_rx) = fixture.coordinator.submit(fixture.job(vec![third]));

    assert_eq!(first_rx.recv_timeout(WAIT).unwrap(), JobOutcome::Completed);
    assert_eq!(second_rx.recv_timeout(WAIT).unwrap(), JobOutcome::Completed);
    assert_eq!(third_rx.recv_timeout(WAIT).unwrap(), JobOutcome::Completed);

    for name in ["first.txt", "second.txt", "third.txt"] {
        assert!(fixture.result_dir.join(name).exists());
    }
}

#[test]
fn test_different_language_pairs_do_not_share_cache_entries() {
    let fixture = Fixture::new();
    let input = fixture.write_input("doc.txt", "hello");

    let (_, outcome_rx) = fixture.coordinator.submit(fixture.job(vec![input.clone()]));
    assert_eq!(outcome_rx.recv_timeout(WAIT).unwrap(), JobOutcome::Completed);
    assert_eq!(fixture.backend_calls.load(Ordering::SeqCst), 1);

    // Same text, different target language: must miss the cache.
    let mut job = fixture.job(vec![input]);
    job.dst_lang = "fr".to_string();
    let (_, outcome_rx) = fixture.coordinator.submit(job);
    assert_eq!(outcome_rx.recv_timeout(WAIT).unwrap(), JobOutcome::Completed);
    assert_eq!(fixture.backend_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_missing_input_file_fails_without_blocking_later_jobs() {
    let fixture = Fixture::new();
    let missing = fixture.input_dir.path().join("nope.txt");

    let (_, failed_rx) = fixture.coordinator.submit(fixture.job(vec![missing]));
    match failed_rx.recv_timeout(WAIT).unwrap() {
        JobOutcome::Failed(message) => assert!(message.contains("nope.txt")),
        other => panic!("expected failure, got {other:?}"),
    }

    let good = fixture.write_input("good.txt", "still works");
    let (_, ok_rx) = fixture.coordinator.submit(fixture.job(vec![good]));
    assert_eq!(ok_rx.recv_timeout(WAIT).unwrap(), JobOutcome::Completed);
}
