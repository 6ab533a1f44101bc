use std::sync::Arc;
use std::time::Duration;

use llmops_console::{ConsoleError, PipelineService};
use llmops_core::step::{StepConfig, StepKind, StepStatus};
use llmops_core::{NeverFail, NoDelay, PipelineError, PipelineRunner, PipelineTemplate, RunOutcome, RunPhase,
                  ScriptedFailures, TokioDelay};
use llmops_domain::{DatasetCatalog, DatasetId};

fn alpaca() -> DatasetId {
    DatasetId::new("alpaca-gpt4-zh", "v1.2")
}

fn service_with(runner: PipelineRunner) -> PipelineService {
    PipelineService::new(DatasetCatalog::mock(), runner)
}

fn instant(failures: ScriptedFailures) -> PipelineService {
    service_with(PipelineRunner::new(Arc::new(failures), Arc::new(NoDelay), Duration::from_millis(1500)))
}

#[tokio::test]
async fn build_run_fail_and_retry() {
    let mut svc = instant(ScriptedFailures::new([false, true]));
    let pid = svc.create_pipeline(&alpaca()).unwrap();
    let filter = svc.add_step(pid, StepKind::Filter, None).unwrap().unwrap();
    let dedupe = svc.add_step(pid, StepKind::Dedupe, None).unwrap().unwrap();

    let outcome = svc.run_pipeline(pid).unwrap().wait().await.unwrap();
    assert!(matches!(outcome, RunOutcome::Failed { step_index: 1, .. }));

    let report = svc.progress(pid).unwrap();
    assert_eq!(report.percent_rounded(), 50);
    assert!(report.has_failed);
    assert_eq!(report.title(), "Pipeline execution failed");
    assert_eq!(report.failed_step().map(|s| s.step_id), Some(dedupe));
    assert_eq!(report.steps[0].label, "done");
    assert_eq!(report.steps[1].label, "failed: CUDA out of memory during Dedupe operation.");

    let handle = svc.retry_pipeline(pid).unwrap().expect("hay un step fallido");
    assert_eq!(handle.start_index(), 1);
    assert_eq!(handle.wait().await.unwrap(), RunOutcome::Completed);

    let report = svc.progress(pid).unwrap();
    assert!(report.is_complete);
    assert_eq!(report.phase, RunPhase::Completed);
    assert_eq!(report.title(), "Pipeline completed");
    assert!(report.steps.iter().all(|s| s.status == StepStatus::Completed));
    assert_eq!(report.steps[0].step_id, filter);

    assert!(svc.retry_pipeline(pid).unwrap().is_none());
    assert!(!svc.events(pid).unwrap().is_empty());
}

#[tokio::test]
async fn unknown_dataset_and_pipeline_are_reported() {
    let mut svc = instant(ScriptedFailures::default());
    let err = svc.create_pipeline(&DatasetId::new("no-existe", "v1")).unwrap_err();
    assert!(matches!(err, ConsoleError::Domain(_)));

    let err = svc.run_pipeline(uuid::Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, ConsoleError::PipelineNotFound(_)));
}

#[tokio::test]
async fn empty_or_invalid_pipeline_does_not_start() {
    let mut svc = instant(ScriptedFailures::default());
    let pid = svc.create_pipeline(&alpaca()).unwrap();
    assert!(matches!(svc.run_pipeline(pid).unwrap_err(), ConsoleError::Pipeline(PipelineError::EmptyPipeline)));

    svc.add_step(pid, StepKind::ModelApply, Some(StepConfig::ModelApply { model: String::new(),
                                                                           prompt_template: "{q}".into() }))
       .unwrap();
    let err = svc.run_pipeline(pid).unwrap_err();
    assert!(matches!(err, ConsoleError::Pipeline(PipelineError::InvalidConfig { .. })));
    assert!(svc.events(pid).unwrap().is_empty());
}

#[tokio::test]
async fn add_step_rejects_config_of_other_kind() {
    let mut svc = instant(ScriptedFailures::default());
    let pid = svc.create_pipeline(&alpaca()).unwrap();
    let err = svc.add_step(pid, StepKind::Filter, Some(StepConfig::default_for(StepKind::Cluster)))
                 .unwrap_err();
    assert!(matches!(err, ConsoleError::Pipeline(PipelineError::ConfigKindMismatch { .. })));
    assert!(svc.steps(pid).unwrap().is_empty());
}

#[tokio::test]
async fn deselecting_dataset_makes_add_step_a_noop() {
    let mut svc = instant(ScriptedFailures::default());
    let pid = svc.create_pipeline(&alpaca()).unwrap();
    svc.add_step(pid, StepKind::Filter, None).unwrap();

    assert!(svc.select_dataset(pid, None).unwrap());
    assert!(svc.steps(pid).unwrap().is_empty());
    assert_eq!(svc.add_step(pid, StepKind::Filter, None).unwrap(), None);
    assert!(matches!(svc.run_pipeline(pid).unwrap_err(),
                     ConsoleError::Pipeline(PipelineError::NoDatasetSelected)));
}

#[tokio::test]
async fn selection_follows_removals() {
    let mut svc = instant(ScriptedFailures::default());
    let pid = svc.create_pipeline(&alpaca()).unwrap();
    let a = tokio_test::assert_ok!(svc.add_step(pid, StepKind::Filter, None)).unwrap();
    let b = tokio_test::assert_ok!(svc.add_step(pid, StepKind::Translate, None)).unwrap();

    svc.remove_step(pid, a).unwrap();
    assert_eq!(svc.selected_step(pid).unwrap().map(|s| s.id), Some(b));
    svc.remove_step(pid, b).unwrap();
    assert_eq!(svc.selected_step(pid).unwrap(), None);
}

#[tokio::test]
async fn active_run_blocks_edits_and_second_start() {
    let mut svc = service_with(PipelineRunner::new(Arc::new(NeverFail), Arc::new(TokioDelay), Duration::from_secs(30)));
    let pid = svc.create_pipeline(&alpaca()).unwrap();
    let step = svc.add_step(pid, StepKind::Cluster, None).unwrap().unwrap();

    let handle = svc.run_pipeline(pid).unwrap();
    assert!(matches!(svc.run_pipeline(pid).unwrap_err(),
                     ConsoleError::Pipeline(PipelineError::RunAlreadyActive)));
    assert!(matches!(svc.remove_step(pid, step).unwrap_err(), ConsoleError::PipelineBusy(_)));
    assert!(svc.pipelines()[0].running);

    assert!(svc.cancel_run(pid).unwrap());
    assert!(matches!(handle.wait().await.unwrap(), RunOutcome::Cancelled { step_index: 0 }));
    assert!(!svc.cancel_run(pid).unwrap());

    let report = svc.progress(pid).unwrap();
    assert_eq!(report.phase, RunPhase::Cancelled);
    assert_eq!(report.steps[0].status, StepStatus::Pending);
    assert!(svc.remove_step(pid, step).unwrap().is_some());
}

#[tokio::test]
async fn template_moves_steps_between_pipelines() {
    let mut svc = instant(ScriptedFailures::default());
    let source = svc.create_pipeline(&alpaca()).unwrap();
    svc.add_step(source, StepKind::Filter, None).unwrap();
    svc.add_step(source, StepKind::Dedupe, None).unwrap();
    let template = svc.save_template(source, "limpieza-basica").unwrap();

    let raw = template.to_json().unwrap();
    let parsed = PipelineTemplate::from_json(&raw).unwrap();

    let target = svc.create_pipeline(&DatasetId::new("dolly-v2-15k", "v2.0")).unwrap();
    let ids = svc.apply_template(target, &parsed).unwrap();
    assert_eq!(ids.len(), 2);
    let kinds: Vec<StepKind> = svc.steps(target).unwrap().iter().map(|s| s.kind()).collect();
    assert_eq!(kinds, vec![StepKind::Filter, StepKind::Dedupe]);
    assert_eq!(svc.save_template(target, "copia").unwrap().definition_hash, template.definition_hash);
}

#[tokio::test]
async fn events_export_as_json_array() {
    let mut svc = instant(ScriptedFailures::default());
    let pid = svc.create_pipeline(&alpaca()).unwrap();
    svc.add_step(pid, StepKind::Augment, None).unwrap();
    let outcome = svc.run_pipeline(pid).unwrap().wait().await.unwrap();
    assert_eq!(outcome, RunOutcome::Completed);

    let raw = svc.events_json(pid).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(parsed.as_array().is_some_and(|a| a.len() >= 4));
}

#[tokio::test]
async fn edits_after_a_completed_run_drop_the_stale_progress() {
    let mut svc = instant(ScriptedFailures::default());
    let pid = svc.create_pipeline(&alpaca()).unwrap();
    svc.add_step(pid, StepKind::Filter, None).unwrap();
    assert_eq!(svc.run_pipeline(pid).unwrap().wait().await.unwrap(), RunOutcome::Completed);
    assert!(svc.progress(pid).unwrap().is_complete);

    // otro dataset: pipeline vacío y sin progreso
    assert!(svc.select_dataset(pid, Some(DatasetId::new("dolly-v2-15k", "v2.0"))).unwrap());
    let report = svc.progress(pid).unwrap();
    assert_eq!(report.phase, RunPhase::Idle);
    assert_eq!(report.percent_rounded(), 0);
    assert!(!report.is_complete);

    svc.add_step(pid, StepKind::Dedupe, None).unwrap();
    let report = svc.progress(pid).unwrap();
    assert_eq!(report.percent_rounded(), 0);
    assert!(!report.is_complete);
    assert_ne!(report.title(), "Pipeline completed");
    assert_eq!(report.steps[0].status, StepStatus::Pending);
}

#[tokio::test]
async fn appending_after_completion_leaves_the_run_partial() {
    let mut svc = instant(ScriptedFailures::default());
    let pid = svc.create_pipeline(&alpaca()).unwrap();
    svc.add_step(pid, StepKind::Filter, None).unwrap();
    svc.run_pipeline(pid).unwrap().wait().await.unwrap();

    svc.add_step(pid, StepKind::Translate, None).unwrap();
    let report = svc.progress(pid).unwrap();
    assert_eq!(report.percent_rounded(), 50);
    assert_eq!(report.phase, RunPhase::Idle);
    assert!(!report.is_complete);
    assert_eq!(report.steps[1].status, StepStatus::Pending);
}

#[tokio::test]
async fn retry_after_edits_runs_the_current_steps() {
    // Filter pasa, Dedupe falla; en el retry no falla nada más
    let mut svc = instant(ScriptedFailures::new([false, true]));
    let pid = svc.create_pipeline(&alpaca()).unwrap();
    let filter = svc.add_step(pid, StepKind::Filter, None).unwrap().unwrap();
    let dedupe = svc.add_step(pid, StepKind::Dedupe, None).unwrap().unwrap();
    svc.run_pipeline(pid).unwrap().wait().await.unwrap();

    let cluster = svc.add_step(pid, StepKind::Cluster, None).unwrap().unwrap();
    let report = svc.progress(pid).unwrap();
    assert_eq!(report.phase, RunPhase::Failed);
    assert_eq!(report.percent_rounded(), 33);
    assert_eq!(report.steps.iter().map(|s| s.status).collect::<Vec<_>>(),
               vec![StepStatus::Completed, StepStatus::Failed, StepStatus::Pending]);

    let handle = svc.retry_pipeline(pid).unwrap().expect("Dedupe sigue fallido");
    assert_eq!(handle.start_index(), 1);
    assert_eq!(handle.wait().await.unwrap(), RunOutcome::Completed);

    let report = svc.progress(pid).unwrap();
    assert!(report.is_complete);
    assert_eq!(report.percent_rounded(), 100);
    let ids: Vec<_> = report.steps.iter().map(|s| s.step_id).collect();
    assert_eq!(ids, vec![filter, dedupe, cluster]);
}

#[tokio::test]
async fn retry_after_removing_a_completed_step_starts_earlier() {
    let mut svc = instant(ScriptedFailures::new([false, true]));
    let pid = svc.create_pipeline(&alpaca()).unwrap();
    let filter = svc.add_step(pid, StepKind::Filter, None).unwrap().unwrap();
    svc.add_step(pid, StepKind::Dedupe, None).unwrap();
    svc.run_pipeline(pid).unwrap().wait().await.unwrap();

    svc.remove_step(pid, filter).unwrap();
    let report = svc.progress(pid).unwrap();
    assert_eq!(report.percent_rounded(), 0);
    assert!(report.has_failed);

    let handle = svc.retry_pipeline(pid).unwrap().unwrap();
    assert_eq!(handle.start_index(), 0);
    assert_eq!(handle.wait().await.unwrap(), RunOutcome::Completed);
    let report = svc.progress(pid).unwrap();
    assert_eq!(report.steps.len(), 1);
    assert_eq!(report.steps[0].status, StepStatus::Completed);
    assert_eq!(report.percent_rounded(), 100);
}
