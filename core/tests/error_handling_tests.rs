// tests/error_handling_tests.rs
mod common;
use common::*;
use orka::{ContextData, OrkaError, Pipeline, PipelineControl};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_pipeline_run_catches_handler_missing() {
  setup_tracing();
  let pipeline = Pipeline::<TestContext, TestError>::new(&[("missing", false, None)]);
  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx).await;
  match result.unwrap_err() {
    TestError::Orka(s) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("missing"));
    }
    other => panic!("Expected TestError::Orka(HandlerMissing), got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_pipeline_with_orka_error_type() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, OrkaError>::new(&[("task", false, None)]);

  pipeline.on_root("task", |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      ctx.write().counter = 1;
      Ok::<PipelineControl, OrkaError>(PipelineControl::Continue)
    })
  });

  let ctx = ContextData::new(TestContext::default());
  assert!(pipeline.run(ctx.clone()).await.is_ok());
  assert_eq!(ctx.read().counter, 1);

  let mut failing_pipeline = Pipeline::<TestContext, OrkaError>::new(&[("fail_task", false, None)]);
  failing_pipeline.on_root("fail_task", |_ctx| {
    Box::pin(async move { Err(OrkaError::Internal("Intentional OrkaError".to_string())) })
  });
  let fail_result = failing_pipeline.run(ContextData::new(TestContext::default())).await;
  match fail_result.unwrap_err() {
    OrkaError::Internal(s) => assert_eq!(s, "Intentional OrkaError"),
    other => panic!("Expected OrkaError::Internal, got {:?}", other),
  }
}

#[test]
fn test_anyhow_wrapping_an_orka_error_is_unwrapped() {
  let wrapped = anyhow::Error::new(OrkaError::Internal("inner".to_string()));
  match OrkaError::from(wrapped) {
    OrkaError::Internal(msg) => assert_eq!(msg, "inner"),
    other => panic!("Expected OrkaError::Internal, got {:?}", other),
  }

  let foreign = anyhow::anyhow!("socket closed");
  match OrkaError::from(foreign) {
    OrkaError::HandlerError { source } => assert_eq!(source.to_string(), "socket closed"),
    other => panic!("Expected OrkaError::HandlerError, got {:?}", other),
  }
}

#[test]
fn test_step_lookup_reports_unknown_step() {
  let pipeline = Pipeline::<TestContext, TestError>::new(&[("present", true, None)]);
  assert!(pipeline.step("present").unwrap().optional);
  match pipeline.step("absent") {
    Err(OrkaError::StepNotFound { step_name }) => assert_eq!(step_name, "absent"),
    other => panic!("Expected StepNotFound, got {:?}", other.map(|s| s.name.clone())),
  }
}
