// orka/src/pipeline/execution.rs

//! `Pipeline::run`: executes steps in order against one shared context.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::core::step::StepDef;
use crate::error::OrkaError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, span, Instrument, Level};

enum StepOutcome {
  Continue,
  Stopped,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<OrkaError> + Send + Sync + 'static,
{
  /// Executes the pipeline against `ctx_data`.
  ///
  /// For each step: the `skip_if` condition is checked, then the `before`, `on`
  /// and `after` handlers run in registration order. A `Stop` from any handler
  /// ends the run with `PipelineResult::Stopped`. A handler error fails the run
  /// unless the step is optional, in which case it is logged and the next step
  /// runs. A required step with no handlers at all fails with
  /// `OrkaError::HandlerMissing`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      pipeline_context_data_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name_str = step_def.name.as_str();

      if step_def.should_skip(&ctx_data) {
        event!(Level::DEBUG, step_name = step_name_str, "Step skipped due to 'skip_if' condition.");
        continue;
      }

      if !self.has_handlers(step_name_str) {
        if step_def.optional {
          event!(Level::DEBUG, step_name = step_name_str, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(Level::ERROR, step_name = step_name_str, "Non-optional step has no handlers.");
        return Err(Err::from(OrkaError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      let step_span = span!(
        Level::INFO,
        "pipeline_step_execution",
        step_name = step_name_str,
        step_index = step_idx,
        optional = step_def.optional
      );

      match self.run_step(step_def, &ctx_data).instrument(step_span).await {
        Ok(StepOutcome::Continue) => {}
        Ok(StepOutcome::Stopped) => return Ok(PipelineResult::Stopped),
        Err(e) if step_def.optional => {
          event!(
            Level::WARN,
            step_name = step_name_str,
            error = %e,
            "Optional step failed; continuing with the next step."
          );
        }
        Err(e) => return Err(e),
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed successfully.");
    Ok(PipelineResult::Completed)
  }

  async fn run_step(&self, step_def: &StepDef<TData>, ctx_data: &ContextData<TData>) -> Result<StepOutcome, Err> {
    let name = step_def.name.as_str();
    for (phase, handlers) in [
      ("before", self.before.get(name)),
      ("on", self.on.get(name)),
      ("after", self.after.get(name)),
    ] {
      if let Some(handlers) = handlers {
        if let StepOutcome::Stopped = Self::run_phase(phase, handlers, ctx_data).await? {
          return Ok(StepOutcome::Stopped);
        }
      }
    }
    event!(Level::DEBUG, "Step processing finished successfully.");
    Ok(StepOutcome::Continue)
  }

  async fn run_phase(
    phase: &'static str,
    handlers: &[Handler<TData, Err>],
    ctx_data: &ContextData<TData>,
  ) -> Result<StepOutcome, Err> {
    for (handler_idx, handler_fn) in handlers.iter().enumerate() {
      let handler_span = span!(Level::DEBUG, "step_handler", phase, handler_index = handler_idx);
      match handler_fn(ctx_data.clone()).instrument(handler_span).await {
        Ok(PipelineControl::Continue) => {}
        Ok(PipelineControl::Stop) => {
          event!(Level::INFO, phase, "Pipeline stopped by a handler.");
          return Ok(StepOutcome::Stopped);
        }
        Err(e) => {
          event!(Level::ERROR, phase, error = %e, "Handler failed.");
          return Err(e);
        }
      }
    }
    Ok(StepOutcome::Continue)
  }
}
