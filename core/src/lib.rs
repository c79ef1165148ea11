// orka/src/lib.rs

//! Orka: a small async, type-safe workflow engine.
//!
//! A workflow is a `Pipeline<TData, Err>` of named steps. Each step can carry
//! `before`, `on` and `after` handlers, a `skip_if` condition and an `optional`
//! flag. Handlers share one `ContextData<TData>` per run and return a
//! `PipelineControl` to continue or stop.
//!
//! The `Orka<E>` registry stores pipelines keyed by their context data type so
//! an application can register every workflow once at start-up and dispatch a
//! run from anywhere that holds a context.
//!
//! Optional steps are best-effort: a handler error inside an optional step is
//! logged and the run moves on to the next step.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context::Handler;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{OrkaError, OrkaResult};

pub use crate::registry::Orka;
