// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! One use case per bootstrap CLI command (§AS.5). Each takes a
//! `&RuntimeServices` plus its own arguments and returns a plain result the
//! bootstrap crate renders - no `clap`/CLI concerns live below this layer.

mod batch;
mod dispatch;
mod ingest;
mod queue_status;
mod resume;

pub use batch::{BatchUseCase, BatchUseCaseInput};
pub use dispatch::DispatchUseCase;
pub use ingest::{IngestOutcome, IngestUseCase};
pub use queue_status::QueueStatusUseCase;
pub use resume::ResumeUseCase;
