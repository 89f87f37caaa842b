//! # functions-host
//!
//! Single-shot execution host for user-authored tool and resource
//! functions.
//!
//! The host is spawned once per invocation by an external orchestrator and
//! walks a fixed pipeline:
//!
//! 1. Decode the command-line contract into a typed [`Invocation`]
//! 2. Resolve the user handler through the [`ModuleLoader`] boundary
//! 3. Call it with isolated error classification
//! 4. Write the result to a pre-existing named pipe as a byte-exact
//!    HTTP/1.1 message, streaming large bodies
//!
//! Every failure from module load onward becomes exactly one
//! [`FunctionsError`], reported as an HTTP 500 with a machine-readable code
//! in the `Gram-Functions-Error` header. Argument violations abort the
//! process before the pipe is opened - at that stage there is no channel to
//! report them structurally.
//!
//! There is no state across invocations: parallelism is the orchestrator
//! spawning one process per call.
//!
//! ## Example
//!
//! ```ignore
//! use functions_host::{host, NodeLoader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), functions_host::HostError> {
//!     let argv: Vec<String> = std::env::args().collect();
//!     host::run(&argv, &NodeLoader::new(), &host::default_code_path()).await
//! }
//! ```

pub mod args;
pub mod error;
pub mod host;
pub mod invoker;
pub mod reporter;
pub mod response;
pub mod runtime;
pub mod wire;

pub use args::{Invocation, InvocationKind, ParsedArgs};
pub use error::{ErrorCode, FunctionsError, HostError};
pub use response::{Body, HandlerResponse};
pub use runtime::{Handler, ModuleLoader, NodeLoader};
