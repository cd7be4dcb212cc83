//! Built-in initializer stages
//!
//! `main` runs on every side, then `client` or `server` depending on where the
//! host is running.

use crate::errors::{AggregateInvocationFailure, EntrypointError};
use crate::invoker::{invoke, InvocationOutcome};
use crate::registry::EntrypointProvider;
use modspec_manifest::Environment;

pub const MAIN: &str = "main";
pub const CLIENT: &str = "client";
pub const SERVER: &str = "server";

pub trait ModInitializer: Send + Sync {
    fn on_initialize(&self) -> anyhow::Result<()>;
}

pub trait ClientModInitializer: Send + Sync {
    fn on_initialize_client(&self) -> anyhow::Result<()>;
}

pub trait DedicatedServerModInitializer: Send + Sync {
    fn on_initialize_server(&self) -> anyhow::Result<()>;
}

pub fn invoke_main<P: EntrypointProvider>(
    provider: &P,
) -> Result<InvocationOutcome, AggregateInvocationFailure> {
    invoke::<dyn ModInitializer, _, _>(provider, MAIN, |init| init.on_initialize())
}

pub fn invoke_client<P: EntrypointProvider>(
    provider: &P,
) -> Result<InvocationOutcome, AggregateInvocationFailure> {
    invoke::<dyn ClientModInitializer, _, _>(provider, CLIENT, |init| init.on_initialize_client())
}

pub fn invoke_server<P: EntrypointProvider>(
    provider: &P,
) -> Result<InvocationOutcome, AggregateInvocationFailure> {
    invoke::<dyn DedicatedServerModInitializer, _, _>(provider, SERVER, |init| {
        init.on_initialize_server()
    })
}

/// Run `main`, then the stage for `side`. A failing `main` stops there.
pub fn initialize<P: EntrypointProvider>(
    provider: &P,
    side: Environment,
) -> Result<(), EntrypointError> {
    invoke_main(provider)?;
    match side {
        Environment::Client => invoke_client(provider)?,
        Environment::Server => invoke_server(provider)?,
        Environment::Universal => InvocationOutcome::NoSubscribers,
    };
    Ok(())
}
