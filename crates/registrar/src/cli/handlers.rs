//! Argument extraction and dispatch.
//!
//! Every command ends in exactly one JSON envelope on stdout. The returned
//! number is the process exit code.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use registrar_core::CreateOfferingRequest;
use serde::Serialize;
use tracing::debug;

use crate::{
    commands::{batch, enrollment, offering, student, AppContext},
    config::Config,
    error::CliError,
    json::{ErrorDetail, JsonResponse},
    logging,
};

/// Load config, open the store, run the selected command and print its
/// envelope.
pub async fn run(matches: &ArgMatches) -> Result<i32> {
    let config = match Config::load(
        path_arg(matches, "config").as_deref(),
        path_arg(matches, "db").as_deref(),
    ) {
        Ok(config) => config,
        Err(e) => {
            logging::init(logging::DEFAULT_LEVEL);
            return emit::<()>(Err(e.into()));
        }
    };

    logging::init(&config.log_level);
    debug!(db = %config.database_path.display(), max_credits = config.max_credits, "config loaded");

    let ctx = match AppContext::open(&config).await {
        Ok(ctx) => ctx,
        Err(e) => return emit::<()>(Err(e)),
    };

    let code = dispatch(&ctx, matches).await;
    ctx.store.close().await;
    code
}

async fn dispatch(ctx: &AppContext, matches: &ArgMatches) -> Result<i32> {
    match matches.subcommand() {
        Some(("student", sub)) => match sub.subcommand() {
            Some(("register", m)) => emit(student::register(ctx, id(m, "id")?).await),
            Some(("show", m)) => emit(student::show(ctx, id(m, "id")?).await),
            _ => {
                anyhow::bail!("Unknown student command. Run 'registrar student --help' for usage.")
            }
        },
        Some(("offering", sub)) => match sub.subcommand() {
            Some(("create", m)) => {
                let request = create_request(m)?;
                emit(offering::create(ctx, &request).await)
            }
            Some(("list", _)) => emit(offering::list(ctx).await),
            Some(("show", m)) => emit(offering::show(ctx, id(m, "id")?).await),
            Some(("delete", m)) => emit(offering::delete(ctx, id(m, "id")?).await),
            _ => {
                anyhow::bail!(
                    "Unknown offering command. Run 'registrar offering --help' for usage."
                )
            }
        },
        Some(("enroll", m)) => {
            emit(enrollment::enroll(ctx, id(m, "student")?, id(m, "offering")?).await)
        }
        Some(("cancel", m)) => {
            emit(enrollment::cancel(ctx, id(m, "student")?, id(m, "offering")?).await)
        }
        Some(("enrollments", m)) => emit(enrollment::list(ctx, id(m, "student")?).await),
        Some(("reconcile", m)) => emit(enrollment::reconcile(ctx, id(m, "offering")?).await),
        Some(("batch", m)) => {
            let file = path_arg(m, "file").context("missing batch file")?;
            match batch::run(ctx, &file).await {
                Ok(response) => {
                    let code = i32::from(!response.all_succeeded());
                    print_envelope(&JsonResponse::success(response))?;
                    Ok(code)
                }
                Err(e) => emit::<()>(Err(e)),
            }
        }
        _ => anyhow::bail!("Unknown command. Run 'registrar --help' for usage."),
    }
}

/// Print the envelope for `result` and return its exit code.
fn emit<T: Serialize>(result: Result<T, CliError>) -> Result<i32> {
    match result {
        Ok(data) => {
            print_envelope(&JsonResponse::success(data))?;
            Ok(0)
        }
        Err(e) => {
            print_envelope(&JsonResponse::<()>::failure(ErrorDetail::from(&e)))?;
            Ok(e.exit_code())
        }
    }
}

#[allow(clippy::print_stdout)]
fn print_envelope<T: Serialize>(response: &JsonResponse<T>) -> Result<()> {
    let json = response.to_json().context("failed to serialize response")?;
    println!("{json}");
    Ok(())
}

fn id(matches: &ArgMatches, name: &str) -> Result<i64> {
    matches
        .get_one::<i64>(name)
        .copied()
        .with_context(|| format!("missing argument <{name}>"))
}

fn string(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing argument --{name}"))
}

fn path_arg(matches: &ArgMatches, name: &str) -> Option<PathBuf> {
    matches.get_one::<PathBuf>(name).cloned()
}

fn create_request(matches: &ArgMatches) -> Result<CreateOfferingRequest> {
    Ok(CreateOfferingRequest {
        id: id(matches, "id")?,
        name: string(matches, "name")?,
        capacity: id(matches, "capacity")?,
        credit: id(matches, "credit")?,
        day: string(matches, "day")?,
        start_time: string(matches, "start")?,
        end_time: string(matches, "end")?,
    })
}
