//! One-shot mode: load a picture, filter it once and write the PNG.

use crate::{
    cli::ApplyArgs,
    config::Config,
    logic::{self, share::FileShareSink},
};
use anyhow::{Context, Result, bail};
use filter_session::LoadOutcome;
use log::{info, warn};
use std::io::Write;

pub async fn apply(config: &Config, args: ApplyArgs) -> Result<()> {
    apply_with_output(config, args, std::io::stdout()).await
}

/// Runs [`apply`] with the review request written to `prompt_output`.
pub async fn apply_with_output<W: Write + Send + 'static>(
    config: &Config,
    args: ApplyArgs,
    prompt_output: W,
) -> Result<()> {
    let mut session = logic::session_with(
        config,
        Box::new(FileShareSink::file(args.output.clone())),
        prompt_output,
    );

    let input = args.input.to_string_lossy();
    match session.select_image(&input).await {
        LoadOutcome::Applied => (),
        LoadOutcome::Empty => bail!("can not read {}", args.input.display()),
        outcome => bail!("can not load {}: {outcome:?}", args.input.display()),
    }

    session.change_filter(args.filter);

    for (slot, value) in args.parameters() {
        if !session.set_parameter(slot, value) {
            warn!("{} ignores {slot}", args.filter);
        }
    }

    let handle = session
        .share()
        .with_context(|| format!("write {}", args.output.display()))?;

    info!(
        "{} -> {} ({})",
        args.input.display(),
        handle.location,
        args.filter
    );

    Ok(())
}
