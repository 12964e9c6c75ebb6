use std::path::Path;

use anyhow::{Context, Result};
use docmirror_core::lark::LarkCli;
use docmirror_core::{Collaborators, FileDocumentSource, MirrorOptions, Offline, mirror_document};
use tracing::debug;

use crate::cli::RenderArgs;
use crate::error::CliError;
use crate::output::print_mirror_result;

/// Render a saved block listing.
///
/// Offline by default: mentions fall back to raw ids and assets are only
/// linked. `--online` routes downloads and user lookups through `lark-cli`.
pub fn execute(args: &RenderArgs, config_path: Option<&Path>, quiet: bool) -> Result<()> {
    if !args.listing.is_file() {
        return Err(CliError::not_found(anyhow::anyhow!(
            "block listing not found: {}",
            args.listing.display()
        ))
        .into());
    }

    let config = super::load_config(config_path)?;
    let doc_id = match &args.doc_id {
        Some(id) => id.trim().to_string(),
        None => args
            .listing
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    if doc_id.is_empty() {
        return Err(CliError::usage(anyhow::anyhow!(
            "cannot derive a document id from {}; pass --doc-id",
            args.listing.display()
        ))
        .into());
    }

    let source = FileDocumentSource::new(&args.listing);
    let lark = if args.online {
        let lark = LarkCli::from_config(&config.lark)?;
        let binary = lark.detect()?;
        debug!(binary = %binary, "online render");
        Some(lark)
    } else {
        None
    };

    let download = lark.is_some() && !args.assets.no_assets && config.render.download_assets;
    let options = MirrorOptions::new(&args.output, &config.render)
        .with_assets_dir(args.assets.assets_dir.clone())
        .with_download(download);

    let collaborators = match &lark {
        Some(lark) => Collaborators {
            source: &source,
            ..Collaborators::uniform(lark)
        },
        None => Collaborators {
            source: &source,
            ..Collaborators::uniform(&Offline)
        },
    };

    let result = mirror_document(&doc_id, &options, collaborators)
        .with_context(|| format!("rendering {}", args.listing.display()))?;
    print_mirror_result(&result, args.format, quiet)
}
