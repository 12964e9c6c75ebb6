use std::path::Path;

use anyhow::{Context, Result};
use docmirror_core::lark::{LarkCli, extract_doc_id};
use docmirror_core::{Collaborators, MirrorOptions, mirror_document};
use tracing::{debug, info};

use crate::cli::MirrorArgs;
use crate::output::print_mirror_result;

/// Fetch a document through `lark-cli` and write it as Markdown.
pub fn execute(args: &MirrorArgs, config_path: Option<&Path>, quiet: bool) -> Result<()> {
    let config = super::load_config(config_path)?;
    let lark = LarkCli::from_config(&config.lark)?;
    let binary = lark.detect()?;
    debug!(binary = %binary, "using lark-cli");

    let doc_id = extract_doc_id(&args.input, |token| lark.resolve_wiki_node(token))?;
    info!(doc_id = %doc_id, input = %args.input, "resolved document");

    let options = MirrorOptions::new(&args.output, &config.render)
        .with_assets_dir(args.assets.assets_dir.clone())
        .with_download(!args.assets.no_assets && config.render.download_assets);

    let result = mirror_document(&doc_id, &options, Collaborators::uniform(&lark))
        .with_context(|| format!("mirroring {doc_id}"))?;
    print_mirror_result(&result, args.format, quiet)
}
