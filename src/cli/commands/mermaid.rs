//! sc mermaid - render a resolved chain as a mermaid flowchart.

use clap::Args;

use crate::app::AppContext;
use crate::error::Result;
use crate::graph::mermaid;
use crate::resolver::{ResolveOptions, resolve};

#[derive(Args, Debug)]
pub struct MermaidArgs {
    /// Profile to render
    pub profile: String,

    /// Include capability nodes between providers and requirers
    #[arg(long)]
    pub capabilities: bool,
}

pub fn run(ctx: &AppContext, args: &MermaidArgs) -> Result<u8> {
    let profile = ctx.find_profile(&args.profile)?;
    let result = resolve(profile, &ctx.skills.skills, ResolveOptions::default())?;
    print!(
        "{}",
        mermaid::render(&result.chain, &ctx.skills.skills, args.capabilities)
    );
    Ok(0)
}
