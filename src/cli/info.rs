use anyhow::Result;

use super::context::CliContext;

pub fn cmd_info(ctx: &CliContext) -> Result<()> {
    let config = ctx.config();
    println!("TabTrail v{}", env!("CARGO_PKG_VERSION"));
    println!("Build Date: {}", env!("TABTRAIL_BUILD_DATE"));
    println!(
        "Git Commit: {} ({})",
        env!("TABTRAIL_GIT_HASH"),
        env!("TABTRAIL_GIT_BRANCH")
    );
    println!("Config: {}", ctx.config_path().display());
    println!(
        "Collector: {} ({})",
        config.collector.url(""),
        config.collector.strictness()
    );
    println!("Relay endpoint: {}", config.relay_config().endpoint);
    Ok(())
}
