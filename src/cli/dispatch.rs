use super::info::cmd_info;
use super::list::cmd_list;
use super::send::cmd_send;
use super::serve::cmd_serve;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use crate::cli::env::CliArgs;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Serve(args) => cmd_serve(args, ctx.config()).await,
        Commands::List(args) => cmd_list(args, ctx.config()).await,
        Commands::Send(args) => cmd_send(args, ctx.config()).await,
        Commands::Info => cmd_info(ctx),
    }
}
