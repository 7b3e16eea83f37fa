use clap::Parser;
use colored::Colorize;
use pbx2fa::cmd;

#[derive(Parser, Debug)]
#[command(
    name = "pbx2fa",
    about = "Enable or disable 2FA for a list of 3CX users",
    version,
    long_about = "Authenticates against the 3CX XAPI with an API client id and secret,\n\
                  then sets Require2FA on every user listed in UsersToChange."
)]
struct Cli {
    #[command(flatten)]
    update: cmd::update::UpdateArgs,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("pbx2fa=debug")
            .init();
    }

    if let Err(e) = cmd::update::run(cli.update).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}
