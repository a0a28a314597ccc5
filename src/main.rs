use clap::Parser;

use pizzaria_caixa::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    pizzaria_caixa::logging::init(cli.verbose);
    pizzaria_caixa::cli::run(cli)
}
