use anyhow::Context;

use crate::client::{ExpenseApi, PizzariaClient};
use crate::format::format_currency;
use crate::session::Session;

use super::render::{KeyValueRow, print_json, render_output};
use super::{Cli, OutputFormat};

pub(super) fn run_stats(cli: &Cli, session: &Session<PizzariaClient>) -> anyhow::Result<()> {
    let stats = session
        .api()
        .statistics()
        .context("Failed to load statistics")?;

    match cli.output {
        OutputFormat::Json => print_json(&stats),
        OutputFormat::Table => {
            let locale = cli.locale_or_default();
            render_output(
                cli,
                vec![
                    KeyValueRow::new("total_expenses", stats.total_expenses.to_string()),
                    KeyValueRow::new("total_amount", format_currency(stats.total_amount, locale)),
                    KeyValueRow::new("pending", stats.pending.to_string()),
                    KeyValueRow::new("paid", stats.paid.to_string()),
                ],
            )
        }
    }
}
