use anyhow::Context;
use comfy_table::Cell;
use serde::Serialize;

use crate::categories::CategorySource;
use crate::client::{Category, CategoryDraft, ExpenseApi, PizzariaClient};
use crate::session::Session;
use crate::types::CategoryId;

use super::render::{KeyValueRow, TableRow, hex_color, print_json, render_output, tag_cell};
use super::{CategoriesCmd, Cli};

pub(super) fn run_categories(
    cli: &Cli,
    session: &mut Session<PizzariaClient>,
    cmd: CategoriesCmd,
) -> anyhow::Result<()> {
    match cmd {
        CategoriesCmd::List => {
            session.load_categories();
            if session.categories().source() == CategorySource::Fallback {
                eprintln!("note: showing the built-in category list");
            }
            render_categories(cli, session.categories().categories())
        }
        CategoriesCmd::Create(args) => {
            let name = args.name.trim();
            if name.is_empty() {
                anyhow::bail!("category name must not be empty");
            }
            if hex_color(&args.hex).is_none() {
                anyhow::bail!("invalid color {:?}; expected #rrggbb", args.hex);
            }
            let draft = CategoryDraft {
                name: name.to_string(),
                description: args
                    .description
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
                color: args.hex.to_lowercase(),
            };

            if cli.dry_run {
                println!("dry-run: would create category:");
                return print_json(&draft);
            }

            let cat = session
                .api()
                .create_category(&draft)
                .context("Failed to create category")?;
            render_output(
                cli,
                vec![
                    KeyValueRow::new("id", cat.id.to_string()),
                    KeyValueRow::new("name", cat.name),
                    KeyValueRow::new("description", cat.description.unwrap_or_default()),
                    KeyValueRow::new("color", cat.color),
                ],
            )
        }
        CategoriesCmd::Seed => {
            if cli.dry_run {
                println!("dry-run: would seed the default categories");
                return Ok(());
            }
            session
                .api()
                .seed_categories()
                .context("Failed to seed categories")?;
            eprintln!("Default categories seeded");

            session.load_categories();
            render_categories(cli, session.categories().categories())
        }
    }
}

fn render_categories(cli: &Cli, categories: &[Category]) -> anyhow::Result<()> {
    let rows = categories
        .iter()
        .map(|c| CategoryRow {
            id: c.id,
            name: c.name.clone(),
            description: c.description.clone().unwrap_or_default(),
            color: c.color.clone(),
        })
        .collect::<Vec<_>>();
    render_output(cli, rows)
}

#[derive(Debug, Clone, Serialize)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    description: String,
    color: String,
}

impl TableRow for CategoryRow {
    const HEADERS: &'static [&'static str] = &["id", "name", "description", "color"];

    fn cells(&self, cli: &Cli) -> Vec<Cell> {
        vec![
            Cell::new(self.id),
            tag_cell(cli, &self.name, &self.color),
            Cell::new(&self.description),
            Cell::new(&self.color),
        ]
    }
}
