use anyhow::Context;
use comfy_table::{Cell, CellAlignment, Row as ComfyRow};
use serde::Serialize;

use crate::client::{Expense, ExpenseApi, PizzariaClient, Statistics};
use crate::filter::{FilterCriteria, distinct_categories};
use crate::form::{ExpenseForm, parse_date};
use crate::format::{format_currency, format_date};
use crate::session::{Notice, Session};

use super::render::{
    KeyValueRow, TableRow, header_cell, new_table, print_json, render_output, tag_cell,
    truncate_for_table,
};
use super::{Cli, ExpenseField, ExpenseFieldArgs, ExpensesCmd, ExpensesListArgs, OutputFormat};

type ClientSession = Session<PizzariaClient>;

pub(super) fn run_expenses(
    cli: &Cli,
    session: &mut ClientSession,
    cmd: ExpensesCmd,
) -> anyhow::Result<()> {
    match cmd {
        ExpensesCmd::List(args) => {
            let criteria = criteria_from_args(&args)?;
            session.load()?;
            render_list(cli, session, &criteria, &args.fields)
        }
        ExpensesCmd::Show { id } => {
            let expense = session
                .api()
                .get_expense(id)
                .with_context(|| format!("Failed to load expense {id}"))?;
            match cli.output {
                OutputFormat::Json => print_json(&expense),
                OutputFormat::Table => render_output(cli, expense_rows(cli, &expense)),
            }
        }
        ExpensesCmd::Create(fields) => {
            // Input errors win over an unreachable server.
            let mut draft = ExpenseForm::new();
            apply_fields(&mut draft, &fields);
            draft.validate()?;

            session.load()?;
            *session.begin_create()? = draft;
            warn_unknown_category(session);

            if cli.dry_run {
                return print_dry_run(session, "create expense");
            }
            let notice = session.submit()?;
            report(cli, session, notice)
        }
        ExpensesCmd::Edit(args) => {
            if args.fields.is_empty() {
                anyhow::bail!("nothing to change; pass at least one field");
            }
            session.load()?;
            let form = session.begin_edit(args.id)?;
            apply_fields(form, &args.fields);
            form.validate()?;
            warn_unknown_category(session);

            if cli.dry_run {
                return print_dry_run(session, &format!("update expense {}", args.id));
            }
            let notice = session.submit()?;
            report(cli, session, notice)
        }
        ExpensesCmd::SetStatus(args) => {
            session.load()?;
            if cli.dry_run {
                println!("dry-run: would mark expense {} {}", args.id, args.status);
                return Ok(());
            }
            let notice = session.change_status(args.id, args.status)?;
            report(cli, session, notice)
        }
        ExpensesCmd::Delete(args) => {
            session.load()?;
            let description = session
                .store()
                .get(args.id)
                .map(|e| e.description.clone())
                .ok_or_else(|| anyhow::anyhow!("expense {} not found", args.id))?;

            if cli.dry_run {
                println!("dry-run: would delete expense {}: {description}", args.id);
                return Ok(());
            }
            super::confirm_write(cli, &format!("Delete expense {}: {description}", args.id))?;

            let notice = session.delete(args.id)?;
            report(cli, session, notice)
        }
        ExpensesCmd::Categories => {
            session.load()?;
            let rows = distinct_categories(session.store().records())
                .into_iter()
                .map(|name| UsedCategoryRow {
                    color: session.categories().color_of(&name).to_string(),
                    name,
                })
                .collect::<Vec<_>>();
            render_output(cli, rows)
        }
    }
}

fn criteria_from_args(args: &ExpensesListArgs) -> anyhow::Result<FilterCriteria> {
    let date = match args.date.as_deref() {
        None => None,
        Some(raw) => Some(
            parse_date(raw)
                .with_context(|| format!("invalid --date {raw:?}; use YYYY-MM-DD or DD/MM/YYYY"))?,
        ),
    };
    Ok(FilterCriteria {
        query: args.search.clone().unwrap_or_default(),
        category: args.category.clone(),
        status: args.status,
        date,
    })
}

fn apply_fields(form: &mut ExpenseForm, fields: &ExpenseFieldArgs) {
    if let Some(v) = &fields.description {
        form.description = v.clone();
    }
    if let Some(v) = &fields.category {
        form.category = v.clone();
    }
    if let Some(v) = &fields.amount {
        form.set_amount_text(v);
    }
    if let Some(v) = &fields.due_date {
        form.due_date = v.clone();
    }
    if let Some(v) = &fields.payment_date {
        form.payment_date = v.clone();
    }
    if let Some(v) = &fields.notes {
        form.notes = v.clone();
    }
    if let Some(v) = fields.status {
        form.status = v;
    }
}

impl ExpenseFieldArgs {
    fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.category.is_none()
            && self.amount.is_none()
            && self.due_date.is_none()
            && self.payment_date.is_none()
            && self.notes.is_none()
            && self.status.is_none()
    }
}

fn warn_unknown_category(session: &ClientSession) {
    if let Some(form) = session.form()
        && !form.category.is_empty()
        && !session.categories().contains(&form.category)
    {
        tracing::warn!(category = %form.category, "category is not in the category list");
    }
}

fn print_dry_run(session: &ClientSession, what: &str) -> anyhow::Result<()> {
    let form = session
        .form()
        .ok_or_else(|| anyhow::anyhow!("no form is open"))?;
    let submission = form.validate()?;
    println!("dry-run: would {what}:");
    print_json(&submission.draft)
}

#[derive(Debug, Serialize)]
struct MutationReport<'a> {
    message: String,
    expense: Option<&'a Expense>,
    statistics: &'a Statistics,
}

fn report(cli: &Cli, session: &ClientSession, notice: Notice) -> anyhow::Result<()> {
    let expense = match notice {
        Notice::Deleted(_) => None,
        _ => session.store().get(notice.id()),
    };
    match cli.output {
        OutputFormat::Json => print_json(&MutationReport {
            message: notice.to_string(),
            expense,
            statistics: session.statistics(),
        }),
        OutputFormat::Table => {
            println!("{notice}");
            if let Some(e) = expense {
                render_output(cli, expense_rows(cli, e))?;
            }
            Ok(())
        }
    }
}

fn expense_rows(cli: &Cli, e: &Expense) -> Vec<KeyValueRow> {
    let locale = cli.locale_or_default();
    vec![
        KeyValueRow::new("id", e.id.to_string()),
        KeyValueRow::new("description", e.description.clone()),
        KeyValueRow::new("category", e.category.clone()),
        KeyValueRow::new("amount", format_currency(e.amount, locale)),
        KeyValueRow::new("due_date", format_date(e.due_date, locale)),
        KeyValueRow::new("payment_date", format_date(e.payment_date, locale)),
        KeyValueRow::new("status", e.status.to_string()),
        KeyValueRow::new("notes", e.notes.clone().unwrap_or_default()),
        KeyValueRow::new("created_at", e.created_at.clone()),
    ]
}

#[derive(Debug, Serialize)]
struct ListOutput<'a> {
    expenses: &'a [&'a Expense],
    summary: crate::filter::Summary,
    statistics: &'a Statistics,
}

fn render_list(
    cli: &Cli,
    session: &ClientSession,
    criteria: &FilterCriteria,
    fields: &[ExpenseField],
) -> anyhow::Result<()> {
    let view = session.view(criteria);
    let stats = session.statistics();

    if cli.output == OutputFormat::Json {
        return print_json(&ListOutput {
            expenses: &view.records,
            summary: view.summary,
            statistics: stats,
        });
    }

    let locale = cli.locale_or_default();
    if view.records.is_empty() {
        println!("No expenses found.");
    } else {
        let mut table = new_table();
        table.set_header(ComfyRow::from(
            fields
                .iter()
                .map(|f| header_cell(cli, field_header(*f)))
                .collect::<Vec<_>>(),
        ));
        for e in &view.records {
            let cells = fields
                .iter()
                .map(|f| expense_cell(cli, session, e, *f))
                .collect::<Vec<_>>();
            table.add_row(ComfyRow::from(cells));
        }
        println!("{table}");
    }

    println!(
        "Showing {} of {} expenses: {} total, {} pending",
        view.summary.count,
        session.store().len(),
        format_currency(view.summary.total, locale),
        view.summary.pending,
    );
    println!(
        "Overall: {} expenses, {} total, {} pending, {} paid",
        stats.total_expenses,
        format_currency(stats.total_amount, locale),
        stats.pending,
        stats.paid,
    );
    Ok(())
}

fn field_header(field: ExpenseField) -> &'static str {
    match field {
        ExpenseField::Id => "id",
        ExpenseField::Description => "description",
        ExpenseField::Category => "category",
        ExpenseField::Amount => "amount",
        ExpenseField::Due => "due",
        ExpenseField::Paid => "paid",
        ExpenseField::Status => "status",
        ExpenseField::Notes => "notes",
    }
}

fn expense_cell(cli: &Cli, session: &ClientSession, e: &Expense, field: ExpenseField) -> Cell {
    let locale = cli.locale_or_default();
    match field {
        ExpenseField::Id => Cell::new(e.id),
        ExpenseField::Description => Cell::new(truncate_for_table(&e.description, 40)),
        ExpenseField::Category => {
            tag_cell(cli, &e.category, session.categories().color_of(&e.category))
        }
        ExpenseField::Amount => {
            Cell::new(format_currency(e.amount, locale)).set_alignment(CellAlignment::Right)
        }
        ExpenseField::Due => Cell::new(format_date(e.due_date, locale)),
        ExpenseField::Paid => Cell::new(format_date(e.payment_date, locale)),
        ExpenseField::Status => tag_cell(cli, &e.status.to_string(), e.status.color()),
        ExpenseField::Notes => Cell::new(truncate_for_table(
            e.notes.as_deref().unwrap_or_default(),
            30,
        )),
    }
}

#[derive(Debug, Clone, Serialize)]
struct UsedCategoryRow {
    name: String,
    color: String,
}

impl TableRow for UsedCategoryRow {
    const HEADERS: &'static [&'static str] = &["category", "color"];

    fn cells(&self, cli: &Cli) -> Vec<Cell> {
        vec![
            tag_cell(cli, &self.name, &self.color),
            Cell::new(&self.color),
        ]
    }
}
