use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Row as ComfyRow, Table};
use serde::Serialize;
use terminal_size::{Width as TermWidth, terminal_size};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{Cli, OutputFormat};

#[derive(Debug, Clone, Serialize)]
pub(super) struct KeyValueRow {
    pub key: String,
    pub value: String,
}

impl KeyValueRow {
    pub fn new(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

pub(super) trait TableRow {
    const HEADERS: &'static [&'static str];
    fn cells(&self, cli: &Cli) -> Vec<Cell>;
}

impl TableRow for KeyValueRow {
    const HEADERS: &'static [&'static str] = &["key", "value"];

    fn cells(&self, _cli: &Cli) -> Vec<Cell> {
        vec![Cell::new(&self.key), Cell::new(&self.value)]
    }
}

pub(super) fn terminal_width() -> Option<u16> {
    if let Ok(cols) = std::env::var("COLUMNS")
        && let Ok(v) = cols.parse::<u16>()
    {
        return Some(v);
    }
    terminal_size().map(|(TermWidth(w), _)| w)
}

/// Cuts `text` to at most `max` display columns, marking the cut with `…`.
pub(super) fn truncate_for_table(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

pub(super) fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth);

    if let Some(w) = terminal_width() {
        table.set_width(w);
    }
    table
}

pub(super) fn render_output<T: Serialize + TableRow>(
    cli: &Cli,
    rows: Vec<T>,
) -> anyhow::Result<()> {
    match cli.output {
        OutputFormat::Json => {
            let s = serde_json::to_string_pretty(&rows)?;
            println!("{s}");
            Ok(())
        }
        OutputFormat::Table => {
            let mut table = new_table();
            table.set_header(ComfyRow::from(
                T::HEADERS
                    .iter()
                    .map(|h| header_cell(cli, h))
                    .collect::<Vec<_>>(),
            ));
            for row in rows {
                table.add_row(ComfyRow::from(row.cells(cli)));
            }
            println!("{table}");
            Ok(())
        }
    }
}

pub(super) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    println!("{s}");
    Ok(())
}

pub(super) fn header_cell(cli: &Cli, text: &str) -> Cell {
    if super::should_color(cli) {
        Cell::new(text)
            .add_attribute(Attribute::Bold)
            .fg(Color::Cyan)
    } else {
        Cell::new(text)
    }
}

/// `#rrggbb` to a terminal color.
pub(super) fn hex_color(hex: &str) -> Option<Color> {
    let h = hex.trim().strip_prefix('#')?;
    if h.len() != 6 || !h.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&h[0..2], 16).ok()?;
    let g = u8::from_str_radix(&h[2..4], 16).ok()?;
    let b = u8::from_str_radix(&h[4..6], 16).ok()?;
    Some(Color::Rgb { r, g, b })
}

/// A cell tinted with the given hex color when color output is on.
pub(super) fn tag_cell(cli: &Cli, text: &str, hex: &str) -> Cell {
    let cell = Cell::new(text);
    if !super::should_color(cli) {
        return cell;
    }
    match hex_color(hex) {
        Some(c) => cell.fg(c).add_attribute(Attribute::Bold),
        None => cell,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_parses_rgb() {
        assert_eq!(
            hex_color("#28a745"),
            Some(Color::Rgb {
                r: 0x28,
                g: 0xa7,
                b: 0x45
            })
        );
        assert_eq!(hex_color("28a745"), None);
        assert_eq!(hex_color("#fff"), None);
        assert_eq!(hex_color("#zzzzzz"), None);
    }

    #[test]
    fn truncate_respects_display_width() {
        assert_eq!(truncate_for_table("Salários", 20), "Salários");
        assert_eq!(truncate_for_table("Pagamento motoboy João", 10), "Pagamento…");
        assert_eq!(truncate_for_table("  curto  ", 5), "curto");
    }
}
