use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Display conventions for money and dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Locale {
    /// `R$ 1.234,56` and `31/12/2024`.
    #[default]
    PtBr,
    /// `$1,234.56` and `2024-12-31`.
    EnUs,
}

impl Locale {
    pub fn name(self) -> &'static str {
        match self {
            Locale::PtBr => "pt-br",
            Locale::EnUs => "en-us",
        }
    }

    fn separators(self) -> (char, char) {
        match self {
            Locale::PtBr => ('.', ','),
            Locale::EnUs => (',', '.'),
        }
    }
}

pub fn format_currency(value: f64, locale: Locale) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let cents = (value.abs() * 100.0).round() as u64;
    let (group, decimal) = locale.separators();

    let units = (cents / 100).to_string();
    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push(group);
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    match locale {
        Locale::PtBr => format!("{sign}R$ {grouped}{decimal}{:02}", cents % 100),
        Locale::EnUs => format!("{sign}${grouped}{decimal}{:02}", cents % 100),
    }
}

/// Missing dates render as `-`.
pub fn format_date(date: Option<NaiveDate>, locale: Locale) -> String {
    match (date, locale) {
        (None, _) => "-".to_string(),
        (Some(d), Locale::PtBr) => d.format("%d/%m/%Y").to_string(),
        (Some(d), Locale::EnUs) => d.format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brazilian_currency() {
        assert_eq!(format_currency(1234.5, Locale::PtBr), "R$ 1.234,50");
        assert_eq!(format_currency(50.0, Locale::PtBr), "R$ 50,00");
        assert_eq!(format_currency(1_000_000.0, Locale::PtBr), "R$ 1.000.000,00");
        assert_eq!(format_currency(0.0, Locale::PtBr), "R$ 0,00");
        assert_eq!(format_currency(-12.5, Locale::PtBr), "-R$ 12,50");
    }

    #[test]
    fn us_currency() {
        assert_eq!(format_currency(2050.0, Locale::EnUs), "$2,050.00");
        assert_eq!(format_currency(f64::NAN, Locale::EnUs), "$0.00");
    }

    #[test]
    fn dates() {
        let d = NaiveDate::from_ymd_opt(2024, 5, 10);
        assert_eq!(format_date(d, Locale::PtBr), "10/05/2024");
        assert_eq!(format_date(d, Locale::EnUs), "2024-05-10");
        assert_eq!(format_date(None, Locale::PtBr), "-");
    }
}
