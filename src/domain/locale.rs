//! English/Turkish terminology and number/date formatting.
//!
//! Lookups never fail: a term missing from the table comes back unchanged.

use chrono::{Datelike, NaiveDate, Weekday};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::AltairError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    English,
    #[default]
    Turkish,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Turkish => "tr",
        }
    }

    fn separators(&self) -> (char, char) {
        // (thousands, decimal)
        match self {
            Language::English => (',', '.'),
            Language::Turkish => ('.', ','),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = AltairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "tr" | "turkish" | "türkçe" => Ok(Language::Turkish),
            other => Err(AltairError::invalid(format!("unsupported language '{}'", other))),
        }
    }
}

/// (English, Turkish)
const TERMS: &[(&str, &str)] = &[
    ("Open", "Açılış"),
    ("High", "Yüksek"),
    ("Low", "Düşük"),
    ("Close", "Kapanış"),
    ("Volume", "Hacim"),
    ("Date", "Tarih"),
    ("Price", "Fiyat"),
    ("Current Price", "Güncel Fiyat"),
    ("Change", "Değişim"),
    ("Change %", "Değişim %"),
    ("Symbol", "Sembol"),
    ("Ticker", "Sembol"),
    ("Quantity", "Adet"),
    ("Average Cost", "Ortalama Maliyet"),
    ("Target Quantity", "Hedef Adet"),
    ("Market Value", "Piyasa Değeri"),
    ("Cost Basis", "Maliyet"),
    ("Total Value", "Toplam Değer"),
    ("Total Cost", "Toplam Maliyet"),
    ("Profit/Loss", "Kar/Zarar"),
    ("Unrealized P&L", "Gerçekleşmemiş Kar/Zarar"),
    ("Weight", "Ağırlık"),
    ("Holdings", "Hisse Sayısı"),
    ("Portfolio", "Portföy"),
    ("Portfolio Summary", "Portföy Özeti"),
    ("Market Summary", "Piyasa Özeti"),
    ("Stock", "Hisse"),
    ("Dividend", "Temettü"),
    ("Dividends", "Temettüler"),
    ("Analysis", "Analiz"),
    ("Technical Analysis", "Teknik Analiz"),
    ("Moving Average", "Hareketli Ortalama"),
    ("Simple Moving Average", "Basit Hareketli Ortalama"),
    ("Exponential Moving Average", "Üssel Hareketli Ortalama"),
    ("Relative Strength Index", "Göreceli Güç Endeksi"),
    ("Overbought", "Aşırı Alım"),
    ("Oversold", "Aşırı Satım"),
    ("Neutral", "Nötr"),
    ("Buy", "Al"),
    ("Sell", "Sat"),
    ("Rebalance", "Dengeleme"),
    ("Price Unavailable", "Fiyat Alınamadı"),
    ("Data Unavailable", "Veri Alınamadı"),
    ("Settings", "Ayarlar"),
    ("Day", "Gün"),
    ("Week", "Hafta"),
    ("Month", "Ay"),
    ("Year", "Yıl"),
    ("Today", "Bugün"),
    ("Yesterday", "Dün"),
];

const MONTHS: [(&str, &str); 12] = [
    ("January", "Ocak"),
    ("February", "Şubat"),
    ("March", "Mart"),
    ("April", "Nisan"),
    ("May", "Mayıs"),
    ("June", "Haziran"),
    ("July", "Temmuz"),
    ("August", "Ağustos"),
    ("September", "Eylül"),
    ("October", "Ekim"),
    ("November", "Kasım"),
    ("December", "Aralık"),
];

const WEEKDAYS: [(&str, &str); 7] = [
    ("Monday", "Pazartesi"),
    ("Tuesday", "Salı"),
    ("Wednesday", "Çarşamba"),
    ("Thursday", "Perşembe"),
    ("Friday", "Cuma"),
    ("Saturday", "Cumartesi"),
    ("Sunday", "Pazar"),
];

fn pick(pair: (&'static str, &'static str), language: Language) -> &'static str {
    match language {
        Language::English => pair.0,
        Language::Turkish => pair.1,
    }
}

/// Translates `term` into `target`, matching either language's spelling
/// case-insensitively. Dotted and dotless i compare equal, so `AŞIRI ALIM`
/// finds `Aşırı Alım`. Unknown terms are returned as given.
pub fn translate(term: &str, target: Language) -> String {
    let needle = fold_case(term.trim());
    TERMS
        .iter()
        .chain(MONTHS.iter())
        .chain(WEEKDAYS.iter())
        .find(|(en, tr)| fold_case(en) == needle || fold_case(tr) == needle)
        .map(|&pair| pick(pair, target).to_string())
        .unwrap_or_else(|| term.to_string())
}

fn fold_case(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'I' | 'İ' | 'ı' => 'i',
            c => c,
        })
        .collect::<String>()
        .to_lowercase()
}

pub fn month_name(month: u32, language: Language) -> Option<&'static str> {
    let idx = month.checked_sub(1)? as usize;
    MONTHS.get(idx).map(|&pair| pick(pair, language))
}

pub fn weekday_name(weekday: Weekday, language: Language) -> &'static str {
    pick(WEEKDAYS[weekday.num_days_from_monday() as usize], language)
}

/// `1234.5` -> `1.234,50` (tr) or `1,234.50` (en).
pub fn format_number(value: f64, decimals: usize, language: Language) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let (thousands, decimal) = language.separators();
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(thousands);
        }
        grouped.push(ch);
    }

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    let mut out = String::new();
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push(decimal);
        out.push_str(frac);
    }
    out
}

/// `-1234.5, "₺"` -> `-₺1.234,50` (tr).
pub fn format_currency(value: f64, symbol: &str, language: Language) -> String {
    let body = format_number(value.abs(), 2, language);
    if value < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}{}", symbol, body)
    } else {
        format!("{}{}", symbol, body)
    }
}

/// Signed percentage: `+%2,50` (tr) or `+2.50%` (en).
pub fn format_percent(value: f64, language: Language) -> String {
    let body = format_number(value.abs(), 2, language);
    let negative = value < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "+" };
    match language {
        Language::English => format!("{}{}%", sign, body),
        Language::Turkish => format!("{}%{}", sign, body),
    }
}

/// `15 Ocak 2024` / `15 January 2024`.
pub fn format_date(date: NaiveDate, language: Language) -> String {
    let month = month_name(date.month(), language).unwrap_or_default();
    format!("{} {} {}", date.day(), month, date.year())
}

/// Bundles a display language for callers that format many values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Localizer {
    pub language: Language,
}

impl Localizer {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn t(&self, term: &str) -> String {
        translate(term, self.language)
    }

    pub fn currency(&self, value: f64) -> String {
        let symbol = match self.language {
            Language::Turkish => "₺",
            Language::English => "$",
        };
        format_currency(value, symbol, self.language)
    }

    pub fn number(&self, value: f64, decimals: usize) -> String {
        format_number(value, decimals, self.language)
    }

    pub fn percent(&self, value: f64) -> String {
        format_percent(value, self.language)
    }

    pub fn date(&self, date: NaiveDate) -> String {
        format_date(date, self.language)
    }
}
