//! Record validation shared by every write path
//!
//! Each draft yields a [`Validation`] report. Errors reject the write;
//! warnings are passed back to the caller alongside a successful write.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::drafts::{parse_date, present, ArticleDraft, MarketPriceDraft, PlantingDraft, TipDraft, HarvestDraft};

const MAX_SANITIZED_LEN: usize = 10_000;
const PRICE_WARNING_THRESHOLD: f64 = 1_000_000.0;

/// Outcome of validating one draft
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Validation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Required text with a character-length window on the trimmed value
    fn text(&mut self, field: &str, value: &Option<String>, min: usize, max: Option<usize>) {
        match present(value) {
            None => self.error(format!("{} is required", field)),
            Some(s) => {
                let len = s.chars().count();
                if len < min {
                    self.error(format!("{} must be at least {} characters", field, min));
                } else if let Some(max) = max.filter(|m| len > *m) {
                    self.error(format!("{} must be at most {} characters", field, max));
                }
            }
        }
    }

    fn non_negative(&mut self, field: &str, value: Option<f64>) {
        if let Some(v) = value {
            if !v.is_finite() {
                self.error(format!("{} must be a valid number", field));
            } else if v < 0.0 {
                self.error(format!("{} cannot be negative", field));
            }
        }
    }
}

impl MarketPriceDraft {
    pub fn validate(&self) -> Validation {
        let mut report = Validation::default();
        report.text("commodity", &self.commodity, 3, None);

        match self.price {
            None => report.error("price is required"),
            Some(p) if !p.is_finite() => report.error("price must be a valid number"),
            Some(p) if p <= 0.0 => report.error("price must be greater than 0"),
            Some(p) if p > PRICE_WARNING_THRESHOLD => {
                report.warn("price looks unusually high, please verify")
            }
            Some(_) => {}
        }

        if present(&self.unit).is_none() {
            report.error("unit is required");
        }

        if let Some(date) = present(&self.date) {
            if parse_date(date).is_err() {
                report.error("date is not a valid date");
            }
        }

        report
    }
}

impl ArticleDraft {
    pub fn validate(&self) -> Validation {
        let mut report = Validation::default();
        report.text("title", &self.title, 5, Some(500));
        report.text("content", &self.content, 20, Some(50_000));

        if let Some(raw) = present(&self.url) {
            if url::Url::parse(raw).is_err() {
                report.warn("url is not a valid absolute URL");
            }
        }

        report
    }
}

impl TipDraft {
    pub fn validate(&self) -> Validation {
        let mut report = Validation::default();
        report.text("title", &self.title, 5, Some(500));
        report.text("content", &self.content, 20, Some(10_000));

        if present(&self.category).is_none() {
            report.warn("category is empty, filed under 'general'");
        }

        report
    }
}

impl PlantingDraft {
    pub fn validate(&self) -> Validation {
        self.validate_on(Utc::now().date_naive())
    }

    /// Validate with `today` as the latest acceptable planting date
    pub fn validate_on(&self, today: NaiveDate) -> Validation {
        let mut report = Validation::default();
        report.text("seed type", &self.seed_type, 3, None);

        match self.seed_count {
            Some(n) if n > 0 => {}
            _ => report.error("seed count must be greater than 0"),
        }

        let planted = match present(&self.planting_date) {
            None => {
                report.error("planting date is required");
                None
            }
            Some(raw) => match parse_date(raw) {
                Ok(d) if d > today => {
                    report.error("planting date cannot be in the future");
                    Some(d)
                }
                Ok(d) => Some(d),
                Err(_) => {
                    report.error("planting date is not a valid date");
                    None
                }
            },
        };

        if let Some(raw) = present(&self.harvest_date) {
            check_harvest_date(&mut report, raw, planted);
        }

        report.non_negative("harvest yield", self.harvest_yield);
        report.non_negative("sales amount", self.sales_amount);
        report
    }
}

impl HarvestDraft {
    /// Validate against the stored planting date of the record
    pub fn validate(&self, planted: NaiveDate) -> Validation {
        let mut report = Validation::default();

        match present(&self.harvest_date) {
            None => report.error("harvest date is required"),
            Some(raw) => check_harvest_date(&mut report, raw, Some(planted)),
        }

        if self.harvest_yield.is_none() {
            report.error("harvest yield is required");
        }
        report.non_negative("harvest yield", self.harvest_yield);
        report.non_negative("price per kg", self.price_per_kg);
        report
    }
}

fn check_harvest_date(report: &mut Validation, raw: &str, planted: Option<NaiveDate>) {
    match parse_date(raw) {
        Err(_) => report.error("harvest date is not a valid date"),
        Ok(harvested) => {
            if planted.is_some_and(|p| harvested < p) {
                report.error("harvest date must not be before the planting date");
            }
        }
    }
}

/// Trim, escape HTML-significant characters and cap the length.
pub fn sanitize_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.trim().chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out.chars().take(MAX_SANITIZED_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn price(commodity: &str, price: Option<f64>, unit: &str) -> MarketPriceDraft {
        MarketPriceDraft {
            commodity: Some(commodity.into()),
            price,
            unit: Some(unit.into()),
            date: None,
        }
    }

    #[test]
    fn market_price_rules() {
        assert!(price("Cabai", Some(25_000.0), "kg").validate().is_valid());

        let report = price("Ca", Some(25_000.0), "kg").validate();
        assert_eq!(report.errors, vec!["commodity must be at least 3 characters"]);

        let report = price("Cabai", Some(0.0), "kg").validate();
        assert_eq!(report.errors, vec!["price must be greater than 0"]);

        let report = price("Cabai", None, " ").validate();
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn market_price_high_value_warns_only() {
        let report = price("Vanili", Some(4_000_000.0), "kg").validate();
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn article_length_limits() {
        let ok = ArticleDraft {
            title: Some("Panen Raya".into()),
            content: Some("Isi artikel yang cukup panjang untuk lolos.".into()),
            ..Default::default()
        };
        assert!(ok.validate().is_valid());

        let long_title = ArticleDraft {
            title: Some("x".repeat(501)),
            ..ok.clone()
        };
        assert_eq!(
            long_title.validate().errors,
            vec!["title must be at most 500 characters"]
        );

        let short = ArticleDraft {
            content: Some("pendek".into()),
            ..ok
        };
        assert_eq!(
            short.validate().errors,
            vec!["content must be at least 20 characters"]
        );
    }

    #[test]
    fn article_length_counts_characters_not_bytes() {
        // 5 characters, 15 bytes
        let article = ArticleDraft {
            title: Some("稻米收成好".into()),
            content: Some("a".repeat(20)),
            ..Default::default()
        };
        assert!(article.validate().is_valid());
    }

    #[test]
    fn article_bad_url_is_warning() {
        let article = ArticleDraft {
            title: Some("Harga Gabah".into()),
            content: Some("Harga gabah naik di musim kemarau.".into()),
            url: Some("not a url".into()),
            ..Default::default()
        };
        let report = article.validate();
        assert!(report.is_valid());
        assert_eq!(report.warnings, vec!["url is not a valid absolute URL"]);
    }

    #[test]
    fn tip_without_category_warns() {
        let tip = TipDraft {
            title: Some("Mulsa Jerami".into()),
            content: Some("Gunakan jerami untuk menjaga kelembaban tanah.".into()),
            category: None,
        };
        let report = tip.validate();
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }

    fn planting(date: &str) -> PlantingDraft {
        PlantingDraft {
            seed_type: Some("Jagung".into()),
            seed_count: Some(250),
            planting_date: Some(date.into()),
            ..Default::default()
        }
    }

    #[test]
    fn planting_rules() {
        let today = day("2024-06-15");
        assert!(planting("2024-06-01").validate_on(today).is_valid());
        assert!(planting("2024-06-15").validate_on(today).is_valid());

        let future = planting("2024-06-16").validate_on(today);
        assert_eq!(future.errors, vec!["planting date cannot be in the future"]);

        let zero = PlantingDraft {
            seed_count: Some(0),
            ..planting("2024-06-01")
        };
        assert_eq!(zero.validate_on(today).errors, vec!["seed count must be greater than 0"]);
    }

    #[test]
    fn planting_harvest_before_planting_rejected() {
        let draft = PlantingDraft {
            harvest_date: Some("2024-05-01".into()),
            ..planting("2024-06-01")
        };
        let report = draft.validate_on(day("2024-06-15"));
        assert_eq!(
            report.errors,
            vec!["harvest date must not be before the planting date"]
        );
    }

    #[test]
    fn planting_negative_figures_rejected() {
        let draft = PlantingDraft {
            harvest_yield: Some(-1.0),
            sales_amount: Some(f64::NAN),
            ..planting("2024-06-01")
        };
        let report = draft.validate_on(day("2024-06-15"));
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn harvest_requires_date_and_yield() {
        let report = HarvestDraft::default().validate(day("2024-01-01"));
        assert_eq!(
            report.errors,
            vec!["harvest date is required", "harvest yield is required"]
        );

        let ok = HarvestDraft {
            harvest_date: Some("2024-04-01".into()),
            harvest_yield: Some(300.0),
            price_per_kg: Some(4500.0),
        };
        assert!(ok.validate(day("2024-01-01")).is_valid());
    }

    #[test]
    fn sanitize_escapes_markup() {
        assert_eq!(
            sanitize_text("  <b>\"padi\" & 'jagung'</b> "),
            "&lt;b&gt;&quot;padi&quot; &amp; &#x27;jagung&#x27;&lt;/b&gt;"
        );
        assert_eq!(sanitize_text(&"a".repeat(20_000)).chars().count(), 10_000);
    }
}
