use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

use crate::catalog::{CarCatalog, TrackCatalog};
use crate::resolver::CarNameResolver;
use crate::types::BopEntry;

static RE_BALLAST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([-+]?\d+)\s*kg").expect("invalid regex: ballast"));

/// Non-fatal diagnostics produced while extracting. Callers decide how to
/// surface these; the extractor itself never fails on malformed input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractWarning {
    #[error("car name not found in catalog: '{0}'")]
    UnknownCar(String),
    #[error("track heading not found in catalog: '{0}'")]
    UnknownTrack(String),
}

/// Result of one extraction pass: the surviving entries in document order
/// plus any warnings raised along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub entries: Vec<BopEntry>,
    pub warnings: Vec<ExtractWarning>,
}

/// Extracts BoP entries from a rendered page body. Both catalogs are
/// injected at construction so tests can substitute smaller ones.
#[derive(Debug, Clone)]
pub struct BopExtractor {
    cars: CarNameResolver,
    tracks: TrackCatalog,
}

impl BopExtractor {
    pub fn new(cars: CarCatalog, tracks: TrackCatalog) -> Self {
        BopExtractor {
            cars: CarNameResolver::new(cars),
            tracks,
        }
    }

    pub fn builtin() -> Self {
        Self::new(CarCatalog::builtin(), TrackCatalog::builtin())
    }

    /// Walks headings and tables in document order. Each `h3` heading
    /// opens a track section; the first table that follows a resolved
    /// heading holds that track's BoP rows. Rows that fail any check are
    /// dropped, never fatal.
    pub fn extract(&self, html: &str, class_filter: Option<&str>) -> Extraction {
        let document = Html::parse_document(html);
        let walk_selector = Selector::parse("h3, table").unwrap();

        let mut out = Extraction::default();
        let mut current_track: Option<String> = None;

        for element in document.select(&walk_selector) {
            match element.value().name() {
                "h3" => {
                    let heading = normalize_whitespace(&leading_text(element));
                    if heading.is_empty() {
                        current_track = None;
                        continue;
                    }
                    match self.tracks.slug(&heading) {
                        Some(slug) => current_track = Some(slug.to_string()),
                        None => {
                            out.warnings.push(ExtractWarning::UnknownTrack(heading));
                            current_track = None;
                        }
                    }
                }
                "table" => {
                    // Taking the track here means later tables in the
                    // same section are ignored.
                    if let Some(track) = current_track.take() {
                        self.extract_table(element, &track, class_filter, &mut out);
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn extract_table(
        &self,
        table: ElementRef,
        track: &str,
        class_filter: Option<&str>,
        out: &mut Extraction,
    ) {
        let row_selector = Selector::parse("tr").unwrap();
        let header_selector = Selector::parse("th").unwrap();
        let cell_selector = Selector::parse("td").unwrap();

        for row in table.select(&row_selector) {
            if row.select(&header_selector).next().is_some() {
                continue;
            }

            let cells: Vec<String> = row
                .select(&cell_selector)
                .map(|cell| normalize_whitespace(&elem_text(cell)))
                .collect();
            if cells.len() < 4 {
                continue;
            }

            // Column layout: class, car, rank (unused), ballast.
            let (class_name, car_name, ballast_text) = (&cells[0], &cells[1], &cells[3]);

            if let Some(filter) = class_filter
                && !class_name.to_lowercase().contains(&filter.to_lowercase())
            {
                continue;
            }

            let Some(car_model) = self.cars.resolve(car_name) else {
                out.warnings
                    .push(ExtractWarning::UnknownCar(car_name.clone()));
                continue;
            };
            let Some(ballast_kg) = parse_ballast(ballast_text) else {
                continue;
            };

            out.entries.push(BopEntry {
                track: track.to_string(),
                car_model,
                ballast_kg,
            });
        }
    }
}

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text content of the element up to its first child element, i.e. the
/// heading text preceding any inline markup.
fn leading_text(element: ElementRef) -> String {
    let mut text = String::new();
    for child in element.children() {
        match child.value() {
            Node::Text(t) => text.push_str(&t.text),
            Node::Element(_) => break,
            _ => {}
        }
    }
    text
}

/// Signed ballast in kilograms, accepted only within the BoP range.
fn parse_ballast(text: &str) -> Option<i32> {
    let caps = RE_BALLAST.captures(text)?;
    let value: i32 = caps[1].parse().ok()?;
    (-50..=50).contains(&value).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BopData;
    use std::fs;

    fn entry(track: &str, car_model: u16, ballast_kg: i32) -> BopEntry {
        BopEntry {
            track: track.to_string(),
            car_model,
            ballast_kg,
        }
    }

    fn row(class: &str, car: &str, rank: &str, ballast: &str) -> String {
        format!("<tr><td>{class}</td><td>{car}</td><td>{rank}</td><td>{ballast}</td></tr>")
    }

    fn doc(heading: &str, rows: &[String]) -> String {
        format!(
            "<h3 class=\"bop-track\">{heading}</h3>\n<table>\n\
             <tr><th>Class</th><th>Car</th><th>#</th><th>Ballast</th></tr>\n{}\n</table>",
            rows.join("\n")
        )
    }

    #[test]
    fn extracts_minimal_document() {
        let html = doc("Silverstone", &[row("GT3", "BMW M4 GT3", "1", "+25 kg")]);
        let result = BopExtractor::builtin().extract(&html, None);

        assert_eq!(result.entries, vec![entry("silverstone", 30, 25)]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn extract_is_idempotent() {
        let html = doc("Silverstone", &[row("GT3", "BMW M4 GT3", "1", "+25 kg")]);
        let extractor = BopExtractor::builtin();
        assert_eq!(extractor.extract(&html, None), extractor.extract(&html, None));
    }

    #[test]
    fn ballast_out_of_range_drops_row() {
        let rows = [
            row("GT3", "BMW M4 GT3", "1", "60 kg"),
            row("GT3", "Ferrari 296 GT3", "2", "-51 kg"),
            row("GT3", "Mercedes AMG GT3", "3", "+50 kg"),
            row("GT3", "Ford Mustang GT3", "4", "-50 kg"),
        ];
        let result = BopExtractor::builtin().extract(&doc("Misano", &rows), None);

        assert_eq!(
            result.entries,
            vec![entry("misano", 25, 50), entry("misano", 36, -50)]
        );
    }

    #[test]
    fn ballast_parsing_accepts_sign_whitespace_and_case() {
        let rows = [
            row("GT3", "BMW M4 GT3", "1", "-10kg"),
            row("GT3", "Ferrari 296 GT3", "2", "+5 KG"),
            row("GT3", "Mercedes AMG GT3", "3", "0 Kg"),
            // No unit suffix, dropped.
            row("GT3", "Ford Mustang GT3", "4", "25"),
        ];
        let result = BopExtractor::builtin().extract(&doc("Zolder", &rows), None);

        assert_eq!(
            result.entries,
            vec![
                entry("zolder", 30, -10),
                entry("zolder", 32, 5),
                entry("zolder", 25, 0),
            ]
        );
    }

    #[test]
    fn class_filter_is_case_insensitive_substring() {
        let rows = [row("GT4 Pro", "BMW M4 GT4", "1", "+10 kg")];
        let html = doc("Zandvoort", &rows);
        let extractor = BopExtractor::builtin();

        let kept = extractor.extract(&html, Some("gt4"));
        assert_eq!(kept.entries, vec![entry("zandvoort", 53, 10)]);

        let dropped = extractor.extract(&html, Some("gt3"));
        assert!(dropped.entries.is_empty());
    }

    #[test]
    fn unknown_track_skips_whole_segment() {
        let html = doc(
            "Nonexistent Circuit",
            &[row("GT3", "BMW M4 GT3", "1", "+25 kg")],
        );
        let result = BopExtractor::builtin().extract(&html, None);

        assert!(result.entries.is_empty());
        assert_eq!(
            result.warnings,
            vec![ExtractWarning::UnknownTrack("Nonexistent Circuit".to_string())]
        );
    }

    #[test]
    fn unknown_car_drops_row_and_warns() {
        let rows = [
            row("GT3", "Koenigsegg Jesko", "1", "+10 kg"),
            row("GT3", "BMW M4 GT3", "2", "-5 kg"),
        ];
        let result = BopExtractor::builtin().extract(&doc("Kyalami", &rows), None);

        assert_eq!(result.entries, vec![entry("kyalami", 30, -5)]);
        assert_eq!(
            result.warnings,
            vec![ExtractWarning::UnknownCar("Koenigsegg Jesko".to_string())]
        );
    }

    #[test]
    fn short_rows_are_skipped() {
        let html = format!(
            "<h3>Suzuka Circuit</h3><table>\
             <tr><td>GT3</td><td>BMW M4 GT3</td><td>+25 kg</td></tr>\
             {}</table>",
            row("GT3", "Ferrari 296 GT3", "1", "+10 kg")
        );
        let result = BopExtractor::builtin().extract(&html, None);

        assert_eq!(result.entries, vec![entry("suzuka", 32, 10)]);
    }

    #[test]
    fn cell_markup_is_stripped() {
        let html = "<h3>Silverstone</h3><table><tr>\
                    <td><span>GT3</span></td>\
                    <td><span>BMW</span> M4 <b>GT3</b></td>\
                    <td>1</td>\
                    <td><em>+25</em> kg</td>\
                    </tr></table>";
        let result = BopExtractor::builtin().extract(html, None);

        assert_eq!(result.entries, vec![entry("silverstone", 30, 25)]);
    }

    #[test]
    fn heading_trailing_markup_is_ignored() {
        let html = format!(
            "<h3>Silverstone <span class=\"flag\">GB</span></h3><table>{}</table>",
            row("GT3", "BMW M4 GT3", "1", "+25 kg")
        );
        let result = BopExtractor::builtin().extract(&html, None);

        assert_eq!(result.entries, vec![entry("silverstone", 30, 25)]);
    }

    #[test]
    fn only_first_table_per_section_is_used() {
        let html = format!(
            "<h3>Silverstone</h3><table>{}</table><table>{}</table>",
            row("GT3", "BMW M4 GT3", "1", "+25 kg"),
            row("GT3", "Ferrari 296 GT3", "2", "+10 kg")
        );
        let result = BopExtractor::builtin().extract(&html, None);

        assert_eq!(result.entries, vec![entry("silverstone", 30, 25)]);
    }

    #[test]
    fn table_before_any_heading_is_ignored() {
        let html = format!(
            "<table>{}</table><h3>Silverstone</h3><table>{}</table>",
            row("GT3", "Ferrari 296 GT3", "1", "+10 kg"),
            row("GT3", "BMW M4 GT3", "2", "+25 kg")
        );
        let result = BopExtractor::builtin().extract(&html, None);

        assert_eq!(result.entries, vec![entry("silverstone", 30, 25)]);
    }

    #[test]
    fn section_without_table_yields_nothing() {
        let html = "<h3>Silverstone</h3><p>BoP not published yet.</p>";
        let result = BopExtractor::builtin().extract(html, None);

        assert!(result.entries.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_extraction() {
        let result = BopExtractor::builtin().extract("", None);
        assert!(result.entries.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn sections_preserve_document_order() {
        let html = format!(
            "{}{}",
            doc("Autodromo Nazionale di Monza", &[
                row("GT3", "Ferrari 296 GT3", "1", "+10 kg"),
                row("GT3", "Porsche 992 GT3 R", "2", "-30 kg"),
            ]),
            doc("Silverstone", &[row("GT3", "BMW M4 GT3", "1", "+25 kg")])
        );
        let result = BopExtractor::builtin().extract(&html, None);

        assert_eq!(
            result.entries,
            vec![
                entry("monza", 32, 10),
                entry("monza", 34, -30),
                entry("silverstone", 30, 25),
            ]
        );
    }

    #[test]
    fn output_document_uses_camel_case_fields() {
        let data = BopData {
            entries: vec![entry("silverstone", 30, 25)],
        };
        let json = serde_json::to_value(&data).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "entries": [
                    { "track": "silverstone", "carModel": 30, "ballastKg": 25 }
                ]
            })
        );
    }

    #[test]
    fn parses_captured_page_fixture() {
        let html = fs::read_to_string("fixtures/bop_page.html")
            .expect("Failed to read fixture HTML file");
        let result = BopExtractor::builtin().extract(&html, None);

        assert_eq!(
            result.entries,
            vec![
                entry("monza", 32, 10),
                entry("monza", 34, -30),
                entry("hungaroring", 25, 0),
                entry("zandvoort", 50, 3),
            ]
        );
        assert_eq!(
            result.warnings,
            vec![
                ExtractWarning::UnknownCar("Lotus Evija".to_string()),
                ExtractWarning::UnknownTrack("Nordschleife Tourist".to_string()),
            ]
        );
    }
}
