use std::sync::Arc;

use catalog_core::error::AppError;
use catalog_core::models::{CharacteristicRow, ProductPage, ProductSummary};
use catalog_core::traits::PageExtractor;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Deserializer};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Page title served instead of the product when the catalog blocks us.
pub const ACCESS_DENIED_TITLE: &str = "Access Denied";

const PRODUCT_MAIN: &str = "pes-product-main";
const BREADCRUMBS: &str = "pes-breadcrumbs";
const SPECIFICATIONS: &str = "pes-description-and-specifications";

#[derive(Debug, Default, Deserialize)]
struct BreadcrumbEntry {
    /// HTML fragment; only its text is kept.
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CharacteristicTable {
    #[serde(default, deserialize_with = "null_as_default")]
    rows: Vec<CharacteristicTableRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CharacteristicTableRow {
    #[serde(default, deserialize_with = "null_as_default")]
    characteristic_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    characteristic_values: Vec<CharacteristicValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CharacteristicValue {
    #[serde(default, deserialize_with = "null_as_default")]
    label_text: String,
}

struct Selectors {
    title: Selector,
    product_main: Selector,
    breadcrumbs: Selector,
    specifications: Selector,
}

/// Extracts product data from the JSON payloads the catalog embeds in
/// custom-element attributes.
///
/// Missing elements, attributes and nested fields yield empty values.
/// A payload that is present but not valid JSON, even after entity
/// unescaping, fails the extraction.
pub struct MarkupExtractor {
    selectors: Arc<Selectors>,
}

impl Clone for MarkupExtractor {
    fn clone(&self) -> Self {
        Self {
            selectors: Arc::clone(&self.selectors),
        }
    }
}

impl MarkupExtractor {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            selectors: Arc::new(Selectors {
                title: compile("title")?,
                product_main: compile(PRODUCT_MAIN)?,
                breadcrumbs: compile(BREADCRUMBS)?,
                specifications: compile(SPECIFICATIONS)?,
            }),
        })
    }

    fn first<'a>(&self, document: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
        document.select(selector).next()
    }

    fn title(&self, document: &Html) -> String {
        self.first(document, &self.selectors.title)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }

    /// Stock code, price and image URLs from the product element.
    fn product_details(&self, document: &Html) -> Result<(String, String, Vec<String>), AppError> {
        let Some(main) = self.first(document, &self.selectors.product_main) else {
            return Ok((String::new(), String::new(), Vec::new()));
        };

        let stock_code = main.value().attr("plain-product-id").unwrap_or_default().trim().to_string();

        let media: Option<Value> = attr_payload(main, "plain-product-media")?;
        let image = media
            .as_ref()
            .and_then(|m| m.pointer("/zoomPictureDesktop/url"))
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        let cta: Option<Value> = attr_payload(main, "plain-cta-area")?;
        let price = cta
            .as_ref()
            .and_then(|c| c.get("pdsPrice"))
            .map(value_text)
            .unwrap_or_default();

        Ok((stock_code, price, image.into_iter().collect()))
    }

    fn category_path(&self, document: &Html) -> Result<Vec<String>, AppError> {
        let Some(element) = self.first(document, &self.selectors.breadcrumbs) else {
            return Ok(Vec::new());
        };
        let entries: Vec<BreadcrumbEntry> =
            attr_payload(element, "plain-breadcrumbs")?.unwrap_or_default();
        Ok(entries.iter().map(|entry| fragment_text(&entry.name)).collect())
    }
}

impl PageExtractor for MarkupExtractor {
    fn extract(&self, code: &str, url: &str, html: &str) -> Result<ProductPage, AppError> {
        let document = Html::parse_document(html);

        let name = self.title(&document);
        let access_denied = name == ACCESS_DENIED_TITLE;

        let (stock_code, display_price, image_urls) = self.product_details(&document)?;
        let category_path = self.category_path(&document)?;

        let specifications = self.first(&document, &self.selectors.specifications);
        let long_description = specifications
            .and_then(|el| el.value().attr("plain-long-desc-sentences"))
            .unwrap_or_default()
            .to_string();
        let tables: Vec<CharacteristicTable> = match specifications {
            Some(el) => attr_payload(el, "plain-characteristic-tables")?.unwrap_or_default(),
            None => Vec::new(),
        };

        let characteristics = tables
            .iter()
            .flat_map(|table| table.rows.iter())
            .flat_map(|row| {
                row.characteristic_values.iter().map(|value| CharacteristicRow {
                    source_product_code: code.to_string(),
                    source_url: url.to_string(),
                    stock_code: stock_code.clone(),
                    characteristic_name: row.characteristic_name.clone(),
                    characteristic_value: value.label_text.clone(),
                })
            })
            .collect();

        Ok(ProductPage {
            summary: ProductSummary {
                name,
                display_price,
                stock_code,
                category_path,
                long_description,
                image_urls,
            },
            characteristics,
            access_denied,
        })
    }
}

/// Treats an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn compile(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css).map_err(|e| AppError::ConfigError(format!("Invalid selector '{css}': {e}")))
}

/// Decodes the JSON payload held in `attr`, or `None` when the attribute
/// is absent, blank or `null`.
fn attr_payload<T: DeserializeOwned>(element: ElementRef<'_>, attr: &str) -> Result<Option<T>, AppError> {
    match element.value().attr(attr) {
        Some(raw) if !raw.trim().is_empty() => decode_payload::<Option<T>>(raw)
            .map_err(|e| AppError::ExtractionError(format!("{attr}: {e}"))),
        _ => Ok(None),
    }
}

/// Parses `raw` as JSON, retrying once with HTML entities unescaped for
/// payloads that were escaped twice.
fn decode_payload<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        Err(first) => {
            let unescaped = unescape_entities(raw);
            if unescaped == raw {
                return Err(first);
            }
            serde_json::from_str(&unescaped)
        }
    }
}

fn unescape_entities(raw: &str) -> String {
    raw.replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Text of an HTML fragment, each text node trimmed, joined without separator.
fn fragment_text(fragment: &str) -> String {
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .map(str::trim)
        .collect()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
