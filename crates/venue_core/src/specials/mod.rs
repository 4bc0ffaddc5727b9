//! Specials loader.
//!
//! # Responsibility
//! - Decode the specials catalog response.
//! - Render one card per record into the specials grid, or a single fallback
//!   message when loading fails.
//!
//! # Invariants
//! - Decoding is all-or-nothing: a malformed catalog renders zero cards.
//! - Cards are built detached and only attached once all of them exist.
//! - Record text is inserted as text nodes, never as markup.
//! - Rendered cards are visible immediately; they bypass the reveal engine.

pub mod catalog;

use crate::dom::{Dom, DomResult};
use crate::model::special::SpecialOffer;
use crate::reveal::{ANIMATED_CLASS, FADE_IN_UP_CLASS};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const SPECIALS_GRID_ID: &str = "specials-grid";
pub const SPECIALS_FALLBACK_TEXT: &str = "Check back later for new specials.";
pub const SPECIALS_FALLBACK_CLASS: &str = "specials-fallback";
const CARD_CLASSES: &str = "card card-sm flyer-card";
const FALLBACK_STYLE: [(&str, &str); 3] = [
    ("grid-column", "span 12"),
    ("text-align", "center"),
    ("color", "var(--text-muted)"),
];

/// Failure while loading the specials catalog.
#[derive(Debug)]
pub enum SpecialsError {
    /// Request could not be completed.
    Network(String),
    /// Server answered with a non-success status.
    Status(u16),
    /// Body is not a JSON array of special offer records.
    Parse(serde_json::Error),
}

impl Display for SpecialsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(details) => write!(f, "specials request failed: {details}"),
            Self::Status(status) => write!(f, "specials request returned status {status}"),
            Self::Parse(err) => write!(f, "specials catalog is malformed: {err}"),
        }
    }
}

impl Error for SpecialsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SpecialsError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Decodes a catalog response body.
pub fn parse_specials(body: &str) -> Result<Vec<SpecialOffer>, SpecialsError> {
    Ok(serde_json::from_str(body)?)
}

/// Classifies a fetched catalog response.
///
/// `body` is `None` when the host could not read the body as text. The body
/// is only decoded for 2xx statuses.
pub fn classify_response(
    status: u16,
    body: Option<&str>,
) -> Result<Vec<SpecialOffer>, SpecialsError> {
    if !(200..300).contains(&status) {
        return Err(SpecialsError::Status(status));
    }
    let body =
        body.ok_or_else(|| SpecialsError::Network("response body is not text".to_string()))?;
    parse_specials(body)
}

/// One rendered card; hosts wire `image` clicks to the lightbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCard<N> {
    pub card: N,
    pub image: N,
    pub offer: SpecialOffer,
}

/// Renders catalog load results into the specials grid.
#[derive(Debug, Clone)]
pub struct SpecialsLoader<N> {
    grid: N,
}

impl<N: Clone> SpecialsLoader<N> {
    pub fn new(grid: N) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &N {
        &self.grid
    }

    /// Replaces the grid content with cards or the fallback message.
    pub fn render<D: Dom<Node = N>>(
        &self,
        dom: &D,
        loaded: Result<Vec<SpecialOffer>, SpecialsError>,
    ) -> Vec<RenderedCard<N>> {
        let offers = match loaded {
            Ok(offers) => offers,
            Err(err) => {
                error!("event=specials_load module=specials status=error error={err}");
                self.render_fallback(dom);
                return Vec::new();
            }
        };

        let cards = match offers
            .into_iter()
            .map(|offer| build_card(dom, offer))
            .collect::<DomResult<Vec<_>>>()
        {
            Ok(cards) => cards,
            Err(err) => {
                error!("event=specials_render module=specials status=error error={err}");
                self.render_fallback(dom);
                return Vec::new();
            }
        };

        dom.clear_children(&self.grid);
        for card in &cards {
            if let Err(err) = dom.append_child(&self.grid, &card.card) {
                warn!("event=specials_render module=specials status=degraded error={err}");
            }
        }
        info!(
            "event=specials_render module=specials status=ok cards={}",
            cards.len()
        );
        cards
    }

    fn render_fallback<D: Dom<Node = N>>(&self, dom: &D) {
        dom.clear_children(&self.grid);
        let message = match dom.create_element("div") {
            Ok(message) => message,
            Err(err) => {
                warn!("event=specials_fallback module=specials status=error error={err}");
                return;
            }
        };
        dom.add_class(&message, SPECIALS_FALLBACK_CLASS);
        for (property, value) in FALLBACK_STYLE {
            dom.set_style(&message, property, value);
        }
        dom.set_text(&message, SPECIALS_FALLBACK_TEXT);
        if let Err(err) = dom.append_child(&self.grid, &message) {
            warn!("event=specials_fallback module=specials status=error error={err}");
        }
    }
}

fn build_card<D: Dom>(dom: &D, offer: SpecialOffer) -> DomResult<RenderedCard<D::Node>> {
    let card = dom.create_element("div")?;
    for class in CARD_CLASSES.split_whitespace() {
        dom.add_class(&card, class);
    }
    dom.add_class(&card, ANIMATED_CLASS);

    let image_container = dom.create_element("div")?;
    dom.add_class(&image_container, "flyer-image-container");
    let image = dom.create_element("img")?;
    dom.set_attribute(&image, "src", &offer.image);
    dom.set_attribute(&image, "alt", &offer.title);
    dom.set_style(&image, "cursor", "pointer");
    dom.append_child(&image_container, &image)?;

    let content = dom.create_element("div")?;
    dom.add_class(&content, "card-content");
    let subtitle = dom.create_element("span")?;
    dom.set_text(&subtitle, &offer.subtitle);
    let title = dom.create_element("h3")?;
    dom.set_text(&title, &offer.title);
    dom.append_child(&content, &subtitle)?;
    dom.append_child(&content, &title)?;

    dom.append_child(&card, &image_container)?;
    dom.append_child(&card, &content)?;

    dom.set_style(&card, "visibility", "visible");
    dom.add_class(&card, FADE_IN_UP_CLASS);

    Ok(RenderedCard { card, image, offer })
}

#[cfg(test)]
mod tests {
    use super::{
        classify_response, parse_specials, SpecialsError, SpecialsLoader, SPECIALS_FALLBACK_TEXT,
    };
    use crate::dom::{Dom, MemoryDom};

    #[test]
    fn parse_rejects_records_missing_fields() {
        let err = parse_specials(r#"[{"image": "/a.jpg", "title": "A"}]"#)
            .expect_err("missing subtitle must fail");
        assert!(matches!(err, SpecialsError::Parse(_)));
    }

    #[test]
    fn parse_rejects_non_array_body() {
        assert!(parse_specials(r#"{"image": "/a.jpg"}"#).is_err());
        assert!(parse_specials("<html>").is_err());
    }

    #[test]
    fn non_success_status_is_reported_before_body() {
        let err = classify_response(404, Some("[]")).expect_err("404 must fail");
        assert!(matches!(err, SpecialsError::Status(404)));
        assert!(matches!(
            classify_response(302, None),
            Err(SpecialsError::Status(302))
        ));
    }

    #[test]
    fn unreadable_body_is_a_network_error() {
        let err = classify_response(200, None).expect_err("missing body must fail");
        assert!(matches!(err, SpecialsError::Network(ref details) if details.contains("not text")));
    }

    #[test]
    fn success_status_decodes_body() {
        let offers = classify_response(
            204,
            Some(r#"[{"image": "/a.jpg", "title": "A", "subtitle": "B"}]"#),
        )
        .expect("2xx with catalog body");
        assert_eq!(offers.len(), 1);
        assert!(matches!(
            classify_response(200, Some("{}")),
            Err(SpecialsError::Parse(_))
        ));
    }

    #[test]
    fn card_text_is_not_interpreted_as_markup() {
        let dom = MemoryDom::new();
        let grid = dom.add_element(dom.body(), "div", Some("specials-grid"), "");
        let loader = SpecialsLoader::new(grid);
        let offers = parse_specials(
            r#"[{"image": "/x.jpg", "title": "<b>Ribs</b>", "subtitle": "Today"}]"#,
        )
        .expect("valid catalog");

        let cards = loader.render(&dom, Ok(offers));
        let title = dom
            .query_within(&cards[0].card, "h3")
            .expect("title node");
        assert_eq!(dom.text(&title), "<b>Ribs</b>");
        assert!(dom.query_within(&cards[0].card, "b").is_none());
    }

    #[test]
    fn status_error_renders_fallback() {
        let dom = MemoryDom::new();
        let grid = dom.add_element(dom.body(), "div", Some("specials-grid"), "");
        let loader = SpecialsLoader::new(grid);

        assert!(loader.render(&dom, Err(SpecialsError::Status(404))).is_empty());
        assert_eq!(dom.text(&grid), SPECIALS_FALLBACK_TEXT);
    }
}
